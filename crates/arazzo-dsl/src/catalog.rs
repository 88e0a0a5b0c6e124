use std::collections::HashMap;

/// An API operation found in a source description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    /// Name of the source description it belongs to
    pub source: String,
    pub operation_id: Option<String>,
    pub method: String,
    pub path: String,
}

/// Looks up operations built from third-party API descriptions
pub trait OperationCatalog {
    fn lookup_operation_id(&self, operation_id: &str) -> Option<Operation>;

    fn lookup_operation_path(&self, operation_path: &str) -> Option<Operation>;
}

/// Catalog backed by two hash maps
#[derive(Debug, Default, Clone)]
pub struct InMemoryCatalog {
    by_id: HashMap<String, Operation>,
    by_path: HashMap<String, Operation>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an operation under its operationId, if it has one
    pub fn register(&mut self, operation: Operation) {
        if let Some(id) = &operation.operation_id {
            self.by_id.insert(id.clone(), operation);
        }
    }

    /// Register an operation under an operationPath such as
    /// `{$sourceDescriptions.petstore.url}#/paths/~1pets/get`
    pub fn register_path(&mut self, operation_path: &str, operation: Operation) {
        self.by_path.insert(operation_path.to_string(), operation);
    }

    pub fn len(&self) -> usize {
        self.by_id.len() + self.by_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl OperationCatalog for InMemoryCatalog {
    /// Accepts a bare id or one qualified as `$sourceDescriptions.<name>.<id>`
    fn lookup_operation_id(&self, operation_id: &str) -> Option<Operation> {
        if let Some(operation) = self.by_id.get(operation_id) {
            return Some(operation.clone());
        }
        let (source, id) = operation_id
            .strip_prefix("$sourceDescriptions.")?
            .split_once('.')?;
        self.by_id
            .get(id)
            .filter(|operation| operation.source == source)
            .cloned()
    }

    fn lookup_operation_path(&self, operation_path: &str) -> Option<Operation> {
        self.by_path.get(operation_path).cloned()
    }
}
