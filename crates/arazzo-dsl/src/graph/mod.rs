//! Resolved `Spec → Workflow → Step` graph.
//!
//! Workflows and steps live in an arena. Parent links and `dependsOn` edges are
//! plain indices, so ownership stays a tree.

mod builder;
mod dependency;
mod node;

pub use builder::GraphBuilder;
pub use dependency::DependencyGraph;
pub use node::{StepNode, WorkflowNode};

use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use crate::catalog::OperationCatalog;
use crate::document::{ArazzoDocument, StepTarget};
use crate::error::DslError;
use crate::validation::{compile_schema, error_codes, ValidationError};

#[derive(Debug, Clone)]
pub struct WorkflowGraph {
    workflows: Vec<WorkflowNode>,
    index: HashMap<String, usize>,
    order: Vec<usize>,
}

impl WorkflowGraph {
    /// Build the graph for `document`
    pub fn build(document: &ArazzoDocument) -> Result<Self, DslError> {
        GraphBuilder::new(document).build()
    }

    pub(crate) fn from_parts(
        workflows: Vec<WorkflowNode>,
        index: HashMap<String, usize>,
        order: Vec<usize>,
    ) -> Self {
        Self {
            workflows,
            index,
            order,
        }
    }

    /// Workflows in document order
    pub fn workflows(&self) -> &[WorkflowNode] {
        &self.workflows
    }

    pub fn workflow(&self, workflow_id: &str) -> Option<&WorkflowNode> {
        self.index.get(workflow_id).map(|&i| &self.workflows[i])
    }

    pub fn step(&self, workflow_id: &str, step_id: &str) -> Option<&StepNode> {
        self.workflow(workflow_id)?.step(step_id)
    }

    /// Owning workflow of a step
    pub fn parent(&self, step: &StepNode) -> &WorkflowNode {
        &self.workflows[step.workflow]
    }

    /// Workflows this one depends on directly
    pub fn dependencies(&self, workflow: &WorkflowNode) -> Vec<&WorkflowNode> {
        workflow
            .dependencies
            .iter()
            .map(|&i| &self.workflows[i])
            .collect()
    }

    /// Every workflow after all of its dependencies. Workflows without a mutual
    /// dependency have no defined relative order.
    pub fn topological_order(&self) -> Vec<&WorkflowNode> {
        self.order.iter().map(|&i| &self.workflows[i]).collect()
    }

    /// Resolve every operationId/operationPath step target. Nothing is recorded
    /// unless all targets resolve.
    pub fn bind_operations(&mut self, catalog: &dyn OperationCatalog) -> Result<(), DslError> {
        let mut resolved = Vec::new();

        for (w, workflow) in self.workflows.iter().enumerate() {
            for (s, step) in workflow.steps.iter().enumerate() {
                let operation = match &step.target {
                    StepTarget::OperationId(id) => catalog.lookup_operation_id(id),
                    StepTarget::OperationPath(path) => catalog.lookup_operation_path(path),
                    StepTarget::Workflow(_) => continue,
                };
                match operation {
                    Some(operation) => resolved.push((w, s, operation)),
                    None => {
                        return Err(DslError::UnknownOperation {
                            step_id: step.id.clone(),
                            target: step.target.to_string(),
                        })
                    }
                }
            }
        }

        debug!(operations = resolved.len(), "Bound step operations");
        for (w, s, operation) in resolved {
            self.workflows[w].steps[s].operation = Some(operation);
        }
        Ok(())
    }

    /// Check workflow inputs against the workflow's input schema
    pub fn validate_inputs(&self, workflow_id: &str, inputs: &Value) -> Result<(), DslError> {
        let workflow = self.workflow(workflow_id).ok_or_else(|| DslError::NotFound {
            kind: "workflow",
            name: workflow_id.to_string(),
        })?;
        let Some(schema) = &workflow.inputs else {
            return Ok(());
        };

        let path = format!("workflows.{}.inputs", workflow_id);
        let compiled = compile_schema(schema, &path).map_err(DslError::ValidationError)?;
        let result = compiled.validate(inputs);
        if let Err(errors) = result {
            let errors: Vec<ValidationError> = errors
                .map(|error| {
                    ValidationError::new(
                        error_codes::INVALID_INPUT,
                        error.to_string(),
                        format!("{}{}", path, error.instance_path),
                    )
                })
                .collect();
            return Err(DslError::from_validation_errors(errors));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{InMemoryCatalog, Operation};
    use crate::parser::parse_document;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const DOCUMENT: &str = r#"
arazzo: 1.0.1
info:
  title: Pets
  version: "1.0.0"
sourceDescriptions:
  - name: petstore
    url: ./petstore.yaml
    type: openapi
workflows:
  - workflowId: adopt
    dependsOn: [login]
    inputs:
      $ref: '#/components/inputs/adoption'
    parameters:
      - name: token
        in: header
        value: $workflows.login.outputs.token
    steps:
      - stepId: find
        operationId: findPets
        parameters:
          - reference: $components.parameters.page
      - stepId: buy
        operationPath: "{$sourceDescriptions.petstore.url}#/paths/~1orders/post"
  - workflowId: login
    steps:
      - stepId: auth
        operationId: login
components:
  inputs:
    adoption:
      type: object
      required: [petId]
      properties:
        petId:
          type: integer
  parameters:
    page:
      name: page
      in: query
      value: 1
"#;

    fn create_test_graph() -> WorkflowGraph {
        let document = parse_document(DOCUMENT).unwrap();
        WorkflowGraph::build(&document).unwrap()
    }

    fn create_test_catalog() -> InMemoryCatalog {
        let mut catalog = InMemoryCatalog::new();
        for id in ["findPets", "login"] {
            catalog.register(Operation {
                source: "petstore".to_string(),
                operation_id: Some(id.to_string()),
                method: "get".to_string(),
                path: format!("/{}", id),
            });
        }
        catalog.register_path(
            "{$sourceDescriptions.petstore.url}#/paths/~1orders/post",
            Operation {
                source: "petstore".to_string(),
                operation_id: None,
                method: "post".to_string(),
                path: "/orders".to_string(),
            },
        );
        catalog
    }

    #[test]
    fn test_topological_order() {
        let graph = create_test_graph();
        let order: Vec<&str> = graph
            .topological_order()
            .into_iter()
            .map(|w| w.id.as_str())
            .collect();
        assert_eq!(order, vec!["login", "adopt"]);

        let adopt = graph.workflow("adopt").unwrap();
        let deps: Vec<&str> = graph.dependencies(adopt).iter().map(|w| w.id.as_str()).collect();
        assert_eq!(deps, vec!["login"]);
    }

    #[test]
    fn test_step_lookup_and_parent() {
        let graph = create_test_graph();
        let step = graph.step("adopt", "find").unwrap();
        assert_eq!(graph.parent(step).id, "adopt");
        assert_eq!(step.target, StepTarget::OperationId("findPets".to_string()));

        let names: Vec<&str> = step.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["token", "page"], "Inherited parameters come first");
        assert!(graph.step("adopt", "missing").is_none());
    }

    #[test]
    fn test_bind_operations() {
        let mut graph = create_test_graph();
        graph.bind_operations(&create_test_catalog()).unwrap();

        let buy = graph.step("adopt", "buy").unwrap();
        assert_eq!(buy.operation.as_ref().map(|o| o.path.as_str()), Some("/orders"));
    }

    #[test]
    fn test_bind_operations_unknown() {
        let mut graph = create_test_graph();
        let err = graph.bind_operations(&InMemoryCatalog::new()).unwrap_err();
        assert_eq!(err.error_code(), "ERR_DSL_UNKNOWN_OPERATION");
        assert!(
            graph.workflows().iter().flat_map(|w| &w.steps).all(|s| s.operation.is_none()),
            "No operation should be recorded after a failure"
        );
    }

    #[test]
    fn test_validate_inputs() {
        let graph = create_test_graph();
        assert!(graph.validate_inputs("adopt", &json!({"petId": 3})).is_ok());

        let err = graph.validate_inputs("adopt", &json!({"petId": "x"})).unwrap_err();
        assert_eq!(err.error_code(), error_codes::INVALID_INPUT);

        assert!(graph.validate_inputs("login", &json!({})).is_ok());
        assert!(graph.validate_inputs("nope", &json!({})).is_err());
    }
}
