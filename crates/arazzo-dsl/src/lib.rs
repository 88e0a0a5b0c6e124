//! # Arazzo DSL
//!
//! Arazzo documents describe API workflows: ordered steps that call operations
//! of third-party APIs (or other workflows), wired together with runtime
//! expressions. This crate parses and validates those documents, resolves
//! reusable components, and builds a workflow graph a host executor can walk.
//!
//! ## Features
//!
//! * YAML and JSON documents with a `1.0.x` version check
//! * Validation that collects every problem: ids, references, expressions, schemas
//! * Resolution of `$components` references with step-over-workflow overrides
//! * `dependsOn` ordering with cycle detection
//! * Criteria evaluation and retry/goto/end directives for step outcomes
//!
//! ## Example
//!
//! ```
//! use arazzo_dsl::load_workflow_graph;
//!
//! let yaml = r#"
//! arazzo: 1.0.1
//! info:
//!   title: Pet adoption
//!   version: 1.0.0
//! sourceDescriptions:
//!   - name: petstore
//!     url: https://example.com/petstore.yaml
//!     type: openapi
//! workflows:
//!   - workflowId: adopt
//!     steps:
//!       - stepId: find
//!         operationId: findPets
//!         successCriteria:
//!           - condition: $statusCode == 200
//!         outputs:
//!           petId: $response.body#/0/id
//! "#;
//!
//! let graph = load_workflow_graph(yaml).unwrap();
//! assert_eq!(graph.topological_order()[0].id, "adopt");
//! ```

mod error;

pub mod catalog;
pub mod document;
pub mod graph;
pub mod parser;
pub mod resolve;
pub mod runtime;
pub mod validation;

pub use catalog::{InMemoryCatalog, Operation, OperationCatalog};
pub use document::ArazzoDocument;
pub use error::DslError;
pub use graph::{StepNode, WorkflowGraph, WorkflowNode};
pub use parser::{parse_document, parse_json_document};
pub use resolve::ReferenceResolver;
pub use runtime::{ActionTarget, CriteriaEngine, CriterionEvaluator, Directive};
pub use validation::{ValidationError, ValidationOptions};

/// Parse and validate an Arazzo YAML (or JSON) string.
///
/// Every validation problem is collected before failing, so the returned error
/// lists all of them.
///
/// # Errors
///
/// * Invalid YAML syntax or missing required fields
/// * Unsupported `arazzo` version
/// * Validation errors (duplicate ids, unknown references, invalid expressions, cycles)
///
/// # Examples
///
/// ```
/// use arazzo_dsl::parse_and_validate_document;
///
/// let yaml = r#"
/// arazzo: 1.0.1
/// info:
///   title: Broken
///   version: 1.0.0
/// workflows:
///   - workflowId: outer
///     steps:
///       - stepId: call
///         workflowId: missing
/// "#;
///
/// let error = parse_and_validate_document(yaml).unwrap_err();
/// assert!(error.error_code().contains("INVALID_REFERENCE"));
/// ```
pub fn parse_and_validate_document(yaml_str: &str) -> Result<ArazzoDocument, DslError> {
    parse_and_validate_document_with(yaml_str, &ValidationOptions::default())
}

pub fn parse_and_validate_document_with(
    yaml_str: &str,
    options: &ValidationOptions,
) -> Result<ArazzoDocument, DslError> {
    let document = parser::parse_document(yaml_str)?;
    validation::validate_document_with(&document, options)?;
    Ok(document)
}

/// Parse, validate and build the workflow graph of a document
pub fn load_workflow_graph(yaml_str: &str) -> Result<WorkflowGraph, DslError> {
    load_workflow_graph_with(yaml_str, &ValidationOptions::default())
}

pub fn load_workflow_graph_with(
    yaml_str: &str,
    options: &ValidationOptions,
) -> Result<WorkflowGraph, DslError> {
    let document = parse_and_validate_document_with(yaml_str, options)?;
    WorkflowGraph::build(&document)
}

/// Returns a version string for the Arazzo DSL crate
///
/// # Examples
///
/// ```
/// use arazzo_dsl::version;
///
/// assert!(version().starts_with("0."));
/// ```
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_valid_document() {
        let yaml = r#"
        arazzo: 1.0.0
        info:
          title: Login
          version: "1"
        workflows:
          - workflowId: login
            steps:
              - stepId: auth
                operationId: login
        "#;

        let graph = load_workflow_graph(yaml);
        assert!(graph.is_ok(), "Failed to load valid document: {:?}", graph.err());
    }

    #[test]
    fn test_validation_runs_before_graph_build() {
        let yaml = r#"
        arazzo: 1.0.0
        info:
          title: Broken
          version: "1"
        workflows:
          - workflowId: a
            dependsOn: [b]
            steps: []
          - workflowId: b
            dependsOn: [a]
            steps:
              - stepId: bad id
                operationId: op
        "#;

        let err = load_workflow_graph(yaml).unwrap_err();
        let codes: Vec<&str> = err.validation_errors().iter().map(|e| e.code).collect();
        assert!(codes.contains(&validation::error_codes::CIRCULAR_DEPENDENCY));
        assert!(codes.contains(&validation::error_codes::INVALID_ID));
    }
}
