use arazzo_expression::{EvaluationError, ExpressionError};
use std::fmt;
use thiserror::Error;

use crate::validation::ValidationError;

/// All possible errors that can occur while processing an Arazzo document
#[derive(Error, Debug)]
pub enum DslError {
    /// Errors that occur during YAML parsing
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Errors that occur during JSON processing
    #[error("JSON processing error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A single validation error
    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationError),

    /// Multiple validation errors
    #[error("{}", MultipleErrorsFormat(.0))]
    MultipleValidationErrors(Vec<ValidationError>),

    /// The `arazzo` field is not a supported 1.0.x version
    #[error("Unsupported Arazzo version: {0}")]
    UnsupportedVersion(String),

    /// A runtime expression failed to lex, parse or match its expected shape
    #[error("Invalid runtime expression '{expression}': {source}")]
    Expression {
        expression: String,
        #[source]
        source: ExpressionError,
    },

    /// A runtime expression could not be evaluated
    #[error("Evaluation error: {0}")]
    Evaluation(#[from] EvaluationError),

    /// A referenced name is absent from the catalog it was looked up in
    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },

    /// Two entries with the same identity in one scope
    #[error("Duplicate {kind} '{identity}' in {scope}")]
    DuplicateDefinition {
        kind: &'static str,
        identity: String,
        scope: String,
    },

    /// A step must have exactly one of operationId, operationPath and workflowId
    #[error("Step '{step_id}' in workflow '{workflow_id}' must have exactly one target, found {found}")]
    InvalidStepTarget {
        workflow_id: String,
        step_id: String,
        found: usize,
    },

    /// dependsOn names a workflow that does not exist
    #[error("Workflow '{workflow_id}' depends on unknown workflow '{dependency}'")]
    UnresolvedDependency {
        workflow_id: String,
        dependency: String,
    },

    /// The dependsOn relation has a cycle
    #[error("Circular workflow dependency: {}", .0.join(" → "))]
    CircularDependency(Vec<String>),

    /// The operation catalog has no match for a step target
    #[error("Step '{step_id}' targets unknown operation {target}")]
    UnknownOperation { step_id: String, target: String },

    /// A criterion could not be evaluated
    #[error("Criterion error: {0}")]
    Criterion(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

// Helper struct to format multiple errors
struct MultipleErrorsFormat<'a>(&'a [ValidationError]);

impl fmt::Display for MultipleErrorsFormat<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Multiple validation errors ({} issues):", self.0.len())?;
        for (i, err) in self.0.iter().enumerate() {
            write!(f, "\n  {}. {}", i + 1, err)?;
        }
        Ok(())
    }
}

impl DslError {
    /// Create a DslError from a vector of validation errors
    pub fn from_validation_errors(mut errors: Vec<ValidationError>) -> Self {
        match errors.len() {
            0 => DslError::InternalError(
                "Called from_validation_errors with empty vector".to_string(),
            ),
            1 => match errors.pop() {
                Some(error) => DslError::ValidationError(error),
                None => DslError::InternalError("Validation error vanished".to_string()),
            },
            _ => DslError::MultipleValidationErrors(errors),
        }
    }

    pub fn expression(expression: &str, source: ExpressionError) -> Self {
        DslError::Expression {
            expression: expression.to_string(),
            source,
        }
    }

    /// The validation errors carried by this error, if any
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            DslError::ValidationError(err) => std::slice::from_ref(err),
            DslError::MultipleValidationErrors(errors) => errors,
            _ => &[],
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            DslError::YamlError(_) => "ERR_DSL_YAML_PARSE",
            DslError::JsonError(_) => "ERR_DSL_JSON_PARSE",
            DslError::ValidationError(err) => err.code,
            DslError::MultipleValidationErrors(_) => "ERR_DSL_VALIDATION_MULTIPLE",
            DslError::UnsupportedVersion(_) => "ERR_DSL_UNSUPPORTED_VERSION",
            DslError::Expression { source, .. } => source.error_code(),
            DslError::Evaluation(err) => err.error_code(),
            DslError::NotFound { .. } => "ERR_DSL_NOT_FOUND",
            DslError::DuplicateDefinition { .. } => "ERR_DSL_DUPLICATE_DEFINITION",
            DslError::InvalidStepTarget { .. } => "ERR_DSL_INVALID_STEP_TARGET",
            DslError::UnresolvedDependency { .. } => "ERR_DSL_UNRESOLVED_DEPENDENCY",
            DslError::CircularDependency(_) => "ERR_DSL_CIRCULAR_DEPENDENCY",
            DslError::UnknownOperation { .. } => "ERR_DSL_UNKNOWN_OPERATION",
            DslError::Criterion(_) => "ERR_DSL_CRITERION",
            DslError::InternalError(_) => "ERR_DSL_INTERNAL",
        }
    }
}
