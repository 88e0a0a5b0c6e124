use std::error::Error;
use std::fmt;
use tracing::debug;

use crate::document::ArazzoDocument;
use crate::error::DslError;

mod flow_validator;
mod reference;
mod schema;

pub use schema::compile_schema;

/// Represents a validation error found in an Arazzo document
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error code (should be a constant identifier)
    pub code: &'static str,

    /// Human-readable error message
    pub message: String,

    /// Optional path to the location of the error (e.g., "workflows[0].steps[2]")
    pub path: Option<String>,
}

impl ValidationError {
    pub fn new(code: &'static str, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: Some(path.into()),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(path) = &self.path {
            write!(f, "{}: {} (at {})", self.code, self.message, path)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

impl Error for ValidationError {}

/// Validation error codes
pub mod error_codes {
    /// Invalid reference (component, step, workflow, source description)
    pub const INVALID_REFERENCE: &str = "ERR_DSL_VALIDATION_INVALID_REFERENCE";

    /// Duplicate ID or identity in one scope
    pub const DUPLICATE_ID: &str = "ERR_DSL_VALIDATION_DUPLICATE_ID";

    /// Circular dependency detected
    pub const CIRCULAR_DEPENDENCY: &str = "ERR_DSL_VALIDATION_CIRCULAR_DEPENDENCY";

    /// Invalid schema
    pub const INVALID_SCHEMA: &str = "ERR_DSL_VALIDATION_INVALID_SCHEMA";

    /// Id does not match the allowed character set
    pub const INVALID_ID: &str = "ERR_DSL_VALIDATION_INVALID_ID";

    /// Step has zero or several targets
    pub const INVALID_STEP_TARGET: &str = "ERR_DSL_VALIDATION_INVALID_STEP_TARGET";

    /// Action fields contradict its type
    pub const INVALID_ACTION: &str = "ERR_DSL_VALIDATION_INVALID_ACTION";

    /// Criterion fields contradict its type
    pub const INVALID_CRITERION: &str = "ERR_DSL_VALIDATION_INVALID_CRITERION";

    /// A runtime expression does not parse
    pub const INVALID_EXPRESSION: &str = "ERR_DSL_VALIDATION_INVALID_EXPRESSION";

    /// Extension key without the `x-` prefix
    pub const INVALID_EXTENSION: &str = "ERR_DSL_VALIDATION_INVALID_EXTENSION";

    /// Workflow inputs do not satisfy the workflow's schema
    pub const INVALID_INPUT: &str = "ERR_DSL_VALIDATION_INVALID_INPUT";
}

/// Knobs for document validation
#[derive(Debug, Clone, Default)]
pub struct ValidationOptions {
    /// Report non-`x-` extension keys as errors instead of warnings
    pub strict_extensions: bool,
}

/// A trait for validators that check specific aspects of the document
pub trait Validator {
    /// Validate the document and return a list of validation errors (if any)
    fn validate(&self, document: &ArazzoDocument) -> Vec<ValidationError>;
}

/// Validate a parsed document with default options
pub fn validate_document(document: &ArazzoDocument) -> Result<(), DslError> {
    validate_document_with(document, &ValidationOptions::default())
}

/// Validate a parsed document, collecting every problem before failing
pub fn validate_document_with(
    document: &ArazzoDocument,
    options: &ValidationOptions,
) -> Result<(), DslError> {
    let validators: Vec<Box<dyn Validator>> = vec![
        Box::new(flow_validator::FlowValidator::new()),
        Box::new(reference::ReferenceValidator::new()),
        Box::new(schema::SchemaValidator::new(options.strict_extensions)),
    ];

    let mut errors = Vec::new();
    for validator in validators {
        errors.extend(validator.validate(document));
    }

    debug!(
        workflows = document.workflows.len(),
        errors = errors.len(),
        "Validated document"
    );

    if !errors.is_empty() {
        return Err(DslError::from_validation_errors(errors));
    }

    Ok(())
}
