use thiserror::Error;

use crate::token::TokenKind;

/// Errors raised while extracting, lexing, parsing or matching the shape of an expression
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpressionError {
    /// No token class matches the input at `position`
    #[error("unknown token '{value}' at position {position}")]
    UnknownToken { value: String, position: usize },

    /// The parser wanted one of `expected` but found another token kind
    #[error("unexpected token {found} '{value}' at position {position}, expected {expected}")]
    UnexpectedToken {
        expected: &'static str,
        found: TokenKind,
        value: String,
        position: usize,
    },

    /// The token list ended before the production was complete
    #[error("unexpected end of expression at position {position}, expected {expected}")]
    UnexpectedEnd { expected: &'static str, position: usize },

    /// Input continues after a complete expression
    #[error("unexpected trailing {found} '{value}' at position {position}")]
    TrailingInput {
        found: TokenKind,
        value: String,
        position: usize,
    },

    /// A `}` without a matching `{`
    #[error("mismatched closing brace at position {position}")]
    MismatchedClosingBrace { position: usize },

    /// A `{` that is never closed
    #[error("mismatched opening brace at position {position}")]
    MismatchedOpeningBrace { position: usize },

    /// Non-whitespace content before or after the braced expression
    #[error("unexpected character '{character}' outside of braces at position {position}")]
    OutsideBraces { character: char, position: usize },

    /// The expression parsed but is not the shape the caller requires
    #[error("expected an expression of the form {expected}, found {found}")]
    ShapeMismatch { expected: String, found: String },
}

impl ExpressionError {
    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            ExpressionError::UnknownToken { .. } => "ERR_EXPR_UNKNOWN_TOKEN",
            ExpressionError::UnexpectedToken { .. } => "ERR_EXPR_UNEXPECTED_TOKEN",
            ExpressionError::UnexpectedEnd { .. } => "ERR_EXPR_UNEXPECTED_END",
            ExpressionError::TrailingInput { .. } => "ERR_EXPR_TRAILING_INPUT",
            ExpressionError::MismatchedClosingBrace { .. }
            | ExpressionError::MismatchedOpeningBrace { .. }
            | ExpressionError::OutsideBraces { .. } => "ERR_EXPR_BRACES",
            ExpressionError::ShapeMismatch { .. } => "ERR_EXPR_SHAPE_MISMATCH",
        }
    }

    /// Byte offset the error refers to, when it has one
    pub fn position(&self) -> Option<usize> {
        match self {
            ExpressionError::UnknownToken { position, .. }
            | ExpressionError::UnexpectedToken { position, .. }
            | ExpressionError::UnexpectedEnd { position, .. }
            | ExpressionError::TrailingInput { position, .. }
            | ExpressionError::MismatchedClosingBrace { position }
            | ExpressionError::MismatchedOpeningBrace { position }
            | ExpressionError::OutsideBraces { position, .. } => Some(*position),
            ExpressionError::ShapeMismatch { .. } => None,
        }
    }
}

/// Errors raised while evaluating an expression against an execution context
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvaluationError {
    /// A scalar such as `$url` or `$statusCode` is not available
    #[error("{0} is not available in the current exchange")]
    MissingExchangeValue(&'static str),

    /// The request or response has no such header
    #[error("{exchange} header '{name}' is not present")]
    MissingHeader { exchange: &'static str, name: String },

    /// No query or path parameter with that name
    #[error("{location} parameter '{name}' is not present")]
    MissingParameter { location: &'static str, name: String },

    /// The request or response carries no body
    #[error("{0} body is not present")]
    MissingBody(&'static str),

    /// A JSON pointer does not resolve inside the body
    #[error("JSON pointer '{pointer}' does not resolve in the {exchange} body")]
    PointerNotFound { exchange: &'static str, pointer: String },

    /// A named input, output or document entry is absent
    #[error("'{name}' not found in {scope}")]
    NotFound { scope: &'static str, name: String },

    /// `$steps.<id>` names a step that has not run yet
    #[error("step '{0}' has not been executed")]
    StepNotExecuted(String),

    /// `$workflows.<id>.outputs` names a workflow that has not run yet
    #[error("workflow '{0}' has not been executed")]
    WorkflowNotExecuted(String),

    /// The path after a step or document root is not supported
    #[error("unsupported path '{path}' for {root}")]
    UnsupportedPath { root: &'static str, path: String },
}

impl EvaluationError {
    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            EvaluationError::MissingExchangeValue(_) => "ERR_EVAL_MISSING_EXCHANGE_VALUE",
            EvaluationError::MissingHeader { .. } => "ERR_EVAL_MISSING_HEADER",
            EvaluationError::MissingParameter { .. } => "ERR_EVAL_MISSING_PARAMETER",
            EvaluationError::MissingBody(_) => "ERR_EVAL_MISSING_BODY",
            EvaluationError::PointerNotFound { .. } => "ERR_EVAL_POINTER_NOT_FOUND",
            EvaluationError::NotFound { .. } => "ERR_EVAL_NOT_FOUND",
            EvaluationError::StepNotExecuted(_) => "ERR_EVAL_STEP_NOT_EXECUTED",
            EvaluationError::WorkflowNotExecuted(_) => "ERR_EVAL_WORKFLOW_NOT_EXECUTED",
            EvaluationError::UnsupportedPath { .. } => "ERR_EVAL_UNSUPPORTED_PATH",
        }
    }
}
