//! # Arazzo runtime expressions
//!
//! Runtime expressions wire data between the steps of an Arazzo workflow:
//! `$inputs.username`, `$steps.login.outputs.token`, `$response.body#/items/0/id`.
//! This crate lexes and parses them into a typed tree, prints that tree, and
//! resolves it either structurally (which component does this reference name?)
//! or against an execution context.
//!
//! ## Example
//!
//! ```
//! use arazzo_expression::{parse, printer::stringify};
//!
//! let expression = parse("$request.header.accept").unwrap();
//! assert_eq!(stringify(&expression), "($request. (header. accept))");
//! assert_eq!(expression.to_string(), "$request.header.accept");
//! ```

mod error;
mod extract;
mod value;

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod printer;
pub mod resolver;
pub mod token;

pub use ast::{Expression, NamedRoot};
pub use error::{EvaluationError, ExpressionError};
pub use extract::extract;
pub use resolver::{evaluate, resolve_name, ExecutionContext, HttpMessage, RuntimeContext};
pub use value::{parse_embedded, RuntimeValue};

/// Tokenize and parse a runtime expression.
///
/// # Examples
///
/// ```
/// use arazzo_expression::{parse, ExpressionError};
///
/// assert!(parse("$steps.login.outputs.token").is_ok());
/// assert!(matches!(
///     parse("$workflows.foo.inputs.username#123"),
///     Err(ExpressionError::TrailingInput { .. })
/// ));
/// ```
pub fn parse(input: &str) -> Result<Expression, ExpressionError> {
    let tokens = lexer::tokenize(input)?;
    parser::parse_tokens(&tokens)
}

/// Whether `input` is a syntactically valid expression, with or without braces.
///
/// This says nothing about whether the names it uses exist in a document.
pub fn validate(input: &str) -> bool {
    parse_embedded(input).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        assert!(validate("$workflows.foo.inputs.username"));
        assert!(validate("{$workflows.foo.inputs.username}"));
        assert!(!validate("$workflows.foo.inputs.username#123"));
        assert!(!validate(""));
    }
}
