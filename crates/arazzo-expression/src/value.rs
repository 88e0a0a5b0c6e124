use serde_json::Value;

use crate::ast::Expression;
use crate::error::{EvaluationError, ExpressionError};
use crate::extract::extract;
use crate::resolver::{evaluate, ExecutionContext};

/// A document value that is either a literal or a runtime expression
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeValue {
    Constant(Value),
    Expression(Expression),
}

impl RuntimeValue {
    /// Classify a raw value. Strings that parse as expressions (optionally wrapped in
    /// braces) are expressions, everything else is a constant.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(text) => match parse_embedded(text) {
                Ok(expression) => RuntimeValue::Expression(expression),
                Err(_) => RuntimeValue::Constant(value.clone()),
            },
            other => RuntimeValue::Constant(other.clone()),
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, RuntimeValue::Constant(_))
    }

    pub fn as_expression(&self) -> Option<&Expression> {
        match self {
            RuntimeValue::Expression(expression) => Some(expression),
            RuntimeValue::Constant(_) => None,
        }
    }

    /// Constants evaluate to themselves
    pub fn evaluate(&self, context: &dyn ExecutionContext) -> Result<Value, EvaluationError> {
        match self {
            RuntimeValue::Constant(value) => Ok(value.clone()),
            RuntimeValue::Expression(expression) => evaluate(expression, context),
        }
    }
}

/// Parse an expression, first stripping `{...}` when the text starts with a brace
pub fn parse_embedded(text: &str) -> Result<Expression, ExpressionError> {
    if text.starts_with('{') {
        crate::parse(&extract(text)?)
    } else {
        crate::parse(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::RuntimeContext;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_classification() {
        assert!(RuntimeValue::from_value(&json!(42)).is_constant());
        assert!(RuntimeValue::from_value(&json!("plain text")).is_constant());
        assert!(RuntimeValue::from_value(&json!({"a": "$inputs.x"})).is_constant());
        assert!(!RuntimeValue::from_value(&json!("$inputs.x")).is_constant());
        assert!(!RuntimeValue::from_value(&json!("{$inputs.x}")).is_constant());
        // a broken brace pair is kept as text
        assert!(RuntimeValue::from_value(&json!("{$inputs.x")).is_constant());
    }

    #[test]
    fn test_evaluate() {
        let context = RuntimeContext::new().with_input("x", json!("hello"));
        assert_eq!(
            RuntimeValue::from_value(&json!("{$inputs.x}"))
                .evaluate(&context)
                .unwrap(),
            json!("hello")
        );
        assert_eq!(
            RuntimeValue::from_value(&json!([1, 2]))
                .evaluate(&context)
                .unwrap(),
            json!([1, 2])
        );
    }
}
