use crate::ast::{Expression, NamedRoot, Node};
use crate::error::ExpressionError;
use crate::printer::stringify;

/// Accepts only `<root><name>` for one fixed root and yields the name
pub struct ShapeMatcher {
    expected: NamedRoot,
}

impl ShapeMatcher {
    pub fn new(expected: NamedRoot) -> Self {
        Self { expected }
    }

    /// Extract the referenced name, failing on every other shape
    pub fn match_name<'a>(&self, expression: &'a Expression) -> Result<&'a str, ExpressionError> {
        self.visit(Node::root(expression))
            .ok_or_else(|| ExpressionError::ShapeMismatch {
                expected: format!("{}<name>", self.expected.as_str()),
                found: stringify(expression),
            })
    }

    fn visit<'a>(&self, node: Node<'a>) -> Option<&'a str> {
        match node {
            Node::WithName(e) if e.value == self.expected => self.visit(Node::Name(&e.name)),
            Node::Name(name) => Some(name.value.as_str()),
            Node::WithName(_)
            | Node::Single(_)
            | Node::WithSource(_)
            | Node::Header(_)
            | Node::Query(_)
            | Node::Path(_)
            | Node::Body(_)
            | Node::Token(_)
            | Node::JsonPointer(_) => None,
        }
    }
}

/// Parse `input`, braces optional, and extract the name it references under `expected`
pub fn resolve_name(input: &str, expected: NamedRoot) -> Result<String, ExpressionError> {
    let expression = crate::parse_embedded(input)?;
    ShapeMatcher::new(expected)
        .match_name(&expression)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_matching_shape_yields_name() {
        let name = resolve_name("$components.parameters.storeId", NamedRoot::ComponentsParameters)
            .unwrap();
        assert_eq!(name, "storeId");

        let braced =
            resolve_name("{$components.parameters.storeId}", NamedRoot::ComponentsParameters)
                .unwrap();
        assert_eq!(braced, "storeId");
    }

    #[test]
    fn test_other_root_is_rejected() {
        let err =
            resolve_name("$components.successActions.storeId", NamedRoot::ComponentsParameters)
                .unwrap_err();
        assert_eq!(
            err,
            ExpressionError::ShapeMismatch {
                expected: "$components.parameters.<name>".to_string(),
                found: "($components.successActions. storeId)".to_string(),
            }
        );
    }

    #[test]
    fn test_non_named_expressions_are_rejected() {
        for input in ["$url", "$request.body#/id", "$response.header.Location"] {
            let err = resolve_name(input, NamedRoot::ComponentsFailureActions).unwrap_err();
            assert_eq!(err.error_code(), "ERR_EXPR_SHAPE_MISMATCH", "Input {}", input);
        }
    }

    #[test]
    fn test_parse_errors_pass_through() {
        let err = resolve_name("$components.parameters.", NamedRoot::ComponentsParameters)
            .unwrap_err();
        assert!(matches!(err, ExpressionError::UnexpectedEnd { .. }));
    }
}
