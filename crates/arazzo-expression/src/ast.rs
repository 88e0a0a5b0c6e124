//! Typed syntax tree for runtime expressions.
//!
//! The node set is closed. Consumers traverse it with [`walk`] or by matching on
//! [`Node`] directly, so adding a variant is a compile error everywhere it matters.

use std::fmt;

use crate::token::TokenKind;

/// Root of a parsed runtime expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    Single(SingleExpression),
    WithSource(ExpressionWithSource),
    WithName(ExpressionWithName),
}

/// `$url`, `$method` or `$statusCode`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleExpression {
    pub value: SingleKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SingleKind {
    Url,
    Method,
    StatusCode,
}

/// `$request.<source>` or `$response.<source>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionWithSource {
    pub value: Exchange,
    pub source: Source,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exchange {
    Request,
    Response,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Header(HeaderRef),
    Query(QueryRef),
    Path(PathRef),
    Body(BodyRef),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderRef {
    pub token: Token,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRef {
    pub name: Name,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRef {
    pub name: Name,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyRef {
    pub pointer: Option<JsonPointer>,
}

/// A named root followed by a name, e.g. `$steps.` + `login.outputs.token`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionWithName {
    pub value: NamedRoot,
    pub name: Name,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedRoot {
    Inputs,
    Outputs,
    Steps,
    Workflows,
    SourceDescriptions,
    Components,
    ComponentsInputs,
    ComponentsParameters,
    ComponentsSuccessActions,
    ComponentsFailureActions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPointer {
    pub value: String,
}

impl SingleKind {
    pub fn from_kind(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Url => Some(SingleKind::Url),
            TokenKind::Method => Some(SingleKind::Method),
            TokenKind::StatusCode => Some(SingleKind::StatusCode),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SingleKind::Url => "$url",
            SingleKind::Method => "$method",
            SingleKind::StatusCode => "$statusCode",
        }
    }
}

impl Exchange {
    pub fn from_kind(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Request => Some(Exchange::Request),
            TokenKind::Response => Some(Exchange::Response),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Exchange::Request => "$request.",
            Exchange::Response => "$response.",
        }
    }

    /// Lowercase label used in error messages
    pub fn label(self) -> &'static str {
        match self {
            Exchange::Request => "request",
            Exchange::Response => "response",
        }
    }
}

impl NamedRoot {
    pub fn from_kind(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Inputs => Some(NamedRoot::Inputs),
            TokenKind::Outputs => Some(NamedRoot::Outputs),
            TokenKind::Steps => Some(NamedRoot::Steps),
            TokenKind::Workflows => Some(NamedRoot::Workflows),
            TokenKind::SourceDescriptions => Some(NamedRoot::SourceDescriptions),
            TokenKind::Components => Some(NamedRoot::Components),
            TokenKind::ComponentsInputs => Some(NamedRoot::ComponentsInputs),
            TokenKind::ComponentsParameters => Some(NamedRoot::ComponentsParameters),
            TokenKind::ComponentsSuccessActions => Some(NamedRoot::ComponentsSuccessActions),
            TokenKind::ComponentsFailureActions => Some(NamedRoot::ComponentsFailureActions),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NamedRoot::Inputs => "$inputs.",
            NamedRoot::Outputs => "$outputs.",
            NamedRoot::Steps => "$steps.",
            NamedRoot::Workflows => "$workflows.",
            NamedRoot::SourceDescriptions => "$sourceDescriptions.",
            NamedRoot::Components => "$components.",
            NamedRoot::ComponentsInputs => "$components.inputs.",
            NamedRoot::ComponentsParameters => "$components.parameters.",
            NamedRoot::ComponentsSuccessActions => "$components.successActions.",
            NamedRoot::ComponentsFailureActions => "$components.failureActions.",
        }
    }
}

impl Source {
    /// Keyword introducing this source, without the trailing dot
    pub fn keyword(&self) -> &'static str {
        match self {
            Source::Header(_) => "header",
            Source::Query(_) => "query",
            Source::Path(_) => "path",
            Source::Body(_) => "body",
        }
    }
}

/// Borrowed view of any node in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node<'a> {
    Single(&'a SingleExpression),
    WithSource(&'a ExpressionWithSource),
    WithName(&'a ExpressionWithName),
    Header(&'a HeaderRef),
    Query(&'a QueryRef),
    Path(&'a PathRef),
    Body(&'a BodyRef),
    Name(&'a Name),
    Token(&'a Token),
    JsonPointer(&'a JsonPointer),
}

impl<'a> Node<'a> {
    pub fn root(expression: &'a Expression) -> Self {
        match expression {
            Expression::Single(e) => Node::Single(e),
            Expression::WithSource(e) => Node::WithSource(e),
            Expression::WithName(e) => Node::WithName(e),
        }
    }

    fn source(source: &'a Source) -> Self {
        match source {
            Source::Header(h) => Node::Header(h),
            Source::Query(q) => Node::Query(q),
            Source::Path(p) => Node::Path(p),
            Source::Body(b) => Node::Body(b),
        }
    }

    /// Direct children in source order
    pub fn children(self) -> Vec<Node<'a>> {
        match self {
            Node::Single(_) | Node::Name(_) | Node::Token(_) | Node::JsonPointer(_) => Vec::new(),
            Node::WithSource(e) => vec![Node::source(&e.source)],
            Node::WithName(e) => vec![Node::Name(&e.name)],
            Node::Header(h) => vec![Node::Token(&h.token)],
            Node::Query(q) => vec![Node::Name(&q.name)],
            Node::Path(p) => vec![Node::Name(&p.name)],
            Node::Body(b) => b.pointer.iter().map(Node::JsonPointer).collect(),
        }
    }
}

/// Visit every node of `expression` in pre-order
pub fn walk<'a, F>(expression: &'a Expression, visit: &mut F)
where
    F: FnMut(Node<'a>),
{
    fn go<'a, F: FnMut(Node<'a>)>(node: Node<'a>, visit: &mut F) {
        visit(node);
        for child in node.children() {
            go(child, visit);
        }
    }
    go(Node::root(expression), visit);
}

/// Renders the expression back to its source text
impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Single(e) => f.write_str(e.value.as_str()),
            Expression::WithName(e) => write!(f, "{}{}", e.value.as_str(), e.name.value),
            Expression::WithSource(e) => {
                f.write_str(e.value.as_str())?;
                match &e.source {
                    Source::Header(h) => write!(f, "header.{}", h.token.value),
                    Source::Query(q) => write!(f, "query.{}", q.name.value),
                    Source::Path(p) => write!(f, "path.{}", p.name.value),
                    Source::Body(BodyRef { pointer: None }) => f.write_str("body"),
                    Source::Body(BodyRef { pointer: Some(p) }) => write!(f, "body#{}", p.value),
                }
            }
        }
    }
}
