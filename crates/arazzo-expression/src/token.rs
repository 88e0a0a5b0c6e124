//! Token kinds produced by the lexer.
//!
//! Fixed literals are matched in the order of [`LITERAL_PRIORITY`]. A literal that is a
//! textual prefix of another (`$components.` and `$components.inputs.`) must come after
//! it, otherwise the shorter one would always win.

use std::fmt;

/// Every kind of token the lexer can emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Url,
    Method,
    StatusCode,
    Request,
    Response,
    Inputs,
    Outputs,
    Steps,
    Workflows,
    SourceDescriptions,
    ComponentsInputs,
    ComponentsParameters,
    ComponentsSuccessActions,
    ComponentsFailureActions,
    Components,
    Header,
    Query,
    Path,
    Body,
    JsonPointerStart,
    Name,
    Token,
    NameOrToken,
    JsonPointer,
}

/// Fixed literals in matching order
pub const LITERAL_PRIORITY: [TokenKind; 20] = [
    TokenKind::Url,
    TokenKind::Method,
    TokenKind::StatusCode,
    TokenKind::Request,
    TokenKind::Response,
    TokenKind::Inputs,
    TokenKind::Outputs,
    TokenKind::Steps,
    TokenKind::Workflows,
    TokenKind::SourceDescriptions,
    TokenKind::ComponentsInputs,
    TokenKind::ComponentsParameters,
    TokenKind::ComponentsSuccessActions,
    TokenKind::ComponentsFailureActions,
    TokenKind::Components,
    TokenKind::Header,
    TokenKind::Query,
    TokenKind::Path,
    TokenKind::Body,
    TokenKind::JsonPointerStart,
];

impl TokenKind {
    /// The exact text of a fixed-literal kind, `None` for pattern classes
    pub fn literal(self) -> Option<&'static str> {
        let text = match self {
            TokenKind::Url => "$url",
            TokenKind::Method => "$method",
            TokenKind::StatusCode => "$statusCode",
            TokenKind::Request => "$request.",
            TokenKind::Response => "$response.",
            TokenKind::Inputs => "$inputs.",
            TokenKind::Outputs => "$outputs.",
            TokenKind::Steps => "$steps.",
            TokenKind::Workflows => "$workflows.",
            TokenKind::SourceDescriptions => "$sourceDescriptions.",
            TokenKind::ComponentsInputs => "$components.inputs.",
            TokenKind::ComponentsParameters => "$components.parameters.",
            TokenKind::ComponentsSuccessActions => "$components.successActions.",
            TokenKind::ComponentsFailureActions => "$components.failureActions.",
            TokenKind::Components => "$components.",
            TokenKind::Header => "header.",
            TokenKind::Query => "query.",
            TokenKind::Path => "path.",
            TokenKind::Body => "body",
            TokenKind::JsonPointerStart => "#",
            TokenKind::Name
            | TokenKind::Token
            | TokenKind::NameOrToken
            | TokenKind::JsonPointer => return None,
        };
        Some(text)
    }

    /// Whether a token of this kind can stand where a `name` is expected
    pub fn is_name(self) -> bool {
        matches!(self, TokenKind::Name | TokenKind::NameOrToken)
    }

    /// Whether a token of this kind can stand where a header `token` is expected
    pub fn is_token(self) -> bool {
        matches!(self, TokenKind::Token | TokenKind::NameOrToken)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Name => f.write_str("name"),
            TokenKind::Token => f.write_str("token"),
            TokenKind::NameOrToken => f.write_str("name-or-token"),
            TokenKind::JsonPointer => f.write_str("json-pointer"),
            literal => write!(f, "'{}'", literal.literal().unwrap_or_default()),
        }
    }
}

/// A token with its source text and byte offset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerToken {
    pub kind: TokenKind,
    pub value: String,
    pub position: usize,
}

impl LexerToken {
    pub fn new(kind: TokenKind, value: impl Into<String>, position: usize) -> Self {
        Self {
            kind,
            value: value.into(),
            position,
        }
    }

    /// Byte offset just past this token
    pub fn end(&self) -> usize {
        self.position + self.value.len()
    }
}
