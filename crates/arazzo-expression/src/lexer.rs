use lazy_static::lazy_static;
use regex::Regex;
use tracing::trace;

use crate::error::ExpressionError;
use crate::token::{LexerToken, TokenKind, LITERAL_PRIORITY};

lazy_static! {
    static ref NAME_REGEX: Regex = Regex::new(r"^[a-zA-Z0-9_.\-]+").unwrap();
    static ref TOKEN_REGEX: Regex = Regex::new(r"^[!#$%&'*+\-.^_`|~0-9a-zA-Z]+").unwrap();
    static ref JSON_POINTER_REGEX: Regex =
        Regex::new(r"^(?:/(?:[\x00-\x2E\x30-\x7D\x7F-\x{10FFFF}]|~[01])+)+").unwrap();
}

/// Splits a runtime expression into tokens
pub struct Lexer<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, position: 0 }
    }

    /// Consume the whole input, failing on the first unrecognised character
    pub fn tokenize(mut self) -> Result<Vec<LexerToken>, ExpressionError> {
        let mut tokens = Vec::new();
        while self.position < self.input.len() {
            let token = self.next_token()?;
            self.position = token.end();
            tokens.push(token);
        }
        trace!(expression = self.input, tokens = tokens.len(), "Tokenized expression");
        Ok(tokens)
    }

    fn next_token(&self) -> Result<LexerToken, ExpressionError> {
        let rest = &self.input[self.position..];

        for kind in LITERAL_PRIORITY {
            if let Some(literal) = kind.literal() {
                if rest.starts_with(literal) {
                    return Ok(LexerToken::new(kind, literal, self.position));
                }
            }
        }

        if let Some(token) = TOKEN_REGEX.find(rest) {
            // Names are a subset of token characters, so the name match is never longer
            return Ok(match NAME_REGEX.find(rest) {
                Some(name) => LexerToken::new(TokenKind::NameOrToken, name.as_str(), self.position),
                None => LexerToken::new(TokenKind::Token, token.as_str(), self.position),
            });
        }

        if let Some(name) = NAME_REGEX.find(rest) {
            return Ok(LexerToken::new(TokenKind::Name, name.as_str(), self.position));
        }

        if let Some(pointer) = JSON_POINTER_REGEX.find(rest) {
            return Ok(LexerToken::new(TokenKind::JsonPointer, pointer.as_str(), self.position));
        }

        Err(ExpressionError::UnknownToken {
            value: rest.to_string(),
            position: self.position,
        })
    }
}

/// Tokenize a runtime expression
pub fn tokenize(input: &str) -> Result<Vec<LexerToken>, ExpressionError> {
    Lexer::new(input).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input)
            .unwrap_or_else(|e| panic!("Failed to tokenize {}: {}", input, e))
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_every_literal_lexes_to_itself() {
        for kind in LITERAL_PRIORITY {
            let literal = kind.literal().unwrap();
            let tokens = tokenize(literal).unwrap();
            assert_eq!(tokens.len(), 1, "Literal {} produced {:?}", literal, tokens);
            assert_eq!(tokens[0].kind, kind);
            assert_eq!(tokens[0].value, literal);
            assert_eq!(tokens[0].position, 0);
        }
    }

    #[test]
    fn test_specific_component_literal_wins() {
        let tokens = tokenize("$components.inputs.foo").unwrap();
        assert_eq!(
            tokens,
            vec![
                LexerToken::new(TokenKind::ComponentsInputs, "$components.inputs.", 0),
                LexerToken::new(TokenKind::NameOrToken, "foo", 19),
            ]
        );
    }

    #[test]
    fn test_request_header() {
        assert_eq!(
            kinds("$request.header.accept"),
            vec![TokenKind::Request, TokenKind::Header, TokenKind::NameOrToken]
        );
    }

    #[test]
    fn test_body_with_pointer() {
        let tokens = tokenize("$response.body#/user/uuid").unwrap();
        assert_eq!(
            tokens,
            vec![
                LexerToken::new(TokenKind::Response, "$response.", 0),
                LexerToken::new(TokenKind::Body, "body", 10),
                LexerToken::new(TokenKind::JsonPointerStart, "#", 14),
                LexerToken::new(TokenKind::JsonPointer, "/user/uuid", 15),
            ]
        );
    }

    #[test]
    fn test_pointer_escapes() {
        let tokens = tokenize("$request.body#/a~1b/c~0d").unwrap();
        assert_eq!(tokens[3].value, "/a~1b/c~0d");
    }

    #[test]
    fn test_name_with_dots_is_one_token() {
        let tokens = tokenize("$steps.loginStep.outputs.sessionToken").unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].kind, TokenKind::NameOrToken);
        assert_eq!(tokens[1].value, "loginStep.outputs.sessionToken");
    }

    #[test]
    fn test_token_only_characters() {
        let tokens = tokenize("$request.header.!x").unwrap();
        assert_eq!(tokens[2], LexerToken::new(TokenKind::Token, "!x", 16));
    }

    #[test]
    fn test_name_or_token_uses_name_length() {
        // '#' is a token character but not a name character
        let tokens = tokenize("$workflows.foo.inputs.username#123").unwrap();
        assert_eq!(tokens[1].kind, TokenKind::NameOrToken);
        assert_eq!(tokens[1].value, "foo.inputs.username");
        assert_eq!(tokens[2].kind, TokenKind::JsonPointerStart);
        assert_eq!(tokens[3].value, "123");
    }

    #[test]
    fn test_unknown_token_reports_offset() {
        let err = tokenize("$inputs. foo").unwrap_err();
        assert_eq!(
            err,
            ExpressionError::UnknownToken {
                value: " foo".to_string(),
                position: 8,
            }
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("").unwrap().is_empty());
    }
}
