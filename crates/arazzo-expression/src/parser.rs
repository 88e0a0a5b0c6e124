use tracing::trace;

use crate::ast::{
    BodyRef, Exchange, Expression, ExpressionWithName, ExpressionWithSource, HeaderRef,
    JsonPointer, Name, NamedRoot, PathRef, QueryRef, SingleExpression, SingleKind, Source, Token,
};
use crate::error::ExpressionError;
use crate::token::{LexerToken, TokenKind};

/// Recursive-descent parser over a flat token list with one token of lookahead
pub struct Parser<'a> {
    tokens: &'a [LexerToken],
    current: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [LexerToken]) -> Self {
        Self { tokens, current: 0 }
    }

    /// Parse exactly one expression covering every token
    pub fn parse(mut self) -> Result<Expression, ExpressionError> {
        let expression = self.expression()?;
        self.expect_end()?;
        trace!(expression = %expression, "Parsed expression");
        Ok(expression)
    }

    fn expression(&mut self) -> Result<Expression, ExpressionError> {
        const EXPECTED: &str = "an expression root such as '$url', '$request.' or '$steps.'";
        let token = self.advance(EXPECTED)?;

        if let Some(value) = SingleKind::from_kind(token.kind) {
            return Ok(Expression::Single(SingleExpression { value }));
        }
        if let Some(value) = Exchange::from_kind(token.kind) {
            let source = self.source()?;
            return Ok(Expression::WithSource(ExpressionWithSource { value, source }));
        }
        if let Some(value) = NamedRoot::from_kind(token.kind) {
            let name = self.name()?;
            return Ok(Expression::WithName(ExpressionWithName { value, name }));
        }

        Err(unexpected(EXPECTED, token))
    }

    fn source(&mut self) -> Result<Source, ExpressionError> {
        const EXPECTED: &str = "'header.', 'query.', 'path.' or 'body'";
        let token = self.advance(EXPECTED)?;

        match token.kind {
            TokenKind::Header => Ok(Source::Header(HeaderRef {
                token: self.token()?,
            })),
            TokenKind::Query => Ok(Source::Query(QueryRef { name: self.name()? })),
            TokenKind::Path => Ok(Source::Path(PathRef { name: self.name()? })),
            TokenKind::Body => Ok(Source::Body(self.body()?)),
            _ => Err(unexpected(EXPECTED, token)),
        }
    }

    fn body(&mut self) -> Result<BodyRef, ExpressionError> {
        match self.peek() {
            Some(token) if token.kind == TokenKind::JsonPointerStart => {
                self.current += 1;
                Ok(BodyRef {
                    pointer: Some(self.json_pointer()?),
                })
            }
            _ => Ok(BodyRef { pointer: None }),
        }
    }

    fn name(&mut self) -> Result<Name, ExpressionError> {
        let token = self.leaf("a name", TokenKind::is_name)?;
        Ok(Name { value: token })
    }

    fn token(&mut self) -> Result<Token, ExpressionError> {
        let token = self.leaf("a header token", TokenKind::is_token)?;
        Ok(Token { value: token })
    }

    fn json_pointer(&mut self) -> Result<JsonPointer, ExpressionError> {
        let token = self.leaf("a JSON pointer", |kind| kind == TokenKind::JsonPointer)?;
        Ok(JsonPointer { value: token })
    }

    /// Leaf productions must consume the final token
    fn leaf(
        &mut self,
        expected: &'static str,
        accepts: impl Fn(TokenKind) -> bool,
    ) -> Result<String, ExpressionError> {
        let token = self.advance(expected)?;
        if !accepts(token.kind) {
            return Err(unexpected(expected, token));
        }
        let value = token.value.clone();
        self.expect_end()?;
        Ok(value)
    }

    fn expect_end(&self) -> Result<(), ExpressionError> {
        match self.peek() {
            None => Ok(()),
            Some(token) => Err(ExpressionError::TrailingInput {
                found: token.kind,
                value: token.value.clone(),
                position: token.position,
            }),
        }
    }

    fn peek(&self) -> Option<&'a LexerToken> {
        self.tokens.get(self.current)
    }

    fn advance(&mut self, expected: &'static str) -> Result<&'a LexerToken, ExpressionError> {
        match self.tokens.get(self.current) {
            Some(token) => {
                self.current += 1;
                Ok(token)
            }
            None => Err(ExpressionError::UnexpectedEnd {
                expected,
                position: self.tokens.last().map(LexerToken::end).unwrap_or(0),
            }),
        }
    }
}

fn unexpected(expected: &'static str, token: &LexerToken) -> ExpressionError {
    ExpressionError::UnexpectedToken {
        expected,
        found: token.kind,
        value: token.value.clone(),
        position: token.position,
    }
}

/// Parse a token list produced by [`crate::lexer::tokenize`]
pub fn parse_tokens(tokens: &[LexerToken]) -> Result<Expression, ExpressionError> {
    Parser::new(tokens).parse()
}
