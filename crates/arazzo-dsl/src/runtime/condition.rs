//! `simple` criterion conditions such as `$statusCode == 200 && $response.body#/ok`.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! or         := and ("||" and)*
//! and        := unary ("&&" unary)*
//! unary      := "!" unary | "(" or ")" | comparison
//! comparison := operand (("==" | "!=" | "<" | "<=" | ">" | ">=") operand)?
//! operand    := runtime expression | number | quoted string | true | false | null
//! ```

use arazzo_expression::{evaluate, parse_embedded, ExecutionContext, Expression};
use serde_json::{Number, Value};
use std::cmp::Ordering;

use crate::error::DslError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Literal(Value),
    Expression(Expression),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// A lone operand, tested for truthiness
    Operand(Operand),
    Compare(Operand, Comparison, Operand),
    Not(Box<Condition>),
    And(Box<Condition>, Box<Condition>),
    Or(Box<Condition>, Box<Condition>),
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    LParen,
    RParen,
    Not,
    And,
    Or,
    Compare(Comparison),
    Literal(Value),
    Expression(String),
}

impl Condition {
    pub fn parse(text: &str) -> Result<Self, DslError> {
        let tokens = tokenize(text)?;
        let mut parser = ConditionParser {
            tokens: &tokens,
            current: 0,
            text,
        };
        let condition = parser.or()?;
        if parser.current < tokens.len() {
            return Err(syntax(text, "unexpected trailing input"));
        }
        Ok(condition)
    }

    pub fn evaluate(&self, context: &dyn ExecutionContext) -> Result<bool, DslError> {
        match self {
            Condition::Operand(operand) => Ok(truthy(&operand.value(context)?)),
            Condition::Compare(left, comparison, right) => Ok(compare(
                &left.value(context)?,
                *comparison,
                &right.value(context)?,
            )),
            Condition::Not(inner) => Ok(!inner.evaluate(context)?),
            Condition::And(left, right) => Ok(left.evaluate(context)? && right.evaluate(context)?),
            Condition::Or(left, right) => Ok(left.evaluate(context)? || right.evaluate(context)?),
        }
    }
}

impl Operand {
    fn value(&self, context: &dyn ExecutionContext) -> Result<Value, DslError> {
        match self {
            Operand::Literal(value) => Ok(value.clone()),
            Operand::Expression(expression) => Ok(evaluate(expression, context)?),
        }
    }
}

struct ConditionParser<'a> {
    tokens: &'a [Token],
    current: usize,
    text: &'a str,
}

impl ConditionParser<'_> {
    fn or(&mut self) -> Result<Condition, DslError> {
        let mut left = self.and()?;
        while self.matches(&Token::Or) {
            let right = self.and()?;
            left = Condition::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and(&mut self) -> Result<Condition, DslError> {
        let mut left = self.unary()?;
        while self.matches(&Token::And) {
            let right = self.unary()?;
            left = Condition::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Condition, DslError> {
        if self.matches(&Token::Not) {
            return Ok(Condition::Not(Box::new(self.unary()?)));
        }
        if self.matches(&Token::LParen) {
            let inner = self.or()?;
            if !self.matches(&Token::RParen) {
                return Err(syntax(self.text, "expected ')'"));
            }
            return Ok(inner);
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Condition, DslError> {
        let left = self.operand()?;
        if let Some(Token::Compare(comparison)) = self.tokens.get(self.current) {
            let comparison = *comparison;
            self.current += 1;
            let right = self.operand()?;
            return Ok(Condition::Compare(left, comparison, right));
        }
        Ok(Condition::Operand(left))
    }

    fn operand(&mut self) -> Result<Operand, DslError> {
        let operand = match self.tokens.get(self.current) {
            Some(Token::Literal(value)) => Operand::Literal(value.clone()),
            Some(Token::Expression(text)) => Operand::Expression(
                parse_embedded(text).map_err(|e| DslError::expression(text, e))?,
            ),
            Some(_) => return Err(syntax(self.text, "expected an operand")),
            None => return Err(syntax(self.text, "unexpected end of condition")),
        };
        self.current += 1;
        Ok(operand)
    }

    fn matches(&mut self, token: &Token) -> bool {
        if self.tokens.get(self.current) == Some(token) {
            self.current += 1;
            return true;
        }
        false
    }
}

fn tokenize(text: &str) -> Result<Vec<Token>, DslError> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let next = chars.get(i + 1).copied();
        let (token, width) = match (chars[i], next) {
            (c, _) if c.is_whitespace() => {
                i += 1;
                continue;
            }
            ('(', _) => (Token::LParen, 1),
            (')', _) => (Token::RParen, 1),
            ('&', Some('&')) => (Token::And, 2),
            ('|', Some('|')) => (Token::Or, 2),
            ('=', Some('=')) => (Token::Compare(Comparison::Eq), 2),
            ('!', Some('=')) => (Token::Compare(Comparison::Ne), 2),
            ('<', Some('=')) => (Token::Compare(Comparison::Le), 2),
            ('>', Some('=')) => (Token::Compare(Comparison::Ge), 2),
            ('<', _) => (Token::Compare(Comparison::Lt), 1),
            ('>', _) => (Token::Compare(Comparison::Gt), 1),
            ('!', _) => (Token::Not, 1),
            (quote @ ('\'' | '"'), _) => {
                let end = chars[i + 1..]
                    .iter()
                    .position(|&c| c == quote)
                    .ok_or_else(|| syntax(text, "unterminated string"))?;
                let literal: String = chars[i + 1..i + 1 + end].iter().collect();
                (Token::Literal(Value::String(literal)), end + 2)
            }
            ('{', Some('$')) => {
                let end = chars[i..]
                    .iter()
                    .position(|&c| c == '}')
                    .ok_or_else(|| syntax(text, "unterminated '{'"))?;
                (Token::Expression(chars[i..=i + end].iter().collect()), end + 1)
            }
            ('$', _) => {
                let width = operand_width(&chars[i..]);
                (Token::Expression(chars[i..i + width].iter().collect()), width)
            }
            _ => {
                let width = operand_width(&chars[i..]);
                let word: String = chars[i..i + width].iter().collect();
                (Token::Literal(literal(&word, text)?), width)
            }
        };
        tokens.push(token);
        i += width;
    }

    Ok(tokens)
}

/// Length of a bare operand, which runs until whitespace or an operator
fn operand_width(chars: &[char]) -> usize {
    let ends = |j: usize| {
        let next = chars.get(j + 1).copied();
        match chars[j] {
            c if c.is_whitespace() => true,
            '(' | ')' | '<' | '>' | '=' => true,
            '!' => next == Some('='),
            '&' => next == Some('&'),
            '|' => next == Some('|'),
            _ => false,
        }
    };
    (1..chars.len()).find(|&j| ends(j)).unwrap_or(chars.len())
}

fn literal(word: &str, text: &str) -> Result<Value, DslError> {
    match word {
        "true" => return Ok(Value::Bool(true)),
        "false" => return Ok(Value::Bool(false)),
        "null" => return Ok(Value::Null),
        _ => {}
    }
    if let Ok(integer) = word.parse::<i64>() {
        return Ok(Value::from(integer));
    }
    word.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| syntax(text, &format!("unexpected '{}'", word)))
}

fn syntax(text: &str, problem: &str) -> DslError {
    DslError::Criterion(format!("invalid condition '{}': {}", text, problem))
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Numbers compare numerically, also against numeric strings. Strings compare
/// case-insensitively.
fn compare(left: &Value, comparison: Comparison, right: &Value) -> bool {
    match comparison {
        Comparison::Eq => loose_eq(left, right),
        Comparison::Ne => !loose_eq(left, right),
        _ => match ordering(left, right) {
            Some(order) => match comparison {
                Comparison::Lt => order.is_lt(),
                Comparison::Le => order.is_le(),
                Comparison::Gt => order.is_gt(),
                _ => order.is_ge(),
            },
            None => false,
        },
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn loose_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::String(a), Value::String(b)) => a.to_lowercase() == b.to_lowercase(),
        (Value::Number(_), _) | (_, Value::Number(_)) => {
            matches!((as_number(left), as_number(right)), (Some(a), Some(b)) if a == b)
        }
        _ => left == right,
    }
}

fn ordering(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::String(a), Value::String(b)) => Some(a.to_lowercase().cmp(&b.to_lowercase())),
        _ => as_number(left)?.partial_cmp(&as_number(right)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arazzo_expression::{HttpMessage, RuntimeContext};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn create_test_context() -> RuntimeContext {
        let mut response = HttpMessage::default();
        response.headers.insert("Content-Type".to_string(), "application/json".to_string());
        response.body = Some(json!({"pets": [{"name": "Rex"}], "total": "3", "ok": true}));
        RuntimeContext::new()
            .with_response(200, response)
            .with_input("limit", json!(5))
    }

    fn check(condition: &str) -> bool {
        Condition::parse(condition)
            .unwrap()
            .evaluate(&create_test_context())
            .unwrap()
    }

    #[test]
    fn test_parse_precedence() {
        let condition = Condition::parse("true || false && !true").unwrap();
        assert_eq!(
            condition,
            Condition::Or(
                Box::new(Condition::Operand(Operand::Literal(json!(true)))),
                Box::new(Condition::And(
                    Box::new(Condition::Operand(Operand::Literal(json!(false)))),
                    Box::new(Condition::Not(Box::new(Condition::Operand(Operand::Literal(
                        json!(true)
                    ))))),
                )),
            )
        );
    }

    #[test]
    fn test_comparisons() {
        assert!(check("$statusCode == 200"));
        assert!(check("$statusCode==200"));
        assert!(!check("$statusCode != 200"));
        assert!(check("$statusCode >= 200 && $statusCode < 300"));
        assert!(check("$response.body#/pets/0/name == 'rex'"));
        assert!(check("$response.body#/total > 2"));
        assert!(check("$inputs.limit <= 5.0"));
        assert!(check("$response.header.content-type == \"application/json\""));
        assert!(check("{$statusCode} == 200"));
    }

    #[test]
    fn test_logic_and_grouping() {
        assert!(check("$response.body#/ok"));
        assert!(check("!($statusCode == 404 || $statusCode == 500)"));
        assert!(!check("$statusCode == 200 && ($inputs.limit > 10 || false)"));
        assert!(check("null == null"));
    }

    #[test]
    fn test_syntax_errors() {
        for condition in ["", "$statusCode ==", "(true", "true)", "'open", "200 = 200", "maybe"] {
            let result = Condition::parse(condition);
            assert!(result.is_err(), "'{}' should not parse", condition);
        }
    }

    #[test]
    fn test_bad_expression_operand() {
        let err = Condition::parse("$request.header == 'x'").unwrap_err();
        match err {
            DslError::Expression { expression, .. } => assert_eq!(expression, "$request.header"),
            err => panic!("Expected Expression error, got {:?}", err),
        }
    }

    #[test]
    fn test_missing_value_is_an_error() {
        let condition = Condition::parse("$request.header.x-id == 'a'").unwrap();
        let err = condition.evaluate(&create_test_context()).unwrap_err();
        assert!(matches!(err, DslError::Evaluation(_)), "Got {:?}", err);
    }
}
