use std::mem;

use thiserror::Error;

use crate::{
    ast::{Anchor, CompareOp, FilterExpr, Operand, PathQuery, Segment, Selector, Token},
    lexer::Lexer,
    value::Value,
};

/// A path query that could not be lexed or parsed.
///
/// The engine raises this instead of returning an empty result so callers can
/// tell a malformed query apart from one that simply matched nothing.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message} (at character {position})")]
pub struct QueryError {
    pub message: String,
    pub position: usize,
}

impl QueryError {
    pub fn new(message: impl Into<String>, position: usize) -> Self {
        QueryError {
            message: message.into(),
            position,
        }
    }
}

/// Deepest nesting of filters, parentheses and `!` a query may use.
const MAX_NESTING: usize = 256;

pub struct Parser {
    lexer: Lexer,
    current_token: Token,
    token_position: usize,
    depth: usize,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Result<Self, QueryError> {
        let token_position = lexer.position();
        let current_token = lexer.next_token()?;
        Ok(Parser {
            lexer,
            current_token,
            token_position,
            depth: 0,
        })
    }

    fn advance(&mut self) -> Result<(), QueryError> {
        self.token_position = self.lexer.position();
        self.current_token = self.lexer.next_token()?;
        Ok(())
    }

    fn error(&self, message: impl Into<String>) -> QueryError {
        QueryError::new(message, self.token_position)
    }

    fn expect(&mut self, expected: Token) -> Result<(), QueryError> {
        if !self.check(&expected) {
            return Err(self.error(format!(
                "expected {:?}, found {:?}",
                expected, self.current_token
            )));
        }
        self.advance()
    }

    fn enter(&mut self) -> Result<(), QueryError> {
        if self.depth >= MAX_NESTING {
            return Err(self.error("filter nested too deeply"));
        }
        self.depth += 1;
        Ok(())
    }

    fn check(&self, token: &Token) -> bool {
        mem::discriminant(&self.current_token) == mem::discriminant(token)
    }

    /// Parse a complete query; trailing input is an error.
    pub fn parse_query(&mut self) -> Result<PathQuery, QueryError> {
        let query = self.parse_path()?;
        if !self.check(&Token::Eof) {
            return Err(self.error(format!("unexpected {:?} after query", self.current_token)));
        }
        Ok(query)
    }

    /// Parse `$...` or `@...`, stopping at the first token that cannot continue a path.
    fn parse_path(&mut self) -> Result<PathQuery, QueryError> {
        let anchor = match self.current_token {
            Token::Dollar => Anchor::Root,
            Token::At => Anchor::Current,
            _ => {
                return Err(self.error(format!(
                    "query must start with '$' or '@', found {:?}",
                    self.current_token
                )));
            }
        };
        self.advance()?;

        let mut segments = Vec::new();
        loop {
            match self.current_token {
                Token::Dot => {
                    self.advance()?;
                    segments.push(Segment::Child(vec![self.parse_dot_selector()?]));
                }
                Token::DotDot => {
                    self.advance()?;
                    let selectors = if self.check(&Token::LBracket) {
                        self.parse_bracket()?
                    } else {
                        vec![self.parse_dot_selector()?]
                    };
                    segments.push(Segment::Descendant(selectors));
                }
                Token::LBracket => segments.push(Segment::Child(self.parse_bracket()?)),
                _ => break,
            }
        }

        Ok(PathQuery { anchor, segments })
    }

    /// Selector after `.` or `..`: a member name or `*`.
    fn parse_dot_selector(&mut self) -> Result<Selector, QueryError> {
        let selector = match mem::replace(&mut self.current_token, Token::Eof) {
            Token::Star => Selector::Wildcard,
            Token::Identifier(name) => Selector::Name(name),
            // Keywords are plain member names in dot position
            Token::Boolean(b) => Selector::Name(b.to_string()),
            Token::Null => Selector::Name("null".to_string()),
            Token::Empty => Selector::Name("empty".to_string()),
            token => {
                self.current_token = token;
                return Err(self.error(format!(
                    "expected member name after '.', found {:?}",
                    self.current_token
                )));
            }
        };
        self.advance()?;
        Ok(selector)
    }

    fn parse_bracket(&mut self) -> Result<Vec<Selector>, QueryError> {
        self.expect(Token::LBracket)?;
        let mut selectors = vec![self.parse_selector()?];
        while self.check(&Token::Comma) {
            self.advance()?;
            selectors.push(self.parse_selector()?);
        }
        self.expect(Token::RBracket)?;
        Ok(selectors)
    }

    fn parse_selector(&mut self) -> Result<Selector, QueryError> {
        match mem::replace(&mut self.current_token, Token::Eof) {
            Token::String(name) | Token::Identifier(name) => {
                self.advance()?;
                Ok(Selector::Name(name))
            }
            Token::Star => {
                self.advance()?;
                Ok(Selector::Wildcard)
            }
            Token::Question => {
                self.advance()?;
                Ok(Selector::Filter(Box::new(self.parse_filter()?)))
            }
            Token::Integer(n) => {
                self.advance()?;
                if self.check(&Token::Colon) {
                    self.parse_slice(Some(n))
                } else {
                    Ok(Selector::Index(n))
                }
            }
            Token::Colon => {
                self.current_token = Token::Colon;
                self.parse_slice(None)
            }
            token => {
                self.current_token = token;
                Err(self.error(format!("unexpected {:?} in brackets", self.current_token)))
            }
        }
    }

    /// Parse the rest of `start:end:step`; the current token is the first colon.
    fn parse_slice(&mut self, start: Option<i64>) -> Result<Selector, QueryError> {
        self.expect(Token::Colon)?;
        let end = self.optional_integer()?;
        let step = if self.check(&Token::Colon) {
            self.advance()?;
            self.optional_integer()?
        } else {
            None
        };
        Ok(Selector::Slice { start, end, step })
    }

    fn optional_integer(&mut self) -> Result<Option<i64>, QueryError> {
        if let Token::Integer(n) = self.current_token {
            self.advance()?;
            Ok(Some(n))
        } else {
            Ok(None)
        }
    }

    fn parse_filter(&mut self) -> Result<FilterExpr, QueryError> {
        self.enter()?;
        let mut left = self.parse_and()?;
        while self.check(&Token::OrOr) {
            self.advance()?;
            let right = self.parse_and()?;
            left = FilterExpr::Or(Box::new(left), Box::new(right));
        }
        self.depth -= 1;
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<FilterExpr, QueryError> {
        let mut left = self.parse_unary()?;
        while self.check(&Token::AndAnd) {
            self.advance()?;
            let right = self.parse_unary()?;
            left = FilterExpr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<FilterExpr, QueryError> {
        match self.current_token {
            Token::Not => {
                self.enter()?;
                self.advance()?;
                let inner = self.parse_unary()?;
                self.depth -= 1;
                Ok(FilterExpr::Not(Box::new(inner)))
            }
            Token::LParen => {
                self.advance()?;
                let expr = self.parse_filter()?;
                self.expect(Token::RParen)?;
                Ok(expr)
            }
            _ => self.parse_test(),
        }
    }

    fn parse_test(&mut self) -> Result<FilterExpr, QueryError> {
        let left = self.parse_operand()?;

        if let Some(op) = self.comparison_operator() {
            self.advance()?;
            let right = self.parse_operand()?;
            return Ok(FilterExpr::Compare { op, left, right });
        }

        if self.check(&Token::Empty) {
            self.advance()?;
            let want_empty = match self.current_token {
                Token::Boolean(b) => b,
                _ => return Err(self.error("expected true or false after 'empty'")),
            };
            self.advance()?;
            return Ok(FilterExpr::Empty {
                operand: left,
                want_empty,
            });
        }

        match left {
            Operand::Query(query) => Ok(FilterExpr::Exists(query)),
            Operand::Literal(_) => Err(self.error("a literal on its own is not a filter test")),
        }
    }

    fn comparison_operator(&self) -> Option<CompareOp> {
        match self.current_token {
            Token::EqEq => Some(CompareOp::Equal),
            Token::NotEq => Some(CompareOp::NotEqual),
            Token::Lt => Some(CompareOp::LessThan),
            Token::LtEq => Some(CompareOp::LessEqual),
            Token::Gt => Some(CompareOp::GreaterThan),
            Token::GtEq => Some(CompareOp::GreaterEqual),
            _ => None,
        }
    }

    fn parse_operand(&mut self) -> Result<Operand, QueryError> {
        let literal = match mem::replace(&mut self.current_token, Token::Eof) {
            Token::Dollar => {
                self.current_token = Token::Dollar;
                return Ok(Operand::Query(self.parse_path()?));
            }
            Token::At => {
                self.current_token = Token::At;
                return Ok(Operand::Query(self.parse_path()?));
            }
            Token::String(s) => Value::String(s),
            Token::Integer(n) => Value::Integer(n),
            Token::Float(n) => Value::Float(n),
            Token::Boolean(b) => Value::Boolean(b),
            Token::Null => Value::Null,
            token => {
                self.current_token = token;
                return Err(self.error(format!(
                    "expected a query or literal, found {:?}",
                    self.current_token
                )));
            }
        };
        self.advance()?;
        Ok(Operand::Literal(literal))
    }
}

/// Parse a query string in one call.
pub fn parse(query: &str) -> Result<PathQuery, QueryError> {
    Parser::new(Lexer::new(query))?.parse_query()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moderate_nesting_parses() {
        let query = format!("$.a[?({}@.b{})]", "(".repeat(50), ")".repeat(50));
        assert!(parse(&query).is_ok());
        assert!(parse(&format!("$.a[?({}@.b)]", "!".repeat(50))).is_ok());
    }

    #[test]
    fn test_deep_nesting_is_an_error() {
        let negations = format!("$.a[?({}@.b)]", "!".repeat(200_000));
        let err = parse(&negations).unwrap_err();
        assert_eq!(err.message, "filter nested too deeply");

        let parens = format!("$.a[?({}@.b{})]", "(".repeat(10_000), ")".repeat(10_000));
        assert!(parse(&parens).is_err());

        let filters = format!("$.a{}", "[?(@.b".repeat(10_000));
        assert!(parse(&filters).is_err());
    }
}
