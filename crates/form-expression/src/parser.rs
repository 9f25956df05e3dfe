//! Recursive-descent parser for conditional-field expressions.
//!
//! Precedence, lowest first: `?:`, `||`, `&&`, equality, relational,
//! additive, multiplicative, unary, postfix (member, index, call).

use crate::ast::{BinaryOp, Expr, LogicalOp, UnaryOp};
use crate::error::ExpressionError;
use crate::types::JsValue;
use serde_json::Value;

/// Parser limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Maximum nesting of sub-expressions.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions { max_depth: 64 }
    }
}

/// Expression parser.
pub struct ExpressionParser<'a> {
    input: &'a str,
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl<'a> ExpressionParser<'a> {
    /// Parse an expression with default limits.
    ///
    /// ```
    /// use form_expression::ExpressionParser;
    ///
    /// assert!(ExpressionParser::parse("data.kind === 'b' && !row.hidden").is_ok());
    /// assert!(ExpressionParser::parse("data.kind = 'b'").is_err());
    /// ```
    pub fn parse(input: &'a str) -> Result<Expr, ExpressionError> {
        Self::parse_with_options(input, &ParseOptions::default())
    }

    pub fn parse_with_options(
        input: &'a str,
        options: &ParseOptions,
    ) -> Result<Expr, ExpressionError> {
        let mut parser = Self {
            input,
            pos: 0,
            depth: 0,
            max_depth: options.max_depth,
        };
        parser.skip_whitespace();
        if parser.is_at_end() {
            return Err(parser.error("empty expression"));
        }
        let expr = parser.parse_expression()?;
        parser.skip_whitespace();
        if parser.peek() == Some(';') {
            parser.advance();
            parser.skip_whitespace();
        }
        if !parser.is_at_end() {
            return Err(parser.unexpected());
        }
        Ok(expr)
    }

    fn parse_expression(&mut self) -> Result<Expr, ExpressionError> {
        self.enter()?;
        let expr = self.parse_conditional_expression();
        self.depth -= 1;
        expr
    }

    fn parse_conditional_expression(&mut self) -> Result<Expr, ExpressionError> {
        let test = self.parse_logical_or_expression()?;
        self.skip_whitespace();
        if self.peek() != Some('?') {
            return Ok(test);
        }
        self.advance();
        let consequent = self.parse_expression()?;
        self.skip_whitespace();
        self.expect(':')?;
        let alternate = self.parse_expression()?;
        Ok(Expr::Conditional {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
        })
    }

    fn parse_logical_or_expression(&mut self) -> Result<Expr, ExpressionError> {
        let mut left = self.parse_logical_and_expression()?;
        let mut links = 0;
        self.skip_whitespace();

        while self.peek_str("||") {
            self.advance_by(2);
            self.enter()?;
            links += 1;
            let right = self.parse_logical_and_expression()?;
            left = Expr::Logical {
                op: LogicalOp::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
            self.skip_whitespace();
        }

        self.depth -= links;
        Ok(left)
    }

    fn parse_logical_and_expression(&mut self) -> Result<Expr, ExpressionError> {
        let mut left = self.parse_equality_expression()?;
        let mut links = 0;
        self.skip_whitespace();

        while self.peek_str("&&") {
            self.advance_by(2);
            self.enter()?;
            links += 1;
            let right = self.parse_equality_expression()?;
            left = Expr::Logical {
                op: LogicalOp::And,
                left: Box::new(left),
                right: Box::new(right),
            };
            self.skip_whitespace();
        }

        self.depth -= links;
        Ok(left)
    }

    fn parse_equality_expression(&mut self) -> Result<Expr, ExpressionError> {
        let mut left = self.parse_relational_expression()?;
        let mut links = 0;
        loop {
            self.skip_whitespace();
            let (op, len) = if self.peek_str("===") {
                (BinaryOp::StrictEq, 3)
            } else if self.peek_str("!==") {
                (BinaryOp::StrictNe, 3)
            } else if self.peek_str("==") {
                (BinaryOp::LooseEq, 2)
            } else if self.peek_str("!=") {
                (BinaryOp::LooseNe, 2)
            } else {
                break;
            };
            self.advance_by(len);
            self.enter()?;
            links += 1;
            let right = self.parse_relational_expression()?;
            left = binary(op, left, right);
        }
        self.depth -= links;
        Ok(left)
    }

    fn parse_relational_expression(&mut self) -> Result<Expr, ExpressionError> {
        let mut left = self.parse_additive_expression()?;
        let mut links = 0;
        loop {
            self.skip_whitespace();
            let (op, len) = if self.peek_str("<=") {
                (BinaryOp::Le, 2)
            } else if self.peek_str(">=") {
                (BinaryOp::Ge, 2)
            } else if self.peek_str("<") {
                (BinaryOp::Lt, 1)
            } else if self.peek_str(">") {
                (BinaryOp::Gt, 1)
            } else {
                break;
            };
            self.advance_by(len);
            self.enter()?;
            links += 1;
            let right = self.parse_additive_expression()?;
            left = binary(op, left, right);
        }
        self.depth -= links;
        Ok(left)
    }

    fn parse_additive_expression(&mut self) -> Result<Expr, ExpressionError> {
        let mut left = self.parse_multiplicative_expression()?;
        let mut links = 0;
        loop {
            self.skip_whitespace();
            let op = match self.peek() {
                Some('+') => BinaryOp::Add,
                Some('-') => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            self.enter()?;
            links += 1;
            let right = self.parse_multiplicative_expression()?;
            left = binary(op, left, right);
        }
        self.depth -= links;
        Ok(left)
    }

    fn parse_multiplicative_expression(&mut self) -> Result<Expr, ExpressionError> {
        let mut left = self.parse_unary_expression()?;
        let mut links = 0;
        loop {
            self.skip_whitespace();
            let op = match self.peek() {
                Some('*') => BinaryOp::Mul,
                Some('/') => BinaryOp::Div,
                Some('%') => BinaryOp::Rem,
                _ => break,
            };
            self.advance();
            self.enter()?;
            links += 1;
            let right = self.parse_unary_expression()?;
            left = binary(op, left, right);
        }
        self.depth -= links;
        Ok(left)
    }

    fn parse_unary_expression(&mut self) -> Result<Expr, ExpressionError> {
        self.skip_whitespace();

        let op = match self.peek() {
            Some('!') => Some((UnaryOp::Not, 1)),
            Some('-') => Some((UnaryOp::Neg, 1)),
            Some('+') => Some((UnaryOp::Plus, 1)),
            _ if self.peek_keyword("typeof") => Some((UnaryOp::TypeOf, "typeof".len())),
            _ => None,
        };

        let Some((op, len)) = op else {
            return self.parse_postfix_expression();
        };
        self.advance_by(len);
        self.enter()?;
        let operand = self.parse_unary_expression();
        self.depth -= 1;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand?),
        })
    }

    fn parse_postfix_expression(&mut self) -> Result<Expr, ExpressionError> {
        let mut expr = self.parse_primary_expression()?;
        let mut links = 0;

        loop {
            self.skip_whitespace();
            if self.peek_str("?.") && !matches!(self.peek_at(2), Some('0'..='9')) {
                self.advance_by(2);
                self.skip_whitespace();
                let property = self.parse_identifier()?;
                expr = Expr::Member {
                    object: Box::new(expr),
                    property,
                    optional: true,
                };
            } else if self.peek() == Some('.') {
                self.advance();
                self.skip_whitespace();
                let property = self.parse_identifier()?;
                expr = Expr::Member {
                    object: Box::new(expr),
                    property,
                    optional: false,
                };
            } else if self.peek() == Some('[') {
                self.advance();
                let index = self.parse_expression()?;
                self.skip_whitespace();
                self.expect(']')?;
                expr = Expr::Index {
                    object: Box::new(expr),
                    index: Box::new(index),
                };
            } else if self.peek() == Some('(') {
                self.advance();
                let args = self.parse_list(')')?;
                expr = Expr::Call {
                    callee: Box::new(expr),
                    args,
                };
            } else {
                break;
            }
            self.enter()?;
            links += 1;
        }
        self.depth -= links;

        Ok(expr)
    }

    fn parse_primary_expression(&mut self) -> Result<Expr, ExpressionError> {
        self.skip_whitespace();

        match self.peek() {
            Some('(') => {
                self.advance();
                let expr = self.parse_expression()?;
                self.skip_whitespace();
                self.expect(')')?;
                Ok(expr)
            }
            Some('[') => {
                self.advance();
                self.enter()?;
                let items = self.parse_list(']');
                self.depth -= 1;
                Ok(Expr::Array(items?))
            }
            Some('"') | Some('\'') => {
                let s = self.parse_string()?;
                Ok(Expr::Literal(JsValue::from(s)))
            }
            Some('0'..='9') => self.parse_number(),
            Some('.') if matches!(self.peek_at(1), Some('0'..='9')) => self.parse_number(),
            Some(c) if is_identifier_start(c) => {
                let name = self.parse_identifier()?;
                Ok(match name.as_str() {
                    "true" => Expr::Literal(JsValue::from(true)),
                    "false" => Expr::Literal(JsValue::from(false)),
                    "null" => Expr::Literal(JsValue::Json(Value::Null)),
                    "undefined" => Expr::Literal(JsValue::Undefined),
                    "this" => Expr::This,
                    _ => Expr::Ident(name),
                })
            }
            None => Err(self.error("unexpected end of input")),
            Some(_) => Err(self.unexpected()),
        }
    }

    /// Comma separated expressions up to `close`, which is consumed.
    fn parse_list(&mut self, close: char) -> Result<Vec<Expr>, ExpressionError> {
        let mut items = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some(close) {
            self.advance();
            return Ok(items);
        }
        loop {
            items.push(self.parse_expression()?);
            self.skip_whitespace();
            match self.peek() {
                Some(',') => self.advance(),
                Some(c) if c == close => {
                    self.advance();
                    return Ok(items);
                }
                _ => return Err(self.unexpected()),
            }
        }
    }

    fn parse_identifier(&mut self) -> Result<String, ExpressionError> {
        let start = self.pos;
        match self.peek() {
            Some(c) if is_identifier_start(c) => self.advance(),
            _ => return Err(self.error("expected identifier")),
        }
        while let Some(c) = self.peek() {
            if is_identifier_part(c) {
                self.advance();
            } else {
                break;
            }
        }
        Ok(self.input[start..self.pos].to_string())
    }

    fn parse_string(&mut self) -> Result<String, ExpressionError> {
        let Some(quote) = self.peek() else {
            return Err(self.error("expected string"));
        };
        self.advance();

        let mut result = String::new();

        loop {
            match self.peek() {
                None => return Err(self.error("unclosed string")),
                Some(c) if c == quote => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    match self.peek() {
                        Some('n') => result.push('\n'),
                        Some('t') => result.push('\t'),
                        Some('r') => result.push('\r'),
                        Some('\\') => result.push('\\'),
                        Some('/') => result.push('/'),
                        Some('\'') => result.push('\''),
                        Some('"') => result.push('"'),
                        _ => return Err(self.error("invalid escape sequence")),
                    }
                    self.advance();
                }
                Some(c) => {
                    result.push(c);
                    self.advance();
                }
            }
        }

        Ok(result)
    }

    fn parse_number(&mut self) -> Result<Expr, ExpressionError> {
        let start = self.pos;
        let mut is_float = false;

        while matches!(self.peek(), Some('0'..='9')) {
            self.advance();
        }
        if self.peek() == Some('.') && matches!(self.peek_at(1), Some('0'..='9')) {
            is_float = true;
            self.advance();
            while matches!(self.peek(), Some('0'..='9')) {
                self.advance();
            }
        }
        if matches!(self.peek(), Some('e') | Some('E')) {
            is_float = true;
            self.advance();
            if matches!(self.peek(), Some('+') | Some('-')) {
                self.advance();
            }
            if !matches!(self.peek(), Some('0'..='9')) {
                return Err(self.error("invalid number"));
            }
            while matches!(self.peek(), Some('0'..='9')) {
                self.advance();
            }
        }

        let text = &self.input[start..self.pos];
        if !is_float {
            if let Ok(n) = text.parse::<i64>() {
                return Ok(Expr::Literal(JsValue::from(n)));
            }
        }
        let n = text
            .parse::<f64>()
            .map_err(|_| ExpressionError::Parse {
                pos: start,
                msg: "invalid number".to_string(),
            })?;
        Ok(Expr::Literal(JsValue::from(n)))
    }

    fn enter(&mut self) -> Result<(), ExpressionError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(ExpressionError::DepthExceeded);
        }
        Ok(())
    }

    fn error(&self, msg: &str) -> ExpressionError {
        ExpressionError::Parse {
            pos: self.pos,
            msg: msg.to_string(),
        }
    }

    fn unexpected(&self) -> ExpressionError {
        match self.peek() {
            Some(c) => self.error(&format!("unexpected character '{c}'")),
            None => self.error("unexpected end of input"),
        }
    }

    /// True when `word` follows and is not the prefix of a longer identifier.
    fn peek_keyword(&self, word: &str) -> bool {
        self.peek_str(word)
            && !self.input[self.pos + word.len()..]
                .chars()
                .next()
                .is_some_and(is_identifier_part)
    }

    fn peek_str(&self, s: &str) -> bool {
        self.input[self.pos..].starts_with(s)
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(n)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn expect(&mut self, expected: char) -> Result<(), ExpressionError> {
        if self.peek() == Some(expected) {
            self.advance();
            Ok(())
        } else {
            Err(self.error(&format!("expected '{expected}'")))
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_identifier_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lit(v: Value) -> Expr {
        Expr::Literal(JsValue::Json(v))
    }

    fn ident(name: &str) -> Expr {
        Expr::Ident(name.to_string())
    }

    fn member(object: Expr, property: &str) -> Expr {
        Expr::Member {
            object: Box::new(object),
            property: property.to_string(),
            optional: false,
        }
    }

    #[test]
    fn test_parse_member_chain() {
        let expr = ExpressionParser::parse("data.address.city").unwrap();
        assert_eq!(expr, member(member(ident("data"), "address"), "city"));
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let expr = ExpressionParser::parse("a || b && c").unwrap();
        let expected = Expr::Logical {
            op: LogicalOp::Or,
            left: Box::new(ident("a")),
            right: Box::new(Expr::Logical {
                op: LogicalOp::And,
                left: Box::new(ident("b")),
                right: Box::new(ident("c")),
            }),
        };
        assert_eq!(expr, expected);
    }

    #[test]
    fn test_strict_equality_is_not_split() {
        let expr = ExpressionParser::parse("a === 1").unwrap();
        assert_eq!(expr, binary(BinaryOp::StrictEq, ident("a"), lit(json!(1))));
        let expr = ExpressionParser::parse("a !== 1").unwrap();
        assert_eq!(expr, binary(BinaryOp::StrictNe, ident("a"), lit(json!(1))));
    }

    #[test]
    fn test_typeof_needs_word_boundary() {
        let expr = ExpressionParser::parse("typeofx").unwrap();
        assert_eq!(expr, ident("typeofx"));
        let expr = ExpressionParser::parse("typeof x").unwrap();
        assert_eq!(
            expr,
            Expr::Unary {
                op: UnaryOp::TypeOf,
                operand: Box::new(ident("x"))
            }
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(ExpressionParser::parse("42").unwrap(), lit(json!(42)));
        assert_eq!(ExpressionParser::parse("1.5").unwrap(), lit(json!(1.5)));
        assert_eq!(ExpressionParser::parse(".5").unwrap(), lit(json!(0.5)));
        assert_eq!(ExpressionParser::parse("1e2").unwrap(), lit(json!(100)));
    }

    #[test]
    fn test_trailing_semicolon() {
        assert_eq!(ExpressionParser::parse("true;").unwrap(), lit(json!(true)));
    }

    #[test]
    fn test_errors_report_position() {
        let err = ExpressionParser::parse("a &&").unwrap_err();
        assert_eq!(
            err,
            ExpressionError::Parse {
                pos: 4,
                msg: "unexpected end of input".to_string()
            }
        );
        assert!(ExpressionParser::parse("").is_err());
        assert!(ExpressionParser::parse("'abc").is_err());
        assert!(ExpressionParser::parse("a b").is_err());
    }

    #[test]
    fn test_depth_limit() {
        let deep = format!("{}1{}", "(".repeat(10), ")".repeat(10));
        let options = ParseOptions { max_depth: 5 };
        assert_eq!(
            ExpressionParser::parse_with_options(&deep, &options),
            Err(ExpressionError::DepthExceeded)
        );
        assert!(ExpressionParser::parse(&deep).is_ok());
        let bangs = format!("{}true", "!".repeat(10));
        assert_eq!(
            ExpressionParser::parse_with_options(&bangs, &options),
            Err(ExpressionError::DepthExceeded)
        );
    }

    #[test]
    fn test_depth_limit_counts_operator_chains() {
        let options = ParseOptions { max_depth: 5 };
        for chain in [
            format!("1{}", " + 1".repeat(10)),
            format!("a{}", " || b".repeat(10)),
            format!("a{}", ".b".repeat(10)),
            format!("f{}", "()".repeat(10)),
        ] {
            assert_eq!(
                ExpressionParser::parse_with_options(&chain, &options),
                Err(ExpressionError::DepthExceeded),
                "{chain}"
            );
        }
        assert!(ExpressionParser::parse_with_options("1 + 1 + 1", &options).is_ok());
        let long = format!("1{}", " + 1".repeat(200_000));
        assert_eq!(ExpressionParser::parse(&long), Err(ExpressionError::DepthExceeded));
    }
}
