//! Transform expression parser
//!
//! Recursive descent with standard precedence climbing: ternary at the top,
//! then `||`, `&&`, equality, comparison, additive, multiplicative, unary,
//! primary. The grammar is closed: the only identifier is `value`, and only
//! the builtin function set is callable.
//!
//! Copyright (c) 2025 Remold Team
//! Licensed under the Apache-2.0 license

use super::ast::{BinaryOp, Builtin, Expr, Literal, UnaryOp};
use super::ExprError;
use std::iter::Peekable;
use std::str::Chars;

/// Transform expression parser
pub struct Parser<'a> {
    chars: Peekable<Chars<'a>>,
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given input
    pub fn new(input: &'a str) -> Result<Self, ExprError> {
        if input.trim().is_empty() {
            return Err(ExprError::Parse {
                message: "empty expression".to_string(),
                position: 0,
            });
        }
        Ok(Self {
            chars: input.chars().peekable(),
            position: 0,
        })
    }

    /// Parse the expression into an AST
    pub fn parse(mut self) -> Result<Expr, ExprError> {
        let expr = self.parse_ternary()?;
        self.skip_whitespace();
        match self.current() {
            None => Ok(expr),
            Some(ch) => Err(ExprError::Parse {
                message: format!("unexpected trailing character '{}'", ch),
                position: self.position,
            }),
        }
    }

    fn parse_ternary(&mut self) -> Result<Expr, ExprError> {
        let condition = self.parse_or()?;
        self.skip_whitespace();
        if self.current() == Some('?') {
            self.advance();
            let if_true = self.parse_ternary()?;
            self.skip_whitespace();
            self.expect_char(':')?;
            let if_false = self.parse_ternary()?;
            return Ok(Expr::Ternary {
                condition: Box::new(condition),
                if_true: Box::new(if_true),
                if_false: Box::new(if_false),
            });
        }
        Ok(condition)
    }

    fn parse_or(&mut self) -> Result<Expr, ExprError> {
        let mut expr = self.parse_and()?;
        loop {
            self.skip_whitespace();
            if self.match_operator("||") {
                let right = self.parse_and()?;
                expr = binary(expr, BinaryOp::Or, right);
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_and(&mut self) -> Result<Expr, ExprError> {
        let mut expr = self.parse_equality()?;
        loop {
            self.skip_whitespace();
            if self.match_operator("&&") {
                let right = self.parse_equality()?;
                expr = binary(expr, BinaryOp::And, right);
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_equality(&mut self) -> Result<Expr, ExprError> {
        let mut expr = self.parse_comparison()?;
        loop {
            self.skip_whitespace();
            if self.match_operator("==") {
                let right = self.parse_comparison()?;
                expr = binary(expr, BinaryOp::Eq, right);
            } else if self.match_operator("!=") {
                let right = self.parse_comparison()?;
                expr = binary(expr, BinaryOp::Ne, right);
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_comparison(&mut self) -> Result<Expr, ExprError> {
        let mut expr = self.parse_additive()?;
        loop {
            self.skip_whitespace();
            if self.match_operator("<=") {
                let right = self.parse_additive()?;
                expr = binary(expr, BinaryOp::Le, right);
            } else if self.match_operator(">=") {
                let right = self.parse_additive()?;
                expr = binary(expr, BinaryOp::Ge, right);
            } else if self.match_operator("<") {
                let right = self.parse_additive()?;
                expr = binary(expr, BinaryOp::Lt, right);
            } else if self.match_operator(">") {
                let right = self.parse_additive()?;
                expr = binary(expr, BinaryOp::Gt, right);
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_additive(&mut self) -> Result<Expr, ExprError> {
        let mut expr = self.parse_multiplicative()?;
        loop {
            self.skip_whitespace();
            match self.current() {
                Some('+') => {
                    self.advance();
                    let right = self.parse_multiplicative()?;
                    expr = binary(expr, BinaryOp::Add, right);
                }
                Some('-') => {
                    self.advance();
                    let right = self.parse_multiplicative()?;
                    expr = binary(expr, BinaryOp::Sub, right);
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ExprError> {
        let mut expr = self.parse_unary()?;
        loop {
            self.skip_whitespace();
            match self.current() {
                Some('*') => {
                    self.advance();
                    let right = self.parse_unary()?;
                    expr = binary(expr, BinaryOp::Mul, right);
                }
                Some('/') => {
                    self.advance();
                    let right = self.parse_unary()?;
                    expr = binary(expr, BinaryOp::Div, right);
                }
                Some('%') => {
                    self.advance();
                    let right = self.parse_unary()?;
                    expr = binary(expr, BinaryOp::Rem, right);
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_unary(&mut self) -> Result<Expr, ExprError> {
        self.skip_whitespace();
        if self.current() == Some('!') && self.peek_next() != Some('=') {
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Not,
                operand: Box::new(operand),
            });
        }
        if self.current() == Some('-') {
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Neg,
                operand: Box::new(operand),
            });
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, ExprError> {
        self.skip_whitespace();
        match self.current() {
            Some('(') => {
                self.advance();
                let expr = self.parse_ternary()?;
                self.skip_whitespace();
                self.expect_char(')')?;
                Ok(expr)
            }
            Some('\'') | Some('"') => {
                let value = self.parse_quoted_string()?;
                Ok(Expr::Literal(Literal::Str(value)))
            }
            Some(ch) if ch.is_ascii_digit() => self.parse_number(),
            Some(ch) if ch.is_alphabetic() || ch == '_' => {
                let ident = self.parse_identifier();
                match ident.as_str() {
                    "value" => Ok(Expr::Value),
                    "true" => Ok(Expr::Literal(Literal::Bool(true))),
                    "false" => Ok(Expr::Literal(Literal::Bool(false))),
                    "null" => Ok(Expr::Literal(Literal::Null)),
                    _ => {
                        self.skip_whitespace();
                        if self.current() == Some('(') {
                            let func = Builtin::from_name(&ident)
                                .ok_or(ExprError::UnknownFunction { name: ident })?;
                            self.advance();
                            let arg = self.parse_ternary()?;
                            self.skip_whitespace();
                            self.expect_char(')')?;
                            Ok(Expr::Call {
                                func,
                                arg: Box::new(arg),
                            })
                        } else {
                            Err(ExprError::UnknownIdentifier { name: ident })
                        }
                    }
                }
            }
            Some(ch) => Err(ExprError::Parse {
                message: format!("unexpected character '{}'", ch),
                position: self.position,
            }),
            None => Err(ExprError::Parse {
                message: "unexpected end of input".to_string(),
                position: self.position,
            }),
        }
    }

    fn parse_identifier(&mut self) -> String {
        let mut identifier = String::new();
        while let Some(ch) = self.current() {
            if ch.is_alphanumeric() || ch == '_' {
                identifier.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        identifier
    }

    fn parse_quoted_string(&mut self) -> Result<String, ExprError> {
        let quote_char = self.advance().expect("caller checked the quote");
        let mut string = String::new();
        let mut escaped = false;

        while let Some(ch) = self.current() {
            if escaped {
                match ch {
                    'n' => string.push('\n'),
                    'r' => string.push('\r'),
                    't' => string.push('\t'),
                    '\\' => string.push('\\'),
                    '\'' => string.push('\''),
                    '"' => string.push('"'),
                    _ => {
                        string.push('\\');
                        string.push(ch);
                    }
                }
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == quote_char {
                self.advance();
                return Ok(string);
            } else {
                string.push(ch);
            }
            self.advance();
        }

        Err(ExprError::Parse {
            message: "unterminated string literal".to_string(),
            position: self.position,
        })
    }

    fn parse_number(&mut self) -> Result<Expr, ExprError> {
        let start = self.position;
        let mut number_str = String::new();
        let mut is_float = false;

        while let Some(ch) = self.current() {
            if ch.is_ascii_digit() {
                number_str.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if self.current() == Some('.') && self.peek_next().map_or(false, |c| c.is_ascii_digit()) {
            is_float = true;
            number_str.push('.');
            self.advance();
            while let Some(ch) = self.current() {
                if ch.is_ascii_digit() {
                    number_str.push(ch);
                    self.advance();
                } else {
                    break;
                }
            }
        }

        if matches!(self.current(), Some('e') | Some('E')) {
            is_float = true;
            number_str.push('e');
            self.advance();
            if matches!(self.current(), Some('+') | Some('-')) {
                number_str.push(self.advance().expect("sign just peeked"));
            }
            while let Some(ch) = self.current() {
                if ch.is_ascii_digit() {
                    number_str.push(ch);
                    self.advance();
                } else {
                    break;
                }
            }
        }

        if is_float {
            number_str
                .parse::<f64>()
                .map(|n| Expr::Literal(Literal::Float(n)))
                .map_err(|_| ExprError::Parse {
                    message: format!("invalid number: {}", number_str),
                    position: start,
                })
        } else {
            number_str
                .parse::<i64>()
                .map(|n| Expr::Literal(Literal::Int(n)))
                .map_err(|_| ExprError::Parse {
                    message: format!("invalid number: {}", number_str),
                    position: start,
                })
        }
    }

    fn match_operator(&mut self, op: &str) -> bool {
        let remaining: String = self.chars.clone().take(op.len()).collect();
        if remaining == op {
            for _ in 0..op.len() {
                self.advance();
            }
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn current(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn peek_next(&mut self) -> Option<char> {
        let mut clone = self.chars.clone();
        clone.next();
        clone.next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.chars.next();
        if let Some(c) = ch {
            self.position += c.len_utf8();
        }
        ch
    }

    fn expect_char(&mut self, expected: char) -> Result<(), ExprError> {
        match self.current() {
            Some(ch) if ch == expected => {
                self.advance();
                Ok(())
            }
            Some(ch) => Err(ExprError::Parse {
                message: format!("expected '{}', found '{}'", expected, ch),
                position: self.position,
            }),
            None => Err(ExprError::Parse {
                message: format!("expected '{}' but reached end of input", expected),
                position: self.position,
            }),
        }
    }
}

fn binary(left: Expr, op: BinaryOp, right: Expr) -> Expr {
    Expr::Binary {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<Expr, ExprError> {
        Parser::new(input)?.parse()
    }

    #[test]
    fn test_parse_literals() {
        assert_eq!(parse("42").unwrap(), Expr::Literal(Literal::Int(42)));
        assert_eq!(parse("3.5").unwrap(), Expr::Literal(Literal::Float(3.5)));
        assert_eq!(
            parse("'hi'").unwrap(),
            Expr::Literal(Literal::Str("hi".to_string()))
        );
        assert_eq!(parse("true").unwrap(), Expr::Literal(Literal::Bool(true)));
        assert_eq!(parse("null").unwrap(), Expr::Literal(Literal::Null));
    }

    #[test]
    fn test_parse_value_binding() {
        assert_eq!(parse("value").unwrap(), Expr::Value);
    }

    #[test]
    fn test_precedence_mul_over_add() {
        let expr = parse("1 + 2 * 3").unwrap();
        match expr {
            Expr::Binary { op: BinaryOp::Add, right, .. } => {
                assert!(matches!(*right, Expr::Binary { op: BinaryOp::Mul, .. }));
            }
            other => panic!("unexpected AST: {:?}", other),
        }
    }

    #[test]
    fn test_parse_ternary() {
        let expr = parse("value > 5 ? 'big' : 'small'").unwrap();
        assert!(matches!(expr, Expr::Ternary { .. }));
    }

    #[test]
    fn test_parse_nested_ternary() {
        let expr = parse("value > 5 ? (value > 10 ? 'xl' : 'l') : 's'").unwrap();
        assert!(matches!(expr, Expr::Ternary { .. }));
    }

    #[test]
    fn test_parse_builtin_call() {
        let expr = parse("upper(value)").unwrap();
        assert!(matches!(
            expr,
            Expr::Call {
                func: Builtin::Upper,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_not_versus_not_equal() {
        assert!(matches!(
            parse("!value").unwrap(),
            Expr::Unary { op: UnaryOp::Not, .. }
        ));
        assert!(matches!(
            parse("value != 3").unwrap(),
            Expr::Binary { op: BinaryOp::Ne, .. }
        ));
    }

    #[test]
    fn test_parse_error_unknown_identifier() {
        assert!(matches!(
            parse("bogus"),
            Err(ExprError::UnknownIdentifier { .. })
        ));
    }

    #[test]
    fn test_parse_error_unknown_function() {
        assert!(matches!(
            parse("exec(value)"),
            Err(ExprError::UnknownFunction { .. })
        ));
    }

    #[test]
    fn test_parse_error_empty() {
        assert!(Parser::new("  ").is_err());
    }

    #[test]
    fn test_parse_error_trailing_garbage() {
        assert!(matches!(parse("1 2"), Err(ExprError::Parse { .. })));
    }
}
