use std::str::FromStr;

use bigdecimal::BigDecimal;

use crate::error::{ErrorKind, EvalError, Span};
use crate::token::{Token, TokenType};
use crate::value::{in_range, Value};

/// Pull-based scanner over the bytes of an expression.
///
/// Once the input is exhausted every call to [`Lexer::next_token`] returns
/// an EOF token, so callers may peek past the end freely.
pub struct Lexer {
    source: String,
    start: usize,
    current: usize,
}

impl Lexer {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            start: 0,
            current: 0,
        }
    }

    pub fn next_token(&mut self) -> Result<Token, EvalError> {
        self.skip_whitespace();
        self.start = self.current;

        if self.is_at_end() {
            return Ok(self.make_token(TokenType::Eof, None));
        }

        let token = self.scan_token()?;
        tracing::trace!(token = %token, "scanned token");
        Ok(token)
    }

    /// Scans the whole input, EOF token included.
    pub fn scan_tokens(&mut self) -> Result<Vec<Token>, EvalError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.is_eof();
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), b' ' | b'\r' | b'\t' | b'\n') && !self.is_at_end() {
            self.current += 1;
        }
    }

    fn scan_token(&mut self) -> Result<Token, EvalError> {
        let c = self.advance();

        match c {
            b'+' => Ok(self.make_token(TokenType::Plus, None)),
            b'-' => Ok(self.make_token(TokenType::Minus, None)),
            b'*' => Ok(self.make_token(TokenType::Star, None)),
            b'/' => Ok(self.make_token(TokenType::Slash, None)),
            b'^' => Ok(self.make_token(TokenType::Caret, None)),
            b'%' => Ok(self.make_token(TokenType::Percent, None)),
            b'(' => Ok(self.make_token(TokenType::LeftParen, None)),
            b')' => Ok(self.make_token(TokenType::RightParen, None)),
            b',' => Ok(self.make_token(TokenType::Comma, None)),
            b'?' => Ok(self.make_token(TokenType::Question, None)),
            b':' => Ok(self.make_token(TokenType::Colon, None)),
            b'!' => {
                let token_type = if self.match_byte(b'=') {
                    TokenType::BangEqual
                } else {
                    TokenType::Bang
                };
                Ok(self.make_token(token_type, None))
            }
            b'>' => {
                let token_type = if self.match_byte(b'=') {
                    TokenType::GreaterEqual
                } else {
                    TokenType::Greater
                };
                Ok(self.make_token(token_type, None))
            }
            b'<' => {
                let token_type = if self.match_byte(b'=') {
                    TokenType::LessEqual
                } else {
                    TokenType::Less
                };
                Ok(self.make_token(token_type, None))
            }
            b'=' => self.doubled(b'=', TokenType::EqualEqual),
            b'&' => self.doubled(b'&', TokenType::And),
            b'|' => self.doubled(b'|', TokenType::Or),
            b'"' | b'\'' => self.string(c),
            c if c.is_ascii_digit() => self.number(),
            c if c.is_ascii_alphabetic() || c == b'_' => Ok(self.identifier()),
            _ => {
                let ch = self.source[self.start..].chars().next().unwrap_or('\0');
                // Step over the whole character so the cursor stays on a char boundary.
                self.current = self.start + ch.len_utf8();
                Err(EvalError::at(
                    ErrorKind::UnexpectedCharacter(ch),
                    Span::new(self.start, self.current),
                ))
            }
        }
    }

    fn advance(&mut self) -> u8 {
        let c = self.peek();
        self.current += 1;
        c
    }

    fn match_byte(&mut self, expected: u8) -> bool {
        if self.is_at_end() || self.peek() != expected {
            false
        } else {
            self.current += 1;
            true
        }
    }

    fn peek(&self) -> u8 {
        self.source
            .as_bytes()
            .get(self.current)
            .copied()
            .unwrap_or(b'\0')
    }

    /// Operators spelled as a doubled character: `==`, `&&`, `||`.
    fn doubled(&mut self, operator: u8, token_type: TokenType) -> Result<Token, EvalError> {
        if self.match_byte(operator) {
            Ok(self.make_token(token_type, None))
        } else {
            Err(EvalError::at(
                ErrorKind::IncompleteOperator {
                    operator: operator as char,
                },
                Span::new(self.start, self.current),
            ))
        }
    }

    fn string(&mut self, quote: u8) -> Result<Token, EvalError> {
        while !self.is_at_end() && self.peek() != quote {
            self.current += 1;
        }

        if self.is_at_end() {
            return Err(EvalError::at(
                ErrorKind::UnterminatedString,
                Span::new(self.start, self.current),
            )
            .with_help(format!("close the string with {}", quote as char)));
        }

        // The closing quote
        self.current += 1;

        let content = self.source[self.start + 1..self.current - 1].to_string();
        Ok(self.make_token(TokenType::String, Some(Value::Text(content))))
    }

    fn number(&mut self) -> Result<Token, EvalError> {
        self.digits();

        if self.match_byte(b'.') {
            if !self.peek().is_ascii_digit() {
                return Err(self.malformed_number("expected a digit after '.'"));
            }
            self.digits();
        }

        if matches!(self.peek(), b'e' | b'E') {
            self.current += 1;
            if !self.match_byte(b'-') {
                self.match_byte(b'+');
            }
            if !self.peek().is_ascii_digit() {
                return Err(self.malformed_number("expected a digit in the exponent"));
            }
            self.digits();
        }

        let lexeme = &self.source[self.start..self.current];
        let value = BigDecimal::from_str(lexeme)
            .map_err(|error| self.malformed_number(&error.to_string()))?;
        if !in_range(&value) {
            return Err(self.malformed_number("the exponent is outside the supported range"));
        }

        Ok(self.make_token(TokenType::Number, Some(Value::Number(value))))
    }

    fn digits(&mut self) {
        while self.peek().is_ascii_digit() {
            self.current += 1;
        }
    }

    fn malformed_number(&self, reason: &str) -> EvalError {
        EvalError::at(
            ErrorKind::MalformedNumber {
                lexeme: self.source[self.start..self.current].to_string(),
                reason: reason.to_string(),
            },
            Span::new(self.start, self.current),
        )
    }

    fn identifier(&mut self) -> Token {
        while matches!(self.peek(), b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'_' | b'.') {
            self.current += 1;
        }

        match &self.source[self.start..self.current] {
            "true" => self.make_token(TokenType::Boolean, Some(Value::Boolean(true))),
            "false" => self.make_token(TokenType::Boolean, Some(Value::Boolean(false))),
            _ => self.make_token(TokenType::Identifier, None),
        }
    }

    fn make_token(&self, token_type: TokenType, literal: Option<Value>) -> Token {
        Token::new(
            token_type,
            literal,
            self.source[self.start..self.current].to_string(),
            self.current,
            Span::new(self.start, self.current),
        )
    }
}
