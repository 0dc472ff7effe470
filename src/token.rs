use std::fmt;

use crate::error::Span;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    // Single-character tokens
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Percent,
    LeftParen,
    RightParen,
    Comma,
    Question,
    Colon,

    // One or two character tokens
    Bang,
    BangEqual,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    And,
    Or,

    // Literals
    Number,
    String,
    Boolean,
    Identifier,

    // Special
    Eof,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            TokenType::Plus => "Plus",
            TokenType::Minus => "Minus",
            TokenType::Star => "Star",
            TokenType::Slash => "Slash",
            TokenType::Caret => "Caret",
            TokenType::Percent => "Percent",
            TokenType::LeftParen => "Left Paren",
            TokenType::RightParen => "Right Paren",
            TokenType::Comma => "Comma",
            TokenType::Question => "Question",
            TokenType::Colon => "Colon",
            TokenType::Bang => "Bang",
            TokenType::BangEqual => "Bang Equal",
            TokenType::EqualEqual => "Equal Equal",
            TokenType::Greater => "Greater",
            TokenType::GreaterEqual => "Greater Equal",
            TokenType::Less => "Less",
            TokenType::LessEqual => "Less Equal",
            TokenType::And => "And",
            TokenType::Or => "Or",
            TokenType::Number => "Number",
            TokenType::String => "String",
            TokenType::Boolean => "Boolean",
            TokenType::Identifier => "Identifier",
            TokenType::Eof => "EOF",
        };
        write!(f, "{}", name)
    }
}

/// A scanned token.
///
/// `lexeme` is the exact source text of the token, quotes included for
/// strings. `literal` holds the decoded value of number, string and boolean
/// tokens. `column` is the 1-based column of the token's last byte, counting
/// every byte consumed so far including whitespace.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    pub literal: Option<Value>,
    pub lexeme: String,
    pub column: usize,
    pub span: Span,
}

impl Token {
    pub fn new(
        token_type: TokenType,
        literal: Option<Value>,
        lexeme: String,
        column: usize,
        span: Span,
    ) -> Self {
        Self {
            token_type,
            literal,
            lexeme,
            column,
            span,
        }
    }

    pub fn is_eof(&self) -> bool {
        self.token_type == TokenType::Eof
    }

    /// How the token is named in parse errors: its quoted lexeme, or `EOF`.
    pub fn describe(&self) -> String {
        if self.is_eof() {
            "EOF".to_string()
        } else {
            format!("'{}'", self.lexeme)
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.literal {
            Some(literal) => write!(
                f,
                "<{} {} {} {}>",
                self.token_type, self.lexeme, literal, self.column
            ),
            None => write!(f, "<{} {} {}>", self.token_type, self.lexeme, self.column),
        }
    }
}
