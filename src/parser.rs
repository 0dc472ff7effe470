use crate::ast::{BinaryOp, Expr, LogicalOp, UnaryOp};
use crate::error::{ErrorKind, EvalError};
use crate::lexer::Lexer;
use crate::token::{Token, TokenType};

/// Recursive-descent parser for a single expression.
///
/// Tokens are pulled from the lexer on demand and kept in an append-only
/// buffer; `current` only ever moves forward, past tokens that were accepted.
pub struct Parser {
    lexer: Lexer,
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    pub fn new(source: &str) -> Self {
        Self {
            lexer: Lexer::new(source),
            tokens: Vec::new(),
            current: 0,
        }
    }

    /// Parses the whole input as one expression.
    pub fn parse(&mut self) -> Result<Expr, EvalError> {
        let expr = self.expression()?;

        let next = self.peek()?;
        if !next.is_eof() {
            let span = next.span;
            return Err(EvalError::at(
                ErrorKind::UnexpectedToken {
                    found: next.describe(),
                },
                span,
            ));
        }

        Ok(expr)
    }

    fn expression(&mut self) -> Result<Expr, EvalError> {
        self.ternary()
    }

    fn ternary(&mut self) -> Result<Expr, EvalError> {
        let condition = self.logical()?;

        if !self.match_types(&[TokenType::Question])? {
            return Ok(condition);
        }

        let when_true = self.expression()?;

        if !self.match_types(&[TokenType::Colon])? {
            let next = self.peek()?;
            return Err(EvalError::at(
                ErrorKind::MalformedTernary {
                    found: next.describe(),
                },
                next.span,
            )
            .with_help("a ternary needs both branches: condition ? when_true : when_false"));
        }

        let when_false = self.expression()?;
        let span = condition.span().to(when_false.span());

        Ok(Expr::Ternary {
            condition: Box::new(condition),
            when_true: Box::new(when_true),
            when_false: Box::new(when_false),
            span,
        })
    }

    fn logical(&mut self) -> Result<Expr, EvalError> {
        let mut expr = self.equality()?;

        while self.match_types(&[TokenType::And, TokenType::Or])? {
            let operator = match self.previous().token_type {
                TokenType::And => LogicalOp::And,
                _ => LogicalOp::Or,
            };
            let right = self.equality()?;
            let span = expr.span().to(right.span());
            expr = Expr::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
                span,
            };
        }

        Ok(expr)
    }

    fn equality(&mut self) -> Result<Expr, EvalError> {
        let mut expr = self.additive()?;

        while self.match_types(&[
            TokenType::EqualEqual,
            TokenType::BangEqual,
            TokenType::Greater,
            TokenType::GreaterEqual,
            TokenType::Less,
            TokenType::LessEqual,
        ])? {
            let operator = match self.previous().token_type {
                TokenType::EqualEqual => BinaryOp::Equal,
                TokenType::BangEqual => BinaryOp::NotEqual,
                TokenType::Greater => BinaryOp::Greater,
                TokenType::GreaterEqual => BinaryOp::GreaterEqual,
                TokenType::Less => BinaryOp::Less,
                _ => BinaryOp::LessEqual,
            };
            let right = self.additive()?;
            expr = binary(expr, operator, right);
        }

        Ok(expr)
    }

    fn additive(&mut self) -> Result<Expr, EvalError> {
        let mut expr = self.multiplicative()?;

        while self.match_types(&[TokenType::Plus, TokenType::Minus])? {
            let operator = match self.previous().token_type {
                TokenType::Plus => BinaryOp::Add,
                _ => BinaryOp::Subtract,
            };
            let right = self.multiplicative()?;
            expr = binary(expr, operator, right);
        }

        Ok(expr)
    }

    fn multiplicative(&mut self) -> Result<Expr, EvalError> {
        let mut expr = self.exponent()?;

        while self.match_types(&[TokenType::Star, TokenType::Slash, TokenType::Percent])? {
            let operator = match self.previous().token_type {
                TokenType::Star => BinaryOp::Multiply,
                TokenType::Slash => BinaryOp::Divide,
                _ => BinaryOp::Modulo,
            };
            let right = self.exponent()?;
            expr = binary(expr, operator, right);
        }

        Ok(expr)
    }

    /// `^` is right-associative: `2 ^ 3 ^ 2` parses as `2 ^ (3 ^ 2)`.
    fn exponent(&mut self) -> Result<Expr, EvalError> {
        let base = self.unary()?;

        if self.match_types(&[TokenType::Caret])? {
            let power = self.exponent()?;
            return Ok(binary(base, BinaryOp::Power, power));
        }

        Ok(base)
    }

    fn unary(&mut self) -> Result<Expr, EvalError> {
        if self.match_types(&[TokenType::Plus, TokenType::Minus, TokenType::Bang])? {
            let token = self.previous();
            let operator = match token.token_type {
                TokenType::Plus => UnaryOp::Plus,
                TokenType::Minus => UnaryOp::Negate,
                _ => UnaryOp::Not,
            };
            let start = token.span;
            let right = self.unary()?;
            let span = start.to(right.span());
            return Ok(Expr::Unary {
                operator,
                right: Box::new(right),
                span,
            });
        }

        self.call()
    }

    fn call(&mut self) -> Result<Expr, EvalError> {
        let expr = self.primary()?;

        let (name, span) = match expr {
            Expr::Variable { name, span } => (name, span),
            other => return Ok(other),
        };

        if !self.match_types(&[TokenType::LeftParen])? {
            return Ok(Expr::Variable { name, span });
        }

        let mut args = Vec::new();
        if !self.match_types(&[TokenType::RightParen])? {
            loop {
                args.push(self.expression()?);
                if !self.match_types(&[TokenType::Comma])? {
                    break;
                }
            }
            self.consume_right_paren("arguments")?;
        }

        let span = span.to(&self.previous().span);
        Ok(Expr::FunctionCall { name, args, span })
    }

    fn primary(&mut self) -> Result<Expr, EvalError> {
        if self.match_types(&[TokenType::Number, TokenType::String, TokenType::Boolean])? {
            let token = self.previous();
            if let Some(value) = token.literal.clone() {
                return Ok(Expr::Literal {
                    value,
                    span: token.span,
                });
            }
        }

        if self.match_types(&[TokenType::Identifier])? {
            let token = self.previous();
            return Ok(Expr::Variable {
                name: token.lexeme.clone(),
                span: token.span,
            });
        }

        if self.match_types(&[TokenType::LeftParen])? {
            let start = self.previous().span;
            let inner = self.expression()?;
            self.consume_right_paren("expression")?;
            let span = start.to(&self.previous().span);
            return Ok(Expr::Group {
                inner: Box::new(inner),
                span,
            });
        }

        let next = self.peek()?;
        Err(EvalError::at(
            ErrorKind::ExpectedExpression {
                found: next.describe(),
            },
            next.span,
        ))
    }

    fn consume_right_paren(&mut self, context: &'static str) -> Result<(), EvalError> {
        if self.match_types(&[TokenType::RightParen])? {
            return Ok(());
        }
        let next = self.peek()?;
        Err(EvalError::at(
            ErrorKind::MissingClosingParen {
                context,
                found: next.describe(),
            },
            next.span,
        ))
    }

    fn match_types(&mut self, types: &[TokenType]) -> Result<bool, EvalError> {
        for token_type in types {
            if self.check(*token_type)? {
                self.advance();
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn check(&mut self, token_type: TokenType) -> Result<bool, EvalError> {
        let next = self.peek()?;
        Ok(!next.is_eof() && next.token_type == token_type)
    }

    fn advance(&mut self) {
        self.current += 1;
    }

    /// The token at the cursor, lexing it first if it is not buffered yet.
    fn peek(&mut self) -> Result<&Token, EvalError> {
        while self.tokens.len() <= self.current {
            let token = self.lexer.next_token()?;
            self.tokens.push(token);
        }
        Ok(&self.tokens[self.current])
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }
}

fn binary(left: Expr, operator: BinaryOp, right: Expr) -> Expr {
    let span = left.span().to(right.span());
    Expr::Binary {
        left: Box::new(left),
        operator,
        right: Box::new(right),
        span,
    }
}
