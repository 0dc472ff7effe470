use std::fmt;

use crate::error::Span;
use crate::value::Value;

/// Expression tree produced by the parser.
///
/// Each node owns its children. Spans are kept for diagnostics only and do
/// not take part in evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Binary {
        left: Box<Expr>,
        operator: BinaryOp,
        right: Box<Expr>,
        span: Span,
    },
    /// Explicit parentheses; evaluates to its inner expression.
    Group {
        inner: Box<Expr>,
        span: Span,
    },
    Literal {
        value: Value,
        span: Span,
    },
    Unary {
        operator: UnaryOp,
        right: Box<Expr>,
        span: Span,
    },
    Variable {
        name: String,
        span: Span,
    },
    FunctionCall {
        name: String,
        args: Vec<Expr>,
        span: Span,
    },
    Ternary {
        condition: Box<Expr>,
        when_true: Box<Expr>,
        when_false: Box<Expr>,
        span: Span,
    },
    Logical {
        left: Box<Expr>,
        operator: LogicalOp,
        right: Box<Expr>,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> &Span {
        match self {
            Expr::Binary { span, .. } => span,
            Expr::Group { span, .. } => span,
            Expr::Literal { span, .. } => span,
            Expr::Unary { span, .. } => span,
            Expr::Variable { span, .. } => span,
            Expr::FunctionCall { span, .. } => span,
            Expr::Ternary { span, .. } => span,
            Expr::Logical { span, .. } => span,
        }
    }

    /// Dispatches to the visitor method for this node's variant.
    pub fn accept<V: Visitor>(&self, visitor: &mut V) -> V::Output {
        match self {
            Expr::Binary {
                left,
                operator,
                right,
                span,
            } => visitor.visit_binary(left, *operator, right, span),
            Expr::Group { inner, span } => visitor.visit_group(inner, span),
            Expr::Literal { value, span } => visitor.visit_literal(value, span),
            Expr::Unary {
                operator,
                right,
                span,
            } => visitor.visit_unary(*operator, right, span),
            Expr::Variable { name, span } => visitor.visit_variable(name, span),
            Expr::FunctionCall { name, args, span } => {
                visitor.visit_function_call(name, args, span)
            }
            Expr::Ternary {
                condition,
                when_true,
                when_false,
                span,
            } => visitor.visit_ternary(condition, when_true, when_false, span),
            Expr::Logical {
                left,
                operator,
                right,
                span,
            } => visitor.visit_logical(left, *operator, right, span),
        }
    }
}

/// A traversal over [`Expr`].
///
/// There are no default methods: a traversal has to say what it does with
/// every variant.
pub trait Visitor {
    type Output;

    fn visit_binary(
        &mut self,
        left: &Expr,
        operator: BinaryOp,
        right: &Expr,
        span: &Span,
    ) -> Self::Output;

    fn visit_group(&mut self, inner: &Expr, span: &Span) -> Self::Output;

    fn visit_literal(&mut self, value: &Value, span: &Span) -> Self::Output;

    fn visit_unary(&mut self, operator: UnaryOp, right: &Expr, span: &Span) -> Self::Output;

    fn visit_variable(&mut self, name: &str, span: &Span) -> Self::Output;

    fn visit_function_call(&mut self, name: &str, args: &[Expr], span: &Span) -> Self::Output;

    fn visit_ternary(
        &mut self,
        condition: &Expr,
        when_true: &Expr,
        when_false: &Expr,
        span: &Span,
    ) -> Self::Output;

    fn visit_logical(
        &mut self,
        left: &Expr,
        operator: LogicalOp,
        right: &Expr,
        span: &Span,
    ) -> Self::Output;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
            BinaryOp::Power => "^",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => ">=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Negate,
    Not,
}

impl UnaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Negate => "-",
            UnaryOp::Not => "!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            LogicalOp::And => "&&",
            LogicalOp::Or => "||",
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", crate::printer::print(self))
    }
}
