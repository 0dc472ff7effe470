use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::function::Arity;
use crate::value::DataType;

/// Byte range in the source expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(&self, other: &Span) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// Which stage of the pipeline produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Lex,
    Parse,
    Resolution,
    Call,
    Arithmetic,
    Declaration,
    Host,
}

impl ErrorCategory {
    pub fn title(&self) -> &'static str {
        match self {
            ErrorCategory::Lex => "Lexical Error",
            ErrorCategory::Parse => "Parse Error",
            ErrorCategory::Resolution => "Resolution Error",
            ErrorCategory::Call => "Call Error",
            ErrorCategory::Arithmetic => "Arithmetic Error",
            ErrorCategory::Declaration => "Declaration Error",
            ErrorCategory::Host => "Host Data Error",
        }
    }

    fn color(&self) -> Color {
        match self {
            ErrorCategory::Lex => Color::Red,
            ErrorCategory::Parse => Color::Yellow,
            ErrorCategory::Resolution | ErrorCategory::Call => Color::Magenta,
            ErrorCategory::Arithmetic => Color::Blue,
            ErrorCategory::Declaration | ErrorCategory::Host => Color::Cyan,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ErrorKind {
    // Lexing
    #[error("unexpected character '{0}'")]
    UnexpectedCharacter(char),

    #[error("unterminated string")]
    UnterminatedString,

    #[error("malformed number '{lexeme}': {reason}")]
    MalformedNumber { lexeme: String, reason: String },

    #[error("incomplete operator '{operator}', expected '{operator}{operator}'")]
    IncompleteOperator { operator: char },

    // Parsing
    #[error("expected expression but found {found}")]
    ExpectedExpression { found: String },

    #[error("expected ')' after {context} but found {found}")]
    MissingClosingParen { context: &'static str, found: String },

    #[error("expected ':' in ternary expression but found {found}")]
    MalformedTernary { found: String },

    #[error("unexpected {found} after expression")]
    UnexpectedToken { found: String },

    // Name resolution
    #[error("unknown variable '{name}'")]
    UnknownVariable { name: String },

    #[error("unknown function '{name}()'")]
    UnknownFunction { name: String },

    #[error("'{name}' is not a variable")]
    NotAVariable { name: String },

    #[error("'{name}' is not a function")]
    NotAFunction { name: String },

    // Function calls
    #[error("function '{name}()' expects {expected} but got {got}")]
    ArityMismatch {
        name: String,
        expected: Arity,
        got: usize,
    },

    #[error("function '{name}()' expects {expected} for argument {position} but got {got}")]
    TypeMismatch {
        name: String,
        position: usize,
        expected: DataType,
        got: DataType,
    },

    #[error("invalid argument to '{name}()': {message}")]
    InvalidArgument { name: String, message: String },

    #[error("{message}")]
    NativeFailure { message: String },

    // Arithmetic
    #[error("division by zero")]
    DivisionByZero,

    #[error("'{op}' operation between ({left}, {right}) is not supported")]
    UnsupportedOperation {
        op: &'static str,
        left: DataType,
        right: DataType,
    },

    #[error("unary '{op}' is not supported for {operand}")]
    UnsupportedUnaryOperation { op: &'static str, operand: DataType },

    #[error("{function}: {message}")]
    DomainError { function: String, message: String },

    #[error("{operation}: number is outside the supported range")]
    NumberOutOfRange { operation: String },

    // Declarations
    #[error("'{name}' is already declared")]
    AlreadyDeclared { name: String },

    // Host data
    #[error("cannot declare '{name}': unsupported data type {found}")]
    UnknownDataType { name: String, found: String },
}

impl ErrorKind {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ErrorKind::UnexpectedCharacter(_)
            | ErrorKind::UnterminatedString
            | ErrorKind::MalformedNumber { .. }
            | ErrorKind::IncompleteOperator { .. } => ErrorCategory::Lex,
            ErrorKind::ExpectedExpression { .. }
            | ErrorKind::MissingClosingParen { .. }
            | ErrorKind::MalformedTernary { .. }
            | ErrorKind::UnexpectedToken { .. } => ErrorCategory::Parse,
            ErrorKind::UnknownVariable { .. }
            | ErrorKind::UnknownFunction { .. }
            | ErrorKind::NotAVariable { .. }
            | ErrorKind::NotAFunction { .. } => ErrorCategory::Resolution,
            ErrorKind::ArityMismatch { .. }
            | ErrorKind::TypeMismatch { .. }
            | ErrorKind::InvalidArgument { .. }
            | ErrorKind::NativeFailure { .. } => ErrorCategory::Call,
            ErrorKind::DivisionByZero
            | ErrorKind::UnsupportedOperation { .. }
            | ErrorKind::UnsupportedUnaryOperation { .. }
            | ErrorKind::DomainError { .. }
            | ErrorKind::NumberOutOfRange { .. } => ErrorCategory::Arithmetic,
            ErrorKind::AlreadyDeclared { .. } => ErrorCategory::Declaration,
            ErrorKind::UnknownDataType { .. } => ErrorCategory::Host,
        }
    }
}

/// Error produced anywhere between lexing and native dispatch.
///
/// `span` is absent for errors that do not originate in source text, such as
/// a failed declaration.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}")]
pub struct EvalError {
    pub kind: ErrorKind,
    pub span: Option<Span>,
    pub help: Option<String>,
}

impl EvalError {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            span: None,
            help: None,
        }
    }

    pub fn at(kind: ErrorKind, span: Span) -> Self {
        Self {
            kind,
            span: Some(span),
            help: None,
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Attaches `span` unless the error already points somewhere.
    pub fn or_span(mut self, span: Span) -> Self {
        if self.span.is_none() {
            self.span = Some(span);
        }
        self
    }

    /// Shorthand for natives reporting a failure of their own.
    pub fn native(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NativeFailure {
            message: message.into(),
        })
    }

    pub fn invalid_argument(name: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument {
            name: name.to_string(),
            message: message.into(),
        })
    }

    pub fn domain(function: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DomainError {
            function: function.to_string(),
            message: message.into(),
        })
    }

    pub fn out_of_range(operation: impl Into<String>) -> Self {
        Self::new(ErrorKind::NumberOutOfRange {
            operation: operation.into(),
        })
    }

    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    pub fn report(&self, source: &str, filename: Option<&str>) {
        let filename = filename.unwrap_or("<expr>");
        let category = self.category();
        let color = category.color();
        let message = self.kind.to_string();

        // Errors without a span point at the whole expression.
        let span = self.span.unwrap_or(Span::new(0, source.len()));
        let range = span.start.min(source.len())..span.end.min(source.len());

        let mut report_builder = Report::build(ReportKind::Error, filename, range.start)
            .with_message(format!("{}: {}", category.title().fg(color), message))
            .with_label(
                Label::new((filename, range))
                    .with_message(&message)
                    .with_color(color),
            );

        if let Some(ref help_text) = self.help {
            report_builder =
                report_builder.with_note(format!("{}: {}", "help".fg(Color::Cyan), help_text));
        }

        if let Err(error) = report_builder
            .finish()
            .eprint((filename, Source::from(source)))
        {
            tracing::warn!(%error, "failed to render diagnostic");
        }
    }
}

impl From<ErrorKind> for EvalError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}
