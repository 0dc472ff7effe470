// dexpr expression language library
//
// Parses a single-expression formula and evaluates it against a
// caller-built environment of variables and native functions. Numbers are
// exact decimals.

// Public modules
pub mod ast;
pub mod builtins;
pub mod environment;
pub mod error;
pub mod evaluator;
pub mod function;
pub mod lexer;
pub mod parser;
pub mod printer;
pub mod repl;
pub mod root;
pub mod runner;
pub mod token;
pub mod value;

// Re-export commonly used items
pub use ast::{BinaryOp, Expr, LogicalOp, UnaryOp, Visitor};
pub use environment::{Environment, Symbol};
pub use error::{ErrorCategory, ErrorKind, EvalError, Span};
pub use evaluator::Evaluator;
pub use function::{Arity, Function};
pub use lexer::Lexer;
pub use parser::Parser;
pub use token::{Token, TokenType};
pub use value::{DataType, Value};

// Re-export front-end entry points
pub use repl::start as start_repl;
pub use runner::run;

/// Parses `expression` into a tree without evaluating it.
pub fn parse(expression: &str) -> Result<Expr, EvalError> {
    let expr = Parser::new(expression).parse()?;
    tracing::debug!(ast = %expr, "parsed expression");
    Ok(expr)
}

/// Parses and evaluates `expression` against `environment`.
pub fn evaluate(expression: &str, environment: &Environment) -> Result<Value, EvalError> {
    let expr = parse(expression)?;
    Evaluator::new(environment).evaluate(&expr)
}

/// Evaluates `expression` with the default functions plus `variables`
/// declared from a JSON object.
pub fn evaluate_json(
    expression: &str,
    variables: &serde_json::Map<String, serde_json::Value>,
) -> Result<Value, EvalError> {
    let mut environment = Environment::with_defaults()?;
    environment.declare_json(variables)?;
    evaluate(expression, &environment)
}
