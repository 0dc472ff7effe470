//! S-expression rendering of an [`Expr`], for debugging and tests.
//!
//! Groups are kept visible so the tree shape written by the user shows up:
//! `(1 + 2) * 3` prints as `(* (group (+ 1 2)) 3)`. Strings are quoted.

use crate::ast::{BinaryOp, Expr, LogicalOp, UnaryOp, Visitor};
use crate::error::Span;
use crate::value::Value;

pub fn print(expr: &Expr) -> String {
    expr.accept(&mut AstPrinter)
}

pub struct AstPrinter;

impl AstPrinter {
    fn parenthesize(&mut self, name: &str, parts: &[&Expr]) -> String {
        let mut out = format!("({}", name);
        for part in parts {
            out.push(' ');
            out.push_str(&part.accept(self));
        }
        out.push(')');
        out
    }
}

impl Visitor for AstPrinter {
    type Output = String;

    fn visit_binary(&mut self, left: &Expr, operator: BinaryOp, right: &Expr, _: &Span) -> String {
        self.parenthesize(operator.symbol(), &[left, right])
    }

    fn visit_group(&mut self, inner: &Expr, _: &Span) -> String {
        self.parenthesize("group", &[inner])
    }

    fn visit_literal(&mut self, value: &Value, _: &Span) -> String {
        match value {
            Value::Text(s) => format!("{:?}", s),
            other => other.to_string(),
        }
    }

    fn visit_unary(&mut self, operator: UnaryOp, right: &Expr, _: &Span) -> String {
        self.parenthesize(operator.symbol(), &[right])
    }

    fn visit_variable(&mut self, name: &str, _: &Span) -> String {
        name.to_string()
    }

    fn visit_function_call(&mut self, name: &str, args: &[Expr], _: &Span) -> String {
        let args: Vec<&Expr> = args.iter().collect();
        self.parenthesize(&format!("call {}", name), &args)
    }

    fn visit_ternary(
        &mut self,
        condition: &Expr,
        when_true: &Expr,
        when_false: &Expr,
        _: &Span,
    ) -> String {
        self.parenthesize("?:", &[condition, when_true, when_false])
    }

    fn visit_logical(&mut self, left: &Expr, operator: LogicalOp, right: &Expr, _: &Span) -> String {
        self.parenthesize(operator.symbol(), &[left, right])
    }
}
