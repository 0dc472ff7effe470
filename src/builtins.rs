//! Default function catalogue and constants.
//!
//! Numbers stay exact except where noted: `exp`, `ln`, `log2` and `log10`
//! compute in `f64`, and `sqrt`/`cbrt` use the Newton root finder.

use std::str::FromStr;

use bigdecimal::{BigDecimal, RoundingMode};
use num_traits::{Signed, ToPrimitive, Zero};

use crate::environment::Environment;
use crate::error::EvalError;
use crate::evaluator::power;
use crate::function::{Arity, Function};
use crate::root::nth_root;
use crate::value::{decimal_from_f64, format_decimal, DataType, Value};

pub const PI: &str = "3.1415926535897932384626433832795028841971693993751058209749445923";
pub const E: &str = "2.71828182845904523536028747135266249775724709369995957496696762772";

/// Most decimal places `round` accepts.
const MAX_ROUND_PLACES: i64 = 1000;

/// Installs every default function and constant into `environment`.
pub fn install(environment: &mut Environment) -> Result<(), EvalError> {
    for function in catalogue() {
        environment.set_function(function)?;
    }
    for (name, digits) in [("PI", PI), ("E", E)] {
        let value = BigDecimal::from_str(digits)
            .map_err(|e| EvalError::native(format!("invalid constant {}: {}", name, e)))?;
        environment.declare_variable(name, value)?;
    }
    Ok(())
}

fn catalogue() -> Vec<Function> {
    vec![
        // exact arithmetic
        number_fn("abs", |n| Ok(n.abs())),
        number_fn("ceil", |n| Ok(n.with_scale_round(0, RoundingMode::Ceiling))),
        number_fn("floor", |n| Ok(n.with_scale_round(0, RoundingMode::Floor))),
        number_fn("sign", |n| {
            Ok(if n.is_zero() {
                BigDecimal::zero()
            } else if n.is_negative() {
                BigDecimal::from(-1)
            } else {
                BigDecimal::from(1)
            })
        }),
        Function::new(
            "pow",
            Arity::Exact(2),
            vec![DataType::Number, DataType::Number],
            DataType::Number,
            |args| {
                let base = number_arg("pow", args, 0)?;
                let exponent = number_arg("pow", args, 1)?;
                power(base, exponent).map(Value::Number)
            },
        ),
        Function::new(
            "round",
            Arity::Exact(2),
            vec![DataType::Number, DataType::Number],
            DataType::Number,
            |args| {
                let n = number_arg("round", args, 0)?;
                let places = round_places(args)?;
                Ok(Value::Number(
                    n.with_scale_round(places, RoundingMode::HalfUp).normalized(),
                ))
            },
        )
        .with_verifier(|args| round_places(args).map(|_| ())),
        extremum("max", |candidate, best| candidate > best),
        extremum("min", |candidate, best| candidate < best),
        // roots
        number_fn("sqrt", |n| nth_root(n, 2)).with_verifier(|args| {
            if number_arg("sqrt", args, 0)?.is_negative() {
                return Err(EvalError::invalid_argument(
                    "sqrt",
                    "square root of a negative number",
                ));
            }
            Ok(())
        }),
        number_fn("cbrt", |n| nth_root(n, 3)),
        // f64
        number_fn("exp", |n| through_f64("exp", n, f64::exp)),
        number_fn("ln", |n| through_f64("ln", n, f64::ln)).with_verifier(positive("ln")),
        number_fn("log2", |n| through_f64("log2", n, f64::log2)).with_verifier(positive("log2")),
        number_fn("log10", |n| through_f64("log10", n, f64::log10))
            .with_verifier(positive("log10")),
        // strings
        Function::new(
            "toNumber",
            Arity::Exact(1),
            vec![DataType::String],
            DataType::Number,
            |args| {
                let text = text_arg("toNumber", args, 0)?;
                Value::parse_number(text).ok_or_else(|| {
                    EvalError::invalid_argument("toNumber", format!("'{}' is not a number", text))
                })
            },
        ),
        Function::new(
            "concat",
            Arity::Variadic { min: 1, max: None },
            vec![DataType::Any],
            DataType::String,
            |args| Ok(Value::Text(args.iter().map(|v| v.to_string()).collect())),
        ),
        Function::new(
            "contains",
            Arity::Exact(2),
            vec![DataType::String, DataType::String],
            DataType::Boolean,
            |args| {
                let haystack = text_arg("contains", args, 0)?;
                let needle = text_arg("contains", args, 1)?;
                Ok(Value::Boolean(haystack.contains(needle)))
            },
        ),
        Function::new(
            "join",
            Arity::Variadic { min: 2, max: None },
            vec![DataType::String],
            DataType::String,
            |args| {
                let separator = text_arg("join", args, 0)?;
                let parts = args
                    .iter()
                    .skip(1)
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>();
                Ok(Value::Text(parts.join(separator)))
            },
        ),
        Function::new(
            "length",
            Arity::Exact(1),
            vec![DataType::String],
            DataType::Number,
            |args| {
                let text = text_arg("length", args, 0)?;
                Ok(Value::Number(BigDecimal::from(text.chars().count() as u64)))
            },
        ),
        replace_fn("replace", |text, from, to| text.replacen(from, to, 1)),
        replace_fn("replaceAll", |text, from, to| text.replace(from, to)),
        Function::new(
            "slice",
            Arity::Exact(3),
            vec![DataType::String, DataType::Number, DataType::Number],
            DataType::String,
            |args| {
                let text = text_arg("slice", args, 0)?;
                let (start, end) = slice_bounds(args)?;
                Ok(Value::Text(text.chars().skip(start).take(end - start).collect()))
            },
        )
        .with_verifier(|args| slice_bounds(args).map(|_| ())),
    ]
}

fn number_arg<'a>(name: &str, args: &'a [Value], index: usize) -> Result<&'a BigDecimal, EvalError> {
    args.get(index).and_then(Value::as_number).ok_or_else(|| {
        EvalError::invalid_argument(name, format!("argument {} must be a number", index + 1))
    })
}

fn text_arg<'a>(name: &str, args: &'a [Value], index: usize) -> Result<&'a str, EvalError> {
    args.get(index).and_then(Value::as_text).ok_or_else(|| {
        EvalError::invalid_argument(name, format!("argument {} must be a string", index + 1))
    })
}

/// `name(number) -> number`.
fn number_fn<F>(name: &'static str, f: F) -> Function
where
    F: Fn(&BigDecimal) -> Result<BigDecimal, EvalError> + Send + Sync + 'static,
{
    Function::new(
        name,
        Arity::Exact(1),
        vec![DataType::Number],
        DataType::Number,
        move |args| f(number_arg(name, args, 0)?).map(Value::Number),
    )
}

fn extremum(name: &'static str, better: fn(&BigDecimal, &BigDecimal) -> bool) -> Function {
    Function::new(
        name,
        Arity::Variadic { min: 1, max: None },
        vec![DataType::Number],
        DataType::Number,
        move |args| {
            let mut best = number_arg(name, args, 0)?;
            for index in 1..args.len() {
                let candidate = number_arg(name, args, index)?;
                if better(candidate, best) {
                    best = candidate;
                }
            }
            Ok(Value::Number(best.clone()))
        },
    )
}

fn replace_fn(name: &'static str, f: fn(&str, &str, &str) -> String) -> Function {
    Function::new(
        name,
        Arity::Exact(3),
        vec![DataType::String, DataType::String, DataType::String],
        DataType::String,
        move |args| {
            let text = text_arg(name, args, 0)?;
            let from = text_arg(name, args, 1)?;
            let to = text_arg(name, args, 2)?;
            Ok(Value::Text(f(text, from, to)))
        },
    )
}

fn through_f64(name: &str, n: &BigDecimal, f: fn(f64) -> f64) -> Result<BigDecimal, EvalError> {
    n.to_f64().map(f).and_then(decimal_from_f64).ok_or_else(|| {
        EvalError::domain(
            name,
            format!("{}({}) has no finite result", name, format_decimal(n)),
        )
    })
}

fn positive(name: &'static str) -> impl Fn(&[Value]) -> Result<(), EvalError> + Send + Sync + 'static {
    move |args| {
        if number_arg(name, args, 0)?.is_positive() {
            Ok(())
        } else {
            Err(EvalError::invalid_argument(name, "argument must be positive"))
        }
    }
}

fn round_places(args: &[Value]) -> Result<i64, EvalError> {
    let places = number_arg("round", args, 1)?;
    places
        .is_integer()
        .then(|| places.to_i64())
        .flatten()
        .filter(|p| (0..=MAX_ROUND_PLACES).contains(p))
        .ok_or_else(|| {
            EvalError::invalid_argument(
                "round",
                format!(
                    "decimal places must be an integer between 0 and {}, got {}",
                    MAX_ROUND_PLACES,
                    format_decimal(places)
                ),
            )
        })
}

fn char_index(args: &[Value], index: usize, what: &str) -> Result<usize, EvalError> {
    let n = number_arg("slice", args, index)?;
    n.is_integer()
        .then(|| n.to_usize())
        .flatten()
        .ok_or_else(|| {
            EvalError::invalid_argument(
                "slice",
                format!("{} must be a non-negative integer, got {}", what, format_decimal(n)),
            )
        })
}

fn slice_bounds(args: &[Value]) -> Result<(usize, usize), EvalError> {
    let length = text_arg("slice", args, 0)?.chars().count();
    let start = char_index(args, 1, "start")?;
    let end = char_index(args, 2, "end")?;
    if start > end {
        return Err(EvalError::invalid_argument(
            "slice",
            format!("start {} is after end {}", start, end),
        ));
    }
    if end > length {
        return Err(EvalError::invalid_argument(
            "slice",
            format!("end {} is past the string length {}", end, length),
        ));
    }
    Ok((start, end))
}
