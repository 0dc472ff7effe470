use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use num_traits::{Signed, Zero};

use crate::error::EvalError;

/// Largest decimal scale, in either direction, a number may carry.
pub const MAX_SCALE: i64 = 100_000;

/// Most digits a number's unscaled integer may have.
pub const MAX_DIGITS: u64 = 250_000;

/// Result of evaluating an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(BigDecimal),
    Text(String),
    Boolean(bool),
}

/// Type tags used in error messages and function signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Number,
    String,
    Boolean,
    /// Accepts any value; only meaningful in a function signature.
    Any,
}

impl DataType {
    pub fn accepts(&self, value: &Value) -> bool {
        *self == DataType::Any || *self == value.data_type()
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            DataType::Number => "number",
            DataType::String => "string",
            DataType::Boolean => "boolean",
            DataType::Any => "any",
        };
        write!(f, "{}", name)
    }
}

impl Value {
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Number(_) => DataType::Number,
            Value::Text(_) => DataType::String,
            Value::Boolean(_) => DataType::Boolean,
        }
    }

    /// Truthiness used by `!`, `&&`, `||` and the ternary condition.
    ///
    /// Every number is truthy, zero included.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Number(_) => true,
            Value::Text(s) => !s.is_empty(),
            Value::Boolean(b) => *b,
        }
    }

    pub fn as_number(&self) -> Option<&BigDecimal> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Parses decimal text such as `"12.50"` or `"1e-3"`.
    pub fn parse_number(text: &str) -> Option<Value> {
        BigDecimal::from_str(text.trim()).ok().map(Value::Number)
    }

    /// Converts a binary float through its shortest round-trip text, so
    /// `0.1` becomes exactly `0.1`. Non-finite values have no decimal form.
    pub fn from_f64(value: f64) -> Option<Value> {
        decimal_from_f64(value).map(Value::Number)
    }
}

pub(crate) fn decimal_from_f64(value: f64) -> Option<BigDecimal> {
    if !value.is_finite() {
        return None;
    }
    BigDecimal::from_str(&value.to_string()).ok()
}

/// Whether `value` is small enough to compute with and print.
///
/// Every number the evaluator sees is in range, so the scale sums inside
/// decimal multiplication and division cannot overflow.
pub fn in_range(value: &BigDecimal) -> bool {
    value.fractional_digit_count().abs() <= MAX_SCALE && value.digits() <= MAX_DIGITS
}

/// Passes `value` through, or reports `operation` as out of range.
pub(crate) fn ensure_in_range(value: BigDecimal, operation: &str) -> Result<BigDecimal, EvalError> {
    if in_range(&value) {
        Ok(value)
    } else {
        Err(EvalError::out_of_range(operation))
    }
}

/// Canonical text of a decimal: no exponent, no trailing fractional zeros.
pub fn format_decimal(value: &BigDecimal) -> String {
    let (digits, scale) = value.normalized().as_bigint_and_exponent();
    if digits.is_zero() {
        return "0".to_string();
    }
    let mut text = digits.magnitude().to_string();

    if scale <= 0 {
        text.extend(std::iter::repeat('0').take(scale.unsigned_abs() as usize));
    } else {
        let scale = scale as usize;
        if text.len() <= scale {
            let padding = "0".repeat(scale - text.len());
            text = format!("0.{}{}", padding, text);
        } else {
            text.insert(text.len() - scale, '.');
        }
    }

    if digits.is_negative() {
        text.insert(0, '-');
    }
    text
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", format_decimal(n)),
            Value::Text(s) => write!(f, "{}", s),
            Value::Boolean(b) => write!(f, "{}", b),
        }
    }
}

impl From<BigDecimal> for Value {
    fn from(value: BigDecimal) -> Self {
        Value::Number(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(BigDecimal::from(value))
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(BigDecimal::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Number(BigDecimal::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}
