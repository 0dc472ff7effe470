use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::ast::{BinaryOp, Expr, LogicalOp, UnaryOp, Visitor};
use crate::environment::{Environment, Symbol};
use crate::error::{ErrorKind, EvalError, Span};
use crate::value::{
    decimal_from_f64, ensure_in_range, format_decimal, Value, MAX_DIGITS, MAX_SCALE,
};

/// Tree-walking interpreter over a borrowed, read-only environment.
pub struct Evaluator<'env> {
    environment: &'env Environment,
}

impl<'env> Evaluator<'env> {
    pub fn new(environment: &'env Environment) -> Self {
        Self { environment }
    }

    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        expr.accept(self)
    }

    fn evaluate_binary_op(
        &self,
        operator: BinaryOp,
        left: Value,
        right: Value,
        span: &Span,
    ) -> Result<Value, EvalError> {
        let unsupported = |left: &Value, right: &Value| {
            EvalError::at(
                ErrorKind::UnsupportedOperation {
                    op: operator.symbol(),
                    left: left.data_type(),
                    right: right.data_type(),
                },
                *span,
            )
        };
        let number = |result: BigDecimal| {
            ensure_in_range(result, operator.symbol())
                .map(Value::Number)
                .map_err(|e| e.or_span(*span))
        };

        match operator {
            BinaryOp::Add => match (left, right) {
                (Value::Number(l), Value::Number(r)) => number(l + r),
                (Value::Text(l), Value::Text(r)) => Ok(Value::Text(l + &r)),
                (Value::Text(l), Value::Number(r)) => Ok(Value::Text(l + &format_decimal(&r))),
                (Value::Number(l), Value::Text(r)) => Ok(Value::Text(format_decimal(&l) + &r)),
                (l, r) => Err(unsupported(&l, &r)),
            },
            BinaryOp::Subtract => match (left, right) {
                (Value::Number(l), Value::Number(r)) => number(l - r),
                (l, r) => Err(unsupported(&l, &r)),
            },
            BinaryOp::Multiply => match (left, right) {
                (Value::Number(l), Value::Number(r)) => number(l * r),
                (l, r) => Err(unsupported(&l, &r)),
            },
            BinaryOp::Divide => match (left, right) {
                (Value::Number(l), Value::Number(r)) => {
                    if r.is_zero() {
                        return Err(EvalError::at(ErrorKind::DivisionByZero, *span));
                    }
                    number(l / r)
                }
                (l, r) => Err(unsupported(&l, &r)),
            },
            BinaryOp::Modulo => match (left, right) {
                (Value::Number(l), Value::Number(r)) => {
                    if r.is_zero() {
                        return Err(EvalError::at(ErrorKind::DivisionByZero, *span));
                    }
                    number(l % r)
                }
                (l, r) => Err(unsupported(&l, &r)),
            },
            BinaryOp::Power => match (left, right) {
                (Value::Number(l), Value::Number(r)) => power(&l, &r)
                    .map(Value::Number)
                    .map_err(|e| e.or_span(*span)),
                (l, r) => Err(unsupported(&l, &r)),
            },
            BinaryOp::Equal | BinaryOp::NotEqual => {
                let equal = match (&left, &right) {
                    (Value::Number(l), Value::Number(r)) => l == r,
                    (Value::Text(l), Value::Text(r)) => l == r,
                    (Value::Boolean(l), Value::Boolean(r)) => l == r,
                    _ => return Err(unsupported(&left, &right)),
                };
                Ok(Value::Boolean(equal == (operator == BinaryOp::Equal)))
            }
            BinaryOp::Greater | BinaryOp::GreaterEqual | BinaryOp::Less | BinaryOp::LessEqual => {
                let (l, r) = match (&left, &right) {
                    (Value::Number(l), Value::Number(r)) => (l, r),
                    _ => return Err(unsupported(&left, &right)),
                };
                let result = match operator {
                    BinaryOp::Greater => l > r,
                    BinaryOp::GreaterEqual => l >= r,
                    BinaryOp::Less => l < r,
                    _ => l <= r,
                };
                Ok(Value::Boolean(result))
            }
        }
    }
}

/// `base ^ exponent`.
///
/// Integer exponents are exact whenever the result fits the supported
/// number range. Other exponents are computed in `f64`.
pub fn power(base: &BigDecimal, exponent: &BigDecimal) -> Result<BigDecimal, EvalError> {
    if base.is_zero() && exponent.is_negative() {
        return Err(EvalError::new(ErrorKind::DivisionByZero));
    }

    if exponent.is_integer() {
        return integer_power(base, exponent);
    }

    let result = match (base.to_f64(), exponent.to_f64()) {
        (Some(b), Some(e)) => b.powf(e),
        _ => f64::NAN,
    };
    let result = decimal_from_f64(result).ok_or_else(|| {
        EvalError::domain(
            "^",
            format!(
                "{} ^ {} has no finite real result",
                format_decimal(base),
                format_decimal(exponent)
            ),
        )
    })?;
    ensure_in_range(result, "^")
}

fn integer_power(base: &BigDecimal, exponent: &BigDecimal) -> Result<BigDecimal, EvalError> {
    if exponent.is_zero() {
        return Ok(BigDecimal::one());
    }
    if base.is_zero() {
        return Ok(BigDecimal::zero());
    }
    if base.abs().is_one() {
        let odd = !(exponent % &BigDecimal::from(2)).is_zero();
        return Ok(if base.is_negative() && odd {
            -BigDecimal::one()
        } else {
            BigDecimal::one()
        });
    }

    let n = exponent
        .to_i64()
        .ok_or_else(|| EvalError::out_of_range("^"))?;
    let base = base.normalized();
    let magnitude = n.unsigned_abs();

    // A normalized base has no trailing zeros, so neither do its powers and
    // the result scale is exactly `scale * n`.
    let (digits, scale) = base.as_bigint_and_exponent();
    let estimated_digits = log10_magnitude(&digits) * magnitude as f64 + 1.0;
    let result_scale = i64::try_from(magnitude)
        .ok()
        .and_then(|m| scale.checked_mul(m))
        .filter(|s| s.abs() <= MAX_SCALE);
    if result_scale.is_none() || estimated_digits > MAX_DIGITS as f64 {
        return Err(EvalError::out_of_range("^"));
    }

    let result = exact_power(&base, magnitude);
    if n < 0 {
        ensure_in_range(BigDecimal::one() / result, "^")
    } else {
        Ok(result)
    }
}

/// `log10(|n|)`, falling back to the bit length for integers past `f64`.
fn log10_magnitude(n: &BigInt) -> f64 {
    match n.magnitude().to_f64() {
        Some(value) if value.is_finite() => value.log10(),
        _ => n.bits() as f64 * std::f64::consts::LOG10_2,
    }
}

fn exact_power(base: &BigDecimal, mut exponent: u64) -> BigDecimal {
    let mut result = BigDecimal::one();
    let mut square = base.clone();
    while exponent > 0 {
        if exponent & 1 == 1 {
            result = &result * &square;
        }
        exponent >>= 1;
        if exponent > 0 {
            square = &square * &square;
        }
    }
    result
}

impl Visitor for Evaluator<'_> {
    type Output = Result<Value, EvalError>;

    fn visit_binary(
        &mut self,
        left: &Expr,
        operator: BinaryOp,
        right: &Expr,
        span: &Span,
    ) -> Self::Output {
        let left_val = self.evaluate(left)?;
        let right_val = self.evaluate(right)?;
        self.evaluate_binary_op(operator, left_val, right_val, span)
    }

    fn visit_group(&mut self, inner: &Expr, _: &Span) -> Self::Output {
        self.evaluate(inner)
    }

    fn visit_literal(&mut self, value: &Value, _: &Span) -> Self::Output {
        Ok(value.clone())
    }

    fn visit_unary(&mut self, operator: UnaryOp, right: &Expr, span: &Span) -> Self::Output {
        let operand = self.evaluate(right)?;
        match operator {
            UnaryOp::Not => Ok(Value::Boolean(!operand.is_truthy())),
            UnaryOp::Plus => Ok(operand),
            UnaryOp::Negate => match operand {
                Value::Number(n) => Ok(Value::Number(-n)),
                other => Err(EvalError::at(
                    ErrorKind::UnsupportedUnaryOperation {
                        op: operator.symbol(),
                        operand: other.data_type(),
                    },
                    *span,
                )),
            },
        }
    }

    fn visit_variable(&mut self, name: &str, span: &Span) -> Self::Output {
        match self.environment.get(name) {
            Some(Symbol::Variable(value)) => Ok(value.clone()),
            Some(Symbol::Function(_)) => Err(EvalError::at(
                ErrorKind::NotAVariable {
                    name: name.to_string(),
                },
                *span,
            )
            .with_help(format!("'{}' is a function; call it as {}(...)", name, name))),
            None => Err(EvalError::at(
                ErrorKind::UnknownVariable {
                    name: name.to_string(),
                },
                *span,
            )),
        }
    }

    fn visit_function_call(&mut self, name: &str, args: &[Expr], span: &Span) -> Self::Output {
        let environment = self.environment;
        let function = match environment.get(name) {
            Some(Symbol::Function(function)) => function,
            Some(Symbol::Variable(_)) => {
                return Err(EvalError::at(
                    ErrorKind::NotAFunction {
                        name: name.to_string(),
                    },
                    *span,
                ))
            }
            None => {
                return Err(EvalError::at(
                    ErrorKind::UnknownFunction {
                        name: name.to_string(),
                    },
                    *span,
                ))
            }
        };

        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.evaluate(arg)?);
        }

        let result = function.call(&values).map_err(|error| {
            let error = match error.kind {
                ErrorKind::ArityMismatch { .. } | ErrorKind::TypeMismatch { .. }
                    if error.help.is_none() =>
                {
                    error.with_help(format!("signature: {}", function.signature()))
                }
                _ => error,
            };
            error.or_span(*span)
        })?;

        match result {
            Value::Number(number) => ensure_in_range(number, &format!("{}()", name))
                .map(Value::Number)
                .map_err(|e| e.or_span(*span)),
            other => Ok(other),
        }
    }

    fn visit_ternary(
        &mut self,
        condition: &Expr,
        when_true: &Expr,
        when_false: &Expr,
        _: &Span,
    ) -> Self::Output {
        if self.evaluate(condition)?.is_truthy() {
            self.evaluate(when_true)
        } else {
            self.evaluate(when_false)
        }
    }

    fn visit_logical(
        &mut self,
        left: &Expr,
        operator: LogicalOp,
        right: &Expr,
        _: &Span,
    ) -> Self::Output {
        let left_truthy = self.evaluate(left)?.is_truthy();
        let result = match operator {
            LogicalOp::Or if left_truthy => true,
            LogicalOp::And if !left_truthy => false,
            _ => self.evaluate(right)?.is_truthy(),
        };
        Ok(Value::Boolean(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(text: &str) -> BigDecimal {
        BigDecimal::from_str(text).unwrap()
    }

    fn pow(base: &str, exponent: &str) -> Result<String, ErrorKind> {
        power(&dec(base), &dec(exponent))
            .map(|n| format_decimal(&n))
            .map_err(|e| e.kind)
    }

    #[test]
    fn integer_powers_are_exact() {
        assert_eq!(pow("2", "10"), Ok("1024".to_string()));
        assert_eq!(pow("1.1", "2"), Ok("1.21".to_string()));
        assert_eq!(pow("-3", "3"), Ok("-27".to_string()));
        assert_eq!(pow("7", "0"), Ok("1".to_string()));
        assert_eq!(pow("2", "-2"), Ok("0.25".to_string()));
        assert_eq!(pow("10", "4096"), Ok(format!("1{}", "0".repeat(4096))));
    }

    #[test]
    fn large_integer_exponents_stay_exact() {
        let big = pow("2", "4097").unwrap();
        assert_eq!(big.len(), 1234);
        assert!(big.starts_with("2088"));
        assert!(big.ends_with('2'));

        let compound = pow("1.0001", "5000").unwrap();
        assert_eq!(compound.len(), 20002);
        assert!(compound.starts_with("1.6486"));
        assert!(compound.ends_with('1'));

        assert_eq!(pow("-1", "1e30"), Ok("1".to_string()));
        assert_eq!(pow("-1", "1000001"), Ok("-1".to_string()));
        assert_eq!(pow("1", "-1e30"), Ok("1".to_string()));
    }

    #[test]
    fn oversized_powers_are_out_of_range() {
        let out_of_range = Err(ErrorKind::NumberOutOfRange {
            operation: "^".to_string(),
        });
        assert_eq!(pow("10", "1000000"), out_of_range);
        assert_eq!(pow("3", "1000000"), out_of_range);
        assert_eq!(pow("0.1", "1000000"), out_of_range);
        assert_eq!(pow("2", "1e30"), out_of_range);
    }

    #[test]
    fn fractional_powers_go_through_floats() {
        assert_eq!(pow("4", "0.5"), Ok("2".to_string()));
        assert_eq!(pow("2", "0.5e0").map(|s| s.starts_with("1.414")), Ok(true));
        assert!(matches!(pow("-8", "0.5"), Err(ErrorKind::DomainError { .. })));
        assert!(matches!(pow("10", "400.5"), Err(ErrorKind::DomainError { .. })));
    }

    #[test]
    fn zero_to_a_negative_power_divides_by_zero() {
        assert_eq!(pow("0", "-1"), Err(ErrorKind::DivisionByZero));
        assert_eq!(pow("0", "-0.5"), Err(ErrorKind::DivisionByZero));
        assert_eq!(pow("0", "3"), Ok("0".to_string()));
    }
}
