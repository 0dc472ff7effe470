//! Arbitrary-precision nth root by Newton's method.
//!
//! This is the one place where numbers leave exact decimal arithmetic:
//! iterates are rounded to a fixed working precision, and the result to
//! [`RESULT_DIGITS`] significant digits.

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};

use crate::error::EvalError;

/// Working precision of the iteration, in bits.
pub const WORKING_PRECISION_BITS: u32 = 256;

/// `WORKING_PRECISION_BITS` in decimal digits, rounded up.
const WORKING_DIGITS: u64 = 78;

/// Iteration stops once successive iterates agree to this many digits.
const CONVERGENCE_DIGITS: i64 = 76;

/// Significant digits kept in the returned root.
pub const RESULT_DIGITS: u64 = 64;

const MAX_ITERATIONS: usize = 1000;

/// Real `degree`-th root of `value`.
///
/// Odd roots of negative numbers root the magnitude and restore the sign.
/// Even roots of negative numbers and the zeroth root are domain errors.
pub fn nth_root(value: &BigDecimal, degree: u32) -> Result<BigDecimal, EvalError> {
    if degree == 0 {
        return Err(EvalError::domain("root", "the zeroth root is undefined"));
    }
    if value.is_zero() {
        return Ok(BigDecimal::zero());
    }

    let negative = value.is_negative();
    if negative && degree % 2 == 0 {
        return Err(EvalError::domain(
            "root",
            format!("root of degree {} of a negative number is not real", degree),
        ));
    }
    if degree == 1 {
        return Ok(value.normalized());
    }

    let magnitude = value.abs();
    let n = BigDecimal::from(degree);
    let n_minus_one = BigDecimal::from(degree - 1);
    let bound = power_of_ten(CONVERGENCE_DIGITS);

    let mut x = initial_guess(&magnitude, degree);
    let mut iterations = 0;
    while iterations < MAX_ITERATIONS {
        iterations += 1;
        // x' = ((n - 1) x + a / x^(n-1)) / n
        let power = pow_rounded(&x, degree - 1);
        let next = ((&n_minus_one * &x) + (&magnitude / &power)) / &n;
        let next = next.with_prec(WORKING_DIGITS);

        let delta = (&next - &x).abs();
        x = next;
        if delta.is_zero() || &delta * &bound < x {
            break;
        }
    }
    tracing::trace!(degree, iterations, "nth root converged");

    let root = x.with_prec(RESULT_DIGITS).normalized();
    Ok(if negative { -root } else { root })
}

/// Largest power of ten not above the root, from the operand's decimal
/// exponent.
fn initial_guess(magnitude: &BigDecimal, degree: u32) -> BigDecimal {
    let (digits, scale) = magnitude.as_bigint_and_exponent();
    let order = digits.to_string().len() as i64 - 1 - scale;
    power_of_ten(order.div_euclid(degree as i64))
}

fn power_of_ten(exponent: i64) -> BigDecimal {
    BigDecimal::new(BigInt::one(), -exponent)
}

fn pow_rounded(x: &BigDecimal, exponent: u32) -> BigDecimal {
    let mut result = BigDecimal::one();
    for _ in 0..exponent {
        result = (&result * x).with_prec(WORKING_DIGITS);
    }
    result
}
