//! Decimal arithmetic substrate.
//!
//! Every compounding and discounting step in the crate runs through these
//! helpers so that overflow, division by zero and logarithms of non-positive
//! numbers surface as [`FinCalcError`] values instead of panics or silent
//! `NaN`-like results. `f64` only appears at the boundary helpers
//! [`from_f64`] and [`to_f64`].

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::FinCalcError;
use crate::FinCalcResult;

const LN_2: Decimal = dec!(0.6931471805599453094172321215);

/// Division that reports a zero denominator with the caller's context.
pub fn checked_div(numerator: Decimal, denominator: Decimal, context: &str) -> FinCalcResult<Decimal> {
    if denominator.is_zero() {
        return Err(FinCalcError::DivisionByZero {
            context: context.to_string(),
        });
    }
    numerator
        .checked_div(denominator)
        .ok_or_else(|| overflow(context))
}

pub fn checked_mul(a: Decimal, b: Decimal, context: &str) -> FinCalcResult<Decimal> {
    a.checked_mul(b).ok_or_else(|| overflow(context))
}

pub fn checked_add(a: Decimal, b: Decimal, context: &str) -> FinCalcResult<Decimal> {
    a.checked_add(b).ok_or_else(|| overflow(context))
}

pub fn checked_sub(a: Decimal, b: Decimal, context: &str) -> FinCalcResult<Decimal> {
    a.checked_sub(b).ok_or_else(|| overflow(context))
}

/// Sum that reports overflow instead of panicking like `Iterator::sum`.
pub fn checked_sum<I>(values: I, context: &str) -> FinCalcResult<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| checked_add(acc, v, context))
}

/// `base^n` for a whole number of periods, by repeated squaring.
pub fn pow_int(base: Decimal, n: u64) -> FinCalcResult<Decimal> {
    let mut result = Decimal::ONE;
    let mut factor = base;
    let mut remaining = n;

    while remaining > 0 {
        if remaining & 1 == 1 {
            result = checked_mul(result, factor, "compounding factor")?;
        }
        remaining >>= 1;
        if remaining > 0 {
            factor = checked_mul(factor, factor, "compounding factor")?;
        }
    }

    Ok(result)
}

/// `base^exponent` for any real exponent.
///
/// Whole exponents go through [`pow_int`] (and its reciprocal for negative
/// exponents); fractional exponents use `exp(exponent * ln(base))`, which
/// requires a positive base.
pub fn pow_frac(base: Decimal, exponent: Decimal) -> FinCalcResult<Decimal> {
    if exponent.fract().is_zero() {
        if let Some(n) = exponent.abs().to_u64() {
            let value = pow_int(base, n)?;
            return if exponent.is_sign_negative() && !exponent.is_zero() {
                checked_div(Decimal::ONE, value, "negative power")
            } else {
                Ok(value)
            };
        }
    }

    if base <= Decimal::ZERO {
        return Err(FinCalcError::DomainError(format!(
            "cannot raise non-positive base {base} to fractional power {exponent}"
        )));
    }
    exp(checked_mul(exponent, ln(base)?, "fractional power")?)
}

/// Natural logarithm; undefined for `x <= 0`.
///
/// Range-reduces `x = m * 2^k` with `m` in `[0.5, 1)`, then sums the
/// `atanh` series `ln(m) = 2 * sum z^(2i+1) / (2i+1)` with `z = (m-1)/(m+1)`.
pub fn ln(x: Decimal) -> FinCalcResult<Decimal> {
    if x <= Decimal::ZERO {
        return Err(FinCalcError::DomainError(format!(
            "logarithm of non-positive value {x}"
        )));
    }
    if x == Decimal::ONE {
        return Ok(Decimal::ZERO);
    }

    let two = dec!(2);
    let mut m = x;
    let mut k: i64 = 0;
    while m >= Decimal::ONE {
        m /= two;
        k += 1;
    }
    while m < dec!(0.5) {
        m *= two;
        k -= 1;
    }

    let z = (m - Decimal::ONE) / (m + Decimal::ONE);
    let z_sq = z * z;
    let mut power = z;
    let mut series = Decimal::ZERO;
    for i in 0..60u32 {
        let term = power / Decimal::from(2 * i + 1);
        if term.is_zero() {
            break;
        }
        series += term;
        power *= z_sq;
    }

    Ok(Decimal::from(k) * LN_2 + two * series)
}

/// `e^x` by halving into `|x| <= 0.5`, a Taylor series, then squaring back.
/// Large negative arguments underflow to zero.
pub fn exp(x: Decimal) -> FinCalcResult<Decimal> {
    if x.is_zero() {
        return Ok(Decimal::ONE);
    }
    if x.is_sign_negative() {
        return match exp(-x) {
            Ok(denominator) => checked_div(Decimal::ONE, denominator, "exp"),
            Err(_) => Ok(Decimal::ZERO),
        };
    }
    if x > dec!(66) {
        return Err(overflow("exp"));
    }

    let mut reduced = x;
    let mut halvings = 0u32;
    while reduced > dec!(0.5) {
        reduced /= dec!(2);
        halvings += 1;
    }

    let mut sum = Decimal::ONE;
    let mut term = Decimal::ONE;
    for n in 1u32..=40 {
        term = term * reduced / Decimal::from(n);
        if term.is_zero() {
            break;
        }
        sum += term;
    }

    for _ in 0..halvings {
        sum = checked_mul(sum, sum, "exp")?;
    }
    Ok(sum)
}

pub fn sqrt(x: Decimal) -> FinCalcResult<Decimal> {
    if x.is_sign_negative() && !x.is_zero() {
        return Err(FinCalcError::DomainError(format!(
            "square root of negative value {x}"
        )));
    }
    x.sqrt()
        .ok_or_else(|| FinCalcError::DomainError(format!("square root of {x} failed")))
}

/// Standard normal probability density. Zero beyond `|x| > 40`.
pub fn norm_pdf(x: Decimal) -> FinCalcResult<Decimal> {
    // 1 / sqrt(2 * pi)
    let inv_sqrt_2pi = dec!(0.3989422804014326779399460599);
    if x.abs() > dec!(40) {
        return Ok(Decimal::ZERO);
    }
    Ok(inv_sqrt_2pi * exp(-(x * x) / dec!(2))?)
}

/// Standard normal CDF, Abramowitz & Stegun 26.2.17 (|error| < 7.5e-8).
pub fn norm_cdf(x: Decimal) -> FinCalcResult<Decimal> {
    let b1 = dec!(0.319381530);
    let b2 = dec!(-0.356563782);
    let b3 = dec!(1.781477937);
    let b4 = dec!(-1.821255978);
    let b5 = dec!(1.330274429);
    let p = dec!(0.2316419);

    let abs_x = x.abs();
    if abs_x > dec!(40) {
        return Ok(if x.is_sign_negative() { Decimal::ZERO } else { Decimal::ONE });
    }
    let t = Decimal::ONE / (Decimal::ONE + p * abs_x);
    let poly = t * (b1 + t * (b2 + t * (b3 + t * (b4 + t * b5))));
    let upper = Decimal::ONE - norm_pdf(abs_x)? * poly;

    Ok(if x.is_sign_negative() {
        Decimal::ONE - upper
    } else {
        upper
    })
}

/// Convert a boundary `f64` into a Decimal, rejecting NaN and infinities.
pub fn from_f64(field: &str, value: f64) -> FinCalcResult<Decimal> {
    if !value.is_finite() {
        return Err(FinCalcError::invalid(field, "must be a finite number"));
    }
    Decimal::from_f64(value)
        .ok_or_else(|| FinCalcError::invalid(field, "is outside the representable decimal range"))
}

pub fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

fn overflow(context: &str) -> FinCalcError {
    FinCalcError::DomainError(format!("{context} overflowed the decimal range"))
}
