use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::FinCalcError;
use crate::math::{checked_add, checked_div, checked_mul, exp, ln, norm_cdf, norm_pdf, sqrt};
use crate::types::*;
use crate::FinCalcResult;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlackScholesInput {
    pub stock_price: Money,
    pub strike_price: Money,
    /// Time to expiry in years
    pub time: Years,
    pub risk_free_rate: Rate,
    pub volatility: Rate,
    /// Continuous dividend yield
    #[serde(default)]
    pub dividend_yield: Rate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlackScholesOutput {
    pub call_price: Money,
    pub put_price: Money,
    pub d1: Decimal,
    pub d2: Decimal,
    pub call_greeks: OptionGreeks,
    pub put_greeks: OptionGreeks,
}

/// Sensitivities per unit change: vega and rho per 1.00 of volatility or
/// rate, theta per year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionGreeks {
    pub delta: Decimal,
    pub gamma: Decimal,
    pub vega: Decimal,
    pub theta: Decimal,
    pub rho: Decimal,
}

// ---------------------------------------------------------------------------
// Pricing
// ---------------------------------------------------------------------------

/// European option prices under Black-Scholes-Merton.
///
/// `call = S e^(-qT) N(d1) - K e^(-rT) N(d2)`, the put follows from
/// put-call parity, and
/// `d1 = [ln(S/K) + (r - q + sigma^2/2) T] / (sigma sqrt(T))`, `d2 = d1 - sigma sqrt(T)`.
pub fn black_scholes(input: &BlackScholesInput) -> FinCalcResult<BlackScholesOutput> {
    validate_input(input)?;

    let s = input.stock_price;
    let k = input.strike_price;
    let t = input.time;
    let r = input.risk_free_rate;
    let q = input.dividend_yield;
    let sigma = input.volatility;

    let mul = |a: Decimal, b: Decimal| checked_mul(a, b, "Black-Scholes");

    let sqrt_t = sqrt(t)?;
    let sigma_sqrt_t = mul(sigma, sqrt_t)?;
    let moneyness = ln(checked_div(s, k, "Black-Scholes: S / K")?)?;
    let drift = mul(r - q + mul(sigma, sigma)? / dec!(2), t)?;
    let d1 = checked_div(
        checked_add(moneyness, drift, "Black-Scholes: d1")?,
        sigma_sqrt_t,
        "Black-Scholes: d1",
    )?;
    let d2 = d1 - sigma_sqrt_t;

    let disc_q = exp(-mul(q, t)?)?;
    let disc_r = exp(-mul(r, t)?)?;
    let nd1 = norm_cdf(d1)?;
    let nd2 = norm_cdf(d2)?;
    let pdf_d1 = norm_pdf(d1)?;

    // Discounted spot and strike
    let spot = s * disc_q;
    let strike = k * disc_r;

    let call_price = spot * nd1 - strike * nd2;
    let put_price = call_price - spot + strike;

    // Shared by both legs
    let gamma = checked_div(disc_q * pdf_d1, mul(s, sigma_sqrt_t)?, "Black-Scholes: gamma")?;
    let vega = mul(spot * pdf_d1, sqrt_t)?;
    let theta_decay = -checked_div(
        mul(spot * pdf_d1, sigma)?,
        dec!(2) * sqrt_t,
        "Black-Scholes: theta",
    )?;

    let call_greeks = OptionGreeks {
        delta: disc_q * nd1,
        gamma,
        vega,
        theta: theta_decay - mul(r, strike * nd2)? + mul(q, spot * nd1)?,
        rho: mul(t, strike * nd2)?,
    };

    let n_minus_d1 = Decimal::ONE - nd1;
    let n_minus_d2 = Decimal::ONE - nd2;
    let put_greeks = OptionGreeks {
        delta: -disc_q * n_minus_d1,
        gamma,
        vega,
        theta: theta_decay + mul(r, strike * n_minus_d2)? - mul(q, spot * n_minus_d1)?,
        rho: -mul(t, strike * n_minus_d2)?,
    };

    Ok(BlackScholesOutput {
        call_price,
        put_price,
        d1,
        d2,
        call_greeks,
        put_greeks,
    })
}

fn validate_input(input: &BlackScholesInput) -> FinCalcResult<()> {
    let positive = [
        ("stock_price", input.stock_price),
        ("strike_price", input.strike_price),
        ("time", input.time),
        ("volatility", input.volatility),
    ];
    for (field, value) in positive {
        if value <= Decimal::ZERO {
            return Err(FinCalcError::invalid(field, "must be positive"));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
