//! Bullet bond pricing and yield to maturity.
//!
//! Settlement is assumed to fall on a coupon date (no accrued interest) and
//! periods are whole coupon periods. Price, duration and convexity all walk
//! the same [`cash_flows`] schedule and the same [`discounted_flows`], so the
//! three measures can never disagree about what the bond pays.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::config::SolverConfig;
use crate::error::FinCalcError;
use crate::math::{checked_add, checked_div, checked_mul, checked_sub, checked_sum};
use crate::solver::{bisect, Monotonicity};
use crate::types::{Money, Rate, Years, MAX_SCHEDULE_PERIODS};
use crate::FinCalcResult;

const YTM_INITIAL_GUESS: Decimal = dec!(0.05);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Input parameters for bond pricing, duration and convexity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BondInput {
    /// Par / face value of the bond (e.g. 1000)
    pub face_value: Money,
    /// Annual coupon rate as a decimal (0.05 = 5%)
    pub coupon_rate: Rate,
    /// Annual market yield used for discounting
    pub market_rate: Rate,
    /// Years remaining until maturity
    pub years: Years,
    /// Coupon payments per year
    pub frequency: u32,
}

/// Input for solving the yield that reproduces an observed price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YtmInput {
    pub face_value: Money,
    pub coupon_rate: Rate,
    pub years: Years,
    pub frequency: u32,
    /// Observed market price
    pub price: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YtmOutput {
    /// Annualised yield (periodic yield * frequency)
    pub ytm: Rate,
    pub periodic_yield: Rate,
    pub iterations: u32,
}

/// A single scheduled payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BondCashFlow {
    /// Coupon period index, starting at 1
    pub period: u32,
    pub time_years: Years,
    pub amount: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// The coupon schedule: `face * coupon_rate / frequency` each period, with
/// the face value added to the final payment.
pub fn cash_flows(input: &BondInput) -> FinCalcResult<Vec<BondCashFlow>> {
    validate_bond(input)?;
    schedule(input.face_value, input.coupon_rate, input.years, input.frequency)
}

/// Present value of the coupons and principal at `market_rate / frequency`.
pub fn bond_price(input: &BondInput) -> FinCalcResult<Money> {
    let flows = cash_flows(input)?;
    let periodic_yield = input.market_rate / Decimal::from(input.frequency);
    checked_sum(discounted_flows(&flows, periodic_yield)?, "bond price")
}

/// Current yield: annual coupon over price.
pub fn current_yield(face_value: Money, coupon_rate: Rate, price: Money) -> FinCalcResult<Rate> {
    if price <= Decimal::ZERO {
        return Err(FinCalcError::invalid("price", "Price must be positive."));
    }
    checked_div(checked_mul(face_value, coupon_rate, "current yield")?, price, "current yield")
}

/// Yield to maturity by bisection over the periodic yield.
///
/// Bond price falls as yield rises, so the residual `price(y) - market` is
/// decreasing in `y`.
pub fn yield_to_maturity(input: &YtmInput, config: &SolverConfig) -> FinCalcResult<YtmOutput> {
    validate_terms(input.face_value, input.coupon_rate, input.years, input.frequency)?;
    if input.price <= Decimal::ZERO {
        return Err(FinCalcError::invalid("price", "Market price must be positive."));
    }

    let flows = schedule(input.face_value, input.coupon_rate, input.years, input.frequency)?;
    let residual = |y: Rate| -> FinCalcResult<Decimal> {
        let pv = checked_sum(discounted_flows(&flows, y)?, "YTM price")?;
        checked_sub(pv, input.price, "YTM residual")
    };

    let solved = bisect(
        "YTM",
        residual,
        YTM_INITIAL_GUESS,
        Monotonicity::Decreasing,
        config,
    )?;

    Ok(YtmOutput {
        ytm: solved.root * Decimal::from(input.frequency),
        periodic_yield: solved.root,
        iterations: solved.iterations,
    })
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate_bond(input: &BondInput) -> FinCalcResult<()> {
    validate_terms(input.face_value, input.coupon_rate, input.years, input.frequency)?;
    if input.market_rate < Decimal::ZERO {
        return Err(FinCalcError::invalid(
            "market_rate",
            "Market rate must be non-negative.",
        ));
    }
    Ok(())
}

fn validate_terms(face_value: Money, coupon_rate: Rate, years: Years, frequency: u32) -> FinCalcResult<()> {
    if face_value <= Decimal::ZERO {
        return Err(FinCalcError::invalid("face_value", "Face value must be positive."));
    }
    if coupon_rate < Decimal::ZERO {
        return Err(FinCalcError::invalid(
            "coupon_rate",
            "Coupon rate must be non-negative.",
        ));
    }
    if years <= Decimal::ZERO {
        return Err(FinCalcError::invalid("years", "Years to maturity must be positive."));
    }
    if frequency == 0 {
        return Err(FinCalcError::invalid(
            "frequency",
            "Coupon frequency must be at least 1.",
        ));
    }
    Ok(())
}

/// Build the payment schedule for already-validated terms.
fn schedule(face_value: Money, coupon_rate: Rate, years: Years, frequency: u32) -> FinCalcResult<Vec<BondCashFlow>> {
    let freq = Decimal::from(frequency);
    // Round to the nearest whole period to absorb inputs like 9.9999
    let total_periods = years
        .checked_mul(freq)
        .and_then(|p| p.round().to_u32())
        .unwrap_or(u32::MAX);
    if total_periods == 0 {
        return Err(FinCalcError::invalid(
            "years",
            "Maturity must span at least one coupon period.",
        ));
    }
    if total_periods > MAX_SCHEDULE_PERIODS {
        return Err(FinCalcError::invalid(
            "years",
            &format!("Maturity may not exceed {MAX_SCHEDULE_PERIODS} coupon periods."),
        ));
    }

    let coupon = checked_mul(face_value, coupon_rate, "bond coupon")? / freq;
    let final_payment = checked_add(coupon, face_value, "bond final payment")?;
    Ok((1..=total_periods)
        .map(|t| BondCashFlow {
            period: t,
            time_years: Decimal::from(t) / freq,
            amount: if t == total_periods {
                final_payment
            } else {
                coupon
            },
        })
        .collect())
}

/// Present value of each flow at `periodic_yield`, built from an iterative
/// discount factor rather than repeated powers.
pub(crate) fn discounted_flows(flows: &[BondCashFlow], periodic_yield: Rate) -> FinCalcResult<Vec<Money>> {
    let one_plus_y = Decimal::ONE + periodic_yield;
    if one_plus_y <= Decimal::ZERO {
        return Err(FinCalcError::DomainError(
            "bond pricing: (1 + periodic yield) must be positive".into(),
        ));
    }

    let mut df = Decimal::ONE;
    flows
        .iter()
        .map(|cf| {
            df = checked_mul(df, one_plus_y, "bond discount factor")?;
            checked_div(cf.amount, df, "bond discount factor")
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
