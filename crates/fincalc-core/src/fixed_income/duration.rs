use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::FinCalcError;
use crate::fixed_income::bonds::{cash_flows, discounted_flows, BondInput};
use crate::math::{checked_add, checked_div, checked_mul, checked_sum};
use crate::types::Rate;
use crate::FinCalcResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Output of the duration calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurationOutput {
    /// Weighted-average time of cash flows (in years)
    pub macaulay_duration: Decimal,
    /// Macaulay duration / (1 + y/freq) -- percentage price sensitivity
    pub modified_duration: Decimal,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Macaulay and modified duration of a bullet bond.
///
/// Each cash flow's present value weights the time (in years) at which it
/// is paid; modified duration divides by one plus the periodic yield.
pub fn duration(input: &BondInput) -> FinCalcResult<DurationOutput> {
    let flows = cash_flows(input)?;
    let periodic_yield = periodic_yield(input);
    let pvs = discounted_flows(&flows, periodic_yield)?;
    let price = checked_sum(pvs.iter().copied(), "Macaulay duration")?;
    if price.is_zero() {
        return Err(FinCalcError::DivisionByZero {
            context: "Macaulay duration: bond price is zero".to_string(),
        });
    }

    let weighted = flows
        .iter()
        .zip(&pvs)
        .map(|(cf, pv)| checked_mul(cf.time_years, *pv, "Macaulay duration"))
        .collect::<FinCalcResult<Vec<_>>>()?;
    let weighted_sum = checked_sum(weighted, "Macaulay duration")?;

    let macaulay_duration = checked_div(weighted_sum, price, "Macaulay duration: bond price")?;
    let modified_duration = macaulay_duration / (Decimal::ONE + periodic_yield);

    Ok(DurationOutput {
        macaulay_duration,
        modified_duration,
    })
}

/// Convexity: `sum[PV(CF_t) * t * (t + 1)] / (P * f^2)`, with `t` counted
/// in coupon periods.
pub fn convexity(input: &BondInput) -> FinCalcResult<Decimal> {
    let flows = cash_flows(input)?;
    let pvs = discounted_flows(&flows, periodic_yield(input))?;
    let price = checked_sum(pvs.iter().copied(), "convexity")?;

    let terms = flows
        .iter()
        .zip(&pvs)
        .map(|(cf, pv)| {
            let t = Decimal::from(cf.period);
            checked_mul(*pv, t * (t + Decimal::ONE), "convexity")
        })
        .collect::<FinCalcResult<Vec<_>>>()?;
    let numerator = checked_sum(terms, "convexity")?;

    let freq = Decimal::from(input.frequency);
    let denominator = checked_mul(price, freq * freq, "convexity")?;

    checked_div(numerator, denominator, "convexity: denominator is zero")
}

/// Estimated relative price change for a yield move of `yield_change`:
/// `-D_mod * dy + 0.5 * C * dy^2`.
pub fn price_change_estimate(
    modified_duration: Decimal,
    convexity: Decimal,
    yield_change: Rate,
) -> FinCalcResult<Decimal> {
    let ctx = "price change estimate";
    let duration_term = checked_mul(-modified_duration, yield_change, ctx)?;
    let dy_sq = checked_mul(yield_change, yield_change, ctx)?;
    let convexity_term = checked_mul(dec!(0.5) * convexity, dy_sq, ctx)?;
    checked_add(duration_term, convexity_term, ctx)
}

fn periodic_yield(input: &BondInput) -> Rate {
    input.market_rate / Decimal::from(input.frequency)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
