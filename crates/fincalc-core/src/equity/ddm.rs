//! Constant-growth (Gordon) dividend discount model.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::FinCalcError;
use crate::math::{checked_div, checked_mul, checked_sub};
use crate::types::{Money, Rate};
use crate::FinCalcResult;

/// Either next year's dividend (`next_dividend`) or the one just paid
/// (`current_dividend`) must be given; the former wins when both are.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GordonGrowthInput {
    #[serde(default)]
    pub next_dividend: Option<Money>,
    #[serde(default)]
    pub current_dividend: Option<Money>,
    pub required_return: Rate,
    pub growth_rate: Rate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GordonGrowthOutput {
    pub value: Money,
    /// The D1 actually discounted
    pub next_dividend: Money,
}

/// Value = D1 / (k - g). Requires `g < k`.
pub fn gordon_growth(input: &GordonGrowthInput) -> FinCalcResult<GordonGrowthOutput> {
    let k = input.required_return;
    let g = input.growth_rate;
    if g >= k {
        return Err(FinCalcError::DomainError(format!(
            "Gordon growth: growth rate ({g}) must be below required return ({k})"
        )));
    }

    let next_dividend = match (input.next_dividend, input.current_dividend) {
        (Some(d1), _) => d1,
        (None, Some(d0)) => checked_mul(d0, Decimal::ONE + g, "Gordon growth: next dividend")?,
        (None, None) => {
            return Err(FinCalcError::MissingInput {
                field: "next_dividend".into(),
            })
        }
    };

    Ok(GordonGrowthOutput {
        value: checked_div(next_dividend, checked_sub(k, g, "Gordon growth")?, "Gordon growth: k - g")?,
        next_dividend,
    })
}
