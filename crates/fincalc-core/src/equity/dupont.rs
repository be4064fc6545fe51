use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::math::checked_div;
use crate::types::Money;
use crate::FinCalcResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DupontInput {
    pub net_income: Money,
    pub revenue: Money,
    pub total_assets: Money,
    pub shareholders_equity: Money,
}

/// Three-factor decomposition: ROE = margin x turnover x leverage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DupontOutput {
    pub roe: Decimal,
    /// Net income / revenue
    pub profit_margin: Decimal,
    /// Revenue / total assets
    pub asset_turnover: Decimal,
    /// Total assets / equity
    pub equity_multiplier: Decimal,
}

pub fn dupont(input: &DupontInput) -> FinCalcResult<DupontOutput> {
    let profit_margin = checked_div(input.net_income, input.revenue, "DuPont: revenue")?;
    let asset_turnover = checked_div(input.revenue, input.total_assets, "DuPont: total assets")?;
    let equity_multiplier = checked_div(
        input.total_assets,
        input.shareholders_equity,
        "DuPont: shareholders' equity",
    )?;
    let roe = checked_div(
        input.net_income,
        input.shareholders_equity,
        "DuPont: shareholders' equity",
    )?;

    Ok(DupontOutput {
        roe,
        profit_margin,
        asset_turnover,
        equity_multiplier,
    })
}
