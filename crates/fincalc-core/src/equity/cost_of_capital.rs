use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::FinCalcError;
use crate::math::{checked_add, checked_div, checked_mul, checked_sub};
use crate::types::{Money, Rate};
use crate::FinCalcResult;

/// Input for the Weighted Average Cost of Capital.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaccInput {
    /// Market value of equity
    pub equity_value: Money,
    /// Market value of debt
    pub debt_value: Money,
    pub cost_of_equity: Rate,
    /// Pre-tax cost of debt
    pub cost_of_debt: Rate,
    /// Marginal corporate tax rate
    pub tax_rate: Rate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaccOutput {
    pub wacc: Rate,
    pub equity_weight: Rate,
    pub debt_weight: Rate,
    pub after_tax_cost_of_debt: Rate,
}

/// Capital Asset Pricing Model: `Rf + beta * (Rm - Rf)`.
pub fn capm(risk_free_rate: Rate, beta: Decimal, market_return: Rate) -> FinCalcResult<Rate> {
    let premium = checked_sub(market_return, risk_free_rate, "CAPM")?;
    checked_add(risk_free_rate, checked_mul(beta, premium, "CAPM")?, "CAPM")
}

/// WACC = (E/V) * Re + (D/V) * Rd * (1 - t), with V = E + D.
pub fn wacc(input: &WaccInput) -> FinCalcResult<WaccOutput> {
    if input.equity_value < Decimal::ZERO {
        return Err(FinCalcError::invalid(
            "equity_value",
            "Equity value must be non-negative.",
        ));
    }
    if input.debt_value < Decimal::ZERO {
        return Err(FinCalcError::invalid(
            "debt_value",
            "Debt value must be non-negative.",
        ));
    }

    let total_value = checked_add(input.equity_value, input.debt_value, "WACC: total capital")?;
    let equity_weight = checked_div(input.equity_value, total_value, "WACC: total capital")?;
    let debt_weight = Decimal::ONE - equity_weight;
    let after_tax_cost_of_debt = checked_mul(
        input.cost_of_debt,
        checked_sub(Decimal::ONE, input.tax_rate, "WACC")?,
        "WACC",
    )?;
    let wacc = checked_add(
        checked_mul(equity_weight, input.cost_of_equity, "WACC")?,
        checked_mul(debt_weight, after_tax_cost_of_debt, "WACC")?,
        "WACC",
    )?;

    Ok(WaccOutput {
        wacc,
        equity_weight,
        debt_weight,
        after_tax_cost_of_debt,
    })
}
