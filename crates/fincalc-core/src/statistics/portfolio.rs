use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::FinCalcError;
use crate::math::{checked_add, checked_div, checked_mul, checked_sub, checked_sum, sqrt};
use crate::types::Rate;
use crate::FinCalcResult;

/// Two-asset portfolio: weights, volatilities and their correlation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwoAssetInput {
    pub weight_1: Decimal,
    pub weight_2: Decimal,
    pub std_dev_1: Rate,
    pub std_dev_2: Rate,
    pub correlation: Decimal,
}

/// `sqrt(w1^2 s1^2 + w2^2 s2^2 + 2 w1 w2 s1 s2 rho)`.
pub fn two_asset_std_dev(input: &TwoAssetInput) -> FinCalcResult<Rate> {
    if input.correlation < -Decimal::ONE || input.correlation > Decimal::ONE {
        return Err(FinCalcError::invalid(
            "correlation",
            "Correlation must lie in [-1, 1].",
        ));
    }
    if input.std_dev_1 < Decimal::ZERO || input.std_dev_2 < Decimal::ZERO {
        return Err(FinCalcError::invalid(
            "std_dev",
            "Standard deviations must be non-negative.",
        ));
    }

    let ctx = "two-asset variance";
    let a = checked_mul(input.weight_1, input.std_dev_1, ctx)?;
    let b = checked_mul(input.weight_2, input.std_dev_2, ctx)?;
    let cross = checked_mul(checked_mul(dec!(2) * input.correlation, a, ctx)?, b, ctx)?;
    let var = checked_add(
        checked_add(checked_mul(a, a, ctx)?, checked_mul(b, b, ctx)?, ctx)?,
        cross,
        ctx,
    )?;
    // Perfect negative correlation can leave a tiny negative from rounding
    sqrt(var.max(Decimal::ZERO))
}

/// `(Rp - Rf) / sigma_p`.
pub fn sharpe_ratio(portfolio_return: Rate, risk_free_rate: Rate, std_dev: Rate) -> FinCalcResult<Decimal> {
    checked_div(
        checked_sub(portfolio_return, risk_free_rate, "Sharpe ratio")?,
        std_dev,
        "Sharpe ratio: portfolio standard deviation",
    )
}

/// Weighted return `sum(w_i * r_i)`.
pub fn portfolio_return(weights: &[Decimal], returns: &[Rate]) -> FinCalcResult<Rate> {
    if weights.len() != returns.len() {
        return Err(FinCalcError::InvalidInput {
            field: "weights".into(),
            reason: format!(
                "{} weights supplied for {} returns",
                weights.len(),
                returns.len()
            ),
        });
    }
    if weights.is_empty() {
        return Err(FinCalcError::InsufficientData(
            "portfolio return requires at least 1 asset".into(),
        ));
    }
    let contributions = weights
        .iter()
        .zip(returns)
        .map(|(w, r)| checked_mul(*w, *r, "portfolio return"))
        .collect::<FinCalcResult<Vec<_>>>()?;
    checked_sum(contributions, "portfolio return")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sixty_forty() -> TwoAssetInput {
        TwoAssetInput {
            weight_1: dec!(0.6),
            weight_2: dec!(0.4),
            std_dev_1: dec!(0.2),
            std_dev_2: dec!(0.1),
            correlation: dec!(0.3),
        }
    }

    #[test]
    fn test_two_asset_std_dev() {
        let sd = two_asset_std_dev(&sixty_forty()).unwrap();
        assert!((sd - dec!(0.1374045)).abs() < dec!(0.000001), "got {sd}");
    }

    #[test]
    fn test_perfect_correlation_is_weighted_average() {
        let sd = two_asset_std_dev(&TwoAssetInput {
            correlation: Decimal::ONE,
            ..sixty_forty()
        })
        .unwrap();
        assert!((sd - dec!(0.16)).abs() < dec!(0.0000000001), "got {sd}");
    }

    #[test]
    fn test_diversification_lowers_risk() {
        let hedged = two_asset_std_dev(&TwoAssetInput {
            correlation: dec!(-0.5),
            ..sixty_forty()
        })
        .unwrap();
        let base = two_asset_std_dev(&sixty_forty()).unwrap();
        assert!(hedged < base);
    }

    #[test]
    fn test_correlation_out_of_range() {
        let err = two_asset_std_dev(&TwoAssetInput {
            correlation: dec!(1.5),
            ..sixty_forty()
        })
        .unwrap_err();
        assert!(matches!(err, FinCalcError::InvalidInput { .. }));
    }

    #[test]
    fn test_sharpe_ratio() {
        assert_eq!(
            sharpe_ratio(dec!(0.12), dec!(0.02), dec!(0.2)).unwrap(),
            dec!(0.5)
        );
        assert!(matches!(
            sharpe_ratio(dec!(0.12), dec!(0.02), Decimal::ZERO),
            Err(FinCalcError::DivisionByZero { .. })
        ));
    }

    #[test]
    fn test_portfolio_return() {
        let r = portfolio_return(&[dec!(0.5), dec!(0.3), dec!(0.2)], &[dec!(0.1), dec!(0.05), dec!(-0.02)])
            .unwrap();
        assert_eq!(r, dec!(0.061));
    }

    #[test]
    fn test_portfolio_return_shape_errors() {
        assert!(matches!(
            portfolio_return(&[dec!(1)], &[dec!(0.1), dec!(0.2)]),
            Err(FinCalcError::InvalidInput { .. })
        ));
        assert!(matches!(
            portfolio_return(&[], &[]),
            Err(FinCalcError::InsufficientData(_))
        ));
    }
}
