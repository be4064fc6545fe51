//! Moments and dispersion measures over a sample of observations.
//!
//! Every function takes a slice in the order the observations were made.
//! Order is irrelevant for all of them except [`geometric_mean`], which
//! treats the values as a series of periodic returns.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::FinCalcError;
use crate::math::{checked_add, checked_div, checked_mul, checked_sub, checked_sum, exp, ln, sqrt};
use crate::FinCalcResult;

/// Divisor used for variance: `n - 1` (sample) or `n` (population).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarianceKind {
    #[default]
    Sample,
    Population,
}

impl VarianceKind {
    fn min_observations(self) -> usize {
        match self {
            VarianceKind::Sample => 2,
            VarianceKind::Population => 1,
        }
    }
}

/// Bundle of the descriptive measures for display. Measures that need more
/// observations than were supplied (or a non-zero dispersion) are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub count: usize,
    pub mean: Decimal,
    pub median: Decimal,
    pub min: Decimal,
    pub max: Decimal,
    pub population_variance: Decimal,
    pub population_std_dev: Decimal,
    pub sample_variance: Option<Decimal>,
    pub sample_std_dev: Option<Decimal>,
    pub mean_absolute_deviation: Decimal,
    pub coefficient_of_variation: Option<Decimal>,
    pub skewness: Option<Decimal>,
    pub excess_kurtosis: Option<Decimal>,
}

fn require(values: &[Decimal], min: usize, measure: &str) -> FinCalcResult<()> {
    if values.len() < min {
        return Err(FinCalcError::InsufficientData(format!(
            "{measure} requires at least {min} observations, got {}",
            values.len()
        )));
    }
    Ok(())
}

pub fn mean(values: &[Decimal]) -> FinCalcResult<Decimal> {
    require(values, 1, "mean")?;
    let sum = checked_sum(values.iter().copied(), "mean")?;
    Ok(sum / Decimal::from(values.len()))
}

pub fn variance(values: &[Decimal], kind: VarianceKind) -> FinCalcResult<Decimal> {
    require(values, kind.min_observations(), "variance")?;
    let m = mean(values)?;
    let mut sum_sq = Decimal::ZERO;
    for x in values {
        let dev = checked_sub(*x, m, "variance")?;
        sum_sq = checked_add(sum_sq, checked_mul(dev, dev, "variance")?, "variance")?;
    }
    let divisor = match kind {
        VarianceKind::Sample => values.len() - 1,
        VarianceKind::Population => values.len(),
    };
    Ok(sum_sq / Decimal::from(divisor))
}

pub fn std_dev(values: &[Decimal], kind: VarianceKind) -> FinCalcResult<Decimal> {
    sqrt(variance(values, kind)?)
}

/// Compound average return `[prod(1 + r_i)]^(1/n) - 1`, evaluated through
/// logarithms so long series cannot overflow the product.
pub fn geometric_mean(returns: &[Decimal]) -> FinCalcResult<Decimal> {
    require(returns, 1, "geometric mean")?;
    let mut log_sum = Decimal::ZERO;
    for r in returns {
        let growth = Decimal::ONE + r;
        if growth <= Decimal::ZERO {
            return Err(FinCalcError::DomainError(format!(
                "geometric mean: return {r} implies a non-positive growth factor"
            )));
        }
        log_sum += ln(growth)?;
    }
    Ok(exp(log_sum / Decimal::from(returns.len()))? - Decimal::ONE)
}

pub fn mean_absolute_deviation(values: &[Decimal]) -> FinCalcResult<Decimal> {
    let m = mean(values)?;
    let deviations = values
        .iter()
        .map(|x| checked_sub(*x, m, "mean absolute deviation").map(|d| d.abs()))
        .collect::<FinCalcResult<Vec<_>>>()?;
    let total = checked_sum(deviations, "mean absolute deviation")?;
    Ok(total / Decimal::from(values.len()))
}

/// Sample standard deviation over the mean.
pub fn coefficient_of_variation(values: &[Decimal]) -> FinCalcResult<Decimal> {
    let s = std_dev(values, VarianceKind::Sample)?;
    checked_div(s, mean(values)?, "coefficient of variation: mean")
}

/// Adjusted Fisher-Pearson skewness, `n / ((n-1)(n-2)) * sum(z^3)`.
pub fn skewness(values: &[Decimal]) -> FinCalcResult<Decimal> {
    require(values, 3, "skewness")?;
    let n = Decimal::from(values.len());
    let cubes = standardized(values, "skewness")?.into_iter().map(|z| z * z * z);
    let sum_cubed = checked_sum(cubes, "skewness")?;
    Ok(n / ((n - Decimal::ONE) * (n - dec!(2))) * sum_cubed)
}

/// Sample excess kurtosis,
/// `n(n+1) / ((n-1)(n-2)(n-3)) * sum(z^4) - 3(n-1)^2 / ((n-2)(n-3))`.
pub fn excess_kurtosis(values: &[Decimal]) -> FinCalcResult<Decimal> {
    require(values, 4, "excess kurtosis")?;
    let n = Decimal::from(values.len());
    let fourths = standardized(values, "excess kurtosis")?.into_iter().map(|z| {
        let z2 = z * z;
        z2 * z2
    });
    let sum_fourth = checked_sum(fourths, "excess kurtosis")?;

    let n1 = n - Decimal::ONE;
    let n2 = n - dec!(2);
    let n3 = n - dec!(3);
    Ok(n * (n + Decimal::ONE) / (n1 * n2 * n3) * sum_fourth - dec!(3) * n1 * n1 / (n2 * n3))
}

/// Everything above in one pass over the caller's data.
pub fn summarize(values: &[Decimal]) -> FinCalcResult<SummaryStatistics> {
    require(values, 1, "summary statistics")?;

    let mut sorted = values.to_vec();
    sorted.sort();
    let count = sorted.len();
    let median = if count % 2 == 0 {
        sorted[count / 2 - 1] / dec!(2) + sorted[count / 2] / dec!(2)
    } else {
        sorted[count / 2]
    };

    let population_variance = variance(values, VarianceKind::Population)?;
    let sample_variance = variance(values, VarianceKind::Sample).ok();

    Ok(SummaryStatistics {
        count,
        mean: mean(values)?,
        median,
        min: sorted[0],
        max: sorted[count - 1],
        population_variance,
        population_std_dev: sqrt(population_variance)?,
        sample_variance,
        sample_std_dev: sample_variance.map(sqrt).transpose()?,
        mean_absolute_deviation: mean_absolute_deviation(values)?,
        coefficient_of_variation: coefficient_of_variation(values).ok(),
        skewness: skewness(values).ok(),
        excess_kurtosis: excess_kurtosis(values).ok(),
    })
}

/// `(x - mean) / s` for each observation, with `s` the sample deviation.
fn standardized(values: &[Decimal], measure: &str) -> FinCalcResult<Vec<Decimal>> {
    let m = mean(values)?;
    let s = std_dev(values, VarianceKind::Sample)?;
    if s.is_zero() {
        return Err(FinCalcError::DivisionByZero {
            context: format!("{measure}: standard deviation is zero"),
        });
    }
    values
        .iter()
        .map(|x| checked_div(checked_sub(*x, m, measure)?, s, measure))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Decimal> {
        [2, 4, 4, 4, 5, 5, 7, 9].into_iter().map(Decimal::from).collect()
    }

    fn approx_eq(a: Decimal, b: Decimal, eps: Decimal) -> bool {
        (a - b).abs() < eps
    }

    #[test]
    fn test_mean_and_variance() {
        let data = sample();
        assert_eq!(mean(&data).unwrap(), dec!(5));
        assert_eq!(variance(&data, VarianceKind::Population).unwrap(), dec!(4));
        let sd = std_dev(&data, VarianceKind::Population).unwrap();
        assert!(approx_eq(sd, dec!(2), dec!(0.0000000001)));
        let s2 = variance(&data, VarianceKind::Sample).unwrap();
        assert!(approx_eq(s2, dec!(4.5714285714), dec!(0.0000001)));
    }

    #[test]
    fn test_sample_variance_needs_two_points() {
        let one = [dec!(3)];
        assert!(matches!(
            variance(&one, VarianceKind::Sample),
            Err(FinCalcError::InsufficientData(_))
        ));
        assert_eq!(variance(&one, VarianceKind::Population).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_empty_mean() {
        assert!(matches!(mean(&[]), Err(FinCalcError::InsufficientData(_))));
    }

    #[test]
    fn test_geometric_mean() {
        let g = geometric_mean(&[dec!(0.1), dec!(-0.05), dec!(0.2)]).unwrap();
        assert!(approx_eq(g, dec!(0.0783652), dec!(0.000001)), "got {g}");
    }

    #[test]
    fn test_geometric_mean_of_constant_return() {
        let g = geometric_mean(&[dec!(0.05); 4]).unwrap();
        assert!(approx_eq(g, dec!(0.05), dec!(0.0000000001)), "got {g}");
    }

    #[test]
    fn test_geometric_mean_total_loss() {
        let err = geometric_mean(&[dec!(0.1), dec!(-1)]).unwrap_err();
        assert!(matches!(err, FinCalcError::DomainError(_)));
    }

    #[test]
    fn test_mean_absolute_deviation() {
        assert_eq!(mean_absolute_deviation(&sample()).unwrap(), dec!(1.5));
    }

    #[test]
    fn test_coefficient_of_variation() {
        let cv = coefficient_of_variation(&sample()).unwrap();
        assert!(approx_eq(cv, dec!(0.427618), dec!(0.000001)));

        let centered = [dec!(-1), dec!(1)];
        assert!(matches!(
            coefficient_of_variation(&centered),
            Err(FinCalcError::DivisionByZero { .. })
        ));
    }

    #[test]
    fn test_skewness_and_kurtosis() {
        let data = sample();
        let sk = skewness(&data).unwrap();
        assert!(approx_eq(sk, dec!(0.818488), dec!(0.000001)), "skew {sk}");
        let k = excess_kurtosis(&data).unwrap();
        assert!(approx_eq(k, dec!(0.940625), dec!(0.000001)), "kurt {k}");
    }

    #[test]
    fn test_symmetric_data_has_zero_skew() {
        let data = [dec!(1), dec!(2), dec!(3), dec!(4), dec!(5)];
        assert!(approx_eq(skewness(&data).unwrap(), Decimal::ZERO, dec!(0.0000000001)));
    }

    #[test]
    fn test_higher_moments_minimum_sizes() {
        let three = [dec!(1), dec!(2), dec!(4)];
        assert!(skewness(&three).is_ok());
        assert!(matches!(
            excess_kurtosis(&three),
            Err(FinCalcError::InsufficientData(_))
        ));
        assert!(matches!(
            skewness(&three[..2]),
            Err(FinCalcError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_constant_series_has_no_skew() {
        let flat = [dec!(3); 5];
        assert!(matches!(
            skewness(&flat),
            Err(FinCalcError::DivisionByZero { .. })
        ));
    }

    #[test]
    fn test_summarize() {
        let summary = summarize(&sample()).unwrap();
        assert_eq!(summary.count, 8);
        assert_eq!(summary.mean, dec!(5));
        assert_eq!(summary.median, dec!(4.5));
        assert_eq!(summary.min, dec!(2));
        assert_eq!(summary.max, dec!(9));
        assert!(approx_eq(summary.population_std_dev, dec!(2), dec!(0.0000000001)));
        assert!(summary.sample_std_dev.is_some());
        assert!(summary.excess_kurtosis.is_some());
    }

    #[test]
    fn test_wide_spread_overflow_is_error() {
        // Squared deviations of 5e14 exceed the decimal range
        let wide = [Decimal::ZERO, dec!(1000000000000000)];
        assert!(matches!(
            variance(&wide, VarianceKind::Sample),
            Err(FinCalcError::DomainError(_))
        ));
        assert!(std_dev(&wide, VarianceKind::Population).is_err());
        assert!(summarize(&wide).is_err());
    }

    #[test]
    fn test_mean_overflow_is_error() {
        let huge = [Decimal::MAX, Decimal::MAX];
        assert!(matches!(mean(&huge), Err(FinCalcError::DomainError(_))));
        assert!(mean_absolute_deviation(&huge).is_err());
    }

    #[test]
    fn test_summarize_single_value() {
        let summary = summarize(&[dec!(7)]).unwrap();
        assert_eq!(summary.median, dec!(7));
        assert_eq!(summary.sample_variance, None);
        assert_eq!(summary.coefficient_of_variation, None);
        assert_eq!(summary.skewness, None);
        assert_eq!(summary.excess_kurtosis, None);
    }
}
