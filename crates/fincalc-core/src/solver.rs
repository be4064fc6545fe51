//! Bisection root finder shared by IRR, YTM and the TVM rate solve.
//!
//! Unlike a textbook bisection the first evaluation happens at a caller
//! supplied guess rather than the bracket midpoint, and the caller states
//! which way the residual moves as the variable grows. That avoids
//! evaluating the residual at the bracket edges, where discount factors such
//! as `(1 - 0.999)^-n` leave the representable decimal range for long
//! cash-flow series. A later guess whose residual still cannot be represented
//! is treated as lying beyond the root, on the far side from the first guess.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::SolverConfig;
use crate::error::{ErrorKind, FinCalcError};
use crate::FinCalcResult;

/// Direction in which the residual moves as the unknown increases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Monotonicity {
    Increasing,
    Decreasing,
}

impl Monotonicity {
    /// Monotonicity implied by the sign of a slope estimate. A flat slope is
    /// treated as decreasing, the common case for discounting equations.
    pub fn from_slope(slope: Decimal) -> Self {
        if slope > Decimal::ZERO {
            Monotonicity::Increasing
        } else {
            Monotonicity::Decreasing
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverResult {
    pub root: Decimal,
    pub iterations: u32,
    pub residual: Decimal,
}

/// Find `x` in `[config.lower_bound, config.upper_bound]` with
/// `|f(x)| < config.tolerance`.
///
/// `function` names the caller in logs and in the
/// [`FinCalcError::NonConvergence`] raised when the iteration budget runs
/// out; that error carries the last evaluated guess so callers may still
/// choose to accept it.
pub fn bisect<F>(
    function: &str,
    mut f: F,
    initial_guess: Decimal,
    direction: Monotonicity,
    config: &SolverConfig,
) -> FinCalcResult<SolverResult>
where
    F: FnMut(Decimal) -> FinCalcResult<Decimal>,
{
    config.validate()?;

    let mut lower = config.lower_bound;
    let mut upper = config.upper_bound;
    let mut guess = if initial_guess > lower && initial_guess < upper {
        initial_guess
    } else {
        (lower + upper) / dec!(2)
    };
    let anchor = guess;
    let mut last_guess = guess;
    let mut last_residual = Decimal::ZERO;

    for iteration in 1..=config.max_iterations {
        let residual = match f(guess) {
            Ok(residual) => residual,
            Err(e) if iteration > 1 && e.kind() == ErrorKind::Domain => {
                trace!(function, iteration, %guess, error = %e, "residual not representable");
                if guess > anchor {
                    upper = guess;
                } else {
                    lower = guess;
                }
                guess = (lower + upper) / dec!(2);
                continue;
            }
            Err(e) => return Err(e),
        };
        trace!(function, iteration, %guess, %residual, "bisection step");

        if residual.abs() < config.tolerance {
            debug!(function, iterations = iteration, root = %guess, "bisection converged");
            return Ok(SolverResult {
                root: guess,
                iterations: iteration,
                residual,
            });
        }

        let root_above_guess = match direction {
            Monotonicity::Decreasing => residual > Decimal::ZERO,
            Monotonicity::Increasing => residual < Decimal::ZERO,
        };
        if root_above_guess {
            lower = guess;
        } else {
            upper = guess;
        }

        last_guess = guess;
        last_residual = residual;
        guess = (lower + upper) / dec!(2);
    }

    debug!(function, best_guess = %last_guess, residual = %last_residual, "bisection exhausted");
    Err(FinCalcError::NonConvergence {
        function: function.to_string(),
        iterations: config.max_iterations,
        last_residual,
        best_guess: last_guess,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increasing_linear_root() {
        let result = bisect(
            "linear",
            |x| Ok(x - dec!(0.25)),
            dec!(0.05),
            Monotonicity::Increasing,
            &SolverConfig::default(),
        )
        .unwrap();
        assert!((result.root - dec!(0.25)).abs() < dec!(0.0000000001));
        assert!(result.residual.abs() < dec!(0.0000000001));
    }

    #[test]
    fn test_decreasing_root() {
        // 1 / (1 + x) - 0.8 = 0 at x = 0.25
        let result = bisect(
            "discount",
            |x| Ok(Decimal::ONE / (Decimal::ONE + x) - dec!(0.8)),
            dec!(0.1),
            Monotonicity::Decreasing,
            &SolverConfig::default(),
        )
        .unwrap();
        assert!((result.root - dec!(0.25)).abs() < dec!(0.000000001));
    }

    #[test]
    fn test_exact_initial_guess_converges_immediately() {
        let result = bisect(
            "exact",
            |x| Ok(x - dec!(0.05)),
            dec!(0.05),
            Monotonicity::Increasing,
            &SolverConfig::default(),
        )
        .unwrap();
        assert_eq!(result.iterations, 1);
        assert_eq!(result.root, dec!(0.05));
    }

    #[test]
    fn test_negative_root_found() {
        let result = bisect(
            "negative",
            |x| Ok(x + dec!(0.4)),
            dec!(0.1),
            Monotonicity::Increasing,
            &SolverConfig::default(),
        )
        .unwrap();
        assert!((result.root + dec!(0.4)).abs() < dec!(0.0000000001));
    }

    #[test]
    fn test_root_outside_bracket_does_not_converge() {
        let err = bisect(
            "outside",
            |x| Ok(x - dec!(50)),
            dec!(0.05),
            Monotonicity::Increasing,
            &SolverConfig::default(),
        )
        .unwrap_err();
        match err {
            FinCalcError::NonConvergence {
                iterations,
                best_guess,
                ..
            } => {
                assert_eq!(iterations, 100);
                // Pushed against the upper edge of the bracket
                assert!(best_guess > dec!(9.99));
            }
            other => panic!("expected NonConvergence, got {other:?}"),
        }
    }

    #[test]
    fn test_iteration_budget_respected() {
        let config = SolverConfig {
            max_iterations: 5,
            ..SolverConfig::default()
        };
        let mut calls = 0;
        let err = bisect(
            "budget",
            |x| {
                calls += 1;
                Ok(x - dec!(3.3333333333))
            },
            dec!(0.05),
            Monotonicity::Increasing,
            &config,
        )
        .unwrap_err();
        assert!(matches!(err, FinCalcError::NonConvergence { iterations: 5, .. }));
        assert_eq!(calls, 5);
    }

    #[test]
    fn test_unrepresentable_guess_narrows_bracket() {
        // Overflows above 1, root at 0.8
        let result = bisect(
            "overflowing",
            |x| {
                if x > Decimal::ONE {
                    Err(FinCalcError::DomainError("overflow".into()))
                } else {
                    Ok(dec!(0.8) - x)
                }
            },
            dec!(0.05),
            Monotonicity::Decreasing,
            &SolverConfig::default(),
        )
        .unwrap();
        assert!((result.root - dec!(0.8)).abs() < dec!(0.0000000001));
    }

    #[test]
    fn test_residual_error_propagates() {
        let err = bisect(
            "failing",
            |_| Err(FinCalcError::DomainError("boom".into())),
            dec!(0.05),
            Monotonicity::Increasing,
            &SolverConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, FinCalcError::DomainError(_)));
    }

    #[test]
    fn test_from_slope() {
        assert_eq!(Monotonicity::from_slope(dec!(2)), Monotonicity::Increasing);
        assert_eq!(Monotonicity::from_slope(dec!(-2)), Monotonicity::Decreasing);
    }
}
