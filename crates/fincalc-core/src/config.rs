use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::FinCalcError;
use crate::FinCalcResult;

/// Default residual tolerance for the root finders.
pub const DEFAULT_TOLERANCE: Decimal = dec!(0.0000000001);

/// Default iteration budget for the root finders.
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

/// Settings for the bisection solver behind IRR, YTM and the TVM rate solve.
///
/// The bracket is expressed in periodic-rate space: the defaults allow any
/// rate strictly above -99.9% and up to 1000% per period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    pub lower_bound: Decimal,
    pub upper_bound: Decimal,
    /// Iteration stops once |residual| drops below this value
    pub tolerance: Decimal,
    pub max_iterations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            lower_bound: dec!(-0.999),
            upper_bound: dec!(10),
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) -> FinCalcResult<()> {
        if self.lower_bound <= dec!(-1) {
            return Err(FinCalcError::invalid(
                "lower_bound",
                "must be greater than -1 (a rate of -100% has no discount factor)",
            ));
        }
        if self.upper_bound <= self.lower_bound {
            return Err(FinCalcError::invalid(
                "upper_bound",
                "must be greater than lower_bound",
            ));
        }
        if self.tolerance <= Decimal::ZERO {
            return Err(FinCalcError::invalid("tolerance", "must be positive"));
        }
        if self.max_iterations == 0 {
            return Err(FinCalcError::invalid("max_iterations", "must be at least 1"));
        }
        Ok(())
    }
}

/// Per-call configuration for [`crate::calculator::calculate`].
///
/// Immutable and passed by reference, so concurrent calls never share
/// mutable numeric state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CalcConfig {
    #[serde(default)]
    pub solver: SolverConfig,
}
