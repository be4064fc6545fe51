//! Decimal-precision financial formulas: time value of money, fixed income,
//! equity and option valuation, descriptive statistics and loan amortization.

pub mod amortization;
pub mod calculator;
pub mod config;
pub mod derivatives;
pub mod equity;
pub mod error;
pub mod fixed_income;
pub mod math;
pub mod solver;
pub mod statistics;
pub mod time_value;
pub mod tvm;
pub mod types;

pub use calculator::{calculate, Calculation};
pub use config::{CalcConfig, SolverConfig};
pub use error::{ErrorKind, FinCalcError};
pub use types::*;

/// Standard result type for all fincalc operations
pub type FinCalcResult<T> = Result<T, FinCalcError>;
