//! Numeric aliases shared by every module, and the envelope that
//! [`crate::calculator::calculate`] wraps around each result.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Currency amounts. Always `Decimal`, never `f64`.
pub type Money = Decimal;

/// Decimal fractions (0.05 = 5%). The TVM `iy` input is the one place a
/// percentage is accepted instead.
pub type Rate = Decimal;

/// Time in years; fractional values allowed.
pub type Years = Decimal;

/// Upper bound on generated schedules (loan months, bond coupon periods).
pub const MAX_SCHEDULE_PERIODS: u32 = 50_000;

/// Arithmetic used for every result, as recorded in the metadata.
pub const PRECISION_LABEL: &str = "rust_decimal_128bit";

/// A computed result together with how it was obtained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    /// The request that produced the result, echoed back
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Wrap `result` in the standard envelope.
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or(serde_json::Value::Null),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: PRECISION_LABEL.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_envelope_fields() {
        let out = with_metadata("test", &["a", "b"], vec!["careful".into()], 42, dec!(1.5));
        assert_eq!(out.result, dec!(1.5));
        assert_eq!(out.assumptions, serde_json::json!(["a", "b"]));
        assert_eq!(out.metadata.computation_time_us, 42);
        assert_eq!(out.metadata.precision, PRECISION_LABEL);
        assert_eq!(out.warnings, vec!["careful".to_string()]);
    }
}
