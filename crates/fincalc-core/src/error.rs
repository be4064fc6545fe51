use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FinCalcError {
    #[error("Missing input: {field} is required")]
    MissingInput { field: String },

    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Domain error: {0}")]
    DomainError(String),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Convergence failure: {function} did not converge after {iterations} iterations (residual: {last_residual}, best guess: {best_guess})")]
    NonConvergence {
        function: String,
        iterations: u32,
        last_residual: Decimal,
        best_guess: Decimal,
    },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Coarse error category, stable across message wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingInput,
    InvalidInput,
    Domain,
    NonConvergence,
    InsufficientData,
    Serialization,
}

impl FinCalcError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FinCalcError::MissingInput { .. } => ErrorKind::MissingInput,
            FinCalcError::InvalidInput { .. } => ErrorKind::InvalidInput,
            FinCalcError::DomainError(_) | FinCalcError::DivisionByZero { .. } => {
                ErrorKind::Domain
            }
            FinCalcError::NonConvergence { .. } => ErrorKind::NonConvergence,
            FinCalcError::InsufficientData(_) => ErrorKind::InsufficientData,
            FinCalcError::SerializationError(_) => ErrorKind::Serialization,
        }
    }

    /// Shorthand for the common `InvalidInput` construction.
    pub(crate) fn invalid(field: &str, reason: &str) -> Self {
        FinCalcError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for FinCalcError {
    fn from(e: serde_json::Error) -> Self {
        FinCalcError::SerializationError(e.to_string())
    }
}
