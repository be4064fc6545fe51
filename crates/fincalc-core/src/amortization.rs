//! Level-payment loan amortization with monthly compounding.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::FinCalcError;
use crate::math::{checked_mul, checked_sub};
use crate::time_value::annuity_payment;
use crate::types::{Money, Rate, Years, MAX_SCHEDULE_PERIODS};
use crate::FinCalcResult;

const MONTHS_PER_YEAR: u32 = 12;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationInput {
    pub loan_amount: Money,
    /// Annual nominal rate as a decimal
    pub interest_rate: Rate,
    /// Term in years; must cover a whole number of months
    pub loan_term: Years,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    pub period: u32,
    pub payment: Money,
    pub principal: Money,
    pub interest: Money,
    /// Remaining balance after this payment
    pub balance: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationSummary {
    pub monthly_payment: Money,
    pub total_payment: Money,
    pub total_interest: Money,
    pub number_of_payments: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationOutput {
    pub schedule: Vec<AmortizationRow>,
    pub summary: AmortizationSummary,
}

/// Build the full payment schedule for a fixed-rate loan.
pub fn amortize(input: &AmortizationInput) -> FinCalcResult<AmortizationOutput> {
    let n = validate_input(input)?;
    let monthly_rate = input.interest_rate / Decimal::from(MONTHS_PER_YEAR);
    let payment = annuity_payment(input.loan_amount, monthly_rate, n)?;

    let mut balance = input.loan_amount;
    let mut schedule = Vec::with_capacity(n as usize);
    for period in 1..=n {
        let interest = checked_mul(balance, monthly_rate, "amortization interest")?;
        let principal = checked_sub(payment, interest, "amortization principal")?;
        balance = (balance - principal).max(Decimal::ZERO);
        schedule.push(AmortizationRow {
            period,
            payment,
            principal,
            interest,
            balance,
        });
    }

    let total_payment = checked_mul(payment, Decimal::from(n), "amortization total payment")?;
    tracing::debug!(payments = n, %payment, "amortization schedule built");

    Ok(AmortizationOutput {
        schedule,
        summary: AmortizationSummary {
            monthly_payment: payment,
            total_payment,
            total_interest: checked_sub(total_payment, input.loan_amount, "amortization total interest")?,
            number_of_payments: n,
        },
    })
}

/// Returns the number of monthly payments.
fn validate_input(input: &AmortizationInput) -> FinCalcResult<u32> {
    if input.loan_amount <= Decimal::ZERO {
        return Err(FinCalcError::invalid("loan_amount", "Loan amount must be positive."));
    }
    if input.interest_rate < Decimal::ZERO {
        return Err(FinCalcError::invalid(
            "interest_rate",
            "Interest rate must be non-negative.",
        ));
    }
    if input.loan_term <= Decimal::ZERO {
        return Err(FinCalcError::invalid("loan_term", "Loan term must be positive."));
    }

    let too_long = || {
        FinCalcError::invalid(
            "loan_term",
            &format!("Loan term may not exceed {MAX_SCHEDULE_PERIODS} months."),
        )
    };
    let months = input
        .loan_term
        .checked_mul(Decimal::from(MONTHS_PER_YEAR))
        .ok_or_else(too_long)?;
    if !months.fract().is_zero() {
        return Err(FinCalcError::invalid(
            "loan_term",
            "Loan term must cover a whole number of months.",
        ));
    }
    months
        .to_u32()
        .filter(|m| *m <= MAX_SCHEDULE_PERIODS)
        .ok_or_else(too_long)
}
