use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::config::SolverConfig;
use crate::error::FinCalcError;
use crate::math::{checked_add, checked_div, checked_mul, checked_sub, pow_frac, pow_int};
use crate::solver::{bisect, Monotonicity};
use crate::types::{Money, Rate};
use crate::FinCalcResult;

/// Starting point for the IRR bisection.
const IRR_INITIAL_GUESS: Decimal = dec!(0.1);

fn validate_rate(field: &str, rate: Rate) -> FinCalcResult<()> {
    if rate <= dec!(-1) {
        return Err(FinCalcError::invalid(
            field,
            "Rate must be greater than -100%",
        ));
    }
    Ok(())
}

fn validate_periods(periods: Decimal) -> FinCalcResult<()> {
    if periods < Decimal::ZERO {
        return Err(FinCalcError::invalid("periods", "Number of periods must be >= 0"));
    }
    Ok(())
}

/// `(1 + rate)^periods`
pub fn compound_factor(rate: Rate, periods: Decimal) -> FinCalcResult<Decimal> {
    validate_rate("rate", rate)?;
    validate_periods(periods)?;
    pow_frac(Decimal::ONE + rate, periods)
}

/// Future Value of a single sum: `PV * (1 + r)^n`
pub fn future_value(present_value: Money, rate: Rate, periods: Decimal) -> FinCalcResult<Money> {
    let factor = compound_factor(rate, periods)?;
    checked_mul(present_value, factor, "future value")
}

/// Present Value of a single sum: `FV / (1 + r)^n`
pub fn present_value(future_value: Money, rate: Rate, periods: Decimal) -> FinCalcResult<Money> {
    let factor = compound_factor(rate, periods)?;
    checked_div(future_value, factor, "present value discount factor")
}

/// Present value of a level perpetuity: `PMT / r`
pub fn perpetuity(payment: Money, rate: Rate) -> FinCalcResult<Money> {
    if rate < Decimal::ZERO {
        return Err(FinCalcError::invalid("rate", "Perpetuity rate must be positive"));
    }
    checked_div(payment, rate, "perpetuity at a zero rate")
}

/// Present value of a perpetuity growing at `growth`: `PMT / (r - g)`
pub fn growing_perpetuity(payment: Money, rate: Rate, growth: Rate) -> FinCalcResult<Money> {
    if growth >= rate {
        return Err(FinCalcError::DomainError(format!(
            "growing perpetuity requires growth ({growth}) below the discount rate ({rate})"
        )));
    }
    let spread = checked_sub(rate, growth, "growing perpetuity spread")?;
    checked_div(payment, spread, "growing perpetuity spread")
}

/// Effective annual return: `(1 + r/m)^m - 1`
pub fn effective_annual_return(nominal_rate: Rate, compounds_per_year: u32) -> FinCalcResult<Rate> {
    if compounds_per_year == 0 {
        return Err(FinCalcError::invalid(
            "compounds_per_year",
            "Must compound at least once per year",
        ));
    }
    let m = Decimal::from(compounds_per_year);
    let periodic = nominal_rate / m;
    validate_rate("nominal_rate", periodic)?;
    Ok(pow_int(Decimal::ONE + periodic, compounds_per_year as u64)? - Decimal::ONE)
}

/// Holding period return: `(End - Begin + Income) / Begin`
pub fn holding_period_return(begin_value: Money, end_value: Money, income: Money) -> FinCalcResult<Rate> {
    let gain = checked_add(
        checked_sub(end_value, begin_value, "holding period return")?,
        income,
        "holding period return",
    )?;
    checked_div(
        gain,
        begin_value,
        "holding period return (beginning value is zero)",
    )
}

/// Bank discount yield: `(F - P) / F * (360 / days)`
pub fn bank_discount_yield(face_value: Money, price: Money, days: u32) -> FinCalcResult<Rate> {
    let spread = checked_sub(face_value, price, "bank discount yield")?;
    let discount = checked_div(spread, face_value, "bank discount yield face value")?;
    let annualiser = checked_div(dec!(360), Decimal::from(days), "bank discount yield days")?;
    checked_mul(discount, annualiser, "bank discount yield")
}

/// Effective annual yield from a holding period yield: `(1 + HPY)^(365/days) - 1`
pub fn effective_annual_yield(holding_period_yield: Rate, days: u32) -> FinCalcResult<Rate> {
    validate_rate("holding_period_yield", holding_period_yield)?;
    let exponent = checked_div(dec!(365), Decimal::from(days), "effective annual yield days")?;
    Ok(pow_frac(Decimal::ONE + holding_period_yield, exponent)? - Decimal::ONE)
}

/// Money market yield: `HPY * 360 / days`
pub fn money_market_yield(holding_period_yield: Rate, days: u32) -> FinCalcResult<Rate> {
    let annualiser = checked_div(dec!(360), Decimal::from(days), "money market yield days")?;
    checked_mul(holding_period_yield, annualiser, "money market yield")
}

/// Return on investment: `(Gained - Spent) / Spent`
pub fn roi(amount_gained: Money, amount_spent: Money) -> FinCalcResult<Rate> {
    checked_div(
        checked_sub(amount_gained, amount_spent, "ROI")?,
        amount_spent,
        "ROI (amount spent is zero)",
    )
}

/// Level payment that amortizes `principal` over `periods` at `rate` per period.
///
/// Returned as a positive amount; a zero rate degrades to `principal / n`.
pub fn annuity_payment(principal: Money, rate: Rate, periods: u32) -> FinCalcResult<Money> {
    if periods == 0 {
        return Err(FinCalcError::invalid("periods", "Number of periods must be > 0"));
    }
    validate_rate("rate", rate)?;

    if rate.is_zero() {
        return Ok(principal / Decimal::from(periods));
    }

    let factor = pow_int(Decimal::ONE + rate, periods as u64)?;
    let numerator = checked_mul(checked_mul(principal, rate, "annuity payment")?, factor, "annuity payment")?;
    checked_div(numerator, factor - Decimal::ONE, "annuity payment factor")
}

/// Net Present Value of a series of cash flows, the first at t = 0.
pub fn npv(rate: Rate, cash_flows: &[Money]) -> FinCalcResult<Money> {
    validate_rate("rate", rate)?;

    let mut result = Decimal::ZERO;
    let one_plus_r = Decimal::ONE + rate;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount = checked_mul(discount, one_plus_r, "NPV discount factor")?;
        }
        let pv = checked_div(*cf, discount, "NPV discount factor")?;
        result = checked_add(result, pv, "NPV sum")?;
    }

    Ok(result)
}

/// Internal Rate of Return by bisection on the NPV curve.
///
/// The search direction comes from the first non-zero flow: a leading
/// outflow makes NPV fall as the rate rises.
pub fn irr(cash_flows: &[Money], config: &SolverConfig) -> FinCalcResult<Rate> {
    if cash_flows.len() < 2 {
        return Err(FinCalcError::InsufficientData(
            "IRR requires at least 2 cash flows".into(),
        ));
    }

    let has_inflow = cash_flows.iter().any(|cf| *cf > Decimal::ZERO);
    let has_outflow = cash_flows.iter().any(|cf| *cf < Decimal::ZERO);
    if !(has_inflow && has_outflow) {
        return Err(FinCalcError::DomainError(
            "IRR is undefined unless the cash flows contain both inflows and outflows".into(),
        ));
    }

    let direction = match cash_flows.iter().find(|cf| !cf.is_zero()) {
        Some(first) if *first > Decimal::ZERO => Monotonicity::Increasing,
        _ => Monotonicity::Decreasing,
    };

    let solved = bisect("IRR", |rate| npv(rate, cash_flows), IRR_INITIAL_GUESS, direction, config)?;
    Ok(solved.root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn assert_close(actual: Decimal, expected: Decimal, tol: Decimal, msg: &str) {
        assert!(
            (actual - expected).abs() < tol,
            "{msg}: expected ~{expected}, got {actual}"
        );
    }

    #[test]
    fn test_future_value_basic() {
        let result = future_value(dec!(1000), dec!(0.05), dec!(10)).unwrap();
        assert_close(result, dec!(1628.89), dec!(0.01), "FV of 1000 at 5% for 10 periods");
    }

    #[test]
    fn test_present_value_basic() {
        let result = present_value(dec!(1628.894627), dec!(0.05), dec!(10)).unwrap();
        assert_close(result, dec!(1000), dec!(0.001), "PV of 1628.89 at 5% for 10 periods");
    }

    #[test]
    fn test_fractional_periods() {
        // 1.21^0.5 = 1.1
        let result = future_value(dec!(100), dec!(0.21), dec!(0.5)).unwrap();
        assert_close(result, dec!(110), dec!(0.0000001), "FV over half a period");
    }

    #[test]
    fn test_rate_at_minus_one_rejected() {
        assert!(future_value(dec!(100), dec!(-1), dec!(5)).is_err());
        assert!(present_value(dec!(100), dec!(-1.5), dec!(5)).is_err());
    }

    #[test]
    fn test_perpetuity() {
        assert_eq!(perpetuity(dec!(50), dec!(0.05)).unwrap(), dec!(1000));
    }

    #[test]
    fn test_perpetuity_zero_rate_is_error() {
        let err = perpetuity(dec!(50), Decimal::ZERO).unwrap_err();
        assert!(matches!(err, FinCalcError::DivisionByZero { .. }));
    }

    #[test]
    fn test_growing_perpetuity() {
        assert_eq!(growing_perpetuity(dec!(50), dec!(0.08), dec!(0.03)).unwrap(), dec!(1000));
        assert!(growing_perpetuity(dec!(50), dec!(0.03), dec!(0.03)).is_err());
    }

    #[test]
    fn test_effective_annual_return_monthly() {
        // (1 + 0.12/12)^12 - 1 = 12.6825%
        let ear = effective_annual_return(dec!(0.12), 12).unwrap();
        assert_close(ear, dec!(0.126825), dec!(0.000001), "EAR of 12% monthly");
    }

    #[test]
    fn test_effective_annual_return_zero_compounding_rejected() {
        assert!(effective_annual_return(dec!(0.12), 0).is_err());
    }

    #[test]
    fn test_holding_period_return() {
        let hpr = holding_period_return(dec!(100), dec!(110), dec!(2)).unwrap();
        assert_eq!(hpr, dec!(0.12));
        assert!(holding_period_return(Decimal::ZERO, dec!(110), Decimal::ZERO).is_err());
    }

    #[test]
    fn test_bank_discount_yield() {
        // (1000 - 985) / 1000 * 360 / 120 = 4.5%
        let bdy = bank_discount_yield(dec!(1000), dec!(985), 120).unwrap();
        assert_eq!(bdy, dec!(0.045));
    }

    #[test]
    fn test_bank_discount_yield_zero_days() {
        assert!(bank_discount_yield(dec!(1000), dec!(985), 0).is_err());
    }

    #[test]
    fn test_effective_annual_yield() {
        // (1.02)^(365/90) - 1 ~ 8.37%
        let eay = effective_annual_yield(dec!(0.02), 90).unwrap();
        assert_close(eay, dec!(0.083624), dec!(0.00001), "EAY of 2% over 90 days");
    }

    #[test]
    fn test_money_market_yield() {
        assert_eq!(money_market_yield(dec!(0.02), 90).unwrap(), dec!(0.08));
    }

    #[test]
    fn test_roi() {
        assert_eq!(roi(dec!(1500), dec!(1000)).unwrap(), dec!(0.5));
        let err = roi(dec!(1500), Decimal::ZERO).unwrap_err();
        assert!(matches!(err, FinCalcError::DivisionByZero { .. }));
    }

    #[test]
    fn test_annuity_payment() {
        // 250k, 4.5% / 12 over 360 months
        let pmt = annuity_payment(dec!(250000), dec!(0.045) / dec!(12), 360).unwrap();
        assert_close(pmt, dec!(1266.71), dec!(0.01), "30y mortgage payment");
    }

    #[test]
    fn test_annuity_payment_zero_rate() {
        assert_eq!(annuity_payment(dec!(1200), Decimal::ZERO, 12).unwrap(), dec!(100));
    }

    #[test]
    fn test_npv_basic() {
        let cfs = vec![dec!(-1000), dec!(300), dec!(400), dec!(500)];
        let result = npv(dec!(0.10), &cfs).unwrap();
        // -1000 + 300/1.1 + 400/1.21 + 500/1.331 ~ -21.04
        assert_close(result, dec!(-21.04), dec!(0.01), "NPV at 10%");
    }

    #[test]
    fn test_npv_zero_rate() {
        let cfs = vec![dec!(-100), dec!(50), dec!(50), dec!(50)];
        assert_eq!(npv(dec!(0.0), &cfs).unwrap(), dec!(50));
    }

    #[test]
    fn test_irr_reference_series() {
        let cfs = vec![dec!(-1000), dec!(300), dec!(400), dec!(500), dec!(600)];
        let rate = irr(&cfs, &SolverConfig::default()).unwrap();
        assert_close(rate, dec!(0.2489), dec!(0.0001), "IRR");
    }

    #[test]
    fn test_irr_inverted_signs() {
        // Borrower's view of the same deal has the same IRR
        let cfs = vec![dec!(1000), dec!(-300), dec!(-400), dec!(-500), dec!(-600)];
        let rate = irr(&cfs, &SolverConfig::default()).unwrap();
        assert_close(rate, dec!(0.2489), dec!(0.0001), "IRR from the borrower side");
    }

    #[test]
    fn test_irr_negative_rate() {
        let cfs = vec![dec!(-1000), dec!(400), dec!(400)];
        let rate = irr(&cfs, &SolverConfig::default()).unwrap();
        assert!(rate < Decimal::ZERO, "Losing investment should have negative IRR, got {rate}");
        assert!(npv(rate, &cfs).unwrap().abs() < dec!(0.000001));
    }

    #[test]
    fn test_irr_requires_sign_change() {
        let cfs = vec![dec!(100), dec!(200)];
        assert!(matches!(
            irr(&cfs, &SolverConfig::default()).unwrap_err(),
            FinCalcError::DomainError(_)
        ));
    }

    #[test]
    fn test_irr_insufficient_flows() {
        assert!(matches!(
            irr(&[dec!(-100)], &SolverConfig::default()).unwrap_err(),
            FinCalcError::InsufficientData(_)
        ));
    }
}
