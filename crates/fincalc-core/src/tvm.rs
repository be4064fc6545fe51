//! Five-variable time-value-of-money solver (N, I/Y, PV, PMT, FV).
//!
//! All amounts follow the cash-flow sign convention: money paid out is
//! negative, money received is positive. The variables are tied together by
//!
//! ```text
//! PV * (1 + r)^N + PMT * [(1 + r)^N - 1] / r + FV = 0
//! ```
//!
//! where `r = I/Y / 100 / CPY` is the periodic rate and payments fall at the
//! end of each period.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::config::SolverConfig;
use crate::error::FinCalcError;
use crate::math::{checked_add, checked_div, checked_mul, checked_sub, ln, pow_frac};
use crate::solver::{bisect, Monotonicity};
use crate::types::{Money, Rate};
use crate::FinCalcResult;

const RATE_INITIAL_GUESS: Decimal = dec!(0.05);
const SLOPE_STEP: Decimal = dec!(0.000001);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TvmVariable {
    #[serde(alias = "n")]
    N,
    #[serde(alias = "iy")]
    IY,
    #[serde(alias = "pv")]
    PV,
    #[serde(alias = "pmt")]
    PMT,
    #[serde(alias = "fv")]
    FV,
}

impl TvmVariable {
    fn field_name(self) -> &'static str {
        match self {
            TvmVariable::N => "n",
            TvmVariable::IY => "iy",
            TvmVariable::PV => "pv",
            TvmVariable::PMT => "pmt",
            TvmVariable::FV => "fv",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TvmInput {
    pub solve_for: TvmVariable,
    /// Number of compounding periods
    #[serde(default)]
    pub n: Option<Decimal>,
    /// Annual interest rate as a percentage (7 = 7%)
    #[serde(default)]
    pub iy: Option<Decimal>,
    #[serde(default)]
    pub pv: Option<Money>,
    #[serde(default)]
    pub pmt: Option<Money>,
    #[serde(default)]
    pub fv: Option<Money>,
    /// Compounding periods per year
    pub cpy: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TvmOutput {
    pub solved_for: TvmVariable,
    /// The value of the solved variable
    pub value: Decimal,
    pub n: Decimal,
    pub iy: Decimal,
    pub pv: Money,
    pub pmt: Money,
    pub fv: Money,
    /// Rate per compounding period as a decimal
    pub periodic_rate: Rate,
}

/// Resolved inputs with every variable but the target present.
struct Knowns {
    n: Decimal,
    rate: Rate,
    pv: Money,
    pmt: Money,
    fv: Money,
}

/// Solve for whichever variable `input.solve_for` names.
pub fn solve_tvm(input: &TvmInput, config: &SolverConfig) -> FinCalcResult<TvmOutput> {
    if input.cpy <= Decimal::ZERO {
        return Err(FinCalcError::invalid("cpy", "Compounding periods per year must be positive"));
    }
    let target = input.solve_for;

    let require = |variable: TvmVariable, value: Option<Decimal>| -> FinCalcResult<Decimal> {
        if variable == target {
            return Ok(Decimal::ZERO);
        }
        value.ok_or_else(|| FinCalcError::MissingInput {
            field: variable.field_name().to_string(),
        })
    };

    let n = require(TvmVariable::N, input.n)?;
    let iy = require(TvmVariable::IY, input.iy)?;
    let pv = require(TvmVariable::PV, input.pv)?;
    let pmt = require(TvmVariable::PMT, input.pmt)?;
    let fv = require(TvmVariable::FV, input.fv)?;

    if n < Decimal::ZERO {
        return Err(FinCalcError::invalid("n", "Number of periods must be >= 0"));
    }
    let rate = iy / dec!(100) / input.cpy;
    if rate <= dec!(-1) {
        return Err(FinCalcError::invalid("iy", "Periodic rate must be greater than -100%"));
    }

    let mut knowns = Knowns { n, rate, pv, pmt, fv };
    let value = match target {
        TvmVariable::FV => {
            knowns.fv = solve_fv(&knowns)?;
            knowns.fv
        }
        TvmVariable::PV => {
            knowns.pv = solve_pv(&knowns)?;
            knowns.pv
        }
        TvmVariable::PMT => {
            knowns.pmt = solve_pmt(&knowns)?;
            knowns.pmt
        }
        TvmVariable::N => {
            knowns.n = solve_n(&knowns)?;
            knowns.n
        }
        TvmVariable::IY => {
            knowns.rate = solve_rate(&knowns, config)?;
            annual_percent(knowns.rate, input.cpy)?
        }
    };

    Ok(TvmOutput {
        solved_for: target,
        value,
        n: knowns.n,
        iy: annual_percent(knowns.rate, input.cpy)?,
        pv: knowns.pv,
        pmt: knowns.pmt,
        fv: knowns.fv,
        periodic_rate: knowns.rate,
    })
}

fn annual_percent(rate: Rate, cpy: Decimal) -> FinCalcResult<Decimal> {
    checked_mul(checked_mul(rate, cpy, "annual rate")?, dec!(100), "annual rate")
}

/// `(1 + r)^n` and the annuity factor `[(1 + r)^n - 1] / r` (which is `n` at r = 0).
fn factors(rate: Rate, n: Decimal) -> FinCalcResult<(Decimal, Decimal)> {
    let growth = pow_frac(Decimal::ONE + rate, n)?;
    let annuity = if rate.is_zero() {
        n
    } else {
        checked_div(growth - Decimal::ONE, rate, "annuity factor")?
    };
    Ok((growth, annuity))
}

/// Left-hand side of the TVM equation; zero at a solution.
fn tvm_residual(rate: Rate, n: Decimal, pv: Money, pmt: Money, fv: Money) -> FinCalcResult<Decimal> {
    let (growth, annuity) = factors(rate, n)?;
    let lhs = checked_add(
        checked_mul(pv, growth, "TVM present value term")?,
        checked_mul(pmt, annuity, "TVM payment term")?,
        "TVM equation",
    )?;
    checked_add(lhs, fv, "TVM equation")
}

fn solve_fv(k: &Knowns) -> FinCalcResult<Money> {
    let (growth, annuity) = factors(k.rate, k.n)?;
    let total = checked_add(
        checked_mul(k.pv, growth, "future value")?,
        checked_mul(k.pmt, annuity, "future value")?,
        "future value",
    )?;
    Ok(-total)
}

fn solve_pv(k: &Knowns) -> FinCalcResult<Money> {
    let (growth, annuity) = factors(k.rate, k.n)?;
    let numerator = checked_add(k.fv, checked_mul(k.pmt, annuity, "present value")?, "present value")?;
    checked_div(-numerator, growth, "present value discount factor")
}

fn solve_pmt(k: &Knowns) -> FinCalcResult<Money> {
    if k.n.is_zero() {
        return Err(FinCalcError::DomainError(
            "cannot solve: result undefined (payment over zero periods)".into(),
        ));
    }
    let (growth, annuity) = factors(k.rate, k.n)?;
    let numerator = checked_add(k.fv, checked_mul(k.pv, growth, "payment")?, "payment")?;
    checked_div(-numerator, annuity, "payment annuity factor")
}

/// Closed form `N = ln((PMT - FV*r) / (PMT + PV*r)) / ln(1 + r)`.
///
/// A negative N is returned as computed: the known values then describe a
/// position that lies that many periods in the past.
fn solve_n(k: &Knowns) -> FinCalcResult<Decimal> {
    let undefined = || FinCalcError::DomainError("cannot solve: result undefined".into());

    if k.rate.is_zero() {
        if k.pmt.is_zero() {
            return Err(undefined());
        }
        let total = checked_add(k.pv, k.fv, "periods")?;
        return checked_div(-total, k.pmt, "periods");
    }

    let numerator = checked_sub(k.pmt, checked_mul(k.fv, k.rate, "periods")?, "periods")?;
    let denominator = checked_add(k.pmt, checked_mul(k.pv, k.rate, "periods")?, "periods")?;
    if denominator.is_zero() {
        return Err(undefined());
    }
    let ratio = checked_div(numerator, denominator, "periods")?;
    if ratio <= Decimal::ZERO {
        return Err(undefined());
    }
    checked_div(ln(ratio)?, ln(Decimal::ONE + k.rate)?, "periods")
}

/// Periodic rate by bisection; no closed form exists.
fn solve_rate(k: &Knowns, config: &SolverConfig) -> FinCalcResult<Rate> {
    if k.n.is_zero() {
        return Err(FinCalcError::DomainError(
            "cannot solve: rate is undefined over zero periods".into(),
        ));
    }
    let signs = [k.pv, k.pmt, k.fv];
    let has_positive = signs.iter().any(|v| *v > Decimal::ZERO);
    let has_negative = signs.iter().any(|v| *v < Decimal::ZERO);
    if !(has_positive && has_negative) {
        return Err(FinCalcError::DomainError(
            "cannot solve: PV, PMT and FV must include both inflows and outflows".into(),
        ));
    }

    let residual = |rate: Rate| tvm_residual(rate, k.n, k.pv, k.pmt, k.fv);

    // d/dr of PV*(1+r)^n has the sign of PV, and the annuity factor grows
    // with r, so same-signed PV and PMT fix the direction outright.
    let direction = if k.pv >= Decimal::ZERO && k.pmt >= Decimal::ZERO {
        Monotonicity::Increasing
    } else if k.pv <= Decimal::ZERO && k.pmt <= Decimal::ZERO {
        Monotonicity::Decreasing
    } else {
        let slope = residual(RATE_INITIAL_GUESS + SLOPE_STEP)? - residual(RATE_INITIAL_GUESS)?;
        Monotonicity::from_slope(slope)
    };

    let solved = bisect("TVM rate", residual, RATE_INITIAL_GUESS, direction, config)?;
    Ok(solved.root)
}
