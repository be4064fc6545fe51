//! Single entry point over every operation in the library.
//!
//! A request is a [`Calculation`]: in JSON, `{"operation": "<name>",
//! "params": {...}}`. [`calculate`] runs it and wraps the result in the
//! standard [`ComputationOutput`] envelope.

use std::time::Instant;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::amortization::{amortize, AmortizationInput};
use crate::config::CalcConfig;
use crate::derivatives::options::{black_scholes, BlackScholesInput};
use crate::equity::cost_of_capital::{capm, wacc, WaccInput};
use crate::equity::ddm::{gordon_growth, GordonGrowthInput};
use crate::equity::dupont::{dupont, DupontInput};
use crate::error::FinCalcError;
use crate::fixed_income::bonds::{bond_price, current_yield, yield_to_maturity, BondInput, YtmInput};
use crate::fixed_income::duration::{convexity, duration, price_change_estimate};
use crate::math::checked_sum;
use crate::statistics::descriptive::{self, VarianceKind};
use crate::statistics::portfolio::{portfolio_return, sharpe_ratio, two_asset_std_dev, TwoAssetInput};
use crate::time_value;
use crate::tvm::{solve_tvm, TvmInput};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::FinCalcResult;

/// Every operation the library exposes, with its named inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "operation", content = "params", rename_all = "snake_case")]
pub enum Calculation {
    FutureValue {
        present_value: Money,
        rate: Rate,
        periods: Decimal,
    },
    PresentValue {
        future_value: Money,
        rate: Rate,
        periods: Decimal,
    },
    Perpetuity {
        payment: Money,
        rate: Rate,
    },
    GrowingPerpetuity {
        payment: Money,
        rate: Rate,
        growth_rate: Rate,
    },
    EffectiveAnnualReturn {
        nominal_rate: Rate,
        compounds_per_year: u32,
    },
    HoldingPeriodReturn {
        begin_value: Money,
        end_value: Money,
        #[serde(default)]
        income: Money,
    },
    BankDiscountYield {
        face_value: Money,
        price: Money,
        days: u32,
    },
    EffectiveAnnualYield {
        holding_period_yield: Rate,
        days: u32,
    },
    MoneyMarketYield {
        holding_period_yield: Rate,
        days: u32,
    },
    Roi {
        amount_gained: Money,
        amount_spent: Money,
    },
    AnnuityPayment {
        principal: Money,
        rate: Rate,
        periods: u32,
    },
    Npv {
        rate: Rate,
        cash_flows: Vec<Money>,
    },
    Irr {
        cash_flows: Vec<Money>,
    },
    Tvm(TvmInput),
    BondPrice(BondInput),
    YieldToMaturity(YtmInput),
    CurrentYield {
        face_value: Money,
        coupon_rate: Rate,
        price: Money,
    },
    Duration(BondInput),
    Convexity(BondInput),
    PriceChangeEstimate {
        modified_duration: Decimal,
        convexity: Decimal,
        yield_change: Rate,
    },
    Capm {
        risk_free_rate: Rate,
        beta: Decimal,
        market_return: Rate,
    },
    Wacc(WaccInput),
    GordonGrowth(GordonGrowthInput),
    Dupont(DupontInput),
    BlackScholes(BlackScholesInput),
    Mean {
        values: Vec<Decimal>,
    },
    Variance {
        values: Vec<Decimal>,
        #[serde(default)]
        kind: VarianceKind,
    },
    StdDev {
        values: Vec<Decimal>,
        #[serde(default)]
        kind: VarianceKind,
    },
    GeometricMean {
        returns: Vec<Rate>,
    },
    MeanAbsoluteDeviation {
        values: Vec<Decimal>,
    },
    CoefficientOfVariation {
        values: Vec<Decimal>,
    },
    Skewness {
        values: Vec<Decimal>,
    },
    ExcessKurtosis {
        values: Vec<Decimal>,
    },
    Summarize {
        values: Vec<Decimal>,
    },
    TwoAssetStdDev(TwoAssetInput),
    SharpeRatio {
        portfolio_return: Rate,
        risk_free_rate: Rate,
        std_dev: Rate,
    },
    PortfolioReturn {
        weights: Vec<Decimal>,
        returns: Vec<Rate>,
    },
    Amortize(AmortizationInput),
}

const OPERATION_NAMES: &[&str] = &[
    "future_value",
    "present_value",
    "perpetuity",
    "growing_perpetuity",
    "effective_annual_return",
    "holding_period_return",
    "bank_discount_yield",
    "effective_annual_yield",
    "money_market_yield",
    "roi",
    "annuity_payment",
    "npv",
    "irr",
    "tvm",
    "bond_price",
    "yield_to_maturity",
    "current_yield",
    "duration",
    "convexity",
    "price_change_estimate",
    "capm",
    "wacc",
    "gordon_growth",
    "dupont",
    "black_scholes",
    "mean",
    "variance",
    "std_dev",
    "geometric_mean",
    "mean_absolute_deviation",
    "coefficient_of_variation",
    "skewness",
    "excess_kurtosis",
    "summarize",
    "two_asset_std_dev",
    "sharpe_ratio",
    "portfolio_return",
    "amortize",
];

impl Calculation {
    /// Parse a `{"operation": ..., "params": {...}}` request.
    ///
    /// An absent required parameter surfaces as `MissingInput` naming the
    /// field; every other malformed request is a `SerializationError`.
    pub fn from_json(json: &str) -> FinCalcResult<Self> {
        serde_json::from_str(json).map_err(|e| {
            let message = e.to_string();
            match missing_field(&message) {
                Some(field) => FinCalcError::MissingInput { field },
                None => FinCalcError::SerializationError(message),
            }
        })
    }

    /// The catalog of operation names accepted in the `operation` tag.
    pub fn operation_names() -> &'static [&'static str] {
        OPERATION_NAMES
    }

    pub fn name(&self) -> &'static str {
        match self {
            Calculation::FutureValue { .. } => "future_value",
            Calculation::PresentValue { .. } => "present_value",
            Calculation::Perpetuity { .. } => "perpetuity",
            Calculation::GrowingPerpetuity { .. } => "growing_perpetuity",
            Calculation::EffectiveAnnualReturn { .. } => "effective_annual_return",
            Calculation::HoldingPeriodReturn { .. } => "holding_period_return",
            Calculation::BankDiscountYield { .. } => "bank_discount_yield",
            Calculation::EffectiveAnnualYield { .. } => "effective_annual_yield",
            Calculation::MoneyMarketYield { .. } => "money_market_yield",
            Calculation::Roi { .. } => "roi",
            Calculation::AnnuityPayment { .. } => "annuity_payment",
            Calculation::Npv { .. } => "npv",
            Calculation::Irr { .. } => "irr",
            Calculation::Tvm(_) => "tvm",
            Calculation::BondPrice(_) => "bond_price",
            Calculation::YieldToMaturity(_) => "yield_to_maturity",
            Calculation::CurrentYield { .. } => "current_yield",
            Calculation::Duration(_) => "duration",
            Calculation::Convexity(_) => "convexity",
            Calculation::PriceChangeEstimate { .. } => "price_change_estimate",
            Calculation::Capm { .. } => "capm",
            Calculation::Wacc(_) => "wacc",
            Calculation::GordonGrowth(_) => "gordon_growth",
            Calculation::Dupont(_) => "dupont",
            Calculation::BlackScholes(_) => "black_scholes",
            Calculation::Mean { .. } => "mean",
            Calculation::Variance { .. } => "variance",
            Calculation::StdDev { .. } => "std_dev",
            Calculation::GeometricMean { .. } => "geometric_mean",
            Calculation::MeanAbsoluteDeviation { .. } => "mean_absolute_deviation",
            Calculation::CoefficientOfVariation { .. } => "coefficient_of_variation",
            Calculation::Skewness { .. } => "skewness",
            Calculation::ExcessKurtosis { .. } => "excess_kurtosis",
            Calculation::Summarize { .. } => "summarize",
            Calculation::TwoAssetStdDev(_) => "two_asset_std_dev",
            Calculation::SharpeRatio { .. } => "sharpe_ratio",
            Calculation::PortfolioReturn { .. } => "portfolio_return",
            Calculation::Amortize(_) => "amortize",
        }
    }
}

/// Run one calculation and wrap the result with methodology and timing.
pub fn calculate(calc: &Calculation, config: &CalcConfig) -> FinCalcResult<ComputationOutput<Value>> {
    let start = Instant::now();
    config.solver.validate()?;
    tracing::debug!(operation = calc.name(), "dispatching calculation");

    let mut warnings: Vec<String> = Vec::new();
    let solver = &config.solver;

    let (methodology, result) = match calc {
        Calculation::FutureValue {
            present_value,
            rate,
            periods,
        } => (
            "Future value: PV * (1 + r)^n",
            to_value(time_value::future_value(*present_value, *rate, *periods)?)?,
        ),
        Calculation::PresentValue {
            future_value,
            rate,
            periods,
        } => (
            "Present value: FV / (1 + r)^n",
            to_value(time_value::present_value(*future_value, *rate, *periods)?)?,
        ),
        Calculation::Perpetuity { payment, rate } => (
            "Perpetuity: PMT / r",
            to_value(time_value::perpetuity(*payment, *rate)?)?,
        ),
        Calculation::GrowingPerpetuity {
            payment,
            rate,
            growth_rate,
        } => (
            "Growing perpetuity: PMT / (r - g)",
            to_value(time_value::growing_perpetuity(*payment, *rate, *growth_rate)?)?,
        ),
        Calculation::EffectiveAnnualReturn {
            nominal_rate,
            compounds_per_year,
        } => (
            "Effective annual return: (1 + r/m)^m - 1",
            to_value(time_value::effective_annual_return(*nominal_rate, *compounds_per_year)?)?,
        ),
        Calculation::HoldingPeriodReturn {
            begin_value,
            end_value,
            income,
        } => (
            "Holding period return: (P1 - P0 + D) / P0",
            to_value(time_value::holding_period_return(*begin_value, *end_value, *income)?)?,
        ),
        Calculation::BankDiscountYield {
            face_value,
            price,
            days,
        } => (
            "Bank discount yield: (F - P) / F * 360 / t",
            to_value(time_value::bank_discount_yield(*face_value, *price, *days)?)?,
        ),
        Calculation::EffectiveAnnualYield {
            holding_period_yield,
            days,
        } => (
            "Effective annual yield: (1 + HPY)^(365/t) - 1",
            to_value(time_value::effective_annual_yield(*holding_period_yield, *days)?)?,
        ),
        Calculation::MoneyMarketYield {
            holding_period_yield,
            days,
        } => (
            "Money market yield: HPY * 360 / t",
            to_value(time_value::money_market_yield(*holding_period_yield, *days)?)?,
        ),
        Calculation::Roi {
            amount_gained,
            amount_spent,
        } => (
            "Return on investment: (gain - cost) / cost",
            to_value(time_value::roi(*amount_gained, *amount_spent)?)?,
        ),
        Calculation::AnnuityPayment {
            principal,
            rate,
            periods,
        } => (
            "Level annuity payment: P * r(1+r)^n / ((1+r)^n - 1)",
            to_value(time_value::annuity_payment(*principal, *rate, *periods)?)?,
        ),
        Calculation::Npv { rate, cash_flows } => {
            let value = time_value::npv(*rate, cash_flows)?;
            if value < Decimal::ZERO {
                warnings.push(format!("Negative NPV ({value}): project destroys value at {rate}"));
            }
            ("Net present value, first flow at t = 0", to_value(value)?)
        }
        Calculation::Irr { cash_flows } => {
            let value = time_value::irr(cash_flows, solver)?;
            if value > Decimal::ONE {
                warnings.push(format!("IRR of {value} exceeds 100%; verify cash flow signs"));
            }
            ("Internal rate of return by bisection on NPV", to_value(value)?)
        }
        Calculation::Tvm(input) => (
            "Time value of money five-variable solve",
            to_value(solve_tvm(input, solver)?)?,
        ),
        Calculation::BondPrice(input) => (
            "Bond price: discounted coupons and principal",
            to_value(bond_price(input)?)?,
        ),
        Calculation::YieldToMaturity(input) => (
            "Yield to maturity by bisection on price",
            to_value(yield_to_maturity(input, solver)?)?,
        ),
        Calculation::CurrentYield {
            face_value,
            coupon_rate,
            price,
        } => (
            "Current yield: annual coupon / price",
            to_value(current_yield(*face_value, *coupon_rate, *price)?)?,
        ),
        Calculation::Duration(input) => (
            "Macaulay and modified duration",
            to_value(duration(input)?)?,
        ),
        Calculation::Convexity(input) => (
            "Convexity: sum PV * t(t+1) / (price * f^2)",
            to_value(convexity(input)?)?,
        ),
        Calculation::PriceChangeEstimate {
            modified_duration,
            convexity,
            yield_change,
        } => (
            "Duration-convexity price change: -D * dy + C/2 * dy^2",
            to_value(price_change_estimate(*modified_duration, *convexity, *yield_change)?)?,
        ),
        Calculation::Capm {
            risk_free_rate,
            beta,
            market_return,
        } => (
            "CAPM: Rf + beta * (Rm - Rf)",
            to_value(capm(*risk_free_rate, *beta, *market_return)?)?,
        ),
        Calculation::Wacc(input) => {
            if input.tax_rate < Decimal::ZERO || input.tax_rate > Decimal::ONE {
                warnings.push(format!("Tax rate {} lies outside [0, 1]", input.tax_rate));
            }
            (
                "WACC: E/V * Re + D/V * Rd * (1 - t)",
                to_value(wacc(input)?)?,
            )
        }
        Calculation::GordonGrowth(input) => {
            let out = gordon_growth(input)?;
            if input.required_return - input.growth_rate < dec!(0.01) {
                warnings.push(
                    "Growth within 1% of the required return; value is highly sensitive".into(),
                );
            }
            ("Gordon growth model: D1 / (k - g)", to_value(out)?)
        }
        Calculation::Dupont(input) => (
            "DuPont three-factor ROE decomposition",
            to_value(dupont(input)?)?,
        ),
        Calculation::BlackScholes(input) => (
            "Black-Scholes-Merton European option pricing",
            to_value(black_scholes(input)?)?,
        ),
        Calculation::Mean { values } => ("Arithmetic mean", to_value(descriptive::mean(values)?)?),
        Calculation::Variance { values, kind } => (
            "Variance",
            to_value(descriptive::variance(values, *kind)?)?,
        ),
        Calculation::StdDev { values, kind } => (
            "Standard deviation",
            to_value(descriptive::std_dev(values, *kind)?)?,
        ),
        Calculation::GeometricMean { returns } => (
            "Geometric mean return",
            to_value(descriptive::geometric_mean(returns)?)?,
        ),
        Calculation::MeanAbsoluteDeviation { values } => (
            "Mean absolute deviation",
            to_value(descriptive::mean_absolute_deviation(values)?)?,
        ),
        Calculation::CoefficientOfVariation { values } => (
            "Coefficient of variation (sample)",
            to_value(descriptive::coefficient_of_variation(values)?)?,
        ),
        Calculation::Skewness { values } => (
            "Adjusted Fisher-Pearson skewness",
            to_value(descriptive::skewness(values)?)?,
        ),
        Calculation::ExcessKurtosis { values } => (
            "Sample excess kurtosis",
            to_value(descriptive::excess_kurtosis(values)?)?,
        ),
        Calculation::Summarize { values } => (
            "Descriptive statistics summary",
            to_value(descriptive::summarize(values)?)?,
        ),
        Calculation::TwoAssetStdDev(input) => (
            "Two-asset portfolio standard deviation",
            to_value(two_asset_std_dev(input)?)?,
        ),
        Calculation::SharpeRatio {
            portfolio_return,
            risk_free_rate,
            std_dev,
        } => (
            "Sharpe ratio: (Rp - Rf) / sigma",
            to_value(sharpe_ratio(*portfolio_return, *risk_free_rate, *std_dev)?)?,
        ),
        Calculation::PortfolioReturn { weights, returns } => {
            let value = portfolio_return(weights, returns)?;
            let weight_sum = checked_sum(weights.iter().copied(), "portfolio weights")?;
            if weight_sum < dec!(0.9999) || weight_sum > dec!(1.0001) {
                warnings.push(format!("Portfolio weights sum to {weight_sum}, not 1"));
            }
            ("Weighted portfolio return", to_value(value)?)
        }
        Calculation::Amortize(input) => (
            "Level-payment monthly amortization",
            to_value(amortize(input)?)?,
        ),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(methodology, calc, warnings, elapsed, result))
}

fn to_value<T: Serialize>(value: T) -> FinCalcResult<Value> {
    Ok(serde_json::to_value(value)?)
}

/// Extract `x` from serde's "missing field `x`" message.
fn missing_field(message: &str) -> Option<String> {
    let rest = message.strip_prefix("missing field `")?;
    let end = rest.find('`')?;
    Some(rest[..end].to_string())
}
