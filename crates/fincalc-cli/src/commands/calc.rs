use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use fincalc_core::{calculate, CalcConfig, Calculation};

use crate::input;

/// Arguments for running one calculation request
#[derive(Args)]
pub struct CalcArgs {
    /// Path to a JSON or YAML request file (reads stdin when omitted)
    #[arg(long)]
    pub input: Option<String>,

    /// Residual tolerance for the IRR / YTM / TVM rate solvers
    #[arg(long)]
    pub tolerance: Option<Decimal>,

    /// Iteration budget for the root finders
    #[arg(long)]
    pub max_iterations: Option<u32>,
}

pub fn run_calc(args: CalcArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: Value = if let Some(ref path) = args.input {
        input::file::read_request(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("--input <file> or a request on stdin is required".into());
    };

    let calc = Calculation::from_json(&request.to_string())?;
    let config = build_config(&args);
    tracing::debug!(operation = calc.name(), ?config, "running calculation");

    let output = calculate(&calc, &config)?;
    Ok(serde_json::to_value(output)?)
}

fn build_config(args: &CalcArgs) -> CalcConfig {
    let mut config = CalcConfig::default();
    if let Some(tolerance) = args.tolerance {
        config.solver.tolerance = tolerance;
    }
    if let Some(max_iterations) = args.max_iterations {
        config.solver.max_iterations = max_iterations;
    }
    config
}
