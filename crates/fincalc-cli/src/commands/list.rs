use serde::Serialize;
use serde_json::Value;

use fincalc_core::Calculation;

#[derive(Serialize)]
struct OperationEntry {
    operation: &'static str,
}

/// The operation catalog as an array, so every output format can render it.
pub fn run_list() -> Result<Value, Box<dyn std::error::Error>> {
    let entries: Vec<OperationEntry> = Calculation::operation_names()
        .iter()
        .map(|&operation| OperationEntry { operation })
        .collect();
    Ok(serde_json::to_value(entries)?)
}
