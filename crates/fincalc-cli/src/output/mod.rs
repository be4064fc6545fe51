pub mod csv_out;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("JSON serialization error: {e}"),
    }
}

/// Render a scalar for display. Decimals arrive as strings and print bare.
pub(crate) fn format_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Flatten nested objects into `parent.child` rows. Arrays of objects are
/// left out; callers render those as their own tables.
pub(crate) fn flatten_fields(prefix: &str, value: &Value, rows: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                let name = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_fields(&name, val, rows);
            }
        }
        Value::Array(items) if items.iter().any(Value::is_object) => {}
        Value::Array(items) => {
            let joined: Vec<String> = items.iter().map(format_scalar).collect();
            rows.push((prefix.to_string(), joined.join(", ")));
        }
        _ => {
            let name = if prefix.is_empty() { "result" } else { prefix };
            rows.push((name.to_string(), format_scalar(value)));
        }
    }
}

/// Arrays of objects nested inside `value`, keyed by field name.
pub(crate) fn object_arrays(value: &Value) -> Vec<(&str, &[Value])> {
    match value {
        Value::Object(map) => map
            .iter()
            .filter_map(|(key, val)| match val {
                Value::Array(items) if items.iter().any(Value::is_object) => {
                    Some((key.as_str(), items.as_slice()))
                }
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_nested_result() {
        let value = json!({
            "call_price": "13.35",
            "call_greeks": {"delta": "0.73"},
            "schedule": [{"period": 1}],
            "cash_flows": ["-100", "110"]
        });
        let mut rows = Vec::new();
        flatten_fields("", &value, &mut rows);
        assert!(rows.contains(&("call_price".into(), "13.35".into())));
        assert!(rows.contains(&("call_greeks.delta".into(), "0.73".into())));
        assert!(rows.contains(&("cash_flows".into(), "-100, 110".into())));
        assert!(!rows.iter().any(|(k, _)| k == "schedule"));
    }

    #[test]
    fn test_scalar_result_row() {
        let mut rows = Vec::new();
        flatten_fields("", &json!("1628.89"), &mut rows);
        assert_eq!(rows, vec![("result".to_string(), "1628.89".to_string())]);
    }

    #[test]
    fn test_object_arrays() {
        let value = json!({"schedule": [{"period": 1}], "summary": {"n": 1}});
        let arrays = object_arrays(&value);
        assert_eq!(arrays.len(), 1);
        assert_eq!(arrays[0].0, "schedule");
    }
}
