use serde_json::Value;

use super::format_scalar;

/// Headline fields, in priority order, for results that are objects.
const PRIORITY_KEYS: &[&str] = &[
    "value",
    "ytm",
    "wacc",
    "roe",
    "call_price",
    "macaulay_duration",
    "monthly_payment",
    "mean",
    "operation",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    let result = value.get("result").unwrap_or(value);
    println!("{}", headline(result));
}

fn headline(result: &Value) -> String {
    match result {
        Value::Object(map) => {
            // Amortization nests its headline under "summary"
            let scopes = [Some(result), map.get("summary")];
            for scope in scopes.into_iter().flatten() {
                for key in PRIORITY_KEYS {
                    if let Some(val) = scope.get(*key).filter(|v| !v.is_null()) {
                        return format_scalar(val);
                    }
                }
            }
            map.iter()
                .next()
                .map(|(key, val)| format!("{key}: {}", format_scalar(val)))
                .unwrap_or_default()
        }
        Value::Array(items) => items.iter().map(headline).collect::<Vec<_>>().join("\n"),
        _ => format_scalar(result),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_headline() {
        assert_eq!(headline(&json!("0.2488833")), "0.2488833");
    }

    #[test]
    fn test_priority_key_headline() {
        let result = json!({"ytm": "0.04", "periodic_yield": "0.02", "iterations": 30});
        assert_eq!(headline(&result), "0.04");
    }

    #[test]
    fn test_nested_summary_headline() {
        let result = json!({"schedule": [], "summary": {"monthly_payment": "1266.71"}});
        assert_eq!(headline(&result), "1266.71");
    }

    #[test]
    fn test_operation_list_headline() {
        let result = json!([{"operation": "npv"}, {"operation": "irr"}]);
        assert_eq!(headline(&result), "npv\nirr");
    }
}
