use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::{flatten_fields, format_scalar, object_arrays};

/// Format output as tables: one Field/Value table for the result, plus one
/// table per row-shaped section (e.g. an amortization schedule).
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) if map.contains_key("result") => {
            let result = &map["result"];
            print_field_table(result);
            for (name, rows) in object_arrays(result) {
                println!("\n{name}:");
                print_array_table(rows);
            }

            if let Some(Value::Array(warnings)) = map.get("warnings") {
                if !warnings.is_empty() {
                    println!("\nWarnings:");
                    for w in warnings.iter().filter_map(Value::as_str) {
                        println!("  - {w}");
                    }
                }
            }
            if let Some(Value::String(meth)) = map.get("methodology") {
                println!("\nMethodology: {meth}");
            }
        }
        Value::Array(arr) => print_array_table(arr),
        _ => print_field_table(value),
    }
}

fn print_field_table(value: &Value) {
    let mut rows = Vec::new();
    flatten_fields("", value, &mut rows);
    if rows.is_empty() {
        return;
    }

    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in rows {
        builder.push_record([key, val]);
    }
    println!("{}", Table::from(builder));
}

fn print_array_table(arr: &[Value]) {
    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            println!("{}", format_scalar(item));
        }
        return;
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(headers.clone());
    for item in arr {
        let row: Vec<String> = headers
            .iter()
            .map(|h| item.get(h).map(format_scalar).unwrap_or_default())
            .collect();
        builder.push_record(row);
    }
    println!("{}", Table::from(builder));
}
