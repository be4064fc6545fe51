use serde_json::Value;
use std::io;

use super::{flatten_fields, format_scalar, object_arrays};

/// Write output as CSV to stdout.
///
/// A result carrying a row-shaped section (such as an amortization
/// schedule) is written as that section; anything else as `field,value`.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let body = value.get("result").unwrap_or(value);
    match body {
        Value::Array(arr) => write_rows(&mut wtr, arr),
        _ => match object_arrays(body).first() {
            Some((_, rows)) => write_rows(&mut wtr, rows),
            None => {
                let mut fields = Vec::new();
                flatten_fields("", body, &mut fields);
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in fields {
                    let _ = wtr.write_record([key, val]);
                }
            }
        },
    }

    let _ = wtr.flush();
}

fn write_rows<W: io::Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) {
    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            let _ = wtr.write_record([format_scalar(item)]);
        }
        return;
    };

    let headers: Vec<&str> = first.keys().map(String::as_str).collect();
    let _ = wtr.write_record(&headers);
    for item in arr {
        let row: Vec<String> = headers
            .iter()
            .map(|h| item.get(*h).map(format_scalar).unwrap_or_default())
            .collect();
        let _ = wtr.write_record(&row);
    }
}
