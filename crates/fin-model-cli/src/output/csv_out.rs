use serde_json::Value;
use std::io;

/// Write output as CSV to stdout: one row per category / line item / period.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value.get("records") {
        Some(Value::Array(records)) => {
            let _ = wtr.write_record(["category", "line_item", "period", "value"]);
            for record in records {
                let Value::Object(map) = record else { continue };
                let category = map.get("category").and_then(Value::as_str).unwrap_or("");
                let line_item = map.get("line_item").and_then(Value::as_str).unwrap_or("");
                if let Some(Value::Array(values)) = map.get("values") {
                    for pair in values {
                        let period = pair.get(0).map(format_csv_value).unwrap_or_default();
                        let amount = pair.get(1).map(format_csv_value).unwrap_or_default();
                        let _ =
                            wtr.write_record([category, line_item, period.as_str(), amount.as_str()]);
                    }
                }
            }
        }
        _ => {
            // Generic field/value fallback for shapes without records
            if let Value::Object(map) = value {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in map {
                    let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
                }
            }
        }
    }

    let _ = wtr.flush();
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
