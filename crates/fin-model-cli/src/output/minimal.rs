use serde_json::Value;

/// Print just the key answer from the output: the run status (with the
/// error, if any), or the first field for other shapes.
pub fn print_minimal(value: &Value) {
    if let Some(report) = value.get("report") {
        let status = report
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        match report.get("error_message").and_then(Value::as_str) {
            Some(error) => println!("{}: {}", status, error),
            None => println!("{}", status),
        }
        return;
    }

    if let Some(total) = value.get("total_debt") {
        println!("total_debt: {}", format_minimal(total));
        return;
    }

    if let Value::Object(map) = value {
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(value));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
