use serde_json::Value;
use tabled::{builder::Builder, Table};

/// Format output as tables using the tabled crate: the run report as a
/// field/value table, then one table per statement category.
pub fn print_table(value: &Value) {
    let Value::Object(map) = value else {
        println!("{}", value);
        return;
    };

    if let Some(Value::Object(report)) = map.get("report") {
        print_report(report);
    }

    if let Some(Value::Array(records)) = map.get("records") {
        print_records(records);
    } else if map.get("report").is_none() {
        print_flat_object(value);
    }
}

fn print_report(report: &serde_json::Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in report {
        if key == "warnings" {
            continue;
        }
        builder.push_record([key.as_str(), &format_value(val)]);
    }
    println!("{}", Table::from(builder));

    if let Some(Value::Array(warnings)) = report.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }
}

/// One table per category. Period labels come from each category's first
/// record, so the valuation block (keyed by metric name) renders the same
/// way as the period-indexed statements.
fn print_records(records: &[Value]) {
    let mut current_category: Option<&str> = None;
    let mut builder = Builder::default();

    for record in records {
        let Value::Object(map) = record else { continue };
        let category = map.get("category").and_then(Value::as_str).unwrap_or("");
        let line_item = map.get("line_item").and_then(Value::as_str).unwrap_or("");
        let Some(Value::Array(values)) = map.get("values") else {
            continue;
        };

        if current_category != Some(category) {
            if current_category.is_some() {
                println!("{}", Table::from(std::mem::take(&mut builder)));
            }
            println!("\n[{}]", category);
            let mut header = vec!["Line Item".to_string()];
            header.extend(values.iter().map(pair_label));
            builder.push_record(header);
            current_category = Some(category);
        }

        let mut row = vec![line_item.to_string()];
        row.extend(values.iter().map(pair_value));
        builder.push_record(row);
    }

    if current_category.is_some() {
        println!("{}", Table::from(builder));
    }
}

fn pair_label(pair: &Value) -> String {
    pair.get(0).map(format_value).unwrap_or_default()
}

fn pair_value(pair: &Value) -> String {
    pair.get(1).map(format_value).unwrap_or_default()
}

fn print_flat_object(value: &Value) {
    if let Value::Object(map) = value {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in map {
            builder.push_record([key.as_str(), &format_value(val)]);
        }
        println!("{}", Table::from(builder));
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
