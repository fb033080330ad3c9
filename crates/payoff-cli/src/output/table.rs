use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{schedule_rows, summary_fields};

/// Format output as tables: the summary first, then the schedule.
pub fn print_table(value: &Value) {
    let Some(envelope) = value.as_object() else {
        println!("{}", value);
        return;
    };

    match envelope.get("result") {
        Some(Value::Object(result)) => print_result(result, envelope),
        _ => print_field_table(summary_fields(envelope)),
    }
}

fn print_result(result: &Map<String, Value>, envelope: &Map<String, Value>) {
    print_field_table(summary_fields(result));

    if let Some((headers, rows)) = schedule_rows(result) {
        let mut builder = Builder::default();
        builder.push_record(headers);
        for row in rows {
            builder.push_record(row);
        }
        println!("\nSchedule:");
        println!("{}", Table::from(builder));
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_field_table(fields: Vec<(String, String)>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in fields {
        builder.push_record([key, val]);
    }
    println!("{}", Table::from(builder));
}
