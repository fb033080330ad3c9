use serde_json::Value;
use std::io;

use super::{schedule_rows, summary_fields};

/// Write output as CSV to stdout.
///
/// Results with a schedule are written one row per month (and per balance
/// for multi-debt plans); anything else as field/value pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .and_then(Value::as_object)
        .or_else(|| value.as_object());

    match result {
        Some(result) => {
            if let Some((headers, rows)) = schedule_rows(result) {
                let _ = wtr.write_record(&headers);
                for row in rows {
                    let _ = wtr.write_record(&row);
                }
            } else {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in summary_fields(result) {
                    let _ = wtr.write_record([key, val]);
                }
            }
        }
        None => {
            let _ = wtr.write_record([value.to_string()]);
        }
    }

    let _ = wtr.flush();
}
