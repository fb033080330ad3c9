pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Headers and rows for a result's `schedule`, if it has one.
///
/// Multi-balance entries carry a nested `balances` array; those are
/// flattened to one row per month and balance.
pub fn schedule_rows(result: &Map<String, Value>) -> Option<(Vec<String>, Vec<Vec<String>>)> {
    let entries = result.get("schedule")?.as_array()?;
    let first = entries.first()?.as_object()?;

    let mut month_keys: Vec<String> = first
        .iter()
        .filter(|(_, v)| !v.is_array() && !v.is_object())
        .map(|(k, _)| k.clone())
        .collect();
    // Month and date lead; the rest keep map order
    month_keys.sort_by_key(|k| match k.as_str() {
        "month" => 0,
        "date" => 1,
        _ => 2,
    });
    let balance_keys: Vec<String> = match first.get("balances") {
        Some(Value::Array(rows)) => rows
            .first()
            .and_then(Value::as_object)
            .map(|b| b.keys().cloned().collect())
            .unwrap_or_default(),
        _ => Vec::new(),
    };

    let mut headers = month_keys.clone();
    headers.extend(balance_keys.iter().cloned());

    let mut rows = Vec::new();
    for entry in entries.iter().filter_map(Value::as_object) {
        let month_cells: Vec<String> = month_keys
            .iter()
            .map(|k| entry.get(k).map(cell).unwrap_or_default())
            .collect();

        match entry.get("balances") {
            Some(Value::Array(balances)) if !balance_keys.is_empty() => {
                for b in balances.iter().filter_map(Value::as_object) {
                    let mut row = month_cells.clone();
                    row.extend(
                        balance_keys
                            .iter()
                            .map(|k| b.get(k).map(cell).unwrap_or_default()),
                    );
                    rows.push(row);
                }
            }
            _ => rows.push(month_cells),
        }
    }

    Some((headers, rows))
}

/// Scalar fields of a result, skipping the schedule.
pub fn summary_fields(result: &Map<String, Value>) -> Vec<(String, String)> {
    result
        .iter()
        .filter(|(k, _)| k.as_str() != "schedule")
        .map(|(k, v)| (k.clone(), cell(v)))
        .collect()
}

fn cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) => arr.iter().map(cell).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
