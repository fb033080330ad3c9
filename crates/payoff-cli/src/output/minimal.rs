use serde_json::Value;

/// Answer fields, most specific first. `total_months` is shared by several
/// outputs so it comes last.
const HEADLINE_KEYS: [&str; 7] = [
    "required_payment",
    "monthly_payment",
    "recommended",
    "runway_months",
    "breakeven_month",
    "outcome",
    "total_months",
];

/// Print just the headline figure from the output.
pub fn print_minimal(value: &Value) {
    println!("{}", headline(value));
}

fn headline(value: &Value) -> String {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let Value::Object(map) = result else {
        return scalar(result);
    };

    HEADLINE_KEYS
        .iter()
        .filter_map(|key| map.get(*key))
        .find(|val| !val.is_null())
        .map(scalar)
        .or_else(|| map.iter().next().map(|(k, v)| format!("{}: {}", k, scalar(v))))
        .unwrap_or_default()
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        // Enum variants with data, e.g. {"CashExhausted": {"month": 13}}
        Value::Object(map) if map.len() == 1 => map.keys().next().cloned().unwrap_or_default(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
