use serde_json::Value;

use super::display_value;

/// Key answer per output shape, in order of priority.
const PRIORITY_POINTERS: [&str; 6] = [
    "/metrics/npv",
    "/npv",
    "/worst_case_npv",
    "/base_case_value",
    "/irr",
    "/discount_rate",
];

/// Print just the key answer value from the output.
///
/// Heuristic: look for well-known result fields in order of priority,
/// then fall back to the first field in the result object.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_text(value));
}

fn minimal_text(value: &Value) -> String {
    // Try to extract the "result" envelope
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    for pointer in PRIORITY_POINTERS {
        if let Some(val) = result_obj.pointer(pointer) {
            if !val.is_null() {
                return display_value(val);
            }
        }
    }

    match result_obj {
        // Timeline: the final cumulative position
        Value::Array(rows) => rows
            .last()
            .and_then(|row| row.get("cumulative_cash_flow"))
            .map(display_value)
            .unwrap_or_default(),
        Value::Object(map) => map
            .iter()
            .next()
            .map(|(key, val)| format!("{}: {}", key, display_value(val)))
            .unwrap_or_default(),
        other => display_value(other),
    }
}
