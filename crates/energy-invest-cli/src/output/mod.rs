pub mod csv_out;
pub mod currency;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => return csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
    Ok(())
}

/// Render a scalar or a `{status, value}` tagged outcome as plain text.
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Object(map) if map.contains_key("status") => {
            let status = map.get("status").map(display_value).unwrap_or_default();
            match map.get("value") {
                Some(inner) if status == "defined" || status == "recovered" => display_value(inner),
                Some(inner) => format!("{} ({})", status, display_value(inner)).replace('_', " "),
                None => status.replace('_', " "),
            }
        }
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
