use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::display_value;

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            // Check if "result" key holds the primary data
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else {
                println!("{}", field_table(map));
            }
        }
        Value::Array(arr) => {
            print_array_table(arr);
        }
        _ => {
            println!("{}", value);
        }
    }
}

fn print_result_table(result: &Value, envelope: &Map<String, Value>) {
    match result {
        Value::Object(res_map) if res_map.contains_key("matrix") => print_grid_table(res_map),
        Value::Object(res_map) => {
            println!("{}", field_table(res_map));
            // Row collections get their own tables
            for (key, val) in res_map {
                if let Value::Array(rows) = val {
                    if rows.first().is_some_and(Value::is_object) {
                        println!("\n{}:", key);
                        print_array_table(rows);
                    }
                }
            }
        }
        _ => println!("{}", display_value(result)),
    }

    // Print warnings if any
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    // Print methodology
    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

/// Field/Value table. Nested records are flattened one level as
/// `parent.child`; arrays are left to dedicated tables.
fn field_table(map: &Map<String, Value>) -> Table {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        match val {
            Value::Array(_) => {}
            Value::Object(inner) if !inner.contains_key("status") => {
                for (child, child_val) in inner {
                    if !child_val.is_array() && !is_plain_object(child_val) {
                        builder.push_record([format!("{key}.{child}"), display_value(child_val)]);
                    }
                }
            }
            _ => builder.push_record([key.clone(), display_value(val)]),
        }
    }
    builder.build()
}

fn is_plain_object(value: &Value) -> bool {
    value.as_object().is_some_and(|m| !m.contains_key("status"))
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    // Collect all keys from first object for headers
    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(headers.clone());

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(display_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}", builder.build());
    } else {
        // Simple array of values
        for item in arr {
            println!("{}", display_value(item));
        }
    }
}

/// Sensitivity grid with variable_1 down the side and variable_2 across the top.
fn print_grid_table(result: &Map<String, Value>) {
    let labels = |key: &str| -> Vec<String> {
        result
            .get(key)
            .and_then(Value::as_array)
            .map(|values| values.iter().map(display_value).collect())
            .unwrap_or_default()
    };
    let rows = labels("variable_1_values");
    let columns = labels("variable_2_values");

    let corner = format!(
        "{} \\ {}",
        result.get("variable_1").map(display_value).unwrap_or_default(),
        result.get("variable_2").map(display_value).unwrap_or_default()
    );
    let mut builder = Builder::default();
    let mut header = vec![corner];
    header.extend(columns);
    builder.push_record(header);

    if let Some(Value::Array(matrix)) = result.get("matrix") {
        for (label, row) in rows.iter().zip(matrix) {
            let mut record = vec![label.clone()];
            if let Value::Array(cells) = row {
                record.extend(cells.iter().map(|cell| match cell {
                    Value::Null => "-".to_string(),
                    other => display_value(other),
                }));
            }
            builder.push_record(record);
        }
    }
    println!("{}", builder.build());

    if let Some(base) = result.get("base_case_value") {
        println!(
            "\nBase case {}: {}",
            result.get("output_metric").map(display_value).unwrap_or_default(),
            display_value(base)
        );
    }
}
