use serde_json::Value;
use std::io;

use energy_invest_core::types::CashFlowRow;

use super::currency::format_currency;
use super::display_value;

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) -> Result<(), Box<dyn std::error::Error>> {
    write_csv(io::stdout().lock(), value)
}

/// Write output as CSV to any writer, flushing at the end.
pub fn write_csv<W: io::Write>(writer: W, value: &Value) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = csv::Writer::from_writer(writer);
    write_value(&mut wtr, value)?;
    wtr.flush()?;
    Ok(())
}

fn write_value<W: io::Write>(wtr: &mut csv::Writer<W>, value: &Value) -> csv::Result<()> {
    match value {
        Value::Object(map) => {
            let body = map.get("result").unwrap_or(value);
            if let Some(Value::Array(rows)) = body.get("cash_flows") {
                // Appraisal: the cash flow table is the tabular part
                write_array_csv(wtr, rows)?;
            } else if let Some(Value::Array(results)) = body.get("results") {
                write_array_csv(wtr, results)?;
            } else if let Some(Value::Array(matrix)) = body.get("matrix") {
                write_grid_csv(wtr, body, matrix)?;
            } else if let Value::Object(fields) = body {
                wtr.write_record(["field", "value"])?;
                for (key, val) in fields {
                    wtr.write_record([key.as_str(), &display_value(val)])?;
                }
            }
        }
        Value::Array(arr) => write_array_csv(wtr, arr)?,
        _ => wtr.write_record([&display_value(value)])?,
    }
    Ok(())
}

fn write_array_csv<W: io::Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) -> csv::Result<()> {
    if arr.is_empty() {
        return Ok(());
    }

    // Extract headers from first object
    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
        wtr.write_record(&headers)?;

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(*h).map(display_value).unwrap_or_default())
                    .collect();
                wtr.write_record(&row)?;
            }
        }
    } else {
        for item in arr {
            wtr.write_record([&display_value(item)])?;
        }
    }
    Ok(())
}

/// Sensitivity grid: one row per variable_1 value, one column per variable_2 value.
fn write_grid_csv<W: io::Write>(wtr: &mut csv::Writer<W>, body: &Value, matrix: &[Value]) -> csv::Result<()> {
    let column_values: Vec<String> = body
        .get("variable_2_values")
        .and_then(Value::as_array)
        .map(|values| values.iter().map(display_value).collect())
        .unwrap_or_default();
    let row_values: Vec<String> = body
        .get("variable_1_values")
        .and_then(Value::as_array)
        .map(|values| values.iter().map(display_value).collect())
        .unwrap_or_default();

    let corner = format!(
        "{}\\{}",
        body.get("variable_1").map(display_value).unwrap_or_default(),
        body.get("variable_2").map(display_value).unwrap_or_default()
    );
    let mut header = vec![corner];
    header.extend(column_values);
    wtr.write_record(&header)?;

    for (label, row) in row_values.iter().zip(matrix) {
        let mut record = vec![label.clone()];
        if let Value::Array(cells) = row {
            record.extend(cells.iter().map(display_value));
        }
        wtr.write_record(&record)?;
    }
    Ok(())
}

/// Write the `{year, net, cumulative}` table with currency-formatted amounts.
pub fn write_cash_flows<W: io::Write>(writer: W, rows: &[CashFlowRow]) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["year", "net_cash_flow", "cumulative_cash_flow"])?;
    for row in rows {
        wtr.write_record([
            row.year.to_string(),
            format_currency(row.net_cash_flow),
            format_currency(row.cumulative_cash_flow),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Export the cash flow table to a CSV file.
pub fn export_cash_flows(path: &str, rows: &[CashFlowRow]) -> Result<(), Box<dyn std::error::Error>> {
    let file = std::fs::File::create(path).map_err(|e| format!("Failed to create '{}': {}", path, e))?;
    write_cash_flows(file, rows)
}
