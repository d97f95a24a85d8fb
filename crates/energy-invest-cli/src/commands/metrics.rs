use clap::Args;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use energy_invest_core::metrics;

use crate::input;

/// Arguments for metrics over a bare cash flow series
#[derive(Args)]
pub struct MetricsArgs {
    /// Path to JSON or YAML file with `cash_flows` and `discount_rate`
    #[arg(long)]
    pub input: Option<String>,

    /// Net cash flows by year, year 0 first (comma-separated, e.g. "-1000,400,400,400")
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub cash_flows: Option<Vec<Decimal>>,

    /// Discount rate as a decimal (0.12 = 12%)
    #[arg(long)]
    pub discount_rate: Option<Decimal>,
}

#[derive(Deserialize)]
struct MetricsInput {
    cash_flows: Vec<Decimal>,
    discount_rate: Decimal,
}

pub fn run_metrics(args: MetricsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let metrics_input: MetricsInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(cash_flows) = args.cash_flows {
        let discount_rate = args
            .discount_rate
            .ok_or("--discount-rate is required with --cash-flows")?;
        MetricsInput {
            cash_flows,
            discount_rate,
        }
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--cash-flows and --discount-rate (or --input) are required".into());
    };

    let result = metrics::compute_metrics(&metrics_input.cash_flows, metrics_input.discount_rate)?;
    Ok(serde_json::to_value(result)?)
}
