use clap::Args;
use serde_json::Value;
use tracing::info;

use energy_invest_core::appraisal;

use super::ConfigArgs;
use crate::output::csv_out;

/// Arguments for the yearly cash flow timeline
#[derive(Args)]
pub struct TimelineArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Also write the cash flow table, currency formatted, to this CSV file
    #[arg(long)]
    pub export: Option<String>,
}

pub fn run_timeline(args: TimelineArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let config = args.config.load()?;
    let (timeline, _) = appraisal::evaluate_project(&config)?;

    if let Some(ref path) = args.export {
        csv_out::export_cash_flows(path, &timeline.cash_flow_rows())?;
        info!(path = %path, "Exported cash flow table");
    }

    Ok(serde_json::to_value(timeline.years())?)
}
