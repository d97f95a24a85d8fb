use clap::Args;
use serde_json::Value;

use energy_invest_core::appraisal;

use super::ConfigArgs;

/// Arguments for the full project appraisal
#[derive(Args)]
pub struct AppraiseArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

pub fn run_appraise(args: AppraiseArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let config = args.config.load()?;
    let result = appraisal::appraise_project(&config)?;
    Ok(serde_json::to_value(result)?)
}
