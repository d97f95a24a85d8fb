use clap::Args;
use serde_json::Value;

use energy_invest_core::project::ProjectType;

use super::PresetKind;

/// Arguments for printing a preset configuration
#[derive(Args)]
pub struct PresetArgs {
    /// Project type
    #[arg(value_enum)]
    pub project_type: PresetKind,
}

/// The preset is printed bare so it can be saved and edited as an input file.
pub fn run_preset(args: PresetArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let config = ProjectType::from(args.project_type).default_configuration();
    Ok(serde_json::to_value(config)?)
}
