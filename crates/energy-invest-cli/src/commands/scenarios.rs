use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use energy_invest_core::scenarios::{
    self, OutputMetric, SensitivityInput, SensitivityVariable, SweepParameter,
};

use super::ConfigArgs;
use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MetricArg {
    Npv,
    Irr,
    PaybackYear,
}

impl From<MetricArg> for OutputMetric {
    fn from(metric: MetricArg) -> Self {
        match metric {
            MetricArg::Npv => OutputMetric::Npv,
            MetricArg::Irr => OutputMetric::Irr,
            MetricArg::PaybackYear => OutputMetric::PaybackYear,
        }
    }
}

/// Arguments for sensitivity analysis
#[derive(Args)]
pub struct SensitivityArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Path to a complete grid definition (base, variable_1, variable_2, output_metric)
    #[arg(long, conflicts_with_all = ["var1", "var2"])]
    pub grid: Option<String>,

    /// First sensitivity variable in format name:min:max:step
    /// (e.g. "wholesale_price:60:100:10")
    #[arg(long)]
    pub var1: Option<String>,

    /// Second sensitivity variable in format name:min:max:step
    /// (e.g. "discount_rate:0.06:0.14:0.02")
    #[arg(long)]
    pub var2: Option<String>,

    /// Metric reported in each cell
    #[arg(long, default_value = "npv")]
    pub metric: MetricArg,
}

fn parse_sens_var(definition: &str) -> Result<SensitivityVariable, Box<dyn std::error::Error>> {
    let parts: Vec<&str> = definition.split(':').collect();
    if parts.len() != 4 {
        return Err(format!(
            "Sensitivity variable must be name:min:max:step, got '{}'",
            definition
        )
        .into());
    }
    let parameter: SweepParameter = serde_json::from_value(Value::String(parts[0].to_string()))
        .map_err(|_| format!("Unknown sweep parameter '{}'", parts[0]))?;
    Ok(SensitivityVariable {
        parameter,
        min: parts[1].parse::<Decimal>()?,
        max: parts[2].parse::<Decimal>()?,
        step: parts[3].parse::<Decimal>()?,
    })
}

pub fn run_sensitivity(args: SensitivityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let sensitivity_input: SensitivityInput = if let Some(ref path) = args.grid {
        input::file::read_input(path)?
    } else {
        let var1 = args.var1.as_deref().ok_or("--var1 is required (or provide --grid)")?;
        let var2 = args.var2.as_deref().ok_or("--var2 is required (or provide --grid)")?;
        SensitivityInput {
            base: args.config.load()?,
            variable_1: parse_sens_var(var1)?,
            variable_2: parse_sens_var(var2)?,
            output_metric: args.metric.into(),
        }
    };

    let result = scenarios::evaluate_sensitivity(&sensitivity_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for the risk scenario matrix
#[derive(Args)]
pub struct RiskScenarioArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

pub fn run_risk_scenarios(args: RiskScenarioArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let config = args.config.load()?;
    let result = scenarios::analyze_risk_scenarios(&config)?;
    Ok(serde_json::to_value(result)?)
}
