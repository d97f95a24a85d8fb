mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::appraise::AppraiseArgs;
use commands::metrics::MetricsArgs;
use commands::preset::PresetArgs;
use commands::scenarios::{RiskScenarioArgs, SensitivityArgs};
use commands::timeline::TimelineArgs;

/// Investment appraisal for solar, wind and battery storage projects
#[derive(Parser)]
#[command(
    name = "energy-invest",
    version,
    about = "Investment appraisal for solar, wind and battery storage projects",
    long_about = "A CLI that simulates annual production, projects indexed and taxed \
                  cash flows, and reports IRR, NPV, payback and LCOE for renewable \
                  generation and storage projects, with decimal precision."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log pipeline stages to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full appraisal: production, cash flows and metrics
    Appraise(AppraiseArgs),
    /// Year-by-year cash flow timeline, optionally exported to CSV
    Timeline(TimelineArgs),
    /// IRR, NPV and payback for a bare net cash flow series
    Metrics(MetricsArgs),
    /// Two-way sensitivity grid over configuration parameters
    Sensitivity(SensitivityArgs),
    /// Appraise every combination of the imbalance and connection-delay risks
    RiskScenarios(RiskScenarioArgs),
    /// Print the default configuration of a project type
    Preset(PresetArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Appraise(args) => commands::appraise::run_appraise(args),
        Commands::Timeline(args) => commands::timeline::run_timeline(args),
        Commands::Metrics(args) => commands::metrics::run_metrics(args),
        Commands::Sensitivity(args) => commands::scenarios::run_sensitivity(args),
        Commands::RiskScenarios(args) => commands::scenarios::run_risk_scenarios(args),
        Commands::Preset(args) => commands::preset::run_preset(args),
        Commands::Version => {
            println!("energy-invest {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result.and_then(|value| output::format_output(&cli.output, &value)) {
        Ok(()) => process::exit(0),
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
