pub mod appraise;
pub mod metrics;
pub mod preset;
pub mod scenarios;
pub mod timeline;

use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use tracing::debug;

use energy_invest_core::project::{ProjectConfiguration, ProjectType};

use crate::input;

/// Project archetype selectable on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PresetKind {
    Solar,
    Wind,
    Storage,
    SolarStorage,
}

impl From<PresetKind> for ProjectType {
    fn from(kind: PresetKind) -> Self {
        match kind {
            PresetKind::Solar => ProjectType::Solar,
            PresetKind::Wind => ProjectType::Wind,
            PresetKind::Storage => ProjectType::Storage,
            PresetKind::SolarStorage => ProjectType::SolarStorage,
        }
    }
}

/// Where the project configuration comes from, plus per-field overrides
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Path to JSON or YAML configuration file (overrides --preset)
    #[arg(long)]
    pub input: Option<String>,

    /// Start from the default configuration of a project type
    #[arg(long)]
    pub preset: Option<PresetKind>,

    /// Discount rate as a decimal (0.12 = 12%)
    #[arg(long)]
    pub discount_rate: Option<Decimal>,

    /// Day-ahead wholesale price per MWh
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Apply the imbalance-penalty risk
    #[arg(long)]
    pub imbalance_risk: Option<bool>,

    /// Apply the grid connection-delay risk
    #[arg(long)]
    pub connection_delay: Option<bool>,

    /// Operating lifetime in years
    #[arg(long)]
    pub lifetime: Option<u32>,
}

impl ConfigArgs {
    /// Resolve the configuration: file, then preset, then piped stdin.
    pub fn load(&self) -> Result<ProjectConfiguration, Box<dyn std::error::Error>> {
        let mut config: ProjectConfiguration = if let Some(ref path) = self.input {
            input::file::read_input(path)?
        } else if let Some(kind) = self.preset {
            ProjectType::from(kind).default_configuration()
        } else if let Some(data) = input::stdin::read_stdin()? {
            serde_json::from_value(data)?
        } else {
            return Err("--input <file>, --preset <type> or stdin required".into());
        };

        self.apply_overrides(&mut config);
        debug!(?config, "Loaded project configuration");
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut ProjectConfiguration) {
        if let Some(rate) = self.discount_rate {
            config.discount_rate = rate;
        }
        if let Some(price) = self.price {
            config.wholesale_price_per_mwh = price;
        }
        if let Some(flag) = self.imbalance_risk {
            config.risks.imbalance_penalty = flag;
        }
        if let Some(flag) = self.connection_delay {
            config.risks.connection_delay = flag;
        }
        if let Some(years) = self.lifetime {
            config.lifetime_years = years;
        }
    }
}
