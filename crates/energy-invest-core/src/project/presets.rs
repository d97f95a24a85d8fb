use enumset::enum_set;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{
    ModelAssumptions, ProjectConfiguration, RiskFlags, Technology, DEFAULT_ANNUAL_CYCLES,
    DEFAULT_ARBITRAGE_SPREAD, DEFAULT_INFLATION_RATE, DEFAULT_LIFETIME_YEARS, DEFAULT_TAX_RATE,
};

/// Project archetypes with ready-made starting inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    Solar,
    Wind,
    Storage,
    SolarStorage,
}

impl ProjectType {
    pub const ALL: [ProjectType; 4] = [
        ProjectType::Solar,
        ProjectType::Wind,
        ProjectType::Storage,
        ProjectType::SolarStorage,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ProjectType::Solar => "Solar PV",
            ProjectType::Wind => "Onshore wind",
            ProjectType::Storage => "Battery storage",
            ProjectType::SolarStorage => "Solar PV + battery storage",
        }
    }

    /// Typical utility-scale inputs for the archetype. Imbalance risk is on by
    /// default since most merchant projects are exposed to it.
    pub fn default_configuration(self) -> ProjectConfiguration {
        let asset_mix = match self {
            ProjectType::Solar => enum_set!(Technology::Solar),
            ProjectType::Wind => enum_set!(Technology::Wind),
            ProjectType::Storage => enum_set!(Technology::Storage),
            ProjectType::SolarStorage => enum_set!(Technology::Solar | Technology::Storage),
        };

        let (generation_capacity_mw, generation_capex_per_mw) = match self {
            ProjectType::Solar | ProjectType::SolarStorage => (dec!(5), dec!(550_000)),
            ProjectType::Wind => (dec!(10), dec!(1_000_000)),
            ProjectType::Storage => (Decimal::ZERO, Decimal::ZERO),
        };

        let with_storage = asset_mix.contains(Technology::Storage);
        let (storage_power_mw, storage_duration_hours, storage_capex_per_mwh, ancillary) =
            if with_storage {
                (dec!(2), dec!(2), dec!(250_000), dec!(20))
            } else {
                (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO, Decimal::ZERO)
            };

        ProjectConfiguration {
            project_name: Some(self.label().to_string()),
            asset_mix,
            generation_capacity_mw,
            storage_power_mw,
            storage_duration_hours,
            generation_capex_per_mw,
            storage_capex_per_mwh,
            fixed_opex_per_mw_year: dec!(12_000),
            wholesale_price_per_mwh: dec!(80),
            arbitrage_spread_per_mwh: DEFAULT_ARBITRAGE_SPREAD,
            ancillary_price_per_mw_hour: ancillary,
            annual_cycles: DEFAULT_ANNUAL_CYCLES,
            risks: RiskFlags {
                imbalance_penalty: true,
                connection_delay: false,
            },
            discount_rate: dec!(0.12),
            inflation_rate: DEFAULT_INFLATION_RATE,
            lifetime_years: DEFAULT_LIFETIME_YEARS,
            tax_rate: DEFAULT_TAX_RATE,
            assumptions: ModelAssumptions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_preset_is_valid() {
        for project_type in ProjectType::ALL {
            let cfg = project_type.default_configuration();
            assert!(cfg.validate().is_ok(), "{project_type:?} preset failed validation");
        }
    }

    #[test]
    fn test_wind_preset() {
        let cfg = ProjectType::Wind.default_configuration();
        assert_eq!(cfg.total_capex(), dec!(10_000_000));
        assert!(!cfg.has_storage());
    }

    #[test]
    fn test_storage_preset_has_no_generation() {
        let cfg = ProjectType::Storage.default_configuration();
        assert_eq!(cfg.generation_technologies().count(), 0);
        assert_eq!(cfg.storage_energy_mwh(), dec!(4));
        assert_eq!(cfg.total_capex(), dec!(1_000_000));
    }

    #[test]
    fn test_hybrid_preset_is_mixed() {
        assert!(ProjectType::SolarStorage.default_configuration().is_mixed());
    }
}
