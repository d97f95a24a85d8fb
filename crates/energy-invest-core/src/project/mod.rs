//! Project definition: the asset mix, techno-economic inputs and the
//! technical assumptions every pipeline stage reads from.

pub mod assumptions;
pub mod presets;

use enumset::{EnumSet, EnumSetType};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::AppraisalError;
use crate::types::{Megawatts, Money, Rate};
use crate::AppraisalResult;

pub use assumptions::{GenerationProfile, ModelAssumptions, StorageProfile};
pub use presets::ProjectType;

/// An enabled asset capability.
#[derive(Debug, Serialize, Deserialize, EnumSetType)]
#[serde(rename_all = "snake_case")]
#[enumset(serialize_repr = "list")]
pub enum Technology {
    Solar,
    Wind,
    Storage,
}

impl Technology {
    pub fn is_generation(self) -> bool {
        !matches!(self, Technology::Storage)
    }
}

/// The set of technologies installed on the site.
pub type AssetMix = EnumSet<Technology>;

pub const DEFAULT_INFLATION_RATE: Rate = dec!(0.02);
pub const DEFAULT_LIFETIME_YEARS: u32 = 20;
pub const DEFAULT_TAX_RATE: Rate = dec!(0.18);
pub const DEFAULT_ARBITRAGE_SPREAD: Money = dec!(40);
pub const DEFAULT_ANNUAL_CYCLES: u32 = 300;
const MAX_LIFETIME_YEARS: u32 = 50;

/// Market and grid risks that derate the base case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFlags {
    /// Imbalance penalties and negative settlement balances
    #[serde(default)]
    pub imbalance_penalty: bool,
    /// Grid connection delivered late, pushing commissioning back
    #[serde(default)]
    pub connection_delay: bool,
}

/// Techno-economic input record for one appraisal run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    pub asset_mix: AssetMix,
    /// Installed generation capacity, applied to every generation technology in the mix
    #[serde(default)]
    pub generation_capacity_mw: Megawatts,
    #[serde(default)]
    pub storage_power_mw: Megawatts,
    #[serde(default)]
    pub storage_duration_hours: Decimal,
    /// CAPEX per MW of generation
    #[serde(default)]
    pub generation_capex_per_mw: Money,
    /// CAPEX per MWh of storage energy capacity
    #[serde(default)]
    pub storage_capex_per_mwh: Money,
    /// Fixed OPEX per installed MW (generation + storage) per year
    pub fixed_opex_per_mw_year: Money,
    /// Day-ahead wholesale price
    pub wholesale_price_per_mwh: Money,
    /// Net price captured per discharged MWh
    #[serde(default = "default_arbitrage_spread")]
    pub arbitrage_spread_per_mwh: Money,
    /// Availability payment per MW per available hour
    #[serde(default)]
    pub ancillary_price_per_mw_hour: Money,
    #[serde(default = "default_annual_cycles")]
    pub annual_cycles: u32,
    #[serde(default)]
    pub risks: RiskFlags,
    pub discount_rate: Rate,
    #[serde(default = "default_inflation_rate")]
    pub inflation_rate: Rate,
    #[serde(default = "default_lifetime_years")]
    pub lifetime_years: u32,
    #[serde(default = "default_tax_rate")]
    pub tax_rate: Rate,
    #[serde(default)]
    pub assumptions: ModelAssumptions,
}

fn default_arbitrage_spread() -> Money {
    DEFAULT_ARBITRAGE_SPREAD
}

fn default_annual_cycles() -> u32 {
    DEFAULT_ANNUAL_CYCLES
}

fn default_inflation_rate() -> Rate {
    DEFAULT_INFLATION_RATE
}

fn default_lifetime_years() -> u32 {
    DEFAULT_LIFETIME_YEARS
}

fn default_tax_rate() -> Rate {
    DEFAULT_TAX_RATE
}

impl ProjectConfiguration {
    pub fn has_storage(&self) -> bool {
        self.asset_mix.contains(Technology::Storage)
    }

    /// Generation technologies present in the mix, in declaration order.
    pub fn generation_technologies(&self) -> impl Iterator<Item = Technology> + '_ {
        self.asset_mix.iter().filter(|t| t.is_generation())
    }

    /// More than one technology installed.
    pub fn is_mixed(&self) -> bool {
        self.asset_mix.len() > 1
    }

    /// First year with production: 1, or later when the connection is delayed.
    pub fn commissioning_year(&self) -> u32 {
        if self.risks.connection_delay {
            1 + self.assumptions.connection_delay_years
        } else {
            1
        }
    }

    /// Number of yearly entries in every timeline array (years 0..=lifetime).
    pub fn horizon_len(&self) -> usize {
        self.lifetime_years as usize + 1
    }

    /// Installed storage energy capacity in MWh.
    pub fn storage_energy_mwh(&self) -> Decimal {
        self.storage_power_mw * self.storage_duration_hours
    }

    /// Total upfront capital expenditure, charged in year 0.
    pub fn total_capex(&self) -> Money {
        self.generation_capacity_mw * self.generation_capex_per_mw
            + self.storage_energy_mwh() * self.storage_capex_per_mwh
    }

    /// Reject nonsensical inputs before any simulation runs.
    pub fn validate(&self) -> AppraisalResult<()> {
        if self.asset_mix.is_empty() {
            return Err(AppraisalError::invalid(
                "asset_mix",
                "At least one technology must be selected",
            ));
        }

        let non_negative = [
            ("generation_capacity_mw", self.generation_capacity_mw),
            ("storage_power_mw", self.storage_power_mw),
            ("storage_duration_hours", self.storage_duration_hours),
            ("generation_capex_per_mw", self.generation_capex_per_mw),
            ("storage_capex_per_mwh", self.storage_capex_per_mwh),
            ("fixed_opex_per_mw_year", self.fixed_opex_per_mw_year),
            ("wholesale_price_per_mwh", self.wholesale_price_per_mwh),
            ("arbitrage_spread_per_mwh", self.arbitrage_spread_per_mwh),
            ("ancillary_price_per_mw_hour", self.ancillary_price_per_mw_hour),
        ];
        for (field, value) in non_negative {
            if value < Decimal::ZERO {
                return Err(AppraisalError::invalid(field, "Cannot be negative"));
            }
        }

        if self.generation_capacity_mw > Decimal::ZERO && self.generation_technologies().next().is_none() {
            return Err(AppraisalError::invalid(
                "generation_capacity_mw",
                "Generation capacity configured but no generation technology in the asset mix",
            ));
        }
        if self.storage_power_mw > Decimal::ZERO && !self.has_storage() {
            return Err(AppraisalError::invalid(
                "storage_power_mw",
                "Storage power configured but storage is not in the asset mix",
            ));
        }

        if self.discount_rate <= Decimal::ZERO || self.discount_rate >= Decimal::ONE {
            return Err(AppraisalError::invalid(
                "discount_rate",
                "Discount rate must be a fraction in (0, 1)",
            ));
        }
        if self.inflation_rate < Decimal::ZERO || self.inflation_rate >= Decimal::ONE {
            return Err(AppraisalError::invalid(
                "inflation_rate",
                "Inflation rate must be a fraction in [0, 1)",
            ));
        }
        if self.tax_rate < Decimal::ZERO || self.tax_rate >= Decimal::ONE {
            return Err(AppraisalError::invalid(
                "tax_rate",
                "Tax rate must be a fraction in [0, 1)",
            ));
        }

        self.assumptions.validate()?;

        if self.lifetime_years > MAX_LIFETIME_YEARS {
            return Err(AppraisalError::invalid(
                "lifetime_years",
                format!("Lifetime cannot exceed {MAX_LIFETIME_YEARS} years"),
            ));
        }
        if self.lifetime_years < self.commissioning_year() {
            return Err(AppraisalError::invalid(
                "lifetime_years",
                format!(
                    "Lifetime of {} years ends before commissioning in year {}",
                    self.lifetime_years,
                    self.commissioning_year()
                ),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use enumset::enum_set;

    fn solar_config() -> ProjectConfiguration {
        ProjectType::Solar.default_configuration()
    }

    #[test]
    fn test_capex_solar_only() {
        let cfg = solar_config();
        assert_eq!(cfg.generation_capacity_mw, dec!(5));
        assert_eq!(cfg.total_capex(), dec!(2_750_000));
    }

    #[test]
    fn test_capex_with_storage() {
        let cfg = ProjectType::SolarStorage.default_configuration();
        // 5 * 550_000 + 2 MW * 2 h * 250_000
        assert_eq!(cfg.total_capex(), dec!(3_750_000));
    }

    #[test]
    fn test_commissioning_year() {
        let mut cfg = solar_config();
        assert_eq!(cfg.commissioning_year(), 1);
        cfg.risks.connection_delay = true;
        assert_eq!(cfg.commissioning_year(), 2);
    }

    #[test]
    fn test_mix_queries() {
        let mut cfg = solar_config();
        assert!(!cfg.is_mixed());
        assert!(!cfg.has_storage());
        cfg.asset_mix = enum_set!(Technology::Solar | Technology::Wind);
        assert!(cfg.is_mixed());
        let gens: Vec<Technology> = cfg.generation_technologies().collect();
        assert_eq!(gens, vec![Technology::Solar, Technology::Wind]);
    }

    #[test]
    fn test_validation_empty_mix() {
        let mut cfg = solar_config();
        cfg.asset_mix = EnumSet::empty();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("asset_mix"));
    }

    #[test]
    fn test_validation_negative_capacity() {
        let mut cfg = solar_config();
        cfg.generation_capacity_mw = dec!(-1);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validation_discount_rate_bounds() {
        let mut cfg = solar_config();
        cfg.discount_rate = Decimal::ZERO;
        assert!(cfg.validate().is_err());
        cfg.discount_rate = dec!(-0.05);
        assert!(cfg.validate().is_err());
        cfg.discount_rate = Decimal::ONE;
        assert!(cfg.validate().is_err());
        cfg.discount_rate = dec!(0.12);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validation_storage_power_without_storage() {
        let mut cfg = solar_config();
        cfg.storage_power_mw = dec!(2);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validation_generation_without_generation_technology() {
        let mut cfg = ProjectType::Storage.default_configuration();
        cfg.generation_capacity_mw = dec!(3);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validation_lifetime_before_commissioning() {
        let mut cfg = solar_config();
        cfg.lifetime_years = 1;
        assert!(cfg.validate().is_ok());
        cfg.risks.connection_delay = true;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_minimal_json_uses_defaults() {
        let json = r#"{
            "asset_mix": ["solar"],
            "generation_capacity_mw": 5,
            "generation_capex_per_mw": 550000,
            "fixed_opex_per_mw_year": 12000,
            "wholesale_price_per_mwh": 80,
            "discount_rate": 0.12
        }"#;
        let cfg: ProjectConfiguration = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.asset_mix, enum_set!(Technology::Solar));
        assert_eq!(cfg.lifetime_years, 20);
        assert_eq!(cfg.tax_rate, dec!(0.18));
        assert_eq!(cfg.inflation_rate, dec!(0.02));
        assert_eq!(cfg.annual_cycles, 300);
        assert!(!cfg.risks.imbalance_penalty);
        assert!(cfg.validate().is_ok());
    }
}
