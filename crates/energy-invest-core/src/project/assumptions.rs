use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::AppraisalError;
use crate::project::Technology;
use crate::types::Rate;
use crate::AppraisalResult;

/// Output characteristics of one generation technology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationProfile {
    /// Fraction of nameplate energy realised over a year
    pub capacity_factor: Decimal,
    /// Annual fractional output decline
    pub annual_degradation: Rate,
}

/// Output and market characteristics of battery storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageProfile {
    /// Annual fractional decline in usable energy capacity
    pub annual_degradation: Rate,
    /// Discharged energy / energy drawn from the grid
    pub round_trip_efficiency: Decimal,
    /// Share of the year the asset is available for ancillary services
    pub ancillary_availability: Decimal,
    /// Charging price = wholesale price - this discount
    pub charging_price_discount: Decimal,
    /// Lowest charging price per MWh before indexation
    pub charging_price_floor: Decimal,
}

/// Technical constants injected into every pipeline stage.
///
/// The defaults reproduce the reference model; override them to test the
/// appraisal against other engineering assumptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelAssumptions {
    pub solar: GenerationProfile,
    pub wind: GenerationProfile,
    pub storage: StorageProfile,
    /// Revenue multiplier applied when the imbalance-penalty risk is set
    pub imbalance_revenue_factor: Decimal,
    /// Years added to commissioning when the connection-delay risk is set
    pub connection_delay_years: u32,
    pub hours_per_year: Decimal,
}

impl Default for ModelAssumptions {
    fn default() -> Self {
        Self {
            solar: GenerationProfile {
                capacity_factor: dec!(0.14),
                annual_degradation: dec!(0.005),
            },
            wind: GenerationProfile {
                capacity_factor: dec!(0.35),
                annual_degradation: dec!(0.005),
            },
            storage: StorageProfile {
                annual_degradation: dec!(0.02),
                round_trip_efficiency: dec!(0.85),
                ancillary_availability: dec!(0.90),
                charging_price_discount: dec!(40),
                charging_price_floor: dec!(10),
            },
            imbalance_revenue_factor: dec!(0.92),
            connection_delay_years: 1,
            hours_per_year: dec!(8760),
        }
    }
}

impl ModelAssumptions {
    /// Generation profile of a technology; `None` for storage.
    pub fn generation_profile(&self, technology: Technology) -> Option<&GenerationProfile> {
        match technology {
            Technology::Solar => Some(&self.solar),
            Technology::Wind => Some(&self.wind),
            Technology::Storage => None,
        }
    }

    pub(crate) fn validate(&self) -> AppraisalResult<()> {
        for (name, profile) in [("solar", &self.solar), ("wind", &self.wind)] {
            check_fraction(
                &format!("assumptions.{name}.capacity_factor"),
                profile.capacity_factor,
                true,
            )?;
            check_fraction(
                &format!("assumptions.{name}.annual_degradation"),
                profile.annual_degradation,
                false,
            )?;
        }

        let storage = &self.storage;
        check_fraction("assumptions.storage.annual_degradation", storage.annual_degradation, false)?;
        check_fraction(
            "assumptions.storage.ancillary_availability",
            storage.ancillary_availability,
            true,
        )?;
        if storage.round_trip_efficiency <= Decimal::ZERO || storage.round_trip_efficiency > Decimal::ONE {
            return Err(AppraisalError::invalid(
                "assumptions.storage.round_trip_efficiency",
                "Round-trip efficiency must be in (0, 1]",
            ));
        }
        if storage.charging_price_discount < Decimal::ZERO {
            return Err(AppraisalError::invalid(
                "assumptions.storage.charging_price_discount",
                "Charging price discount cannot be negative",
            ));
        }
        if storage.charging_price_floor < Decimal::ZERO {
            return Err(AppraisalError::invalid(
                "assumptions.storage.charging_price_floor",
                "Charging price floor cannot be negative",
            ));
        }

        check_fraction("assumptions.imbalance_revenue_factor", self.imbalance_revenue_factor, true)?;
        if self.hours_per_year <= Decimal::ZERO {
            return Err(AppraisalError::invalid(
                "assumptions.hours_per_year",
                "Hours per year must be positive",
            ));
        }

        Ok(())
    }
}

/// `inclusive_one` allows exactly 1 (factors); degradation must stay below 1.
fn check_fraction(field: &str, value: Decimal, inclusive_one: bool) -> AppraisalResult<()> {
    let above = if inclusive_one {
        value > Decimal::ONE
    } else {
        value >= Decimal::ONE
    };
    if value < Decimal::ZERO || above {
        let bound = if inclusive_one { "[0, 1]" } else { "[0, 1)" };
        return Err(AppraisalError::invalid(field, format!("Must be a fraction in {bound}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_model() {
        let a = ModelAssumptions::default();
        assert_eq!(a.solar.capacity_factor, dec!(0.14));
        assert_eq!(a.wind.capacity_factor, dec!(0.35));
        assert_eq!(a.storage.round_trip_efficiency, dec!(0.85));
        assert_eq!(a.connection_delay_years, 1);
        assert!(a.validate().is_ok());
    }

    #[test]
    fn test_each_generation_variant_resolves_its_profile() {
        let a = ModelAssumptions::default();
        assert_eq!(a.generation_profile(Technology::Solar), Some(&a.solar));
        assert_eq!(a.generation_profile(Technology::Wind), Some(&a.wind));
        assert_eq!(a.generation_profile(Technology::Storage), None);
    }

    #[test]
    fn test_degradation_of_one_rejected() {
        let mut a = ModelAssumptions::default();
        a.storage.annual_degradation = Decimal::ONE;
        assert!(a.validate().is_err());
    }

    #[test]
    fn test_zero_efficiency_rejected() {
        let mut a = ModelAssumptions::default();
        a.storage.round_trip_efficiency = Decimal::ZERO;
        assert!(a.validate().is_err());
    }

    #[test]
    fn test_partial_override_deserializes() {
        let a: ModelAssumptions =
            serde_json::from_str(r#"{ "connection_delay_years": 2 }"#).unwrap();
        assert_eq!(a.connection_delay_years, 2);
        assert_eq!(a.solar, ModelAssumptions::default().solar);
    }
}
