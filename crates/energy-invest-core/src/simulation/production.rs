use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::project::ProjectConfiguration;
use crate::types::MegawattHours;

/// Yearly energy volumes, indexed by project year (0..=lifetime).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionProfile {
    pub commissioning_year: u32,
    /// Energy generated by all generation technologies
    pub generation_mwh: Vec<MegawattHours>,
    /// Energy discharged by storage
    pub storage_discharge_mwh: Vec<MegawattHours>,
}

impl ProductionProfile {
    pub fn total_energy_mwh(&self) -> MegawattHours {
        self.generation_mwh.iter().sum::<Decimal>() + self.storage_discharge_mwh.iter().sum::<Decimal>()
    }
}

/// Convert installed capacity and asset mix into yearly energy volumes.
///
/// Years before commissioning stay at zero. From commissioning onwards every
/// technology degrades geometrically with asset age. Every generation
/// technology in the mix is credited with the full generation capacity.
#[instrument(skip_all, fields(mix = ?config.asset_mix))]
pub fn simulate_production(config: &ProjectConfiguration) -> ProductionProfile {
    let horizon = config.horizon_len();
    let commissioning_year = config.commissioning_year();
    let start = commissioning_year as usize;
    let assumptions = &config.assumptions;

    let mut generation_mwh = vec![Decimal::ZERO; horizon];
    let mut storage_discharge_mwh = vec![Decimal::ZERO; horizon];

    // (first-year energy, annual retention) per generation technology
    let generation_sources: Vec<(Decimal, Decimal)> = config
        .generation_technologies()
        .filter_map(|technology| assumptions.generation_profile(technology))
        .map(|profile| {
            (
                config.generation_capacity_mw * assumptions.hours_per_year * profile.capacity_factor,
                Decimal::ONE - profile.annual_degradation,
            )
        })
        .collect();

    let storage_first_year = if config.has_storage() {
        config.storage_energy_mwh() * Decimal::from(config.annual_cycles)
    } else {
        Decimal::ZERO
    };
    let storage_retention = Decimal::ONE - assumptions.storage.annual_degradation;

    // Iterative degradation factors, (1 - d)^age
    let mut generation_factors = vec![Decimal::ONE; generation_sources.len()];
    let mut storage_factor = Decimal::ONE;

    for t in start..horizon {
        if t > start {
            for (factor, (_, retention)) in generation_factors.iter_mut().zip(&generation_sources) {
                *factor *= *retention;
            }
            storage_factor *= storage_retention;
        }

        generation_mwh[t] = generation_sources
            .iter()
            .zip(&generation_factors)
            .map(|((first_year, _), factor)| *first_year * *factor)
            .sum();
        storage_discharge_mwh[t] = storage_first_year * storage_factor;
    }

    let profile = ProductionProfile {
        commissioning_year,
        generation_mwh,
        storage_discharge_mwh,
    };
    debug!(
        commissioning_year,
        total_energy_mwh = %profile.total_energy_mwh(),
        "Simulated production"
    );
    profile
}
