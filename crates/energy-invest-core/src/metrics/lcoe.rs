use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::AppraisalError;
use crate::project::{ProjectConfiguration, Technology};
use crate::simulation::cashflow::YearlyTimeline;
use crate::types::Money;
use crate::AppraisalResult;

/// Why LCOE was not produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LcoeUnsupported {
    /// Costs cannot be allocated between co-installed technologies
    MixedAssetConfiguration,
    /// No energy is delivered over the horizon
    ZeroDiscountedEnergy,
    /// Only a net-cash-flow series was supplied
    MissingCostProfile,
}

/// Levelized cost per MWh delivered, or an explicit non-result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Lcoe {
    Defined(Money),
    Unsupported(LcoeUnsupported),
}

impl Lcoe {
    pub fn value(&self) -> Option<Money> {
        match self {
            Lcoe::Defined(value) => Some(*value),
            Lcoe::Unsupported(_) => None,
        }
    }
}

/// Discounted lifetime cost (CAPEX + operating cost) over discounted lifetime
/// energy, at the configured discount rate. Generation energy counts for
/// solar and wind, discharged energy for storage.
pub fn levelized_cost(config: &ProjectConfiguration, timeline: &YearlyTimeline) -> AppraisalResult<Lcoe> {
    if config.is_mixed() {
        return Ok(Lcoe::Unsupported(LcoeUnsupported::MixedAssetConfiguration));
    }

    let energy = if config.asset_mix.contains(Technology::Storage) {
        &timeline.storage_discharge_mwh
    } else {
        &timeline.generation_mwh
    };

    let one_plus_r = Decimal::ONE + config.discount_rate;
    let mut discount = Decimal::ONE;
    let mut discounted_cost = timeline.total_capex;
    let mut discounted_energy = Decimal::ZERO;

    for t in 1..timeline.len() {
        discount = discount
            .checked_mul(one_plus_r)
            .ok_or_else(|| AppraisalError::DivisionByZero {
                context: format!("LCOE discount factor overflow at period {t}"),
            })?;
        discounted_cost += checked_present_value(timeline.operating_cost[t], discount, t)?;
        discounted_energy += checked_present_value(energy[t], discount, t)?;
    }

    if discounted_energy.is_zero() {
        return Ok(Lcoe::Unsupported(LcoeUnsupported::ZeroDiscountedEnergy));
    }

    discounted_cost
        .checked_div(discounted_energy)
        .map(Lcoe::Defined)
        .ok_or_else(|| AppraisalError::DivisionByZero {
            context: "LCOE discounted energy".into(),
        })
}

fn checked_present_value(value: Decimal, discount: Decimal, t: usize) -> AppraisalResult<Decimal> {
    value
        .checked_div(discount)
        .ok_or_else(|| AppraisalError::DivisionByZero {
            context: format!("LCOE discount factor at period {t}"),
        })
}
