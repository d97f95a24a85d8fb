use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{info, instrument, warn};

use crate::metrics::{self, levelized_cost, FinancialMetrics, Lcoe, Payback};
use crate::project::ProjectConfiguration;
use crate::simulation::cashflow::{project_cashflows, YearlyTimeline};
use crate::simulation::production::simulate_production;
use crate::time_value::IrrOutcome;
use crate::types::{with_metadata, CashFlowRow, ComputationOutput, MegawattHours, Money};
use crate::AppraisalResult;

/// Complete appraisal of one project configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectAppraisal {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    pub total_capex: Money,
    /// Lifetime generation plus storage discharge
    pub total_energy_mwh: MegawattHours,
    pub commissioning_year: u32,
    pub metrics: FinancialMetrics,
    /// `{year, net, cumulative}` rows for display and export
    pub cash_flows: Vec<CashFlowRow>,
    pub timeline: YearlyTimeline,
}

/// Validate, simulate, project and reduce: the bare pipeline with no envelope.
pub fn evaluate_project(config: &ProjectConfiguration) -> AppraisalResult<(YearlyTimeline, FinancialMetrics)> {
    config.validate()?;

    let production = simulate_production(config);
    let timeline = project_cashflows(config, &production)?;
    let mut metrics = metrics::compute_metrics(&timeline.net_cash_flow, config.discount_rate)?;
    metrics.lcoe = levelized_cost(config, &timeline)?;

    Ok((timeline, metrics))
}

/// Run the full appraisal and wrap it with methodology, assumptions and
/// advisory warnings.
#[instrument(skip_all, fields(project = config.project_name.as_deref().unwrap_or("unnamed")))]
pub fn appraise_project(config: &ProjectConfiguration) -> AppraisalResult<ComputationOutput<ProjectAppraisal>> {
    let start = Instant::now();

    let (timeline, metrics) = evaluate_project(config)?;
    let warnings = advisory_warnings(config, &metrics);
    for warning in &warnings {
        warn!("{warning}");
    }

    info!(
        npv = %metrics.npv,
        irr = ?metrics.irr,
        payback = ?metrics.payback,
        "Project appraised"
    );

    let output = ProjectAppraisal {
        project_name: config.project_name.clone(),
        total_capex: timeline.total_capex,
        total_energy_mwh: timeline.total_energy_mwh(),
        commissioning_year: timeline.commissioning_year,
        metrics,
        cash_flows: timeline.cash_flow_rows(),
        timeline,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Annual production simulation, indexed cash flow projection, NPV/IRR/payback/LCOE",
        &serde_json::json!({
            "asset_mix": config.asset_mix,
            "generation_capacity_mw": config.generation_capacity_mw.to_string(),
            "storage_power_mw": config.storage_power_mw.to_string(),
            "storage_duration_hours": config.storage_duration_hours.to_string(),
            "discount_rate": config.discount_rate.to_string(),
            "inflation_rate": config.inflation_rate.to_string(),
            "tax_rate": config.tax_rate.to_string(),
            "lifetime_years": config.lifetime_years,
            "risks": config.risks,
            "model": config.assumptions,
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Observations worth surfacing to the user. None of them stop the appraisal.
fn advisory_warnings(config: &ProjectConfiguration, metrics: &FinancialMetrics) -> Vec<String> {
    let mut warnings = Vec::new();

    if let IrrOutcome::Undefined(reason) = metrics.irr {
        warnings.push(format!("IRR is undefined ({reason:?}); shown as 0%"));
    }
    if metrics.payback == Payback::NotRecovered {
        warnings.push(format!(
            "Capital is not recovered within the {}-year horizon",
            config.lifetime_years
        ));
    }
    if let Lcoe::Unsupported(reason) = metrics.lcoe {
        warnings.push(format!("LCOE not reported: {reason:?}"));
    }

    if config.generation_technologies().count() > 1 {
        warnings.push(format!(
            "Generation capacity of {} MW is applied to each generation technology in the mix",
            config.generation_capacity_mw
        ));
    }

    if config.discount_rate < dec!(0.05) || config.discount_rate > dec!(0.25) {
        warnings.push(format!(
            "Discount rate of {} is outside the typical 5%-25% range",
            config.discount_rate
        ));
    }

    if config.has_storage() && config.storage_power_mw > Decimal::ZERO {
        if config.storage_duration_hours < Decimal::ONE || config.storage_duration_hours > dec!(4) {
            warnings.push(format!(
                "Storage duration of {} h is outside the typical 1-4 h range",
                config.storage_duration_hours
            ));
        }
        if !(100..=700).contains(&config.annual_cycles) {
            warnings.push(format!(
                "{} cycles per year is outside the typical 100-700 range",
                config.annual_cycles
            ));
        }
        let storage = &config.assumptions.storage;
        if config.wholesale_price_per_mwh - storage.charging_price_discount < storage.charging_price_floor {
            warnings.push(format!(
                "Charging price floored at {} per MWh",
                storage.charging_price_floor
            ));
        }
    }

    warnings
}
