use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;

use energy_invest_core::project::{ProjectConfiguration, ProjectType};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse_configuration(config_json: &str) -> NapiResult<ProjectConfiguration> {
    serde_json::from_str(config_json).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Appraisal pipeline
// ---------------------------------------------------------------------------

#[napi]
pub fn appraise_project(config_json: String) -> NapiResult<String> {
    let config = parse_configuration(&config_json)?;
    let output = energy_invest_core::appraisal::appraise_project(&config).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Year-by-year rows, including the cumulative position.
#[napi]
pub fn project_timeline(config_json: String) -> NapiResult<String> {
    let config = parse_configuration(&config_json)?;
    let (timeline, _) = energy_invest_core::appraisal::evaluate_project(&config).map_err(to_napi_error)?;
    serde_json::to_string(&timeline.years()).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct MetricsInput {
    cash_flows: Vec<Decimal>,
    discount_rate: Decimal,
}

#[napi]
pub fn compute_metrics(input_json: String) -> NapiResult<String> {
    let input: MetricsInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = energy_invest_core::metrics::compute_metrics(&input.cash_flows, input.discount_rate)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[napi]
pub fn sensitivity_grid(input_json: String) -> NapiResult<String> {
    let input: energy_invest_core::scenarios::SensitivityInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = energy_invest_core::scenarios::evaluate_sensitivity(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn risk_scenarios(config_json: String) -> NapiResult<String> {
    let config = parse_configuration(&config_json)?;
    let output = energy_invest_core::scenarios::analyze_risk_scenarios(&config).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Presets
// ---------------------------------------------------------------------------

/// `project_type` is one of `solar`, `wind`, `storage`, `solar_storage`.
#[napi]
pub fn preset_configuration(project_type: String) -> NapiResult<String> {
    let project_type: ProjectType =
        serde_json::from_value(serde_json::Value::String(project_type)).map_err(to_napi_error)?;
    serde_json::to_string(&project_type.default_configuration()).map_err(to_napi_error)
}
