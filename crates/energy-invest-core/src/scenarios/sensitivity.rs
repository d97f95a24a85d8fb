use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, instrument};

use crate::appraisal::evaluate_project;
use crate::error::AppraisalError;
use crate::metrics::FinancialMetrics;
use crate::project::ProjectConfiguration;
use crate::types::*;
use crate::AppraisalResult;

const MAX_SWEEP_POINTS: usize = 101;

/// Configuration field varied along one axis of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepParameter {
    DiscountRate,
    WholesalePrice,
    GenerationCapex,
    StorageCapex,
    FixedOpex,
    ArbitrageSpread,
    AncillaryPrice,
    GenerationCapacity,
}

impl SweepParameter {
    fn current(self, config: &ProjectConfiguration) -> Decimal {
        match self {
            SweepParameter::DiscountRate => config.discount_rate,
            SweepParameter::WholesalePrice => config.wholesale_price_per_mwh,
            SweepParameter::GenerationCapex => config.generation_capex_per_mw,
            SweepParameter::StorageCapex => config.storage_capex_per_mwh,
            SweepParameter::FixedOpex => config.fixed_opex_per_mw_year,
            SweepParameter::ArbitrageSpread => config.arbitrage_spread_per_mwh,
            SweepParameter::AncillaryPrice => config.ancillary_price_per_mw_hour,
            SweepParameter::GenerationCapacity => config.generation_capacity_mw,
        }
    }

    fn apply(self, config: &mut ProjectConfiguration, value: Decimal) {
        let field = match self {
            SweepParameter::DiscountRate => &mut config.discount_rate,
            SweepParameter::WholesalePrice => &mut config.wholesale_price_per_mwh,
            SweepParameter::GenerationCapex => &mut config.generation_capex_per_mw,
            SweepParameter::StorageCapex => &mut config.storage_capex_per_mwh,
            SweepParameter::FixedOpex => &mut config.fixed_opex_per_mw_year,
            SweepParameter::ArbitrageSpread => &mut config.arbitrage_spread_per_mwh,
            SweepParameter::AncillaryPrice => &mut config.ancillary_price_per_mw_hour,
            SweepParameter::GenerationCapacity => &mut config.generation_capacity_mw,
        };
        *field = value;
    }
}

/// Metric reported in each grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMetric {
    Npv,
    Irr,
    PaybackYear,
}

impl OutputMetric {
    /// `None` when the metric is undefined for this cell.
    fn extract(self, metrics: &FinancialMetrics) -> Option<Decimal> {
        match self {
            OutputMetric::Npv => Some(metrics.npv),
            OutputMetric::Irr => metrics.irr.rate(),
            OutputMetric::PaybackYear => metrics.payback.year().map(Decimal::from),
        }
    }
}

/// Sweep range for one parameter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityVariable {
    pub parameter: SweepParameter,
    pub min: Decimal,
    pub max: Decimal,
    pub step: Decimal,
}

/// Input for 2-way sensitivity analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityInput {
    /// Base case configuration; every cell overrides two of its fields
    pub base: ProjectConfiguration,
    pub variable_1: SensitivityVariable,
    pub variable_2: SensitivityVariable,
    pub output_metric: OutputMetric,
}

/// Output of 2-way sensitivity analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityOutput {
    pub variable_1: SweepParameter,
    pub variable_2: SweepParameter,
    pub variable_1_values: Vec<Decimal>,
    pub variable_2_values: Vec<Decimal>,
    pub output_metric: OutputMetric,
    /// Matrix[i][j] = metric when variable_1 = values_1[i], variable_2 = values_2[j];
    /// `None` where the metric is undefined or the cell is invalid
    pub matrix: Vec<Vec<Option<Decimal>>>,
    /// Metric of the unmodified base configuration
    pub base_case_value: Option<Decimal>,
    /// Grid cell closest to the base configuration (row, col)
    pub base_case_position: (usize, usize),
}

/// Generate the sweep values for a sensitivity variable from min to max with step.
fn generate_sweep_values(var: &SensitivityVariable) -> AppraisalResult<Vec<Decimal>> {
    let field = format!("variable:{:?}", var.parameter);
    if var.step <= Decimal::ZERO {
        return Err(AppraisalError::invalid(&field, "Step must be positive"));
    }
    if var.min > var.max {
        return Err(AppraisalError::invalid(&field, "Min must be <= max"));
    }

    let too_many_points = || {
        AppraisalError::invalid(
            &field,
            format!("Sweep exceeds {MAX_SWEEP_POINTS} points; widen the step"),
        )
    };
    let points = var
        .max
        .checked_sub(var.min)
        .and_then(|span| span.checked_div(var.step))
        .ok_or_else(too_many_points)?
        .floor();
    if points >= Decimal::from(MAX_SWEEP_POINTS) {
        return Err(too_many_points());
    }

    let mut values = Vec::new();
    let mut current = var.min;
    while current <= var.max {
        values.push(current);
        match current.checked_add(var.step) {
            Some(next) => current = next,
            None => break,
        }
    }
    // Ensure max is included if step doesn't land exactly on it
    if let Some(&last) = values.last() {
        if last < var.max {
            values.push(var.max);
        }
    }

    Ok(values)
}

/// Find the closest index to a target value in a sorted list.
fn closest_index(values: &[Decimal], target: Decimal) -> usize {
    values
        .iter()
        .enumerate()
        .min_by_key(|(_, v)| (**v - target).abs())
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Evaluate a 2-way sensitivity grid over the full appraisal pipeline.
///
/// Rows are evaluated in parallel; every cell is an independent run with
/// its own configuration copy. A cell whose configuration fails validation
/// is left empty and reported as a warning.
#[instrument(skip_all, fields(v1 = ?input.variable_1.parameter, v2 = ?input.variable_2.parameter))]
pub fn evaluate_sensitivity(input: &SensitivityInput) -> AppraisalResult<ComputationOutput<SensitivityOutput>> {
    let start = Instant::now();

    if input.variable_1.parameter == input.variable_2.parameter {
        return Err(AppraisalError::invalid(
            "variable_2",
            "The two sweep variables must differ",
        ));
    }
    let v1_values = generate_sweep_values(&input.variable_1)?;
    let v2_values = generate_sweep_values(&input.variable_2)?;

    let (_, base_metrics) = evaluate_project(&input.base)?;
    let base_case_value = input.output_metric.extract(&base_metrics);

    let rows: Vec<(Vec<Option<Decimal>>, Vec<String>)> = v1_values
        .par_iter()
        .map(|v1| {
            let mut row = Vec::with_capacity(v2_values.len());
            let mut row_warnings = Vec::new();
            for v2 in &v2_values {
                let mut config = input.base.clone();
                input.variable_1.parameter.apply(&mut config, *v1);
                input.variable_2.parameter.apply(&mut config, *v2);
                match evaluate_project(&config) {
                    Ok((_, metrics)) => row.push(input.output_metric.extract(&metrics)),
                    Err(e) => {
                        row_warnings.push(format!("Evaluation failed at ({v1}, {v2}): {e}"));
                        row.push(None);
                    }
                }
            }
            (row, row_warnings)
        })
        .collect();

    let mut matrix = Vec::with_capacity(rows.len());
    let mut warnings = Vec::new();
    for (row, row_warnings) in rows {
        matrix.push(row);
        warnings.extend(row_warnings);
    }

    let base_row = closest_index(&v1_values, input.variable_1.parameter.current(&input.base));
    let base_col = closest_index(&v2_values, input.variable_2.parameter.current(&input.base));
    debug!(cells = v1_values.len() * v2_values.len(), "Evaluated sensitivity grid");

    let output = SensitivityOutput {
        variable_1: input.variable_1.parameter,
        variable_2: input.variable_2.parameter,
        variable_1_values: v1_values,
        variable_2_values: v2_values,
        output_metric: input.output_metric,
        matrix,
        base_case_value,
        base_case_position: (base_row, base_col),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "2-Way Sensitivity Analysis (full appraisal per cell)",
        &serde_json::json!({
            "variable_1": input.variable_1.parameter,
            "variable_2": input.variable_2.parameter,
            "output_metric": input.output_metric,
        }),
        warnings,
        elapsed,
        output,
    ))
}
