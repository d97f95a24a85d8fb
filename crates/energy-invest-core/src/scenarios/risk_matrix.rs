use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, instrument};

use crate::appraisal::evaluate_project;
use crate::metrics::Payback;
use crate::project::{ProjectConfiguration, RiskFlags};
use crate::time_value::IrrOutcome;
use crate::types::*;
use crate::AppraisalResult;

/// Metrics for one combination of risk flags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskScenarioResult {
    pub name: String,
    pub risks: RiskFlags,
    pub npv: Money,
    pub irr: IrrOutcome,
    pub payback: Payback,
    /// NPV minus the risk-free NPV (non-positive when risks only derate)
    pub npv_change_vs_base: Money,
    /// Change as a fraction of the absolute risk-free NPV; `None` when that NPV is zero
    pub npv_change_pct: Option<Rate>,
}

/// Output of the risk scenario matrix
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskScenarioOutput {
    pub results: Vec<RiskScenarioResult>,
    /// Risk flags as configured by the caller
    pub configured_risks: RiskFlags,
    pub worst_case_npv: Money,
}

const COMBINATIONS: [(&str, RiskFlags); 4] = [
    (
        "risk_free",
        RiskFlags {
            imbalance_penalty: false,
            connection_delay: false,
        },
    ),
    (
        "imbalance_penalty",
        RiskFlags {
            imbalance_penalty: true,
            connection_delay: false,
        },
    ),
    (
        "connection_delay",
        RiskFlags {
            imbalance_penalty: false,
            connection_delay: true,
        },
    ),
    (
        "combined",
        RiskFlags {
            imbalance_penalty: true,
            connection_delay: true,
        },
    ),
];

/// Appraise the configuration under every combination of the imbalance and
/// connection-delay flags, measuring NPV erosion against the risk-free case.
#[instrument(skip_all)]
pub fn analyze_risk_scenarios(config: &ProjectConfiguration) -> AppraisalResult<ComputationOutput<RiskScenarioOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let mut evaluated = Vec::with_capacity(COMBINATIONS.len());
    for (name, risks) in COMBINATIONS {
        let mut scenario = config.clone();
        scenario.risks = risks;
        let (_, metrics) = evaluate_project(&scenario)?;
        debug!(scenario = name, npv = %metrics.npv, "Evaluated risk scenario");
        evaluated.push((name, risks, metrics));
    }

    let base_npv = evaluated[0].2.npv;
    let mut results = Vec::with_capacity(evaluated.len());
    for (name, risks, metrics) in evaluated {
        let change = metrics.npv - base_npv;
        let change_pct = if base_npv.is_zero() {
            None
        } else {
            change.checked_div(base_npv.abs())
        };
        if let IrrOutcome::Undefined(reason) = metrics.irr {
            warnings.push(format!("{name}: IRR undefined ({reason:?})"));
        }
        results.push(RiskScenarioResult {
            name: name.to_string(),
            risks,
            npv: metrics.npv,
            irr: metrics.irr,
            payback: metrics.payback,
            npv_change_vs_base: change,
            npv_change_pct: change_pct,
        });
    }

    let worst_case_npv = results
        .iter()
        .map(|r| r.npv)
        .min()
        .unwrap_or(Decimal::ZERO);
    if worst_case_npv < Decimal::ZERO && base_npv >= Decimal::ZERO {
        warnings.push("NPV turns negative under at least one risk combination".into());
    }

    let output = RiskScenarioOutput {
        results,
        configured_risks: config.risks,
        worst_case_npv,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Risk flag matrix (full appraisal per combination)",
        &serde_json::json!({
            "imbalance_revenue_factor": config.assumptions.imbalance_revenue_factor.to_string(),
            "connection_delay_years": config.assumptions.connection_delay_years,
            "discount_rate": config.discount_rate.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::ProjectType;
    use rust_decimal_macros::dec;

    #[test]
    fn test_four_combinations_in_order() {
        let out = analyze_risk_scenarios(&ProjectType::Solar.default_configuration())
            .unwrap()
            .result;
        let names: Vec<&str> = out.results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["risk_free", "imbalance_penalty", "connection_delay", "combined"]);
        assert_eq!(out.results[0].npv_change_vs_base, Decimal::ZERO);
    }

    #[test]
    fn test_risks_erode_npv() {
        let out = analyze_risk_scenarios(&ProjectType::Wind.default_configuration())
            .unwrap()
            .result;
        let base = out.results[0].npv;
        for r in &out.results[1..] {
            assert!(r.npv < base, "{} should derate NPV", r.name);
            assert!(r.npv_change_vs_base < Decimal::ZERO);
        }
        // Both risks together are worse than either alone
        assert!(out.results[3].npv < out.results[1].npv);
        assert!(out.results[3].npv < out.results[2].npv);
        assert_eq!(out.worst_case_npv, out.results[3].npv);
    }

    #[test]
    fn test_configured_flags_do_not_change_matrix() {
        let mut cfg = ProjectType::Solar.default_configuration();
        cfg.risks = RiskFlags::default();
        let a = analyze_risk_scenarios(&cfg).unwrap().result;
        cfg.risks = RiskFlags {
            imbalance_penalty: true,
            connection_delay: true,
        };
        let b = analyze_risk_scenarios(&cfg).unwrap().result;
        for (x, y) in a.results.iter().zip(&b.results) {
            assert_eq!(x.npv, y.npv);
        }
        assert!(b.configured_risks.connection_delay);
    }

    #[test]
    fn test_delay_shifts_payback() {
        let out = analyze_risk_scenarios(&ProjectType::Solar.default_configuration())
            .unwrap()
            .result;
        let free = out.results[0].payback.year();
        let delayed = out.results[2].payback.year();
        if let (Some(free), Some(delayed)) = (free, delayed) {
            assert!(delayed > free);
        }
    }

    #[test]
    fn test_invalid_configuration_propagates() {
        let mut cfg = ProjectType::Solar.default_configuration();
        cfg.discount_rate = dec!(1.5);
        assert!(analyze_risk_scenarios(&cfg).is_err());
    }
}
