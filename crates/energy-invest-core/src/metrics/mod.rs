//! Reduction of a net-cash-flow timeline to investment decision metrics.

pub mod lcoe;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AppraisalError;
use crate::time_value::{self, IrrOutcome};
use crate::types::{Money, Rate};
use crate::AppraisalResult;

pub use lcoe::{levelized_cost, Lcoe, LcoeUnsupported};

/// First year in which the investment is paid back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Payback {
    #[serde(rename = "recovered")]
    Year(u32),
    NotRecovered,
}

impl Payback {
    pub fn year(&self) -> Option<u32> {
        match self {
            Payback::Year(year) => Some(*year),
            Payback::NotRecovered => None,
        }
    }
}

/// Scalar appraisal metrics for one cash-flow timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialMetrics {
    pub irr: IrrOutcome,
    pub npv: Money,
    pub discount_rate: Rate,
    pub payback: Payback,
    pub lcoe: Lcoe,
}

/// Compute IRR, NPV and payback for a yearly net-cash-flow series
/// (index 0 = investment year).
///
/// A bare series carries no cost or energy breakdown, so LCOE is reported as
/// unsupported here; the appraisal pipeline fills it in from the timeline.
pub fn compute_metrics(net_cash_flow: &[Money], discount_rate: Rate) -> AppraisalResult<FinancialMetrics> {
    if net_cash_flow.is_empty() {
        return Err(AppraisalError::InsufficientData(
            "Metrics require at least one cash flow".into(),
        ));
    }
    if discount_rate <= Decimal::ZERO || discount_rate >= Decimal::ONE {
        return Err(AppraisalError::invalid(
            "discount_rate",
            "Discount rate must be a fraction in (0, 1)",
        ));
    }

    let npv = time_value::npv(discount_rate, net_cash_flow)?;
    let irr = time_value::irr(net_cash_flow);
    let payback = payback_year(net_cash_flow);

    debug!(npv = %npv, irr = ?irr, payback = ?payback, "Computed metrics");

    Ok(FinancialMetrics {
        irr,
        npv,
        discount_rate,
        payback,
        lcoe: Lcoe::Unsupported(LcoeUnsupported::MissingCostProfile),
    })
}

/// Index of the first year whose cumulative net cash flow is non-negative.
pub fn payback_year(net_cash_flow: &[Money]) -> Payback {
    let mut cumulative = Decimal::ZERO;
    for (year, cf) in net_cash_flow.iter().enumerate() {
        cumulative += cf;
        if cumulative >= Decimal::ZERO {
            return Payback::Year(year as u32);
        }
    }
    Payback::NotRecovered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_value::IrrFailure;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_basic_metrics() {
        let cfs = vec![dec!(-1000), dec!(400), dec!(400), dec!(400)];
        let m = compute_metrics(&cfs, dec!(0.08)).unwrap();
        assert!(m.irr.is_defined());
        assert!(m.npv > Decimal::ZERO);
        assert_eq!(m.payback, Payback::Year(3));
        assert_eq!(m.lcoe, Lcoe::Unsupported(LcoeUnsupported::MissingCostProfile));
    }

    #[test]
    fn test_payback_not_recovered() {
        let cfs = vec![dec!(-1000), dec!(100), dec!(100)];
        assert_eq!(payback_year(&cfs), Payback::NotRecovered);
        assert_eq!(payback_year(&cfs).year(), None);
    }

    #[test]
    fn test_payback_exact_break_even_counts() {
        let cfs = vec![dec!(-1000), dec!(500), dec!(500), dec!(10)];
        assert_eq!(payback_year(&cfs), Payback::Year(2));
    }

    #[test]
    fn test_payback_year_zero_without_capex() {
        assert_eq!(payback_year(&[Decimal::ZERO, dec!(10)]), Payback::Year(0));
    }

    #[test]
    fn test_all_negative_series_has_undefined_irr() {
        let cfs = vec![dec!(-1000), dec!(-50), dec!(-50)];
        let m = compute_metrics(&cfs, dec!(0.10)).unwrap();
        assert_eq!(m.irr, IrrOutcome::Undefined(IrrFailure::NoSignChange));
        assert_eq!(m.irr.value_or_zero(), Decimal::ZERO);
        assert_eq!(m.payback, Payback::NotRecovered);
    }

    #[test]
    fn test_empty_series_rejected() {
        assert!(compute_metrics(&[], dec!(0.10)).is_err());
    }

    #[test]
    fn test_non_positive_discount_rate_rejected() {
        let cfs = vec![dec!(-1000), dec!(1200)];
        assert!(compute_metrics(&cfs, Decimal::ZERO).is_err());
        assert!(compute_metrics(&cfs, dec!(-0.1)).is_err());
    }

    #[test]
    fn test_percentage_style_discount_rate_rejected() {
        let mut cfs = vec![dec!(-2_750_000)];
        cfs.extend(std::iter::repeat(dec!(353_059.20)).take(20));
        assert!(compute_metrics(&cfs, dec!(50)).is_err());
        assert!(compute_metrics(&cfs, Decimal::ONE).is_err());
    }

    #[test]
    fn test_idempotent() {
        let cfs = vec![dec!(-2_750_000), dec!(353_059.20), dec!(360_000), dec!(370_000)];
        let first = compute_metrics(&cfs, dec!(0.12)).unwrap();
        let second = compute_metrics(&cfs, dec!(0.12)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_payback_serializes_with_status_tag() {
        let json = serde_json::to_value(Payback::Year(7)).unwrap();
        assert_eq!(json["status"], "recovered");
        assert_eq!(json["value"], 7);
        let json = serde_json::to_value(Payback::NotRecovered).unwrap();
        assert_eq!(json["status"], "not_recovered");
    }
}
