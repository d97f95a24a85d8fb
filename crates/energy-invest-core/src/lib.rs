//! Investment appraisal for solar, wind and battery storage projects.
//!
//! The pipeline runs in three stages: [`simulation::production`] turns a
//! [`project::ProjectConfiguration`] into annual energy, [`simulation::cashflow`]
//! turns energy into an indexed, taxed cash-flow timeline, and [`metrics`]
//! reduces the timeline to IRR, NPV, payback and LCOE. [`appraisal`] wires the
//! stages together behind a single call.

pub mod appraisal;
pub mod error;
pub mod metrics;
pub mod project;
pub mod simulation;
pub mod time_value;
pub mod types;

#[cfg(feature = "scenarios")]
pub mod scenarios;

pub use appraisal::{appraise_project, evaluate_project, ProjectAppraisal};
pub use error::AppraisalError;
pub use metrics::{compute_metrics, FinancialMetrics, Lcoe, Payback};
pub use project::{ModelAssumptions, ProjectConfiguration, ProjectType, RiskFlags, Technology};
pub use simulation::{project_cashflows, simulate_production, ProductionProfile, YearlyTimeline};
pub use time_value::{IrrFailure, IrrOutcome};

pub type AppraisalResult<T> = Result<T, AppraisalError>;
