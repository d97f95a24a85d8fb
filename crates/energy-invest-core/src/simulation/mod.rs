//! Annual production and cash-flow stages of the appraisal pipeline.

pub mod cashflow;
pub mod production;

pub use cashflow::{project_cashflows, TimelineYear, YearlyTimeline};
pub use production::{simulate_production, ProductionProfile};
