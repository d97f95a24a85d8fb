pub mod risk_matrix;
#[cfg(feature = "sensitivity")]
pub mod sensitivity;

pub use risk_matrix::{analyze_risk_scenarios, RiskScenarioOutput, RiskScenarioResult};
#[cfg(feature = "sensitivity")]
pub use sensitivity::{
    evaluate_sensitivity, OutputMetric, SensitivityInput, SensitivityOutput, SensitivityVariable,
    SweepParameter,
};
