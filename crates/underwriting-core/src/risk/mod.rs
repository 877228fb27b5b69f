//! Threshold risk-rating bands, independent of the compliance verdict.

mod classifier;

pub use classifier::{
    assess_risk, dscr_severity, ltv_severity, occupancy_severity, skilled_nursing_severity,
    RiskInput, RiskRating, RiskSeverity, RiskSummary,
};
