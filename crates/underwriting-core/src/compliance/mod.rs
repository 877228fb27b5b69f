//! Generic agency compliance evaluation.
//!
//! One evaluator serves every agency/product combination; product behavior
//! is expressed as threshold data in the registry, never as per-product
//! code paths here.

mod evaluator;
mod inputs;

pub use evaluator::{evaluate_compliance, ComplianceResult, ComplianceTest};
pub use inputs::{ActualMetrics, ComplianceInput, OptionalInputs};
