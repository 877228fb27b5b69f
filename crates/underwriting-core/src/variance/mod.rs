//! Projection-versus-actuals variance analysis.

mod analyzer;

pub use analyzer::{
    calculate_variance, variance_status, MonthlyActual, VarianceInput, VarianceLine,
    VarianceReport, VarianceStatus,
};
