//! Multi-year cash-flow projection and IRR.

pub mod cashflow;
pub mod irr;

pub use cashflow::{project, ProjectionOutput, SALE_COST_PCT};
pub use irr::irr;
