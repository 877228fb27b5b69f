//! Core ratio calculator: revenue waterfall, debt sizing, coverage and
//! return ratios. Everything here is a pure function of its arguments;
//! the projection, sensitivity, and compliance layers are built on top.

pub mod debt;
pub mod waterfall;

pub use debt::{
    annual_debt_service, annual_reserves, cash_on_cash, debt_metrics, dscr, equity_required,
    going_in_cap_rate, loan_amount, loan_balance_after, DebtMetrics, RESERVES_PER_UNIT,
};
pub use waterfall::{
    revenue_waterfall, RevenueWaterfall, DEFAULT_EXPENSE_RATIO_PCT,
    DEFAULT_OTHER_INCOME_RATIO_PCT,
};
