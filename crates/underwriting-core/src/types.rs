use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Percentages expressed as percent values (65 = 65%, 5.5 = 5.5%). The
/// agency worksheets this engine reproduces carry LTV, occupancy, and note
/// rates as percentages, so every formula divides by 100 explicitly.
pub type Pct = Decimal;

/// Year counts
pub type Years = u32;

/// Longest amortization term any agency product writes. Inputs beyond this
/// are data-entry errors and are rejected before the schedule math runs.
pub const MAX_AMORTIZATION_YEARS: Years = 50;

/// Longest hold period the projection engine accepts.
pub const MAX_HOLD_PERIOD_YEARS: Years = 30;

// ---------------------------------------------------------------------------
// Rounding
// ---------------------------------------------------------------------------

/// Round half away from zero, the agency reporting convention. All published
/// figures go through one of these so that re-running a deal reproduces the
/// stored snapshot exactly.
pub fn round_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn round_ratio(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn round_margin(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

pub fn round_whole(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

// ---------------------------------------------------------------------------
// Agency / product identity
// ---------------------------------------------------------------------------

/// Government-sponsored enterprise whose product rules apply to a deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Agency {
    FannieMae,
    FreddieMac,
}

impl fmt::Display for Agency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Agency::FannieMae => write!(f, "Fannie Mae"),
            Agency::FreddieMac => write!(f, "Freddie Mac"),
        }
    }
}

/// Loan product variant. The variant set is shared across agencies; each
/// agency's catalog carries the subset it actually offers, with its own
/// thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProductVariant {
    Conventional,
    /// Fannie Mae small mortgage loan program
    SmallLoan,
    /// Freddie Mac small balance loan program
    SmallBalance,
    AffordableHousing,
    TargetedAffordable,
    SeniorsIndependentLiving,
    SeniorsAssistedLiving,
    SeniorsMemoryCare,
    StudentHousing,
    ManufacturedHousing,
    Cooperative,
    AdjustableRate,
    GreenRetrofit,
    Supplemental,
    ModerateRehab,
    ValueAdd,
    LeaseUp,
    NearStabilization,
}

impl ProductVariant {
    /// Seniors-housing variants share the care-mix blend and the
    /// skilled-nursing concentration cap.
    pub fn is_seniors_housing(&self) -> bool {
        matches!(
            self,
            ProductVariant::SeniorsIndependentLiving
                | ProductVariant::SeniorsAssistedLiving
                | ProductVariant::SeniorsMemoryCare
        )
    }
}

impl fmt::Display for ProductVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProductVariant::Conventional => "conventional",
            ProductVariant::SmallLoan => "small-loan",
            ProductVariant::SmallBalance => "small-balance",
            ProductVariant::AffordableHousing => "affordable-housing",
            ProductVariant::TargetedAffordable => "targeted-affordable",
            ProductVariant::SeniorsIndependentLiving => "seniors-independent-living",
            ProductVariant::SeniorsAssistedLiving => "seniors-assisted-living",
            ProductVariant::SeniorsMemoryCare => "seniors-memory-care",
            ProductVariant::StudentHousing => "student-housing",
            ProductVariant::ManufacturedHousing => "manufactured-housing",
            ProductVariant::Cooperative => "cooperative",
            ProductVariant::AdjustableRate => "adjustable-rate",
            ProductVariant::GreenRetrofit => "green-retrofit",
            ProductVariant::Supplemental => "supplemental",
            ProductVariant::ModerateRehab => "moderate-rehab",
            ProductVariant::ValueAdd => "value-add",
            ProductVariant::LeaseUp => "lease-up",
            ProductVariant::NearStabilization => "near-stabilization",
        };
        write!(f, "{label}")
    }
}

// ---------------------------------------------------------------------------
// Deal inputs
// ---------------------------------------------------------------------------

/// One deal's raw underwriting assumptions. Built once per calculation
/// request and treated as immutable by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationInputs {
    /// Monthly rent per unit
    pub rent_per_unit: Money,
    pub unit_count: u32,
    /// Physical occupancy (95 = 95%)
    pub occupancy_pct: Pct,
    /// Actual other income; when absent, estimated as a ratio of net rent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_income: Option<Money>,
    /// Override for the other-income ratio (default 13.5)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_income_ratio_pct: Option<Pct>,
    /// Actual operating expenses; when absent, estimated as a ratio of EGI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operating_expenses: Option<Money>,
    /// Override for the expense ratio (default 54.35)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expense_ratio_pct: Option<Pct>,
    pub purchase_price: Money,
    /// Closing and diligence costs funded from equity
    #[serde(default)]
    pub acquisition_costs: Money,
    pub ltv_pct: Pct,
    /// Annual note rate (5.5 = 5.5%)
    pub interest_rate_pct: Pct,
    #[serde(default)]
    pub interest_only: bool,
    pub amortization_years: Years,
    pub hold_period_years: Years,
    pub exit_cap_rate_pct: Pct,
    /// NOI growth per projection year, starting with year 2. The last entry
    /// carries forward when the hold period is longer than the sequence.
    #[serde(default)]
    pub noi_growth_pct: Vec<Pct>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agency: Option<Agency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductVariant>,
}

// ---------------------------------------------------------------------------
// Deal outputs
// ---------------------------------------------------------------------------

/// One projected year of the hold period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlowYear {
    /// 1-based projection year
    pub year: u32,
    pub noi: Money,
    pub debt_service: Money,
    pub reserves: Money,
    pub cash_flow: Money,
}

/// One stress-test outcome. Deltas are versus the base scenario, so the
/// base row carries zero deltas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensitivityScenario {
    pub name: String,
    pub noi: Money,
    pub noi_delta: Money,
    pub exit_value: Money,
    pub exit_value_delta: Money,
}

/// Computed financial snapshot for a deal. Persisted by the surrounding
/// application and recomputed whenever inputs change; re-evaluating the same
/// inputs reproduces every field exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    // Revenue waterfall
    pub gross_potential_rent: Money,
    pub vacancy_loss: Money,
    pub net_rental_income: Money,
    pub other_income: Money,
    pub effective_gross_income: Money,
    pub operating_expenses: Money,
    pub net_operating_income: Money,
    pub noi_margin_pct: Pct,

    // Debt and returns
    pub loan_amount: Money,
    pub annual_debt_service: Money,
    pub annual_reserves: Money,
    pub equity_required: Money,
    pub dscr: Decimal,
    pub going_in_cap_rate_pct: Pct,
    pub cash_on_cash_pct: Pct,

    // Exit
    pub exit_value: Money,
    pub sale_costs: Money,
    pub loan_balance_at_exit: Money,
    pub net_sale_proceeds: Money,
    pub equity_multiple: Decimal,
    /// None when the IRR solver found no root in range
    #[serde(skip_serializing_if = "Option::is_none")]
    pub irr_pct: Option<Pct>,

    pub cash_flows: Vec<CashFlowYear>,
    pub sensitivity: Vec<SensitivityScenario>,
}

// ---------------------------------------------------------------------------
// Computation envelope
// ---------------------------------------------------------------------------

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(round_currency(dec!(843881.585)), dec!(843881.59));
        assert_eq!(round_currency(dec!(-843881.585)), dec!(-843881.59));
        assert_eq!(round_margin(dec!(45.65)), dec!(45.7));
        assert_eq!(round_whole(dec!(2.5)), dec!(3));
    }

    #[test]
    fn test_product_variant_serde_kebab_case() {
        let json = serde_json::to_string(&ProductVariant::SeniorsAssistedLiving).unwrap();
        assert_eq!(json, "\"seniors-assisted-living\"");
        let back: ProductVariant = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ProductVariant::SeniorsAssistedLiving);
    }

    #[test]
    fn test_seniors_housing_predicate() {
        assert!(ProductVariant::SeniorsMemoryCare.is_seniors_housing());
        assert!(!ProductVariant::Cooperative.is_seniors_housing());
    }
}
