use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Agency, Money, Pct, ProductVariant, Years};

/// One compliance evaluation request: the agency/product pair to test
/// against plus the deal's actual metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceInput {
    pub agency: Agency,
    pub product: ProductVariant,
    pub metrics: ActualMetrics,
    #[serde(default)]
    pub optional: OptionalInputs,
}

/// Actual underwritten metrics, required for every product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActualMetrics {
    pub dscr: Decimal,
    pub ltv_pct: Pct,
    pub amortization_years: Years,
    #[serde(default)]
    pub interest_only: bool,
    pub loan_amount: Money,
    pub annual_debt_service: Money,
    pub net_operating_income: Money,
    /// Annual note rate (5.5 = 5.5%)
    pub note_rate_pct: Pct,
}

/// Product-specific inputs. Absence of a field means the corresponding
/// optional test is skipped, never failed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptionalInputs {
    // Seniors housing care mix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub independent_living_beds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assisted_living_beds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_care_beds: Option<u32>,
    /// Skilled-nursing share of total revenue (as a percentage)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skilled_nursing_revenue_pct: Option<Pct>,

    // Cooperative dual-basis DSCRs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dscr_actual_operations: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dscr_market_rental: Option<Decimal>,

    // Adjustable-rate worst case: margin plus the rate-cap strike
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arm_margin_pct: Option<Pct>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_cap_strike_pct: Option<Pct>,

    // Occupancy and tenancy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_occupancy_pct: Option<Pct>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leased_pct: Option<Pct>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rental_home_pct: Option<Pct>,

    // Rehab window
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_rehab_period: Option<bool>,

    // Supplemental loans: the senior lien being supplemented
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub senior_loan_balance: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub senior_annual_debt_service: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_value: Option<Money>,

    // Green retrofit projected savings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_projected_savings: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_projected_savings: Option<Money>,
}
