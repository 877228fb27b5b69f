use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Agency, Money, Pct, ProductVariant, Years};

/// Coarse property-type classification used to suggest a default product
/// variant for a new deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PropertyType {
    Multifamily,
    SmallMultifamily,
    AffordableMultifamily,
    IndependentLiving,
    AssistedLiving,
    MemoryCare,
    StudentHousing,
    ManufacturedHousingCommunity,
    CooperativeHousing,
}

/// Regulatory thresholds for one agency/product pair. Data only; every
/// behavioral rule lives in the compliance evaluator. Optional fields are
/// product-specific limits; `None` means the product carries no such rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductProfile {
    pub agency: Agency,
    pub product: ProductVariant,

    // Core thresholds, present on every product
    pub max_ltv_pct: Pct,
    pub min_dscr: Decimal,
    pub max_amortization_years: Years,

    // Loan size bounds (small-loan programs)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_loan_amount: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_loan_amount: Option<Money>,

    // Occupancy and tenancy floors (manufactured housing, stabilization)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_occupancy_pct: Option<Pct>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_rental_home_pct: Option<Pct>,

    // Seniors housing concentration cap
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_skilled_nursing_pct: Option<Pct>,

    // Cooperative dual-basis minimums
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coop_min_dscr_actual: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coop_min_dscr_market: Option<Decimal>,

    // Adjustable-rate stress minimum at the capped note rate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stress_min_dscr: Option<Decimal>,

    // Rehab-period reduced minimums
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rehab_min_dscr_amortizing: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rehab_min_dscr_io: Option<Decimal>,

    // Lease-up floors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leaseup_min_physical_occupancy_pct: Option<Pct>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leaseup_min_leased_pct: Option<Pct>,

    // Combined senior + supplemental thresholds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub combined_max_ltv_pct: Option<Pct>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub combined_min_dscr: Option<Decimal>,

    // Green retrofit NCF credit weights (fractions, 1.0 = 100% of savings)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub green_owner_savings_weight: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub green_tenant_savings_weight: Option<Decimal>,
}

impl ProductProfile {
    /// Profile with core thresholds only; catalog entries fill in the
    /// product-specific limits with struct update syntax.
    pub fn core(
        agency: Agency,
        product: ProductVariant,
        max_ltv_pct: Pct,
        min_dscr: Decimal,
        max_amortization_years: Years,
    ) -> Self {
        ProductProfile {
            agency,
            product,
            max_ltv_pct,
            min_dscr,
            max_amortization_years,
            min_loan_amount: None,
            max_loan_amount: None,
            min_occupancy_pct: None,
            max_rental_home_pct: None,
            max_skilled_nursing_pct: None,
            coop_min_dscr_actual: None,
            coop_min_dscr_market: None,
            stress_min_dscr: None,
            rehab_min_dscr_amortizing: None,
            rehab_min_dscr_io: None,
            leaseup_min_physical_occupancy_pct: None,
            leaseup_min_leased_pct: None,
            combined_max_ltv_pct: None,
            combined_min_dscr: None,
            green_owner_savings_weight: None,
            green_tenant_savings_weight: None,
        }
    }
}
