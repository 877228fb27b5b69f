//! Freddie Mac product catalog. Same shape as the Fannie Mae table with its
//! own threshold values and product mix.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

use super::profile::ProductProfile;
use crate::types::{Agency, ProductVariant};

/// Minimum DSCR per seniors care type, used in the bed-mix blend.
pub const MIN_DSCR_INDEPENDENT_LIVING: Decimal = dec!(1.30);
pub const MIN_DSCR_ASSISTED_LIVING: Decimal = dec!(1.45);
pub const MIN_DSCR_MEMORY_CARE: Decimal = dec!(1.50);

pub(super) fn catalog() -> BTreeMap<ProductVariant, ProductProfile> {
    use ProductVariant::*;
    let a = Agency::FreddieMac;

    let entries = vec![
        ProductProfile::core(a, Conventional, dec!(80), dec!(1.25), 30),
        ProductProfile {
            min_loan_amount: Some(dec!(1_000_000)),
            max_loan_amount: Some(dec!(7_500_000)),
            ..ProductProfile::core(a, SmallBalance, dec!(80), dec!(1.20), 30)
        },
        ProductProfile::core(a, TargetedAffordable, dec!(80), dec!(1.20), 35),
        ProductProfile {
            max_skilled_nursing_pct: Some(dec!(20)),
            ..ProductProfile::core(a, SeniorsIndependentLiving, dec!(75), MIN_DSCR_INDEPENDENT_LIVING, 30)
        },
        ProductProfile {
            max_skilled_nursing_pct: Some(dec!(20)),
            ..ProductProfile::core(a, SeniorsAssistedLiving, dec!(70), MIN_DSCR_ASSISTED_LIVING, 30)
        },
        ProductProfile {
            max_skilled_nursing_pct: Some(dec!(20)),
            ..ProductProfile::core(a, SeniorsMemoryCare, dec!(70), MIN_DSCR_MEMORY_CARE, 30)
        },
        ProductProfile::core(a, StudentHousing, dec!(70), dec!(1.35), 30),
        ProductProfile {
            min_occupancy_pct: Some(dec!(80)),
            max_rental_home_pct: Some(dec!(25)),
            ..ProductProfile::core(a, ManufacturedHousing, dec!(75), dec!(1.25), 30)
        },
        ProductProfile {
            coop_min_dscr_actual: Some(dec!(1.05)),
            coop_min_dscr_market: Some(dec!(1.50)),
            ..ProductProfile::core(a, Cooperative, dec!(60), dec!(1.05), 30)
        },
        ProductProfile {
            stress_min_dscr: Some(dec!(1.00)),
            ..ProductProfile::core(a, AdjustableRate, dec!(70), dec!(1.10), 30)
        },
        ProductProfile {
            green_owner_savings_weight: Some(dec!(1.00)),
            green_tenant_savings_weight: Some(dec!(0.50)),
            ..ProductProfile::core(a, GreenRetrofit, dec!(80), dec!(1.25), 30)
        },
        ProductProfile {
            combined_max_ltv_pct: Some(dec!(70)),
            combined_min_dscr: Some(dec!(1.30)),
            ..ProductProfile::core(a, Supplemental, dec!(70), dec!(1.30), 30)
        },
        ProductProfile {
            rehab_min_dscr_amortizing: Some(dec!(1.10)),
            rehab_min_dscr_io: Some(dec!(1.25)),
            ..ProductProfile::core(a, ValueAdd, dec!(75), dec!(1.20), 30)
        },
        ProductProfile {
            leaseup_min_physical_occupancy_pct: Some(dec!(65)),
            leaseup_min_leased_pct: Some(dec!(85)),
            ..ProductProfile::core(a, LeaseUp, dec!(70), dec!(1.25), 30)
        },
        ProductProfile {
            min_occupancy_pct: Some(dec!(85)),
            ..ProductProfile::core(a, NearStabilization, dec!(70), dec!(1.25), 30)
        },
    ];

    entries.into_iter().map(|p| (p.product, p)).collect()
}
