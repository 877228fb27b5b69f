//! Product profile registry: one immutable catalog per agency, built on
//! first use and shared by reference thereafter. No mutation path exists;
//! thresholds are compiled-in constants.

pub mod fannie;
pub mod freddie;
pub mod profile;

use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::error::UnderwritingError;
use crate::types::{round_ratio, Agency, ProductVariant};
use crate::UnderwritingResult;

pub use profile::{ProductProfile, PropertyType};

static FANNIE_CATALOG: OnceLock<BTreeMap<ProductVariant, ProductProfile>> = OnceLock::new();
static FREDDIE_CATALOG: OnceLock<BTreeMap<ProductVariant, ProductProfile>> = OnceLock::new();

/// The full product catalog for an agency.
pub fn catalog(agency: Agency) -> &'static BTreeMap<ProductVariant, ProductProfile> {
    match agency {
        Agency::FannieMae => FANNIE_CATALOG.get_or_init(fannie::catalog),
        Agency::FreddieMac => FREDDIE_CATALOG.get_or_init(freddie::catalog),
    }
}

/// Look up the profile for an agency/product pair. A variant the agency does
/// not offer is an error; the registry never guesses a default.
pub fn lookup(
    agency: Agency,
    product: ProductVariant,
) -> UnderwritingResult<&'static ProductProfile> {
    catalog(agency)
        .get(&product)
        .ok_or_else(|| UnderwritingError::UnknownProduct {
            agency: agency.to_string(),
            product: product.to_string(),
        })
}

/// Non-failing lookup for callers holding an optional product key.
pub fn try_lookup(
    agency: Agency,
    product: Option<ProductVariant>,
) -> Option<&'static ProductProfile> {
    product.and_then(|p| catalog(agency).get(&p))
}

/// Suggest a default product variant from a coarse property-type
/// classification. Pure mapping; the underwriter can always override it.
pub fn suggest_product(agency: Agency, property_type: PropertyType) -> ProductVariant {
    match property_type {
        PropertyType::Multifamily => ProductVariant::Conventional,
        PropertyType::SmallMultifamily => match agency {
            Agency::FannieMae => ProductVariant::SmallLoan,
            Agency::FreddieMac => ProductVariant::SmallBalance,
        },
        PropertyType::AffordableMultifamily => match agency {
            Agency::FannieMae => ProductVariant::AffordableHousing,
            Agency::FreddieMac => ProductVariant::TargetedAffordable,
        },
        PropertyType::IndependentLiving => ProductVariant::SeniorsIndependentLiving,
        PropertyType::AssistedLiving => ProductVariant::SeniorsAssistedLiving,
        PropertyType::MemoryCare => ProductVariant::SeniorsMemoryCare,
        PropertyType::StudentHousing => ProductVariant::StudentHousing,
        PropertyType::ManufacturedHousingCommunity => ProductVariant::ManufacturedHousing,
        PropertyType::CooperativeHousing => ProductVariant::Cooperative,
    }
}

/// Bed-count-weighted minimum DSCR for a seniors care mix. All-zero bed
/// counts fall back to the independent-living minimum.
pub fn blended_min_dscr(
    agency: Agency,
    independent_living_beds: u32,
    assisted_living_beds: u32,
    memory_care_beds: u32,
) -> Decimal {
    let (il, al, mc) = match agency {
        Agency::FannieMae => (
            fannie::MIN_DSCR_INDEPENDENT_LIVING,
            fannie::MIN_DSCR_ASSISTED_LIVING,
            fannie::MIN_DSCR_MEMORY_CARE,
        ),
        Agency::FreddieMac => (
            freddie::MIN_DSCR_INDEPENDENT_LIVING,
            freddie::MIN_DSCR_ASSISTED_LIVING,
            freddie::MIN_DSCR_MEMORY_CARE,
        ),
    };

    let total = u64::from(independent_living_beds)
        + u64::from(assisted_living_beds)
        + u64::from(memory_care_beds);
    if total == 0 {
        return il;
    }

    let weighted = il * Decimal::from(independent_living_beds)
        + al * Decimal::from(assisted_living_beds)
        + mc * Decimal::from(memory_care_beds);

    round_ratio(weighted / Decimal::from(total))
}
