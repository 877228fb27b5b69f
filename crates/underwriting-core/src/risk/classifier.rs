use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::registry;
use crate::types::{with_metadata, Agency, ComputationOutput, Pct, ProductVariant};
use crate::UnderwritingResult;

// ---------------------------------------------------------------------------
// Severity bands
// ---------------------------------------------------------------------------

/// Ordered severity scale. The derived ordering is load-bearing: an overall
/// rating is the maximum severity across individual metrics.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RiskSeverity {
    Low,
    Moderate,
    High,
    Critical,
}

impl std::fmt::Display for RiskSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RiskSeverity::Low => "Low",
            RiskSeverity::Moderate => "Moderate",
            RiskSeverity::High => "High",
            RiskSeverity::Critical => "Critical",
        };
        write!(f, "{label}")
    }
}

// DSCR bucket edges
const DSCR_CRITICAL_BELOW: Decimal = dec!(1.00);
const DSCR_HIGH_BELOW: Decimal = dec!(1.15);
const DSCR_MODERATE_BELOW: Decimal = dec!(1.25);

// LTV is rated against the product's cap: headroom in percentage points
const LTV_HIGH_HEADROOM_PTS: Decimal = dec!(2.5);
const LTV_MODERATE_HEADROOM_PTS: Decimal = dec!(5);

// Physical occupancy bucket edges
const OCCUPANCY_CRITICAL_BELOW: Decimal = dec!(80);
const OCCUPANCY_HIGH_BELOW: Decimal = dec!(85);
const OCCUPANCY_MODERATE_BELOW: Decimal = dec!(90);

// Skilled nursing revenue concentration edges
const SKILLED_NURSING_MODERATE_ABOVE: Decimal = dec!(10);
const SKILLED_NURSING_HIGH_ABOVE: Decimal = dec!(15);
const SKILLED_NURSING_CRITICAL_ABOVE: Decimal = dec!(20);

/// Coverage risk from the actual DSCR alone. Below break-even is always
/// critical regardless of product.
pub fn dscr_severity(dscr: Decimal) -> RiskSeverity {
    if dscr < DSCR_CRITICAL_BELOW {
        RiskSeverity::Critical
    } else if dscr < DSCR_HIGH_BELOW {
        RiskSeverity::High
    } else if dscr < DSCR_MODERATE_BELOW {
        RiskSeverity::Moderate
    } else {
        RiskSeverity::Low
    }
}

/// Leverage risk as headroom to the product's LTV cap. Over the cap is
/// critical; inside the cap the band depends on remaining points.
pub fn ltv_severity(ltv_pct: Pct, max_ltv_pct: Pct) -> RiskSeverity {
    let headroom = max_ltv_pct - ltv_pct;
    if headroom < Decimal::ZERO {
        RiskSeverity::Critical
    } else if headroom < LTV_HIGH_HEADROOM_PTS {
        RiskSeverity::High
    } else if headroom < LTV_MODERATE_HEADROOM_PTS {
        RiskSeverity::Moderate
    } else {
        RiskSeverity::Low
    }
}

pub fn occupancy_severity(occupancy_pct: Pct) -> RiskSeverity {
    if occupancy_pct < OCCUPANCY_CRITICAL_BELOW {
        RiskSeverity::Critical
    } else if occupancy_pct < OCCUPANCY_HIGH_BELOW {
        RiskSeverity::High
    } else if occupancy_pct < OCCUPANCY_MODERATE_BELOW {
        RiskSeverity::Moderate
    } else {
        RiskSeverity::Low
    }
}

pub fn skilled_nursing_severity(revenue_pct: Pct) -> RiskSeverity {
    if revenue_pct > SKILLED_NURSING_CRITICAL_ABOVE {
        RiskSeverity::Critical
    } else if revenue_pct > SKILLED_NURSING_HIGH_ABOVE {
        RiskSeverity::High
    } else if revenue_pct > SKILLED_NURSING_MODERATE_ABOVE {
        RiskSeverity::Moderate
    } else {
        RiskSeverity::Low
    }
}

// ---------------------------------------------------------------------------
// Assessment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskInput {
    pub agency: Agency,
    pub product: ProductVariant,
    pub dscr: Decimal,
    pub ltv_pct: Pct,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_occupancy_pct: Option<Pct>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skilled_nursing_revenue_pct: Option<Pct>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskRating {
    pub metric: String,
    pub severity: RiskSeverity,
    pub actual: Decimal,
}

/// Per-metric ratings plus their maximum. Informational only; a deal can
/// rate `Critical` here and still pass compliance, and vice versa.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskSummary {
    pub agency: Agency,
    pub product: ProductVariant,
    pub ratings: Vec<RiskRating>,
    pub overall: RiskSeverity,
}

/// Rate a deal's headline metrics against fixed severity bands. Optional
/// metrics that were not supplied produce no rating and cannot move the
/// overall severity.
pub fn assess_risk(input: &RiskInput) -> UnderwritingResult<ComputationOutput<RiskSummary>> {
    let start = Instant::now();
    let profile = registry::lookup(input.agency, input.product)?;

    let mut ratings = vec![
        RiskRating {
            metric: "DSCR".to_string(),
            severity: dscr_severity(input.dscr),
            actual: input.dscr,
        },
        RiskRating {
            metric: "LTV".to_string(),
            severity: ltv_severity(input.ltv_pct, profile.max_ltv_pct),
            actual: input.ltv_pct,
        },
    ];

    if let Some(occ) = input.physical_occupancy_pct {
        ratings.push(RiskRating {
            metric: "Physical Occupancy".to_string(),
            severity: occupancy_severity(occ),
            actual: occ,
        });
    }
    if let Some(sn) = input.skilled_nursing_revenue_pct {
        ratings.push(RiskRating {
            metric: "Skilled Nursing Concentration".to_string(),
            severity: skilled_nursing_severity(sn),
            actual: sn,
        });
    }

    let overall = ratings
        .iter()
        .map(|r| r.severity)
        .max()
        .unwrap_or(RiskSeverity::Low);

    let summary = RiskSummary {
        agency: input.agency,
        product: input.product,
        ratings,
        overall,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "agency": input.agency,
        "product": input.product,
        "ltv_cap_pct": profile.max_ltv_pct,
    });

    Ok(with_metadata(
        "Threshold Risk Rating",
        &assumptions,
        Vec::new(),
        elapsed,
        summary,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_severity_ordering() {
        assert!(RiskSeverity::Low < RiskSeverity::Moderate);
        assert!(RiskSeverity::Moderate < RiskSeverity::High);
        assert!(RiskSeverity::High < RiskSeverity::Critical);
    }

    #[test]
    fn test_dscr_bucket_edges() {
        assert_eq!(dscr_severity(dec!(0.99)), RiskSeverity::Critical);
        assert_eq!(dscr_severity(dec!(1.00)), RiskSeverity::High);
        assert_eq!(dscr_severity(dec!(1.14)), RiskSeverity::High);
        assert_eq!(dscr_severity(dec!(1.15)), RiskSeverity::Moderate);
        assert_eq!(dscr_severity(dec!(1.24)), RiskSeverity::Moderate);
        assert_eq!(dscr_severity(dec!(1.25)), RiskSeverity::Low);
        assert_eq!(dscr_severity(dec!(2.00)), RiskSeverity::Low);
    }

    #[test]
    fn test_ltv_headroom_buckets() {
        let cap = dec!(80);
        assert_eq!(ltv_severity(dec!(81), cap), RiskSeverity::Critical);
        assert_eq!(ltv_severity(dec!(80), cap), RiskSeverity::High);
        assert_eq!(ltv_severity(dec!(78), cap), RiskSeverity::High);
        assert_eq!(ltv_severity(dec!(77.5), cap), RiskSeverity::Moderate);
        assert_eq!(ltv_severity(dec!(76), cap), RiskSeverity::Moderate);
        assert_eq!(ltv_severity(dec!(75), cap), RiskSeverity::Low);
        assert_eq!(ltv_severity(dec!(55), cap), RiskSeverity::Low);
    }

    #[test]
    fn test_occupancy_buckets() {
        assert_eq!(occupancy_severity(dec!(79.9)), RiskSeverity::Critical);
        assert_eq!(occupancy_severity(dec!(84)), RiskSeverity::High);
        assert_eq!(occupancy_severity(dec!(89)), RiskSeverity::Moderate);
        assert_eq!(occupancy_severity(dec!(95)), RiskSeverity::Low);
    }

    #[test]
    fn test_skilled_nursing_buckets() {
        assert_eq!(skilled_nursing_severity(dec!(5)), RiskSeverity::Low);
        assert_eq!(skilled_nursing_severity(dec!(10)), RiskSeverity::Low);
        assert_eq!(skilled_nursing_severity(dec!(12)), RiskSeverity::Moderate);
        assert_eq!(skilled_nursing_severity(dec!(18)), RiskSeverity::High);
        assert_eq!(skilled_nursing_severity(dec!(20)), RiskSeverity::High);
        assert_eq!(skilled_nursing_severity(dec!(21)), RiskSeverity::Critical);
    }

    #[test]
    fn test_overall_is_maximum_severity() {
        let input = RiskInput {
            agency: Agency::FannieMae,
            product: ProductVariant::SeniorsAssistedLiving,
            dscr: dec!(1.45),          // Low
            ltv_pct: dec!(60),         // Low against the 75 cap
            physical_occupancy_pct: Some(dec!(83)), // High
            skilled_nursing_revenue_pct: Some(dec!(12)), // Moderate
        };
        let out = assess_risk(&input).unwrap();
        assert_eq!(out.result.ratings.len(), 4);
        assert_eq!(out.result.overall, RiskSeverity::High);
    }

    #[test]
    fn test_absent_optional_metrics_produce_no_rating() {
        let input = RiskInput {
            agency: Agency::FannieMae,
            product: ProductVariant::Conventional,
            dscr: dec!(1.50),
            ltv_pct: dec!(65),
            physical_occupancy_pct: None,
            skilled_nursing_revenue_pct: None,
        };
        let out = assess_risk(&input).unwrap();
        assert_eq!(out.result.ratings.len(), 2);
        assert_eq!(out.result.overall, RiskSeverity::Low);
    }

    #[test]
    fn test_over_leveraged_deal_is_critical() {
        let input = RiskInput {
            agency: Agency::FreddieMac,
            product: ProductVariant::SmallBalance,
            dscr: dec!(1.30),
            ltv_pct: dec!(82), // cap is 80
            physical_occupancy_pct: None,
            skilled_nursing_revenue_pct: None,
        };
        let out = assess_risk(&input).unwrap();
        assert_eq!(out.result.overall, RiskSeverity::Critical);
    }

    #[test]
    fn test_unknown_product_is_an_error() {
        let input = RiskInput {
            agency: Agency::FreddieMac,
            product: ProductVariant::SmallLoan,
            dscr: dec!(1.30),
            ltv_pct: dec!(70),
            physical_occupancy_pct: None,
            skilled_nursing_revenue_pct: None,
        };
        assert!(assess_risk(&input).is_err());
    }

    #[test]
    fn test_summary_round_trips_through_json() {
        let input = RiskInput {
            agency: Agency::FannieMae,
            product: ProductVariant::Conventional,
            dscr: dec!(1.12),
            ltv_pct: dec!(79),
            physical_occupancy_pct: Some(dec!(92)),
            skilled_nursing_revenue_pct: None,
        };
        let out = assess_risk(&input).unwrap();
        let json = serde_json::to_string(&out.result).unwrap();
        let back: RiskSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, out.result);
    }
}
