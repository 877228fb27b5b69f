use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::inputs::{ComplianceInput, OptionalInputs};
use crate::ratios;
use crate::registry::{self, ProductProfile};
use crate::error::UnderwritingError;
use crate::types::{
    round_currency, round_ratio, with_metadata, Agency, ComputationOutput, Money, ProductVariant,
    Years, MAX_AMORTIZATION_YEARS,
};
use crate::UnderwritingResult;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Result of one rule check. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceTest {
    pub name: String,
    pub passed: bool,
    pub actual: Decimal,
    pub required: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Aggregated verdict for one deal/product pair. `overall_pass` is the
/// logical AND over exactly the tests that ran; a skipped optional test is
/// absent from both lists and cannot move the verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceResult {
    pub agency: Agency,
    pub product: ProductVariant,
    pub overall_pass: bool,

    // Echoed core thresholds
    pub max_ltv_pct: Decimal,
    pub min_dscr: Decimal,
    pub max_amortization_years: Years,

    pub core_tests: Vec<ComplianceTest>,
    pub product_tests: Vec<ComplianceTest>,

    /// Green retrofit net-cash-flow credit; informational, not a test
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ncf_adjustment: Option<Money>,
}

/// Product-specific tests. Which of these run for a given evaluation is
/// computed up front from the profile's armed thresholds and the optional
/// inputs actually present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OptionalTest {
    LoanAmountMaximum,
    LoanAmountMinimum,
    BlendedDscr,
    SkilledNursingCap,
    CoopActualOperations,
    CoopMarketRental,
    StressDscr,
    OccupancyFloor,
    RentalHomeCap,
    RehabDscr,
    LeaseUpPhysicalOccupancy,
    LeaseUpLeased,
    CombinedDscr,
    CombinedLtv,
}

impl OptionalTest {
    fn name(&self) -> &'static str {
        match self {
            OptionalTest::LoanAmountMaximum => "Loan Amount Maximum",
            OptionalTest::LoanAmountMinimum => "Loan Amount Minimum",
            OptionalTest::BlendedDscr => "Blended DSCR Minimum (Care Mix)",
            OptionalTest::SkilledNursingCap => "Skilled Nursing Revenue Cap",
            OptionalTest::CoopActualOperations => "DSCR Minimum (Actual Operations)",
            OptionalTest::CoopMarketRental => "DSCR Minimum (Market Rental)",
            OptionalTest::StressDscr => "Stress DSCR at Capped Rate",
            OptionalTest::OccupancyFloor => "Physical Occupancy Floor",
            OptionalTest::RentalHomeCap => "Rental Home Percentage Cap",
            OptionalTest::RehabDscr => "Rehab Period DSCR Minimum",
            OptionalTest::LeaseUpPhysicalOccupancy => "Lease-Up Physical Occupancy Floor",
            OptionalTest::LeaseUpLeased => "Lease-Up Leased Percentage Floor",
            OptionalTest::CombinedDscr => "Combined DSCR Minimum",
            OptionalTest::CombinedLtv => "Combined LTV Maximum",
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Evaluate a deal's actual metrics against one agency/product rule set.
/// Both agencies run through this same evaluator; the differences live
/// entirely in the registry's threshold tables.
pub fn evaluate_compliance(
    input: &ComplianceInput,
) -> UnderwritingResult<ComputationOutput<ComplianceResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.metrics.amortization_years > MAX_AMORTIZATION_YEARS {
        return Err(UnderwritingError::InvalidInput {
            field: "amortization_years".into(),
            reason: format!("Amortization term cannot exceed {MAX_AMORTIZATION_YEARS} years"),
        });
    }

    let profile = registry::lookup(input.agency, input.product)?;

    let core_tests = run_core_tests(profile, input);

    let (applicable, skipped) = applicable_tests(profile, input);
    for name in skipped {
        warnings.push(format!(
            "Optional test '{name}' skipped: required inputs not provided"
        ));
    }

    let product_tests: Vec<ComplianceTest> = applicable
        .iter()
        .filter_map(|test| run_optional_test(*test, profile, input))
        .collect();

    let ncf_adjustment = green_ncf_adjustment(profile, &input.optional, &mut warnings);

    let overall_pass = core_tests
        .iter()
        .chain(product_tests.iter())
        .all(|t| t.passed);

    let result = ComplianceResult {
        agency: input.agency,
        product: input.product,
        overall_pass,
        max_ltv_pct: profile.max_ltv_pct,
        min_dscr: profile.min_dscr,
        max_amortization_years: profile.max_amortization_years,
        core_tests,
        product_tests,
        ncf_adjustment,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "agency": input.agency,
        "product": input.product,
    });

    Ok(with_metadata(
        "Agency Product Compliance Evaluation",
        &assumptions,
        warnings,
        elapsed,
        result,
    ))
}

// ---------------------------------------------------------------------------
// Core tests
// ---------------------------------------------------------------------------

fn run_core_tests(profile: &ProductProfile, input: &ComplianceInput) -> Vec<ComplianceTest> {
    let m = &input.metrics;
    vec![
        min_test("DSCR Minimum", m.dscr, profile.min_dscr, None),
        max_test("LTV Maximum", m.ltv_pct, profile.max_ltv_pct, None),
        max_test(
            "Amortization Maximum",
            Decimal::from(m.amortization_years),
            Decimal::from(profile.max_amortization_years),
            None,
        ),
    ]
}

fn min_test(name: &str, actual: Decimal, required: Decimal, note: Option<String>) -> ComplianceTest {
    ComplianceTest {
        name: name.to_string(),
        passed: actual >= required,
        actual,
        required,
        note,
    }
}

fn max_test(name: &str, actual: Decimal, required: Decimal, note: Option<String>) -> ComplianceTest {
    ComplianceTest {
        name: name.to_string(),
        passed: actual <= required,
        actual,
        required,
        note,
    }
}

// ---------------------------------------------------------------------------
// Optional test applicability
// ---------------------------------------------------------------------------

/// Compute which optional tests run, and which armed tests were skipped for
/// lack of inputs. Applicability is decided entirely here so that "which
/// tests ran" is testable on its own.
fn applicable_tests(
    profile: &ProductProfile,
    input: &ComplianceInput,
) -> (Vec<OptionalTest>, Vec<&'static str>) {
    let opt = &input.optional;
    let mut applicable = Vec::new();
    let mut skipped = Vec::new();

    let mut gate = |test: OptionalTest, armed: bool, present: bool| {
        if !armed {
            return;
        }
        if present {
            applicable.push(test);
        } else {
            skipped.push(test.name());
        }
    };

    let loan_entered = !input.metrics.loan_amount.is_zero();
    gate(
        OptionalTest::LoanAmountMaximum,
        profile.max_loan_amount.is_some(),
        loan_entered,
    );
    gate(
        OptionalTest::LoanAmountMinimum,
        profile.min_loan_amount.is_some(),
        loan_entered,
    );

    let has_bed_mix = opt.independent_living_beds.is_some()
        || opt.assisted_living_beds.is_some()
        || opt.memory_care_beds.is_some();
    gate(
        OptionalTest::BlendedDscr,
        profile.product.is_seniors_housing(),
        has_bed_mix,
    );
    gate(
        OptionalTest::SkilledNursingCap,
        profile.max_skilled_nursing_pct.is_some(),
        opt.skilled_nursing_revenue_pct.is_some(),
    );

    gate(
        OptionalTest::CoopActualOperations,
        profile.coop_min_dscr_actual.is_some(),
        opt.dscr_actual_operations.is_some(),
    );
    gate(
        OptionalTest::CoopMarketRental,
        profile.coop_min_dscr_market.is_some(),
        opt.dscr_market_rental.is_some(),
    );

    gate(
        OptionalTest::StressDscr,
        profile.stress_min_dscr.is_some(),
        opt.arm_margin_pct.is_some() && opt.rate_cap_strike_pct.is_some(),
    );

    gate(
        OptionalTest::OccupancyFloor,
        profile.min_occupancy_pct.is_some(),
        opt.physical_occupancy_pct.is_some(),
    );
    gate(
        OptionalTest::RentalHomeCap,
        profile.max_rental_home_pct.is_some(),
        opt.rental_home_pct.is_some(),
    );

    // A deal explicitly outside its rehab window is not a skip; the rule
    // simply does not apply
    let rehab_armed = profile.rehab_min_dscr_amortizing.is_some()
        || profile.rehab_min_dscr_io.is_some();
    match opt.in_rehab_period {
        Some(true) => gate(OptionalTest::RehabDscr, rehab_armed, true),
        Some(false) => {}
        None => gate(OptionalTest::RehabDscr, rehab_armed, false),
    }

    gate(
        OptionalTest::LeaseUpPhysicalOccupancy,
        profile.leaseup_min_physical_occupancy_pct.is_some(),
        opt.physical_occupancy_pct.is_some(),
    );
    gate(
        OptionalTest::LeaseUpLeased,
        profile.leaseup_min_leased_pct.is_some(),
        opt.leased_pct.is_some(),
    );

    gate(
        OptionalTest::CombinedDscr,
        profile.combined_min_dscr.is_some(),
        opt.senior_annual_debt_service.is_some(),
    );
    gate(
        OptionalTest::CombinedLtv,
        profile.combined_max_ltv_pct.is_some(),
        opt.senior_loan_balance.is_some() && opt.property_value.is_some(),
    );

    (applicable, skipped)
}

// ---------------------------------------------------------------------------
// Optional test execution
// ---------------------------------------------------------------------------

/// Run one applicable optional test. Returns None only if an input that
/// applicability already checked has gone missing, which leaves the verdict
/// unchanged rather than inventing a failure.
fn run_optional_test(
    test: OptionalTest,
    profile: &ProductProfile,
    input: &ComplianceInput,
) -> Option<ComplianceTest> {
    let m = &input.metrics;
    let opt = &input.optional;

    match test {
        OptionalTest::LoanAmountMaximum => {
            let cap = profile.max_loan_amount?;
            Some(max_test(test.name(), m.loan_amount, cap, None))
        }
        OptionalTest::LoanAmountMinimum => {
            let floor = profile.min_loan_amount?;
            Some(min_test(test.name(), m.loan_amount, floor, None))
        }
        OptionalTest::BlendedDscr => {
            let il = opt.independent_living_beds.unwrap_or(0);
            let al = opt.assisted_living_beds.unwrap_or(0);
            let mc = opt.memory_care_beds.unwrap_or(0);
            let required = registry::blended_min_dscr(input.agency, il, al, mc);
            Some(min_test(
                test.name(),
                m.dscr,
                required,
                Some(format!("bed mix IL {il} / AL {al} / MC {mc}")),
            ))
        }
        OptionalTest::SkilledNursingCap => {
            let cap = profile.max_skilled_nursing_pct?;
            let actual = opt.skilled_nursing_revenue_pct?;
            Some(max_test(test.name(), actual, cap, None))
        }
        OptionalTest::CoopActualOperations => {
            let required = profile.coop_min_dscr_actual?;
            let actual = opt.dscr_actual_operations?;
            Some(min_test(test.name(), actual, required, None))
        }
        OptionalTest::CoopMarketRental => {
            let required = profile.coop_min_dscr_market?;
            let actual = opt.dscr_market_rental?;
            Some(min_test(test.name(), actual, required, None))
        }
        OptionalTest::StressDscr => {
            let required = profile.stress_min_dscr?;
            let stressed_rate = opt.arm_margin_pct? + opt.rate_cap_strike_pct?;
            let stressed_ds = ratios::annual_debt_service(
                m.loan_amount,
                stressed_rate,
                m.amortization_years,
                m.interest_only,
            );
            let actual = ratios::dscr(m.net_operating_income, stressed_ds);
            Some(min_test(
                test.name(),
                actual,
                required,
                Some(format!("debt service recomputed at {stressed_rate}% note rate")),
            ))
        }
        OptionalTest::OccupancyFloor => {
            let floor = profile.min_occupancy_pct?;
            let actual = opt.physical_occupancy_pct?;
            Some(min_test(test.name(), actual, floor, None))
        }
        OptionalTest::RentalHomeCap => {
            let cap = profile.max_rental_home_pct?;
            let actual = opt.rental_home_pct?;
            Some(max_test(test.name(), actual, cap, None))
        }
        OptionalTest::RehabDscr => {
            let required = if m.interest_only {
                profile.rehab_min_dscr_io?
            } else {
                profile.rehab_min_dscr_amortizing?
            };
            let basis = if m.interest_only { "interest-only" } else { "amortizing" };
            Some(min_test(
                test.name(),
                m.dscr,
                required,
                Some(format!("{basis} basis during rehab period")),
            ))
        }
        OptionalTest::LeaseUpPhysicalOccupancy => {
            let floor = profile.leaseup_min_physical_occupancy_pct?;
            let actual = opt.physical_occupancy_pct?;
            Some(min_test(test.name(), actual, floor, None))
        }
        OptionalTest::LeaseUpLeased => {
            let floor = profile.leaseup_min_leased_pct?;
            let actual = opt.leased_pct?;
            Some(min_test(test.name(), actual, floor, None))
        }
        OptionalTest::CombinedDscr => {
            let required = profile.combined_min_dscr?;
            let senior_ds = opt.senior_annual_debt_service?;
            let combined_ds = senior_ds + m.annual_debt_service;
            let actual = ratios::dscr(m.net_operating_income, combined_ds);
            Some(min_test(
                test.name(),
                actual,
                required,
                Some("senior and supplemental debt service combined".to_string()),
            ))
        }
        OptionalTest::CombinedLtv => {
            let cap = profile.combined_max_ltv_pct?;
            let senior_balance = opt.senior_loan_balance?;
            let value = opt.property_value?;
            let actual = if value.is_zero() {
                Decimal::ZERO
            } else {
                round_ratio((senior_balance + m.loan_amount) / value * dec!(100))
            };
            Some(max_test(
                test.name(),
                actual,
                cap,
                Some("senior and supplemental balances combined".to_string()),
            ))
        }
    }
}

/// Weighted owner/tenant projected-savings credit for green retrofit
/// products. Informational NCF adjustment, never a pass/fail test.
fn green_ncf_adjustment(
    profile: &ProductProfile,
    opt: &OptionalInputs,
    warnings: &mut Vec<String>,
) -> Option<Money> {
    let owner_weight = profile.green_owner_savings_weight?;
    let tenant_weight = profile.green_tenant_savings_weight?;

    if opt.owner_projected_savings.is_none() && opt.tenant_projected_savings.is_none() {
        warnings.push(
            "Green NCF adjustment skipped: no projected savings provided".to_string(),
        );
        return None;
    }

    let owner = opt.owner_projected_savings.unwrap_or(Decimal::ZERO);
    let tenant = opt.tenant_projected_savings.unwrap_or(Decimal::ZERO);
    Some(round_currency(owner * owner_weight + tenant * tenant_weight))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance::inputs::ActualMetrics;
    use rust_decimal_macros::dec;

    fn passing_metrics() -> ActualMetrics {
        ActualMetrics {
            dscr: dec!(1.45),
            ltv_pct: dec!(70),
            amortization_years: 30,
            interest_only: false,
            loan_amount: dec!(6_500_000),
            annual_debt_service: dec!(450_000),
            net_operating_income: dec!(700_000),
            note_rate_pct: dec!(5.5),
        }
    }

    fn request(agency: Agency, product: ProductVariant) -> ComplianceInput {
        ComplianceInput {
            agency,
            product,
            metrics: passing_metrics(),
            optional: OptionalInputs::default(),
        }
    }

    #[test]
    fn test_conventional_all_core_pass() {
        let out =
            evaluate_compliance(&request(Agency::FannieMae, ProductVariant::Conventional)).unwrap();
        let r = &out.result;

        assert!(r.overall_pass);
        assert_eq!(r.core_tests.len(), 3);
        assert!(r.product_tests.is_empty());
        assert_eq!(r.max_ltv_pct, dec!(80));
        assert_eq!(r.min_dscr, dec!(1.25));
    }

    #[test]
    fn test_ltv_over_cap_fails_overall() {
        // 82% actual against the 80% small-balance cap: DSCR passes but the
        // verdict is false
        let mut input = request(Agency::FreddieMac, ProductVariant::SmallBalance);
        input.metrics.ltv_pct = dec!(82);
        let out = evaluate_compliance(&input).unwrap();
        let r = &out.result;

        let ltv = r.core_tests.iter().find(|t| t.name == "LTV Maximum").unwrap();
        assert!(!ltv.passed);
        assert_eq!(ltv.actual, dec!(82));
        assert_eq!(ltv.required, dec!(80));

        let dscr = r.core_tests.iter().find(|t| t.name == "DSCR Minimum").unwrap();
        assert!(dscr.passed);

        assert!(!r.overall_pass);
    }

    #[test]
    fn test_dscr_below_minimum_fails() {
        let mut input = request(Agency::FannieMae, ProductVariant::Conventional);
        input.metrics.dscr = dec!(1.10);
        let out = evaluate_compliance(&input).unwrap();
        assert!(!out.result.overall_pass);
    }

    #[test]
    fn test_amortization_over_maximum_fails() {
        let mut input = request(Agency::FannieMae, ProductVariant::Conventional);
        input.metrics.amortization_years = 35;
        let out = evaluate_compliance(&input).unwrap();
        assert!(!out.result.overall_pass);
    }

    #[test]
    fn test_implausible_amortization_is_an_error() {
        let mut input = request(Agency::FannieMae, ProductVariant::AdjustableRate);
        input.metrics.amortization_years = 400_000_000;
        input.optional.arm_margin_pct = Some(dec!(2.5));
        input.optional.rate_cap_strike_pct = Some(dec!(5.0));
        let err = evaluate_compliance(&input).unwrap_err();
        match err {
            UnderwritingError::InvalidInput { field, .. } => {
                assert_eq!(field, "amortization_years")
            }
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_product_is_an_error() {
        let input = request(Agency::FannieMae, ProductVariant::ValueAdd);
        assert!(evaluate_compliance(&input).is_err());
    }

    #[test]
    fn test_missing_optional_inputs_skip_not_fail() {
        // Seniors product without a bed mix: blended and concentration tests
        // are skipped with warnings and the verdict is unchanged
        let input = request(Agency::FannieMae, ProductVariant::SeniorsAssistedLiving);
        let out = evaluate_compliance(&input).unwrap();
        let r = &out.result;

        assert!(r.product_tests.is_empty());
        assert!(r.overall_pass);
        assert!(out
            .warnings
            .iter()
            .any(|w| w.contains("Blended DSCR") && w.contains("skipped")));
        assert!(out
            .warnings
            .iter()
            .any(|w| w.contains("Skilled Nursing") && w.contains("skipped")));
    }

    #[test]
    fn test_inapplicable_test_never_changes_verdict() {
        let base = request(Agency::FannieMae, ProductVariant::SeniorsAssistedLiving);
        let base_out = evaluate_compliance(&base).unwrap();

        // Providing the skilled-nursing input adds one test; the bed-mix test
        // stays skipped and everything else is identical
        let mut with_sn = base.clone();
        with_sn.optional.skilled_nursing_revenue_pct = Some(dec!(12));
        let sn_out = evaluate_compliance(&with_sn).unwrap();

        assert_eq!(base_out.result.core_tests, sn_out.result.core_tests);
        assert_eq!(sn_out.result.product_tests.len(), 1);
        assert_eq!(base_out.result.overall_pass, sn_out.result.overall_pass);
    }

    #[test]
    fn test_blended_dscr_runs_with_bed_mix() {
        let mut input = request(Agency::FannieMae, ProductVariant::SeniorsAssistedLiving);
        input.optional.assisted_living_beds = Some(100);
        input.metrics.dscr = dec!(1.40);
        let out = evaluate_compliance(&input).unwrap();
        let r = &out.result;

        let blended = r
            .product_tests
            .iter()
            .find(|t| t.name.contains("Blended"))
            .unwrap();
        // AL-only mix requires exactly the AL constant
        assert_eq!(blended.required, dec!(1.40));
        assert!(blended.passed);
        assert!(r.overall_pass);
    }

    #[test]
    fn test_blended_dscr_failure() {
        let mut input = request(Agency::FreddieMac, ProductVariant::SeniorsMemoryCare);
        input.optional.memory_care_beds = Some(60);
        input.metrics.dscr = dec!(1.45); // Freddie memory care requires 1.50
        let out = evaluate_compliance(&input).unwrap();
        assert!(!out.result.overall_pass);
    }

    #[test]
    fn test_skilled_nursing_concentration_cap() {
        let mut input = request(Agency::FannieMae, ProductVariant::SeniorsAssistedLiving);
        input.optional.assisted_living_beds = Some(80);
        input.optional.skilled_nursing_revenue_pct = Some(dec!(24));
        input.metrics.dscr = dec!(1.50);
        let out = evaluate_compliance(&input).unwrap();
        let r = &out.result;

        let sn = r
            .product_tests
            .iter()
            .find(|t| t.name.contains("Skilled Nursing"))
            .unwrap();
        assert!(!sn.passed);
        assert_eq!(sn.required, dec!(20));
        assert!(!r.overall_pass);
    }

    #[test]
    fn test_cooperative_dual_basis() {
        let mut input = request(Agency::FannieMae, ProductVariant::Cooperative);
        input.metrics.ltv_pct = dec!(50);
        input.metrics.dscr = dec!(1.05);
        input.optional.dscr_actual_operations = Some(dec!(1.02));
        input.optional.dscr_market_rental = Some(dec!(1.40)); // below the 1.55 minimum
        let out = evaluate_compliance(&input).unwrap();
        let r = &out.result;

        assert_eq!(r.product_tests.len(), 2);
        let actual_ops = r
            .product_tests
            .iter()
            .find(|t| t.name.contains("Actual Operations"))
            .unwrap();
        assert!(actual_ops.passed);
        let market = r
            .product_tests
            .iter()
            .find(|t| t.name.contains("Market Rental"))
            .unwrap();
        assert!(!market.passed);
        assert!(!r.overall_pass);
    }

    #[test]
    fn test_cooperative_single_basis_present() {
        // Only the actual-operations figure entered: the market test is
        // skipped, not failed
        let mut input = request(Agency::FannieMae, ProductVariant::Cooperative);
        input.metrics.ltv_pct = dec!(50);
        input.optional.dscr_actual_operations = Some(dec!(1.10));
        let out = evaluate_compliance(&input).unwrap();

        assert_eq!(out.result.product_tests.len(), 1);
        assert!(out.result.overall_pass);
        assert!(out
            .warnings
            .iter()
            .any(|w| w.contains("Market Rental") && w.contains("skipped")));
    }

    #[test]
    fn test_stress_dscr_at_capped_rate() {
        let mut input = request(Agency::FannieMae, ProductVariant::AdjustableRate);
        input.optional.arm_margin_pct = Some(dec!(2.5));
        input.optional.rate_cap_strike_pct = Some(dec!(5.5));
        let out = evaluate_compliance(&input).unwrap();
        let r = &out.result;

        let stress = r
            .product_tests
            .iter()
            .find(|t| t.name.contains("Stress"))
            .unwrap();
        // Debt service at 8% on 6.5M amortizing exceeds the actual-rate
        // figure, so the stressed DSCR sits below the underwritten 1.45
        assert!(stress.actual < input.metrics.dscr);
        assert_eq!(stress.required, dec!(1.00));
        assert!(stress.note.as_deref().unwrap().contains("8"));
    }

    #[test]
    fn test_manufactured_housing_floors_and_caps() {
        let mut input = request(Agency::FreddieMac, ProductVariant::ManufacturedHousing);
        input.optional.physical_occupancy_pct = Some(dec!(78)); // floor is 80
        input.optional.rental_home_pct = Some(dec!(20)); // cap is 25
        let out = evaluate_compliance(&input).unwrap();
        let r = &out.result;

        let occ = r
            .product_tests
            .iter()
            .find(|t| t.name.contains("Occupancy"))
            .unwrap();
        assert!(!occ.passed);
        let rental = r
            .product_tests
            .iter()
            .find(|t| t.name.contains("Rental Home"))
            .unwrap();
        assert!(rental.passed);
        assert!(!r.overall_pass);
    }

    #[test]
    fn test_rehab_minimum_depends_on_io_flag() {
        let mut amortizing = request(Agency::FannieMae, ProductVariant::ModerateRehab);
        amortizing.optional.in_rehab_period = Some(true);
        amortizing.metrics.dscr = dec!(1.18);
        let out = evaluate_compliance(&amortizing).unwrap();
        let rehab = out.result.product_tests.first().unwrap();
        assert_eq!(rehab.required, dec!(1.15));
        assert!(rehab.passed);

        let mut io = amortizing.clone();
        io.metrics.interest_only = true;
        let out = evaluate_compliance(&io).unwrap();
        let rehab = out.result.product_tests.first().unwrap();
        assert_eq!(rehab.required, dec!(1.30));
        assert!(!rehab.passed);
        assert!(!out.result.overall_pass);
    }

    #[test]
    fn test_rehab_flag_false_means_not_applicable() {
        let mut input = request(Agency::FannieMae, ProductVariant::ModerateRehab);
        input.optional.in_rehab_period = Some(false);
        let out = evaluate_compliance(&input).unwrap();

        assert!(out.result.product_tests.is_empty());
        // Explicitly outside the rehab window: no skip warning either
        assert!(!out.warnings.iter().any(|w| w.contains("Rehab")));
    }

    #[test]
    fn test_lease_up_floors() {
        let mut input = request(Agency::FreddieMac, ProductVariant::LeaseUp);
        input.metrics.ltv_pct = dec!(68);
        input.optional.physical_occupancy_pct = Some(dec!(70));
        input.optional.leased_pct = Some(dec!(82)); // floor is 85
        let out = evaluate_compliance(&input).unwrap();
        let r = &out.result;

        assert_eq!(r.product_tests.len(), 2);
        assert!(r.product_tests.iter().any(|t| t.name.contains("Physical") && t.passed));
        assert!(r.product_tests.iter().any(|t| t.name.contains("Leased") && !t.passed));
        assert!(!r.overall_pass);
    }

    #[test]
    fn test_supplemental_combined_tests() {
        let mut input = request(Agency::FannieMae, ProductVariant::Supplemental);
        input.metrics.loan_amount = dec!(1_500_000);
        input.metrics.annual_debt_service = dec!(110_000);
        input.metrics.ltv_pct = dec!(12);
        input.optional.senior_loan_balance = Some(dec!(6_000_000));
        input.optional.senior_annual_debt_service = Some(dec!(420_000));
        input.optional.property_value = Some(dec!(10_000_000));
        let out = evaluate_compliance(&input).unwrap();
        let r = &out.result;

        let combined_dscr = r
            .product_tests
            .iter()
            .find(|t| t.name == "Combined DSCR Minimum")
            .unwrap();
        // 700,000 / 530,000 = 1.3207... -> 1.32
        assert_eq!(combined_dscr.actual, dec!(1.32));
        assert!(combined_dscr.passed);

        let combined_ltv = r
            .product_tests
            .iter()
            .find(|t| t.name == "Combined LTV Maximum")
            .unwrap();
        // (6,000,000 + 1,500,000) / 10,000,000 = 75%
        assert_eq!(combined_ltv.actual, dec!(75));
        assert!(combined_ltv.passed);
        assert!(r.overall_pass);
    }

    #[test]
    fn test_green_ncf_adjustment_weights() {
        let mut input = request(Agency::FannieMae, ProductVariant::GreenRetrofit);
        input.optional.owner_projected_savings = Some(dec!(40_000));
        input.optional.tenant_projected_savings = Some(dec!(20_000));
        let out = evaluate_compliance(&input).unwrap();

        // Fannie: 100% of owner + 75% of tenant savings
        assert_eq!(out.result.ncf_adjustment, Some(dec!(55_000)));
        assert!(out.result.product_tests.is_empty());
    }

    #[test]
    fn test_green_adjustment_differs_by_agency() {
        let mut input = request(Agency::FreddieMac, ProductVariant::GreenRetrofit);
        input.optional.owner_projected_savings = Some(dec!(40_000));
        input.optional.tenant_projected_savings = Some(dec!(20_000));
        let out = evaluate_compliance(&input).unwrap();

        // Freddie weights tenant savings at 50%
        assert_eq!(out.result.ncf_adjustment, Some(dec!(50_000)));
    }

    #[test]
    fn test_green_adjustment_skipped_without_savings() {
        let input = request(Agency::FannieMae, ProductVariant::GreenRetrofit);
        let out = evaluate_compliance(&input).unwrap();
        assert_eq!(out.result.ncf_adjustment, None);
        assert!(out.warnings.iter().any(|w| w.contains("Green NCF")));
    }

    #[test]
    fn test_small_loan_size_window() {
        let mut input = request(Agency::FannieMae, ProductVariant::SmallLoan);
        input.metrics.loan_amount = dec!(9_500_000); // over the 9M cap
        let out = evaluate_compliance(&input).unwrap();
        let r = &out.result;

        let max = r
            .product_tests
            .iter()
            .find(|t| t.name == "Loan Amount Maximum")
            .unwrap();
        assert!(!max.passed);
        let min = r
            .product_tests
            .iter()
            .find(|t| t.name == "Loan Amount Minimum")
            .unwrap();
        assert!(min.passed);
        assert!(!r.overall_pass);
    }

    #[test]
    fn test_result_round_trips_through_json() {
        let mut input = request(Agency::FannieMae, ProductVariant::SeniorsAssistedLiving);
        input.optional.assisted_living_beds = Some(100);
        let out = evaluate_compliance(&input).unwrap();

        let json = serde_json::to_string(&out.result).unwrap();
        let back: ComplianceResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, out.result);
    }
}
