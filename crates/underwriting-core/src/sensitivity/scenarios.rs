use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::projections::project;
use crate::ratios::{debt_metrics, revenue_waterfall};
use crate::types::{CalculationInputs, Money, SensitivityScenario};

/// Run the four fixed stress scenarios against a shared base case:
/// base, income -5%, occupancy -10 points, exit cap +100 bps. Each scenario
/// is a full re-evaluation of the waterfall and projection under perturbed
/// inputs; deltas are versus the base row.
pub fn run_scenarios(inputs: &CalculationInputs) -> Vec<SensitivityScenario> {
    let (base_noi, base_exit) = evaluate_scenario(inputs);

    let mut income_shock = inputs.clone();
    income_shock.rent_per_unit = income_shock.rent_per_unit * dec!(0.95);

    let mut occupancy_shock = inputs.clone();
    occupancy_shock.occupancy_pct = (occupancy_shock.occupancy_pct - dec!(10)).max(Decimal::ZERO);

    let mut cap_expansion = inputs.clone();
    cap_expansion.exit_cap_rate_pct += dec!(1);

    let runs = [
        ("Base", base_noi, base_exit),
        scenario("Income -5%", &income_shock),
        scenario("Occupancy -10 pts", &occupancy_shock),
        scenario("Exit Cap +100 bps", &cap_expansion),
    ];

    runs.into_iter()
        .map(|(name, noi, exit_value)| SensitivityScenario {
            name: name.to_string(),
            noi,
            noi_delta: noi - base_noi,
            exit_value,
            exit_value_delta: exit_value - base_exit,
        })
        .collect()
}

fn scenario(name: &'static str, inputs: &CalculationInputs) -> (&'static str, Money, Money) {
    let (noi, exit_value) = evaluate_scenario(inputs);
    (name, noi, exit_value)
}

fn evaluate_scenario(inputs: &CalculationInputs) -> (Money, Money) {
    let waterfall = revenue_waterfall(inputs);
    let debt = debt_metrics(inputs, waterfall.net_operating_income);
    // Scenario warnings are discarded; the base pipeline run reports them
    let mut warnings = Vec::new();
    let projection = project(
        inputs,
        waterfall.net_operating_income,
        &debt,
        &mut warnings,
    );
    (waterfall.net_operating_income, projection.exit_value)
}
