use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use underwriting_core::pipeline;
use underwriting_core::CalculationInputs;

use crate::input;

/// Arguments for the full underwriting pipeline
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct EvaluateArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Monthly rent per unit
    #[arg(long)]
    pub rent: Option<Decimal>,

    /// Number of units
    #[arg(long)]
    pub units: Option<u32>,

    /// Physical occupancy percentage (95 = 95%)
    #[arg(long)]
    pub occupancy: Option<Decimal>,

    /// Actual annual other income (estimated from net rent when omitted)
    #[arg(long)]
    pub other_income: Option<Decimal>,

    /// Other-income ratio override, percent of net rent
    #[arg(long)]
    pub other_income_ratio: Option<Decimal>,

    /// Actual annual operating expenses (estimated from EGI when omitted)
    #[arg(long, alias = "opex")]
    pub operating_expenses: Option<Decimal>,

    /// Expense ratio override, percent of EGI
    #[arg(long)]
    pub expense_ratio: Option<Decimal>,

    /// Purchase price
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Closing and diligence costs funded from equity
    #[arg(long)]
    pub acquisition_costs: Option<Decimal>,

    /// Loan-to-value percentage
    #[arg(long)]
    pub ltv: Option<Decimal>,

    /// Annual note rate percentage
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Interest-only loan
    #[arg(long)]
    pub interest_only: bool,

    /// Amortization term in years
    #[arg(long)]
    pub amortization: Option<u32>,

    /// Hold period in years
    #[arg(long)]
    pub hold: Option<u32>,

    /// Exit cap rate percentage
    #[arg(long)]
    pub exit_cap: Option<Decimal>,

    /// Annual NOI growth percentages from year 2, comma separated
    /// (last value carries forward)
    #[arg(long, value_delimiter = ',')]
    pub growth: Vec<Decimal>,
}

pub fn run_evaluate(args: EvaluateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let inputs: CalculationInputs = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_piped()? {
        serde_json::from_value(data)?
    } else {
        build_inputs(&args)?
    };

    let result = pipeline::evaluate(&inputs)?;
    Ok(serde_json::to_value(result)?)
}

fn build_inputs(args: &EvaluateArgs) -> Result<CalculationInputs, Box<dyn std::error::Error>> {
    Ok(CalculationInputs {
        rent_per_unit: args.rent.ok_or("--rent is required (or provide --input)")?,
        unit_count: args.units.ok_or("--units is required (or provide --input)")?,
        occupancy_pct: args
            .occupancy
            .ok_or("--occupancy is required (or provide --input)")?,
        other_income: args.other_income,
        other_income_ratio_pct: args.other_income_ratio,
        operating_expenses: args.operating_expenses,
        expense_ratio_pct: args.expense_ratio,
        purchase_price: args.price.ok_or("--price is required (or provide --input)")?,
        acquisition_costs: args.acquisition_costs.unwrap_or(Decimal::ZERO),
        ltv_pct: args.ltv.ok_or("--ltv is required (or provide --input)")?,
        interest_rate_pct: args.rate.ok_or("--rate is required (or provide --input)")?,
        interest_only: args.interest_only,
        amortization_years: args
            .amortization
            .ok_or("--amortization is required (or provide --input)")?,
        hold_period_years: args.hold.ok_or("--hold is required (or provide --input)")?,
        exit_cap_rate_pct: args
            .exit_cap
            .ok_or("--exit-cap is required (or provide --input)")?,
        noi_growth_pct: args.growth.clone(),
        agency: None,
        product: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn args() -> EvaluateArgs {
        EvaluateArgs {
            input: None,
            rent: Some(dec!(1200)),
            units: Some(100),
            occupancy: Some(dec!(95)),
            other_income: None,
            other_income_ratio: None,
            operating_expenses: None,
            expense_ratio: None,
            price: Some(dec!(10_000_000)),
            acquisition_costs: None,
            ltv: Some(dec!(65)),
            rate: Some(dec!(5.5)),
            interest_only: false,
            amortization: Some(30),
            hold: Some(5),
            exit_cap: Some(dec!(5.25)),
            growth: vec![dec!(3)],
        }
    }

    #[test]
    fn test_build_inputs_from_flags() {
        let inputs = build_inputs(&args()).unwrap();
        assert_eq!(inputs.rent_per_unit, dec!(1200));
        assert_eq!(inputs.unit_count, 100);
        assert_eq!(inputs.acquisition_costs, dec!(0));
        assert_eq!(inputs.noi_growth_pct, vec![dec!(3)]);
    }

    #[test]
    fn test_missing_required_flag_is_an_error() {
        let mut a = args();
        a.exit_cap = None;
        let err = build_inputs(&a).unwrap_err();
        assert!(err.to_string().contains("--exit-cap"));
    }
}
