use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use underwriting_core::compliance::{self, ActualMetrics, ComplianceInput, OptionalInputs};

use crate::input;

/// Arguments for agency product compliance testing. Product-specific
/// optional inputs (bed mix, ARM terms, senior loan figures, and so on)
/// are only accepted through a JSON input file or piped stdin.
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ComplianceArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Agency: fannie-mae or freddie-mac
    #[arg(long)]
    pub agency: Option<String>,

    /// Product variant in kebab-case, e.g. seniors-assisted-living
    #[arg(long)]
    pub product: Option<String>,

    /// Underwritten DSCR
    #[arg(long)]
    pub dscr: Option<Decimal>,

    /// Loan-to-value percentage
    #[arg(long)]
    pub ltv: Option<Decimal>,

    /// Amortization term in years
    #[arg(long)]
    pub amortization: Option<u32>,

    /// Interest-only loan
    #[arg(long)]
    pub interest_only: bool,

    /// Loan amount
    #[arg(long)]
    pub loan: Option<Decimal>,

    /// Annual debt service
    #[arg(long, alias = "ads")]
    pub debt_service: Option<Decimal>,

    /// Net operating income
    #[arg(long)]
    pub noi: Option<Decimal>,

    /// Annual note rate percentage
    #[arg(long)]
    pub rate: Option<Decimal>,
}

pub fn run_compliance(args: ComplianceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let compliance_input: ComplianceInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_piped()? {
        serde_json::from_value(data)?
    } else {
        build_input(&args)?
    };

    let result = compliance::evaluate_compliance(&compliance_input)?;
    Ok(serde_json::to_value(result)?)
}

fn build_input(args: &ComplianceArgs) -> Result<ComplianceInput, Box<dyn std::error::Error>> {
    let agency = args
        .agency
        .as_deref()
        .ok_or("--agency is required (or provide --input)")?;
    let product = args
        .product
        .as_deref()
        .ok_or("--product is required (or provide --input)")?;

    Ok(ComplianceInput {
        agency: super::parse_agency(agency)?,
        product: super::parse_product(product)?,
        metrics: ActualMetrics {
            dscr: args.dscr.ok_or("--dscr is required (or provide --input)")?,
            ltv_pct: args.ltv.ok_or("--ltv is required (or provide --input)")?,
            amortization_years: args
                .amortization
                .ok_or("--amortization is required (or provide --input)")?,
            interest_only: args.interest_only,
            loan_amount: args.loan.unwrap_or(Decimal::ZERO),
            annual_debt_service: args.debt_service.unwrap_or(Decimal::ZERO),
            net_operating_income: args.noi.unwrap_or(Decimal::ZERO),
            note_rate_pct: args.rate.unwrap_or(Decimal::ZERO),
        },
        optional: OptionalInputs::default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use underwriting_core::{Agency, ProductVariant};

    #[test]
    fn test_build_input_from_flags() {
        let args = ComplianceArgs {
            input: None,
            agency: Some("freddie".to_string()),
            product: Some("small-balance".to_string()),
            dscr: Some(dec!(1.32)),
            ltv: Some(dec!(74)),
            amortization: Some(30),
            interest_only: false,
            loan: Some(dec!(5_000_000)),
            debt_service: None,
            noi: None,
            rate: None,
        };
        let input = build_input(&args).unwrap();
        assert_eq!(input.agency, Agency::FreddieMac);
        assert_eq!(input.product, ProductVariant::SmallBalance);
        assert_eq!(input.metrics.annual_debt_service, dec!(0));
    }
}
