use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use underwriting_core::risk::{self, RiskInput};

use crate::input;

/// Arguments for threshold risk rating
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct RiskArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Agency: fannie-mae or freddie-mac
    #[arg(long)]
    pub agency: Option<String>,

    /// Product variant in kebab-case
    #[arg(long)]
    pub product: Option<String>,

    /// Underwritten DSCR
    #[arg(long)]
    pub dscr: Option<Decimal>,

    /// Loan-to-value percentage
    #[arg(long)]
    pub ltv: Option<Decimal>,

    /// Physical occupancy percentage
    #[arg(long)]
    pub occupancy: Option<Decimal>,

    /// Skilled nursing share of revenue, percent
    #[arg(long)]
    pub skilled_nursing: Option<Decimal>,
}

pub fn run_risk(args: RiskArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let risk_input: RiskInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_piped()? {
        serde_json::from_value(data)?
    } else {
        build_input(&args)?
    };

    let result = risk::assess_risk(&risk_input)?;
    Ok(serde_json::to_value(result)?)
}

fn build_input(args: &RiskArgs) -> Result<RiskInput, Box<dyn std::error::Error>> {
    let agency = args
        .agency
        .as_deref()
        .ok_or("--agency is required (or provide --input)")?;
    let product = args
        .product
        .as_deref()
        .ok_or("--product is required (or provide --input)")?;

    Ok(RiskInput {
        agency: super::parse_agency(agency)?,
        product: super::parse_product(product)?,
        dscr: args.dscr.ok_or("--dscr is required (or provide --input)")?,
        ltv_pct: args.ltv.ok_or("--ltv is required (or provide --input)")?,
        physical_occupancy_pct: args.occupancy,
        skilled_nursing_revenue_pct: args.skilled_nursing,
    })
}
