use clap::Args;
use serde_json::Value;

use underwriting_core::variance::{self, VarianceInput};

use crate::input;

/// Arguments for variance analysis. The input carries a full stored
/// projection plus the monthly actuals, so flag entry is not offered.
#[derive(Args)]
pub struct VarianceArgs {
    /// Path to JSON input file with `projection` and `actuals`
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_variance(args: VarianceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let variance_input: VarianceInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_piped()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input file is required for variance analysis".into());
    };

    let result = variance::calculate_variance(&variance_input);
    Ok(serde_json::to_value(result)?)
}
