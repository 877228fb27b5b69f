mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::compliance::ComplianceArgs;
use commands::evaluate::EvaluateArgs;
use commands::products::ProductsArgs;
use commands::risk::RiskArgs;
use commands::variance::VarianceArgs;

/// Agency multifamily underwriting calculations
#[derive(Parser)]
#[command(
    name = "uwe",
    version,
    about = "Agency multifamily underwriting calculations",
    long_about = "A CLI for deterministic multifamily underwriting with decimal precision. \
                  Supports the full NOI/debt/returns pipeline, cash-flow projections with \
                  IRR, sensitivity scenarios, Fannie Mae and Freddie Mac product compliance, \
                  risk ratings, and projection-versus-actuals variance."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full underwriting pipeline (waterfall, debt, projections, sensitivity)
    Evaluate(EvaluateArgs),
    /// Test a deal's metrics against an agency product rule set
    Compliance(ComplianceArgs),
    /// Rate a deal's headline metrics against severity bands
    Risk(RiskArgs),
    /// Compare reported actuals against a stored projection
    Variance(VarianceArgs),
    /// List agency product profiles and their thresholds
    Products(ProductsArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Evaluate(args) => commands::evaluate::run_evaluate(args),
        Commands::Compliance(args) => commands::compliance::run_compliance(args),
        Commands::Risk(args) => commands::risk::run_risk(args),
        Commands::Variance(args) => commands::variance::run_variance(args),
        Commands::Products(args) => commands::products::run_products(args),
        Commands::Version => {
            println!("uwe {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
