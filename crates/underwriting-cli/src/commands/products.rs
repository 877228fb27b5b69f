use clap::Args;
use serde_json::Value;

use underwriting_core::registry;
use underwriting_core::Agency;

/// Arguments for listing product profiles
#[derive(Args)]
pub struct ProductsArgs {
    /// Limit the listing to one agency: fannie-mae or freddie-mac
    #[arg(long)]
    pub agency: Option<String>,
}

pub fn run_products(args: ProductsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let agencies: Vec<Agency> = match args.agency.as_deref() {
        Some(s) => vec![super::parse_agency(s)?],
        None => vec![Agency::FannieMae, Agency::FreddieMac],
    };

    let mut profiles = Vec::new();
    for agency in agencies {
        for profile in registry::catalog(agency).values() {
            profiles.push(serde_json::to_value(profile)?);
        }
    }
    Ok(Value::Array(profiles))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_both_catalogs_by_default() {
        let value = run_products(ProductsArgs { agency: None }).unwrap();
        let arr = value.as_array().unwrap();
        assert_eq!(arr.len(), 30);
    }

    #[test]
    fn test_single_agency_listing() {
        let value = run_products(ProductsArgs {
            agency: Some("fannie-mae".to_string()),
        })
        .unwrap();
        let arr = value.as_array().unwrap();
        assert_eq!(arr.len(), 15);
        assert!(arr.iter().all(|p| p["agency"] == "fannie-mae"));
    }
}
