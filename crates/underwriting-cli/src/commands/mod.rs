pub mod compliance;
pub mod evaluate;
pub mod products;
pub mod risk;
pub mod variance;

use underwriting_core::{Agency, ProductVariant};

/// Parse an agency name, accepting the common short forms.
pub(crate) fn parse_agency(s: &str) -> Result<Agency, Box<dyn std::error::Error>> {
    match s.to_lowercase().as_str() {
        "fannie" | "fannie-mae" | "fnma" => Ok(Agency::FannieMae),
        "freddie" | "freddie-mac" | "fhlmc" => Ok(Agency::FreddieMac),
        other => {
            Err(format!("Unknown agency '{other}' (expected fannie-mae or freddie-mac)").into())
        }
    }
}

/// Parse a kebab-case product variant, e.g. `seniors-assisted-living`.
pub(crate) fn parse_product(s: &str) -> Result<ProductVariant, Box<dyn std::error::Error>> {
    serde_json::from_value(serde_json::Value::String(s.to_lowercase()))
        .map_err(|_| format!("Unknown product variant '{s}'").into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_agency_short_forms() {
        assert_eq!(parse_agency("fannie").unwrap(), Agency::FannieMae);
        assert_eq!(parse_agency("Freddie-Mac").unwrap(), Agency::FreddieMac);
        assert!(parse_agency("ginnie").is_err());
    }

    #[test]
    fn test_parse_product_kebab_case() {
        assert_eq!(
            parse_product("small-balance").unwrap(),
            ProductVariant::SmallBalance
        );
        assert_eq!(
            parse_product("Seniors-Assisted-Living").unwrap(),
            ProductVariant::SeniorsAssistedLiving
        );
        assert!(parse_product("mezzanine").is_err());
    }
}
