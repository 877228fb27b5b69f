use napi::Result as NapiResult;
use napi_derive::napi;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Underwriting pipeline
// ---------------------------------------------------------------------------

#[napi]
pub fn evaluate_deal(input_json: String) -> NapiResult<String> {
    let input: underwriting_core::CalculationInputs =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = underwriting_core::pipeline::evaluate(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Compliance and risk
// ---------------------------------------------------------------------------

#[napi]
pub fn evaluate_compliance(input_json: String) -> NapiResult<String> {
    let input: underwriting_core::compliance::ComplianceInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        underwriting_core::compliance::evaluate_compliance(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn assess_risk(input_json: String) -> NapiResult<String> {
    let input: underwriting_core::risk::RiskInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = underwriting_core::risk::assess_risk(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Variance and reference data
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_variance(input_json: String) -> NapiResult<String> {
    let input: underwriting_core::variance::VarianceInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = underwriting_core::variance::calculate_variance(&input);
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn list_products(agency_json: String) -> NapiResult<String> {
    let agency: underwriting_core::Agency =
        serde_json::from_str(&agency_json).map_err(to_napi_error)?;
    let profiles: Vec<&underwriting_core::registry::ProductProfile> =
        underwriting_core::registry::catalog(agency).values().collect();
    serde_json::to_string(&profiles).map_err(to_napi_error)
}

#[napi]
pub fn suggest_product(agency_json: String, property_type_json: String) -> NapiResult<String> {
    let agency: underwriting_core::Agency =
        serde_json::from_str(&agency_json).map_err(to_napi_error)?;
    let property_type: underwriting_core::registry::PropertyType =
        serde_json::from_str(&property_type_json).map_err(to_napi_error)?;
    let product = underwriting_core::registry::suggest_product(agency, property_type);
    serde_json::to_string(&product).map_err(to_napi_error)
}
