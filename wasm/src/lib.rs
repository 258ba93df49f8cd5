//! WebAssembly module for the import procurement tracker
//!
//! Lets the browser preview, with the same engine the server runs:
//! - Landed cost from a supplier quotation
//! - Marketplace selling cost
//! - Margin and the target FOB price
//! - Case-rounded purchase quantities
//!
//! Figures cross the boundary as JSON strings so decimals keep their precision.

use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

use shared::{
    adjust_to_case_multiple, analyze, calculate_landed_cost as landed_cost,
    calculate_selling_cost as selling_cost, Configuration, CostParameters, Currency, Money,
    WorkflowError,
};

fn decimal(value: f64, field: &str) -> Result<Decimal, String> {
    Decimal::try_from(value).map_err(|_| format!("{} is not a finite number", field))
}

fn resolve(config_json: &str) -> Result<CostParameters, String> {
    let config: Configuration = serde_json::from_str(config_json)
        .map_err(|e| format!("Invalid configuration JSON: {}", e))?;
    config.resolve().map_err(|e| e.to_string())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization failed: {}", e))
}

fn landed_cost_json(
    fob_amount: f64,
    currency: &str,
    unit_volume_cbm: f64,
    config_json: &str,
) -> Result<String, String> {
    let currency: Currency = currency.parse()?;
    let fob = Money::new(decimal(fob_amount, "fob_amount")?, currency);
    let params = resolve(config_json)?;
    let breakdown = landed_cost(fob, decimal(unit_volume_cbm, "unit_volume_cbm")?, &params)
        .map_err(|e| e.to_string())?;
    to_json(&breakdown)
}

fn selling_cost_json(selling_price: f64, config_json: &str) -> Result<String, String> {
    let params = resolve(config_json)?;
    let cost = selling_cost(decimal(selling_price, "selling_price")?, &params.marketplace)
        .map_err(|e| e.to_string())?;
    to_json(&cost)
}

fn analysis_json(
    fob_amount: f64,
    currency: &str,
    unit_volume_cbm: f64,
    selling_price: f64,
    config_json: &str,
) -> Result<String, String> {
    let currency: Currency = currency.parse()?;
    let fob = Money::new(decimal(fob_amount, "fob_amount")?, currency);
    let params = resolve(config_json)?;
    let analysis = analyze(
        fob,
        decimal(unit_volume_cbm, "unit_volume_cbm")?,
        decimal(selling_price, "selling_price")?,
        &params,
    )
    .map_err(|e| e.to_string())?;
    to_json(&analysis)
}

fn missing_fields_json(config_json: &str) -> Result<String, String> {
    let config: Configuration = serde_json::from_str(config_json)
        .map_err(|e| format!("Invalid configuration JSON: {}", e))?;
    let missing = match config.resolve() {
        Ok(_) => Vec::new(),
        Err(WorkflowError::ConfigurationIncomplete { missing }) => missing,
        Err(e) => return Err(e.to_string()),
    };
    to_json(&missing)
}

fn to_js_error(message: String) -> JsValue {
    if message.starts_with("Configuration incomplete") {
        web_sys::console::warn_1(&JsValue::from_str(&message));
    }
    js_sys::Error::new(&message).into()
}

/// Full landed-cost breakdown for one unit, as JSON
#[wasm_bindgen]
pub fn calculate_landed_cost(
    fob_amount: f64,
    currency: &str,
    unit_volume_cbm: f64,
    config_json: &str,
) -> Result<String, JsValue> {
    landed_cost_json(fob_amount, currency, unit_volume_cbm, config_json).map_err(to_js_error)
}

/// Marketplace commission and surcharge at a selling price, as JSON
#[wasm_bindgen]
pub fn calculate_selling_cost(selling_price: f64, config_json: &str) -> Result<String, JsValue> {
    selling_cost_json(selling_price, config_json).map_err(to_js_error)
}

/// Landed cost, selling cost, margin and target price, as JSON
#[wasm_bindgen]
pub fn analyze_margin(
    fob_amount: f64,
    currency: &str,
    unit_volume_cbm: f64,
    selling_price: f64,
    config_json: &str,
) -> Result<String, JsValue> {
    analysis_json(fob_amount, currency, unit_volume_cbm, selling_price, config_json)
        .map_err(to_js_error)
}

/// Configuration fields still needed before costs can be computed, as a JSON array
#[wasm_bindgen]
pub fn missing_configuration_fields(config_json: &str) -> Result<String, JsValue> {
    missing_fields_json(config_json).map_err(to_js_error)
}

/// Round a suggested quantity up to whole cases
#[wasm_bindgen]
pub fn adjust_purchase_quantity(suggested: u32, units_per_case: u32) -> u32 {
    adjust_to_case_multiple(suggested, units_per_case)
}

/// Whether a purchase quantity falls short of the supplier minimum
#[wasm_bindgen]
pub fn is_below_minimum_order(quantity: u32, minimum_order_quantity: Option<u32>) -> bool {
    shared::is_below_minimum_order(quantity, minimum_order_quantity)
}
