//! Stage payloads as submitted by the acting party
//!
//! Every field is optional at the serde level so that a missing required field
//! is reported by name rather than as a generic parse failure. Unknown keys are
//! ignored.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use validator::{Validate, ValidationErrors};

use crate::error::{WorkflowError, WorkflowResult};
use crate::types::Currency;
use crate::validation::validate_rate;

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct ReplenishmentPayload {
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub suggested_quantity: Option<u32>,
    #[validate(length(max = 2000))]
    pub reason: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct QuoteRequestPayload {
    /// Defaults to the suggested quantity
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub requested_quantity: Option<u32>,
    #[validate(length(max = 2000))]
    pub comments: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct QuotationPayload {
    pub unit_price: Option<Decimal>,
    /// Defaults to RMB
    pub currency: Option<Currency>,
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub units_per_case: Option<u32>,
    pub case_volume_cbm: Option<Decimal>,
    pub production_lead_time_days: Option<u32>,
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub minimum_order_quantity: Option<u32>,
    #[validate(length(max = 120))]
    pub supplier_city: Option<String>,
    #[validate(length(max = 2000))]
    pub comments: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct AnalysisPayload {
    pub selling_price: Option<Decimal>,
    #[validate(length(max = 2000))]
    pub comments: Option<String>,
}

/// The approver supplies only the decision and overrides; the cost analysis
/// and target price are always computed.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct ApprovalPayload {
    pub approved: Option<bool>,
    #[validate(length(max = 2000))]
    pub comments: Option<String>,
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub purchase_quantity: Option<u32>,
    #[validate(length(min = 1, max = 64, message = "must be 1 to 64 characters"))]
    pub new_sku: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct PurchaseConfirmationPayload {
    /// Defaults to the approved quantity
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub confirmed_quantity: Option<u32>,
    pub estimated_delivery_date: Option<NaiveDate>,
    #[validate(length(max = 2000))]
    pub comments: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct ManufacturingPayload {
    /// Defaults to the confirmed quantity
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub manufactured_quantity: Option<u32>,
    pub completion_date: Option<NaiveDate>,
    #[validate(length(max = 2000))]
    pub quality_notes: Option<String>,
    #[validate(length(max = 2000))]
    pub comments: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct ShippingPayload {
    /// Defaults to the manufactured quantity
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub shipped_quantity: Option<u32>,
    #[validate(length(min = 1, max = 64, message = "must be 1 to 64 characters"))]
    pub container_number: Option<String>,
    #[validate(length(max = 2000))]
    pub comments: Option<String>,
}

/// Parse and validate a stage payload. `null` is treated as an empty object.
pub fn parse_payload<T>(payload: &serde_json::Value) -> WorkflowResult<T>
where
    T: DeserializeOwned + Validate,
{
    let value = match payload {
        serde_json::Value::Null => serde_json::Value::Object(serde_json::Map::new()),
        serde_json::Value::Object(_) => payload.clone(),
        _ => {
            return Err(WorkflowError::MalformedPayload(
                "payload must be a JSON object".to_string(),
            ))
        }
    };

    let parsed: T =
        serde_json::from_value(value).map_err(|e| WorkflowError::MalformedPayload(e.to_string()))?;
    parsed.validate().map_err(first_invalid_field)?;
    Ok(parsed)
}

/// Report the alphabetically first failing field so errors are stable
fn first_invalid_field(errors: ValidationErrors) -> WorkflowError {
    let field_errors = errors.field_errors();
    let mut fields: Vec<_> = field_errors.into_iter().collect();
    fields.sort_by_key(|(name, _)| *name);

    match fields.first() {
        Some((name, errs)) => {
            let message = errs
                .first()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .unwrap_or_else(|| "invalid".to_string());
            WorkflowError::invalid(*name, message)
        }
        None => WorkflowError::MalformedPayload("validation failed".to_string()),
    }
}

/// Unwrap a required field or name it as missing
pub fn require<T>(value: Option<T>, field: &str) -> WorkflowResult<T> {
    value.ok_or_else(|| WorkflowError::MissingField(field.to_string()))
}

/// Require a strictly positive decimal no larger than
/// [`MAX_AMOUNT`](crate::validation::MAX_AMOUNT)
pub fn require_positive(value: Option<Decimal>, field: &str) -> WorkflowResult<Decimal> {
    let value = require(value, field)?;
    validate_rate(value).map_err(|message| WorkflowError::invalid(field, message))?;
    Ok(value)
}
