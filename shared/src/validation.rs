//! Validation utilities for SKUs and stored cost configuration

use rust_decimal::Decimal;

use crate::error::{WorkflowError, WorkflowResult};
use crate::models::Configuration;

// ============================================================================
// Catalog Validations
// ============================================================================

/// Validate a catalog SKU: 1 to 64 visible characters, no whitespace
pub fn validate_sku(sku: &str) -> Result<(), &'static str> {
    if sku.is_empty() || sku.len() > 64 {
        return Err("SKU must be 1 to 64 characters");
    }
    if sku.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err("SKU cannot contain whitespace");
    }
    Ok(())
}

/// Largest price, volume or cost figure accepted as input (10^12)
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

const TOO_LARGE: &str = "must not exceed 1000000000000";

// ============================================================================
// Configuration Validations
// ============================================================================

/// Percentages are stored as fractions
pub fn validate_fraction(value: Decimal) -> Result<(), &'static str> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err("must be a fraction between 0 and 1");
    }
    Ok(())
}

pub fn validate_rate(value: Decimal) -> Result<(), &'static str> {
    if value <= Decimal::ZERO {
        return Err("must be greater than zero");
    }
    if value > MAX_AMOUNT {
        return Err(TOO_LARGE);
    }
    Ok(())
}

pub fn validate_amount(value: Decimal) -> Result<(), &'static str> {
    if value < Decimal::ZERO {
        return Err("cannot be negative");
    }
    if value > MAX_AMOUNT {
        return Err(TOO_LARGE);
    }
    Ok(())
}

fn check(
    field: &str,
    value: Option<Decimal>,
    rule: fn(Decimal) -> Result<(), &'static str>,
) -> WorkflowResult<()> {
    match value {
        Some(v) => rule(v).map_err(|message| WorkflowError::invalid(field, message)),
        None => Ok(()),
    }
}

/// Validate the fields an administrator did fill in.
///
/// Absent fields are allowed here; completeness is only enforced when the
/// cost engine runs.
pub fn validate_configuration(config: &Configuration) -> WorkflowResult<()> {
    check("exchange_rates.rmb_to_usd", config.exchange_rates.rmb_to_usd, validate_rate)?;
    check("exchange_rates.usd_to_local", config.exchange_rates.usd_to_local, validate_rate)?;
    check("container_cbm", config.container_cbm, validate_rate)?;
    check("fixed_costs_usd.ocean_freight", config.fixed_costs_usd.ocean_freight, validate_amount)?;
    for (key, value) in &config.fixed_costs_usd.other {
        check(&format!("fixed_costs_usd.{}", key), Some(*value), validate_amount)?;
    }
    for (key, value) in &config.fixed_costs_local {
        check(&format!("fixed_costs_local.{}", key), Some(*value), validate_amount)?;
    }

    let vc = &config.variable_costs;
    check("variable_costs.supplier_commission", vc.supplier_commission, validate_fraction)?;
    check("variable_costs.container_insurance", vc.container_insurance, validate_fraction)?;
    check("variable_costs.import_duty", vc.import_duty, validate_fraction)?;
    check("variable_costs.vat", vc.vat, validate_fraction)?;

    let mp = &config.marketplace;
    check("marketplace.commission_pct", mp.commission_pct, validate_fraction)?;
    check("marketplace.shipping_threshold", mp.shipping_threshold, validate_amount)?;
    check("marketplace.shipping_cost", mp.shipping_cost, validate_amount)?;
    check("marketplace.medium_threshold", mp.medium_threshold, validate_amount)?;
    check("marketplace.medium_charge", mp.medium_charge, validate_amount)?;
    check("marketplace.low_charge", mp.low_charge, validate_amount)?;

    if let (Some(medium), Some(shipping)) = (mp.medium_threshold, mp.shipping_threshold) {
        if medium > shipping {
            return Err(WorkflowError::invalid(
                "marketplace.medium_threshold",
                "cannot exceed the shipping threshold",
            ));
        }
    }
    Ok(())
}
