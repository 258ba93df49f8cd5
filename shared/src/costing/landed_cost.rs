//! Landed-cost calculation from a supplier FOB price

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{add, div_or_zero, mul};
use crate::error::WorkflowResult;
use crate::models::CostParameters;
use crate::types::{Currency, Money};

/// Every intermediate figure of the landed-cost chain, in calculation order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LandedCostBreakdown {
    pub fob_foreign: Decimal,
    pub currency: Currency,
    pub rate_to_usd: Decimal,
    pub unit_volume_cbm: Decimal,
    pub fob_usd: Decimal,
    pub supplier_commission_usd: Decimal,
    pub fob_plus_commission_usd: Decimal,
    pub freight_per_unit_usd: Decimal,
    pub insurance_base_usd: Decimal,
    pub insurance_usd: Decimal,
    pub cif_usd: Decimal,
    pub usd_to_local: Decimal,
    pub cif_local: Decimal,
    pub import_duty_local: Decimal,
    pub vat_base_local: Decimal,
    pub vat_local: Decimal,
    /// Remaining fixed overhead per container, pooled in USD
    pub pooled_overhead_usd: Decimal,
    pub logistics_cost_local: Decimal,
    pub landed_cost_local: Decimal,
}

/// Ocean freight attributed to one unit by its volumetric share of a container
pub fn freight_per_unit(unit_volume: Decimal, params: &CostParameters) -> WorkflowResult<Decimal> {
    if unit_volume <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }
    let per_cbm = div_or_zero(params.ocean_freight_usd, params.container_cbm, "freight_per_unit_usd")?;
    mul(per_cbm, unit_volume, "freight_per_unit_usd")
}

/// Pooled fixed overhead attributed to one unit, converted to local currency
pub fn logistics_per_unit(
    unit_volume: Decimal,
    params: &CostParameters,
) -> WorkflowResult<(Decimal, Decimal)> {
    let local_in_usd = div_or_zero(params.fixed_local, params.usd_to_local, "pooled_overhead_usd")?;
    let pooled_usd = add(local_in_usd, params.other_fixed_usd, "pooled_overhead_usd")?;

    if unit_volume <= Decimal::ZERO {
        return Ok((pooled_usd, Decimal::ZERO));
    }
    let per_cbm = div_or_zero(pooled_usd, params.container_cbm, "logistics_cost_local")?;
    let per_unit_usd = mul(per_cbm, unit_volume, "logistics_cost_local")?;
    Ok((pooled_usd, mul(per_unit_usd, params.usd_to_local, "logistics_cost_local")?))
}

/// Run the full landed-cost chain for one unit
pub fn calculate_landed_cost(
    fob: Money,
    unit_volume_cbm: Decimal,
    params: &CostParameters,
) -> WorkflowResult<LandedCostBreakdown> {
    let rate_to_usd = params.rate_to_usd(fob.currency);

    let fob_usd = mul(fob.amount, rate_to_usd, "fob_usd")?;
    let supplier_commission_usd = mul(fob_usd, params.supplier_commission, "supplier_commission_usd")?;
    let fob_plus_commission_usd = add(fob_usd, supplier_commission_usd, "fob_plus_commission_usd")?;

    let freight_per_unit_usd = freight_per_unit(unit_volume_cbm, params)?;

    let insurance_base_usd = add(fob_plus_commission_usd, freight_per_unit_usd, "insurance_base_usd")?;
    let insurance_usd = mul(insurance_base_usd, params.container_insurance, "insurance_usd")?;
    let cif_usd = add(insurance_base_usd, insurance_usd, "cif_usd")?;

    let cif_local = mul(cif_usd, params.usd_to_local, "cif_local")?;
    let import_duty_local = mul(cif_local, params.import_duty, "import_duty_local")?;
    let vat_base_local = add(cif_local, import_duty_local, "vat_base_local")?;
    let vat_local = mul(vat_base_local, params.vat, "vat_local")?;

    let (pooled_overhead_usd, logistics_cost_local) = logistics_per_unit(unit_volume_cbm, params)?;

    let landed_cost_local = add(
        add(vat_base_local, vat_local, "landed_cost_local")?,
        logistics_cost_local,
        "landed_cost_local",
    )?;

    Ok(LandedCostBreakdown {
        fob_foreign: fob.amount,
        currency: fob.currency,
        rate_to_usd,
        unit_volume_cbm,
        fob_usd,
        supplier_commission_usd,
        fob_plus_commission_usd,
        freight_per_unit_usd,
        insurance_base_usd,
        insurance_usd,
        cif_usd,
        usd_to_local: params.usd_to_local,
        cif_local,
        import_duty_local,
        vat_base_local,
        vat_local,
        pooled_overhead_usd,
        logistics_cost_local,
        landed_cost_local,
    })
}
