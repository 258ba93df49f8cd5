//! Margin and target-price solving
//!
//! The target-price solve walks the landed-cost chain backwards in the same
//! order it runs forwards. Its result is advisory only.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::landed_cost::LandedCostBreakdown;
use super::{div_or_zero, mul, sub};
use crate::error::WorkflowResult;
use crate::models::CostParameters;
use crate::types::Currency;

/// Net margin the business aims for, as a fraction of selling price
pub const TARGET_MARGIN: Decimal = Decimal::from_parts(18, 0, 0, false, 2);

/// Lowest target FOB price ever reported, in the quotation currency
pub const TARGET_PRICE_FLOOR: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MarginAnalysis {
    pub selling_price: Decimal,
    pub landed_cost: Decimal,
    pub selling_cost: Decimal,
    pub net_profit: Decimal,
    /// Net profit over selling price, in percent
    pub margin_pct: Decimal,
    pub target_margin_pct: Decimal,
    pub below_target: bool,
}

/// The FOB price that would bring the margin back to target, with the
/// intermediate figures of the backwards solve
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TargetPrice {
    pub target_landed_cost_local: Decimal,
    pub target_cif_local: Decimal,
    pub target_cif_usd: Decimal,
    pub target_fob_plus_commission_usd: Decimal,
    pub target_fob_usd: Decimal,
    /// Solved price before the floor is applied
    pub unclamped_fob_foreign: Decimal,
    pub target_fob_foreign: Decimal,
    pub currency: Currency,
    /// Whether the floor replaced the solved price
    pub clamped: bool,
}

pub fn calculate_margin(
    selling_price: Decimal,
    landed_cost: Decimal,
    selling_cost: Decimal,
) -> WorkflowResult<MarginAnalysis> {
    let net_profit = sub(sub(selling_price, landed_cost, "net_profit")?, selling_cost, "net_profit")?;
    let ratio = div_or_zero(net_profit, selling_price, "margin_pct")?;
    let margin_pct = mul(ratio, Decimal::ONE_HUNDRED, "margin_pct")?;
    let target_margin_pct = TARGET_MARGIN * Decimal::ONE_HUNDRED;

    Ok(MarginAnalysis {
        selling_price,
        landed_cost,
        selling_cost,
        net_profit,
        margin_pct,
        target_margin_pct,
        below_target: margin_pct < target_margin_pct,
    })
}

/// Solve for the FOB price (in the quotation currency) at which the margin is
/// exactly [`TARGET_MARGIN`].
///
/// Logistics does not depend on FOB and is taken from `current`. Duty and VAT
/// compound on CIF, insurance on FOB plus commission plus freight.
pub fn solve_target_price(
    selling_price: Decimal,
    selling_cost: Decimal,
    current: &LandedCostBreakdown,
    params: &CostParameters,
) -> WorkflowResult<TargetPrice> {
    let target_landed_cost_local = sub(
        mul(selling_price, Decimal::ONE - TARGET_MARGIN, "target_landed_cost_local")?,
        selling_cost,
        "target_landed_cost_local",
    )?;

    let tax_factor = mul(
        Decimal::ONE + params.import_duty,
        Decimal::ONE + params.vat,
        "target_cif_local",
    )?;
    let target_cif_local = div_or_zero(
        sub(target_landed_cost_local, current.logistics_cost_local, "target_cif_local")?,
        tax_factor,
        "target_cif_local",
    )?;
    let target_cif_usd = div_or_zero(target_cif_local, params.usd_to_local, "target_cif_usd")?;

    let target_fob_plus_commission_usd = sub(
        div_or_zero(
            target_cif_usd,
            Decimal::ONE + params.container_insurance,
            "target_fob_plus_commission_usd",
        )?,
        current.freight_per_unit_usd,
        "target_fob_plus_commission_usd",
    )?;
    let target_fob_usd = div_or_zero(
        target_fob_plus_commission_usd,
        Decimal::ONE + params.supplier_commission,
        "target_fob_usd",
    )?;
    let unclamped_fob_foreign = div_or_zero(target_fob_usd, current.rate_to_usd, "target_fob_foreign")?;

    let clamped = unclamped_fob_foreign < TARGET_PRICE_FLOOR;
    let target_fob_foreign = if clamped {
        TARGET_PRICE_FLOOR
    } else {
        unclamped_fob_foreign
    };

    Ok(TargetPrice {
        target_landed_cost_local,
        target_cif_local,
        target_cif_usd,
        target_fob_plus_commission_usd,
        target_fob_usd,
        unclamped_fob_foreign,
        target_fob_foreign,
        currency: current.currency,
        clamped,
    })
}
