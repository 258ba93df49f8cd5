//! Marketplace selling costs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{add, mul};
use crate::error::WorkflowResult;
use crate::models::MarketplaceFees;

/// Which flat surcharge band a selling price falls into
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SurchargeTier {
    /// Price qualifies for free shipping; the seller pays the shipping cost
    Shipping,
    Medium,
    Low,
    /// Zero price, nothing to charge
    None,
}

impl SurchargeTier {
    pub fn for_price(selling_price: Decimal, fees: &MarketplaceFees) -> Self {
        if selling_price >= fees.shipping_threshold && selling_price > Decimal::ZERO {
            SurchargeTier::Shipping
        } else if selling_price >= fees.medium_threshold && selling_price > Decimal::ZERO {
            SurchargeTier::Medium
        } else if selling_price > Decimal::ZERO {
            SurchargeTier::Low
        } else {
            SurchargeTier::None
        }
    }

    pub fn amount(&self, fees: &MarketplaceFees) -> Decimal {
        match self {
            SurchargeTier::Shipping => fees.shipping_cost,
            SurchargeTier::Medium => fees.medium_charge,
            SurchargeTier::Low => fees.low_charge,
            SurchargeTier::None => Decimal::ZERO,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MarketplaceFeeBreakdown {
    pub selling_price: Decimal,
    pub commission_pct: Decimal,
    pub commission: Decimal,
    pub tier: SurchargeTier,
    pub surcharge: Decimal,
    pub total: Decimal,
}

/// Total marketplace-side cost of selling one unit at `selling_price`
pub fn calculate_selling_cost(
    selling_price: Decimal,
    fees: &MarketplaceFees,
) -> WorkflowResult<MarketplaceFeeBreakdown> {
    let commission = mul(selling_price, fees.commission_pct, "commission")?;
    let tier = SurchargeTier::for_price(selling_price, fees);
    let surcharge = tier.amount(fees);

    Ok(MarketplaceFeeBreakdown {
        selling_price,
        commission_pct: fees.commission_pct,
        commission,
        tier,
        surcharge,
        total: add(commission, surcharge, "selling_cost")?,
    })
}
