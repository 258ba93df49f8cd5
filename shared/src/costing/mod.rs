//! Cost engine: landed cost, marketplace fees, margin and target price

mod landed_cost;
mod margin;
mod marketplace;

pub use landed_cost::*;
pub use margin::*;
pub use marketplace::*;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{WorkflowError, WorkflowResult};
use crate::models::CostParameters;
use crate::types::{round_cents, Money};

fn out_of_range(figure: &str) -> WorkflowError {
    WorkflowError::invalid(figure, "is out of range")
}

pub(crate) fn mul(a: Decimal, b: Decimal, figure: &str) -> WorkflowResult<Decimal> {
    a.checked_mul(b).ok_or_else(|| out_of_range(figure))
}

pub(crate) fn add(a: Decimal, b: Decimal, figure: &str) -> WorkflowResult<Decimal> {
    a.checked_add(b).ok_or_else(|| out_of_range(figure))
}

pub(crate) fn sub(a: Decimal, b: Decimal, figure: &str) -> WorkflowResult<Decimal> {
    a.checked_sub(b).ok_or_else(|| out_of_range(figure))
}

/// Division where a zero divisor yields zero
pub(crate) fn div_or_zero(a: Decimal, b: Decimal, figure: &str) -> WorkflowResult<Decimal> {
    if b.is_zero() {
        return Ok(Decimal::ZERO);
    }
    a.checked_div(b).ok_or_else(|| out_of_range(figure))
}

/// Point-in-time result of running the whole cost engine for one product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CostAnalysis {
    pub landed_cost: LandedCostBreakdown,
    pub marketplace: MarketplaceFeeBreakdown,
    pub margin: MarginAnalysis,
    /// Present only when the margin is below target
    pub target_price: Option<TargetPrice>,
}

impl CostAnalysis {
    /// The advisory target FOB price, rounded to cents
    pub fn target_purchase_price(&self) -> Option<Money> {
        self.target_price
            .as_ref()
            .map(|t| Money::new(round_cents(t.target_fob_foreign), t.currency))
    }
}

/// Run landed cost, selling cost, margin and (when needed) the target-price solve.
///
/// Fails with `InvalidField` naming the first figure that leaves the range a
/// `Decimal` can hold.
pub fn analyze(
    fob: Money,
    unit_volume_cbm: Decimal,
    selling_price: Decimal,
    params: &CostParameters,
) -> WorkflowResult<CostAnalysis> {
    let landed_cost = calculate_landed_cost(fob, unit_volume_cbm, params)?;
    let marketplace = calculate_selling_cost(selling_price, &params.marketplace)?;
    let margin = calculate_margin(selling_price, landed_cost.landed_cost_local, marketplace.total)?;

    let target_price = margin
        .below_target
        .then(|| solve_target_price(selling_price, marketplace.total, &landed_cost, params))
        .transpose()?;

    Ok(CostAnalysis {
        landed_cost,
        marketplace,
        margin,
        target_price,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_helpers_name_the_figure() {
        assert_eq!(
            mul(Decimal::MAX, Decimal::TWO, "cif_local"),
            Err(WorkflowError::invalid("cif_local", "is out of range"))
        );
        assert!(add(Decimal::MAX, Decimal::ONE, "total").is_err());
        assert!(sub(Decimal::MIN, Decimal::ONE, "net_profit").is_err());
        assert_eq!(div_or_zero(Decimal::ONE, Decimal::ZERO, "ratio"), Ok(Decimal::ZERO));
    }
}
