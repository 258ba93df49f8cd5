//! Purchase quantity rounding against supplier case sizes

use serde::{Deserialize, Serialize};

/// Round `suggested` up to the next full case.
///
/// A case size of zero means the supplier sells loose units.
pub fn adjust_to_case_multiple(suggested: u32, units_per_case: u32) -> u32 {
    if units_per_case == 0 {
        return suggested;
    }
    suggested.div_ceil(units_per_case).saturating_mul(units_per_case)
}

/// Whether `quantity` falls short of the supplier's minimum order
pub fn is_below_minimum_order(quantity: u32, minimum_order_quantity: Option<u32>) -> bool {
    minimum_order_quantity.is_some_and(|moq| quantity < moq)
}

/// Outcome of sizing a purchase
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuantityPlan {
    pub suggested_quantity: u32,
    pub adjusted_quantity: u32,
    /// Operator override, or the adjusted quantity
    pub purchase_quantity: u32,
    pub below_minimum_order: bool,
}

impl QuantityPlan {
    pub fn new(
        suggested: u32,
        units_per_case: u32,
        override_quantity: Option<u32>,
        minimum_order_quantity: Option<u32>,
    ) -> Self {
        let adjusted_quantity = adjust_to_case_multiple(suggested, units_per_case);
        let purchase_quantity = override_quantity.unwrap_or(adjusted_quantity);
        Self {
            suggested_quantity: suggested,
            adjusted_quantity,
            purchase_quantity,
            below_minimum_order: is_below_minimum_order(purchase_quantity, minimum_order_quantity),
        }
    }
}
