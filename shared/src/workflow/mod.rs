//! Procurement workflow state machine

mod engine;
mod payload;
mod status;
mod transitions;

pub use engine::*;
pub use payload::*;
pub use status::*;
pub use transitions::*;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::Money;

/// Conditions reported alongside an applied transition. None of them block it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum WorkflowWarning {
    BelowMinimumOrderQuantity {
        quantity: u32,
        minimum: u32,
    },
    MarginBelowTarget {
        margin_pct: Decimal,
        target_margin_pct: Decimal,
        /// FOB price that would restore the target margin
        target_purchase_price: Option<Money>,
    },
}

impl std::fmt::Display for WorkflowWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkflowWarning::BelowMinimumOrderQuantity { quantity, minimum } => write!(
                f,
                "Purchase quantity {} is below the supplier minimum of {}",
                quantity, minimum
            ),
            WorkflowWarning::MarginBelowTarget {
                margin_pct,
                target_margin_pct,
                target_purchase_price,
            } => {
                write!(
                    f,
                    "Margin {}% is below the {}% target",
                    margin_pct.round_dp(2),
                    target_margin_pct
                )?;
                if let Some(price) = target_purchase_price {
                    write!(f, "; target FOB {}", price)?;
                }
                Ok(())
            }
        }
    }
}
