//! The legal transition table

use serde::Serialize;

use super::{ProductStatus, Stage};
use crate::models::ActorRole;

/// One legal move out of a status
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Transition {
    pub from: ProductStatus,
    pub to: ProductStatus,
    /// Alternative target when the acting party declines
    pub rejected_to: Option<ProductStatus>,
    pub role: ActorRole,
    pub stage: Stage,
}

const fn step(from: ProductStatus, to: ProductStatus, role: ActorRole, stage: Stage) -> Transition {
    Transition {
        from,
        to,
        rejected_to: None,
        role,
        stage,
    }
}

/// Every status has at most one outgoing entry
pub const TRANSITIONS: &[Transition] = &[
    step(
        ProductStatus::NoReplenishmentNeeded,
        ProductStatus::NeedsReplenishment,
        ActorRole::Buyer,
        Stage::Replenishment,
    ),
    step(
        ProductStatus::NeedsReplenishment,
        ProductStatus::QuoteRequested,
        ActorRole::Buyer,
        Stage::QuoteRequest,
    ),
    step(
        ProductStatus::QuoteRequested,
        ProductStatus::Quoted,
        ActorRole::Supplier,
        Stage::Quotation,
    ),
    step(
        ProductStatus::QuoteRejected,
        ProductStatus::Quoted,
        ActorRole::Supplier,
        Stage::Quotation,
    ),
    step(
        ProductStatus::Quoted,
        ProductStatus::Analyzing,
        ActorRole::Buyer,
        Stage::Analysis,
    ),
    Transition {
        from: ProductStatus::Analyzing,
        to: ProductStatus::PurchaseApproved,
        rejected_to: Some(ProductStatus::QuoteRejected),
        role: ActorRole::Buyer,
        stage: Stage::Approval,
    },
    step(
        ProductStatus::PurchaseApproved,
        ProductStatus::PurchaseConfirmed,
        ActorRole::Supplier,
        Stage::PurchaseConfirmation,
    ),
    step(
        ProductStatus::PurchaseConfirmed,
        ProductStatus::Manufactured,
        ActorRole::Supplier,
        Stage::Manufacturing,
    ),
    step(
        ProductStatus::Manufactured,
        ProductStatus::Shipped,
        ActorRole::Supplier,
        Stage::Shipping,
    ),
];

/// The transition leaving `status`, if any
pub fn transition_from(status: ProductStatus) -> Option<&'static Transition> {
    TRANSITIONS.iter().find(|t| t.from == status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_most_one_transition_per_status() {
        for status in ProductStatus::ALL {
            let count = TRANSITIONS.iter().filter(|t| t.from == status).count();
            assert!(count <= 1, "{} has {} transitions", status, count);
        }
    }

    #[test]
    fn test_terminal_status_has_no_transition() {
        assert!(transition_from(ProductStatus::Shipped).is_none());
    }

    #[test]
    fn test_only_approval_can_reject() {
        for t in TRANSITIONS {
            assert_eq!(t.rejected_to.is_some(), t.stage == Stage::Approval);
        }
    }

    #[test]
    fn test_forward_targets_advance() {
        for t in TRANSITIONS {
            assert!(t.to.pipeline_position() > t.from.pipeline_position());
        }
    }
}
