//! Pipeline statuses and stages

use serde::{Deserialize, Serialize};

/// Where a product sits in the procurement pipeline
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    NoReplenishmentNeeded,
    NeedsReplenishment,
    QuoteRequested,
    Quoted,
    /// Side branch from analysis; re-quotation returns to `Quoted`
    QuoteRejected,
    Analyzing,
    PurchaseApproved,
    PurchaseConfirmed,
    Manufactured,
    Shipped,
}

impl ProductStatus {
    pub const ALL: [ProductStatus; 10] = [
        ProductStatus::NoReplenishmentNeeded,
        ProductStatus::NeedsReplenishment,
        ProductStatus::QuoteRequested,
        ProductStatus::Quoted,
        ProductStatus::QuoteRejected,
        ProductStatus::Analyzing,
        ProductStatus::PurchaseApproved,
        ProductStatus::PurchaseConfirmed,
        ProductStatus::Manufactured,
        ProductStatus::Shipped,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::NoReplenishmentNeeded => "NO_REPLENISHMENT_NEEDED",
            ProductStatus::NeedsReplenishment => "NEEDS_REPLENISHMENT",
            ProductStatus::QuoteRequested => "QUOTE_REQUESTED",
            ProductStatus::Quoted => "QUOTED",
            ProductStatus::QuoteRejected => "QUOTE_REJECTED",
            ProductStatus::Analyzing => "ANALYZING",
            ProductStatus::PurchaseApproved => "PURCHASE_APPROVED",
            ProductStatus::PurchaseConfirmed => "PURCHASE_CONFIRMED",
            ProductStatus::Manufactured => "MANUFACTURED",
            ProductStatus::Shipped => "SHIPPED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == s)
    }

    /// Position along the main pipeline. A rejected quote sits level with an
    /// open quote request, since both wait on the supplier.
    pub fn pipeline_position(&self) -> u8 {
        match self {
            ProductStatus::NoReplenishmentNeeded => 0,
            ProductStatus::NeedsReplenishment => 1,
            ProductStatus::QuoteRequested | ProductStatus::QuoteRejected => 2,
            ProductStatus::Quoted => 3,
            ProductStatus::Analyzing => 4,
            ProductStatus::PurchaseApproved => 5,
            ProductStatus::PurchaseConfirmed => 6,
            ProductStatus::Manufactured => 7,
            ProductStatus::Shipped => 8,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ProductStatus::Shipped)
    }
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The step a transition performs, and the kind of record it leaves behind
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Replenishment,
    QuoteRequest,
    Quotation,
    Analysis,
    Approval,
    PurchaseConfirmation,
    Manufacturing,
    Shipping,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Replenishment => "replenishment",
            Stage::QuoteRequest => "quote_request",
            Stage::Quotation => "quotation",
            Stage::Analysis => "analysis",
            Stage::Approval => "approval",
            Stage::PurchaseConfirmation => "purchase_confirmation",
            Stage::Manufacturing => "manufacturing",
            Stage::Shipping => "shipping",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
