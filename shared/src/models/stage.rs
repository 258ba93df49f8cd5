//! Per-stage audit records
//!
//! One record is appended for every applied transition and never edited
//! afterwards. The payload is a tagged union keyed by stage, so the fields each
//! stage computes are always present where expected.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::costing::CostAnalysis;
use crate::models::ActorRole;
use crate::types::{Currency, Money};
use crate::workflow::{ProductStatus, Stage, WorkflowWarning};

/// Immutable audit entry for one applied transition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageRecord {
    pub id: Uuid,
    pub previous_status: ProductStatus,
    pub next_status: ProductStatus,
    pub actor_role: ActorRole,
    pub recorded_at: DateTime<Utc>,
    pub details: StageDetails,
}

impl StageRecord {
    pub fn stage(&self) -> Stage {
        self.details.stage()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalDecision {
    Approved,
    Rejected,
}

/// Exchange rates in force when a quotation was recorded
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RateSnapshot {
    pub rmb_to_usd: Option<Decimal>,
    pub usd_to_local: Option<Decimal>,
}

/// SKU rewrite performed at approval
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SkuChange {
    pub from: String,
    pub to: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum StageDetails {
    Replenishment {
        suggested_quantity: u32,
        reason: Option<String>,
    },
    QuoteRequest {
        requested_quantity: u32,
        comments: Option<String>,
    },
    Quotation {
        unit_price: Decimal,
        currency: Currency,
        /// Unit price converted with the rate in force, when one was configured
        unit_price_usd: Option<Decimal>,
        units_per_case: u32,
        case_volume_cbm: Decimal,
        unit_volume_cbm: Decimal,
        production_lead_time_days: u32,
        minimum_order_quantity: Option<u32>,
        supplier_city: Option<String>,
        comments: Option<String>,
        rates: RateSnapshot,
    },
    Analysis {
        selling_price: Decimal,
        comments: Option<String>,
        fob_price: Option<Money>,
        unit_volume_cbm: Option<Decimal>,
    },
    Approval {
        decision: ApprovalDecision,
        comments: Option<String>,
        suggested_quantity: u32,
        adjusted_quantity: u32,
        purchase_quantity: u32,
        analysis: CostAnalysis,
        /// Advisory FOB price for the target margin, rounded to cents
        target_purchase_price: Option<Money>,
        sku_change: Option<SkuChange>,
        warnings: Vec<WorkflowWarning>,
    },
    PurchaseConfirmation {
        confirmed_quantity: u32,
        estimated_delivery_date: NaiveDate,
        comments: Option<String>,
    },
    Manufacturing {
        manufactured_quantity: u32,
        completion_date: Option<NaiveDate>,
        quality_notes: Option<String>,
        comments: Option<String>,
    },
    Shipping {
        shipped_quantity: u32,
        container_number: String,
        shipped_volume_cbm: Decimal,
        comments: Option<String>,
    },
}

impl StageDetails {
    pub fn stage(&self) -> Stage {
        match self {
            StageDetails::Replenishment { .. } => Stage::Replenishment,
            StageDetails::QuoteRequest { .. } => Stage::QuoteRequest,
            StageDetails::Quotation { .. } => Stage::Quotation,
            StageDetails::Analysis { .. } => Stage::Analysis,
            StageDetails::Approval { .. } => Stage::Approval,
            StageDetails::PurchaseConfirmation { .. } => Stage::PurchaseConfirmation,
            StageDetails::Manufacturing { .. } => Stage::Manufacturing,
            StageDetails::Shipping { .. } => Stage::Shipping,
        }
    }
}
