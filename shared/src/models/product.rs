//! Products moving through the procurement pipeline

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::StageRecord;
use crate::types::Money;
use crate::workflow::{ProductStatus, Stage};

/// Prefix of provisional SKUs assigned before the real catalog code is known
pub const PROVISIONAL_SKU_PREFIX: &str = "SKU-";

/// A product and everything the pipeline has recorded about it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub sku: String,
    pub description: String,
    pub reference_link: Option<String>,
    pub status: ProductStatus,
    /// Permanently removed from the pipeline
    #[serde(default)]
    pub excluded: bool,

    // Commercial terms from the latest quotation
    pub fob_price: Option<Money>,
    pub unit_volume_cbm: Option<Decimal>,
    pub units_per_case: Option<u32>,
    pub case_volume_cbm: Option<Decimal>,
    pub minimum_order_quantity: Option<u32>,
    pub selling_price: Option<Decimal>,

    // Quantities per stage
    pub suggested_quantity: Option<u32>,
    pub requested_quantity: Option<u32>,
    pub approved_quantity: Option<u32>,
    pub confirmed_quantity: Option<u32>,
    pub manufactured_quantity: Option<u32>,
    pub shipped_quantity: Option<u32>,

    /// Landed cost in local currency from the latest approval analysis
    pub landed_cost: Option<Decimal>,
    /// Margin percent from the latest approval analysis
    pub projected_margin: Option<Decimal>,
    pub container_number: Option<String>,

    #[serde(default)]
    pub stages: Vec<StageRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(sku: impl Into<String>, description: impl Into<String>, status: ProductStatus, now: DateTime<Utc>) -> Self {
        Self {
            sku: sku.into(),
            description: description.into(),
            reference_link: None,
            status,
            excluded: false,
            fob_price: None,
            unit_volume_cbm: None,
            units_per_case: None,
            case_volume_cbm: None,
            minimum_order_quantity: None,
            selling_price: None,
            suggested_quantity: None,
            requested_quantity: None,
            approved_quantity: None,
            confirmed_quantity: None,
            manufactured_quantity: None,
            shipped_quantity: None,
            landed_cost: None,
            projected_margin: None,
            container_number: None,
            stages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Most recent record for `stage`, if the product has been through it
    pub fn latest_record(&self, stage: Stage) -> Option<&StageRecord> {
        self.stages.iter().rev().find(|r| r.stage() == stage)
    }

    pub fn has_provisional_sku(&self) -> bool {
        is_provisional_sku(&self.sku)
    }
}

/// `SKU-` followed by exactly six ASCII digits
pub fn is_provisional_sku(sku: &str) -> bool {
    sku.strip_prefix(PROVISIONAL_SKU_PREFIX)
        .is_some_and(|digits| digits.len() == 6 && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// Provisional SKU for the `sequence`-th registered product
pub fn provisional_sku(sequence: u32) -> String {
    format!("{}{:06}", PROVISIONAL_SKU_PREFIX, sequence % 1_000_000)
}
