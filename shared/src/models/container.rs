//! Container references

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The association requested from the container collaborator when a product ships
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContainerAssignment {
    pub container_number: String,
    pub sku: String,
    pub volume_cbm: Decimal,
}
