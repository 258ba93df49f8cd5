//! Shared domain engine for the import procurement tracker
//!
//! This crate holds the procurement workflow state machine and the
//! landed-cost and margin engine. It performs no I/O and is used by both the
//! backend service and the browser build (via WASM).

pub mod costing;
pub mod error;
pub mod models;
pub mod replenishment;
pub mod types;
pub mod validation;
pub mod workflow;

pub use costing::*;
pub use error::*;
pub use models::*;
pub use replenishment::*;
pub use types::*;
pub use validation::*;
pub use workflow::*;
