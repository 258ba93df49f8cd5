//! HTTP handlers

pub mod health;
pub mod workflow;

pub use health::health_check;
pub use workflow::*;
