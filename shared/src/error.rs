//! Engine errors

use serde::Serialize;
use thiserror::Error;

use crate::models::ActorRole;
use crate::workflow::ProductStatus;

/// Broad classification used by callers to decide how to surface an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Authorization,
    Validation,
    ConfigurationIncomplete,
}

/// Every failure the workflow engine and cost calculators can report.
///
/// None of these are retryable without a change of input, role, product state
/// or configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorkflowError {
    #[error("Role {actor} may not move a product from {from}; requires {required}")]
    RoleNotAuthorized {
        actor: ActorRole,
        required: ActorRole,
        from: ProductStatus,
    },

    #[error("Product {sku} is {current}, not {expected}")]
    StatusMismatch {
        sku: String,
        expected: ProductStatus,
        current: ProductStatus,
    },

    #[error("No transition leaves {0}")]
    NoTransition(ProductStatus),

    #[error("Product {0} has been excluded from the pipeline")]
    ProductExcluded(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidField { field: String, message: String },

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("SKU {0} is already in use")]
    DuplicateSku(String),

    #[error("SKU {0} was not auto-generated and cannot be rewritten")]
    SkuNotRewritable(String),

    #[error("Configuration incomplete, missing: {}", missing.join(", "))]
    ConfigurationIncomplete { missing: Vec<String> },
}

impl WorkflowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WorkflowError::RoleNotAuthorized { .. }
            | WorkflowError::StatusMismatch { .. }
            | WorkflowError::NoTransition(_)
            | WorkflowError::ProductExcluded(_) => ErrorKind::Authorization,
            WorkflowError::MissingField(_)
            | WorkflowError::InvalidField { .. }
            | WorkflowError::MalformedPayload(_)
            | WorkflowError::DuplicateSku(_)
            | WorkflowError::SkuNotRewritable(_) => ErrorKind::Validation,
            WorkflowError::ConfigurationIncomplete { .. } => ErrorKind::ConfigurationIncomplete,
        }
    }

    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        WorkflowError::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;
