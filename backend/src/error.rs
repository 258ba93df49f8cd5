//! Error handling for the procurement tracker service
//!
//! Engine errors pass through unchanged and are mapped onto HTTP here.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::{ProductStatus, WorkflowError};
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Engine errors (authorization, validation, configuration)
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error("Insufficient permissions: {0}")]
    InsufficientPermissions(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    // Collaborator errors
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Container not found: {0}")]
    ContainerNotFound(String),

    #[error("Conflict: {message}")]
    Conflict {
        message: String,
        current_status: Option<ProductStatus>,
    },

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl AppError {
    /// The engine error behind this one, if any
    pub fn workflow(&self) -> Option<&WorkflowError> {
        match self {
            AppError::Workflow(e) => Some(e),
            _ => None,
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_status: Option<ProductStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorDetail {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            field: None,
            current_status: None,
            details: None,
        }
    }

    fn with_field(mut self, field: &str) -> Self {
        self.field = Some(field.to_string());
        self
    }
}

fn workflow_detail(err: &WorkflowError) -> (StatusCode, ErrorDetail) {
    let message = err.to_string();
    match err {
        WorkflowError::RoleNotAuthorized { .. } => (
            StatusCode::FORBIDDEN,
            ErrorDetail::new("ROLE_NOT_AUTHORIZED", message),
        ),
        WorkflowError::StatusMismatch { current, .. } => {
            let mut detail = ErrorDetail::new("STATUS_MISMATCH", message);
            detail.current_status = Some(*current);
            (StatusCode::CONFLICT, detail)
        }
        WorkflowError::NoTransition(current) => {
            let mut detail = ErrorDetail::new("NO_TRANSITION", message);
            detail.current_status = Some(*current);
            (StatusCode::FORBIDDEN, detail)
        }
        WorkflowError::ProductExcluded(_) => (
            StatusCode::FORBIDDEN,
            ErrorDetail::new("PRODUCT_EXCLUDED", message),
        ),
        WorkflowError::MissingField(field) => (
            StatusCode::BAD_REQUEST,
            ErrorDetail::new("MISSING_FIELD", message).with_field(field),
        ),
        WorkflowError::InvalidField { field, .. } => (
            StatusCode::BAD_REQUEST,
            ErrorDetail::new("INVALID_FIELD", message).with_field(field),
        ),
        WorkflowError::MalformedPayload(_) => (
            StatusCode::BAD_REQUEST,
            ErrorDetail::new("MALFORMED_PAYLOAD", message),
        ),
        WorkflowError::DuplicateSku(_) => (
            StatusCode::CONFLICT,
            ErrorDetail::new("DUPLICATE_SKU", message).with_field("new_sku"),
        ),
        WorkflowError::SkuNotRewritable(_) => (
            StatusCode::BAD_REQUEST,
            ErrorDetail::new("SKU_NOT_REWRITABLE", message).with_field("new_sku"),
        ),
        WorkflowError::ConfigurationIncomplete { missing } => {
            let mut detail = ErrorDetail::new("CONFIGURATION_INCOMPLETE", message);
            detail.details = Some(serde_json::json!({ "missing": missing }));
            (StatusCode::UNPROCESSABLE_ENTITY, detail)
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::Workflow(err) => workflow_detail(err),
            AppError::InsufficientPermissions(msg) => (
                StatusCode::FORBIDDEN,
                ErrorDetail::new("INSUFFICIENT_PERMISSIONS", msg.clone()),
            ),
            AppError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new("VALIDATION_ERROR", msg.clone()),
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail::new("NOT_FOUND", format!("{} not found", resource)),
            ),
            AppError::ContainerNotFound(number) => (
                StatusCode::NOT_FOUND,
                ErrorDetail::new(
                    "CONTAINER_NOT_FOUND",
                    format!("Container {} not found or not open for loading", number),
                )
                .with_field("container_number"),
            ),
            AppError::Conflict {
                message,
                current_status,
            } => {
                let mut detail = ErrorDetail::new("CONFLICT", message.clone());
                detail.current_status = *current_status;
                (StatusCode::CONFLICT, detail)
            }
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("DATABASE_ERROR", "A database error occurred"),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("INTERNAL_ERROR", msg.clone()),
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("INTERNAL_ERROR", "An internal server error occurred"),
            ),
        };

        let kind = self.workflow().map(WorkflowError::kind);
        tracing::error!(status = %status, kind = ?kind, "Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers and services
pub type AppResult<T> = Result<T, AppError>;
