//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use core_kernel::PortError;
use domain_billing::SettlementError;

use crate::config::ApiConfig;

const GENERIC_INTERNAL_MESSAGE: &str = "An unexpected error occurred";

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiError {
    /// Hides internal diagnostics when running in production
    pub fn for_environment(self, config: &ApiConfig) -> Self {
        match self {
            ApiError::Internal(_) if config.is_production() => {
                ApiError::Internal(GENERIC_INTERNAL_MESSAGE.to_string())
            }
            other => other,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message: Some(message).filter(|m| !m.is_empty()),
        };

        (status, Json(body)).into_response()
    }
}

impl From<SettlementError> for ApiError {
    fn from(err: SettlementError) -> Self {
        match err {
            SettlementError::BookingNotFound(_)
            | SettlementError::InvoiceNotFound(_)
            | SettlementError::PropertyNotFound(_) => ApiError::NotFound(err.to_string()),
            SettlementError::PropertyNotApproved { .. } => ApiError::BadRequest(err.to_string()),
            SettlementError::Conflict(msg) => ApiError::Conflict(msg),
            SettlementError::Port(port) => port.into(),
            SettlementError::CodeGenerationExhausted { .. } => {
                error!(error = %err, "Settlement failed");
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<PortError> for ApiError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            PortError::Conflict { message } => ApiError::Conflict(message),
            PortError::Validation { message, .. } => ApiError::Validation(message),
            other => {
                error!(error = %other, "Port failure");
                ApiError::Internal(other.to_string())
            }
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::Validation(errors.to_string())
    }
}
