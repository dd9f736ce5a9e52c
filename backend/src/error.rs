//! Error handling for the Flood Risk Gateway
//!
//! Provides consistent error responses in English and Indonesian.
//!
//! Upstream errors (`UpstreamUnavailable`, `MalformedUpstreamPayload`) are
//! produced by the clients in `external` and absorbed by the services, which
//! degrade instead of failing. They only carry an HTTP mapping so that the
//! type stays total.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Client errors
    #[error("Insufficient input: {0}")]
    InsufficientInput(String),

    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    // Upstream errors
    #[error("Upstream unavailable ({service}): {message}")]
    UpstreamUnavailable { service: String, message: String },

    #[error("Malformed payload from {service}: {message}")]
    MalformedUpstreamPayload { service: String, message: String },

    // Storage errors
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Internal errors
    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl AppError {
    pub fn upstream(service: &str, message: impl ToString) -> Self {
        AppError::UpstreamUnavailable {
            service: service.to_string(),
            message: message.to_string(),
        }
    }

    pub fn malformed(service: &str, message: impl ToString) -> Self {
        AppError::MalformedUpstreamPayload {
            service: service.to_string(),
            message: message.to_string(),
        }
    }

    pub fn validation(field: &str, message: impl ToString) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: message.to_string(),
        }
    }

    /// True for failures that a degraded path is expected to absorb
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            AppError::UpstreamUnavailable { .. } | AppError::MalformedUpstreamPayload { .. }
        )
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
    pub message_en: String,
    pub message_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::InsufficientInput(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "INSUFFICIENT_INPUT".to_string(),
                    message_en: msg.clone(),
                    message_id: format!("Data belum cukup: {}", msg),
                    field: None,
                },
            ),
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message_en: message.clone(),
                    message_id: format!("Data tidak valid: {}", message),
                    field: Some(field.clone()),
                },
            ),
            AppError::UpstreamUnavailable { service, .. } => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail {
                    code: "UPSTREAM_UNAVAILABLE".to_string(),
                    message_en: format!("{} is temporarily unavailable", service),
                    message_id: format!("Layanan {} sedang tidak tersedia", service),
                    field: None,
                },
            ),
            AppError::MalformedUpstreamPayload { service, .. } => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail {
                    code: "MALFORMED_UPSTREAM_PAYLOAD".to_string(),
                    message_en: format!("{} returned an unexpected response", service),
                    message_id: format!("Respons dari {} tidak sesuai format", service),
                    field: None,
                },
            ),
            AppError::StorageError(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorDetail {
                    code: "STORAGE_ERROR".to_string(),
                    message_en: format!("Storage error: {}", msg),
                    message_id: format!("Terjadi kesalahan penyimpanan: {}", msg),
                    field: None,
                },
            ),
            AppError::Configuration(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "CONFIGURATION_ERROR".to_string(),
                    message_en: format!("Configuration error: {}", msg),
                    message_id: format!("Terjadi kesalahan konfigurasi: {}", msg),
                    field: None,
                },
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message_en: "An internal server error occurred".to_string(),
                    message_id: "Terjadi kesalahan internal server".to_string(),
                    field: None,
                },
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let status = |e: AppError| e.into_response().status();
        assert_eq!(status(AppError::InsufficientInput("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status(AppError::validation("lat", "bad")), StatusCode::BAD_REQUEST);
        assert_eq!(status(AppError::upstream("bmkg", "timeout")), StatusCode::BAD_GATEWAY);
        assert_eq!(status(AppError::StorageError("x".into())), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_is_upstream() {
        assert!(AppError::upstream("openweather", "timeout").is_upstream());
        assert!(AppError::malformed("bmkg", "missing data").is_upstream());
        assert!(!AppError::InsufficientInput("empty".into()).is_upstream());
    }
}
