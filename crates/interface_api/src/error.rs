//! API error handling

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use core_kernel::{CoreError, PortError};
use domain_claims::{AttachmentError, ClaimError, FieldError};

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Validation error: {}", FieldError::join(.0))]
    Validation(Vec<FieldError>),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message, details) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Unauthorized".to_string(),
                None,
            ),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                msg,
                None,
            ),
            ApiError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "One or more fields are invalid.".to_string(),
                Some(errors),
            ),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ClaimError> for ApiError {
    fn from(err: ClaimError) -> Self {
        match err {
            ClaimError::Validation(errors) => {
                warn!(errors = %FieldError::join(&errors), "Rejected invalid input");
                ApiError::Validation(errors)
            }
            ClaimError::Forbidden(msg) => {
                warn!(reason = %msg, "Access denied");
                ApiError::Forbidden(msg)
            }
            ClaimError::ClaimNotFound(_) | ClaimError::LecturerNotFound(_) => {
                warn!(error = %err, "Lookup failed");
                ApiError::NotFound(err.to_string())
            }
            ClaimError::InvalidStatusTransition { .. }
            | ClaimError::ClaimClosed { .. }
            | ClaimError::ReportUnavailable(_) => {
                warn!(error = %err, "Request conflicts with claim state");
                ApiError::Conflict(err.to_string())
            }
            ClaimError::Storage(AttachmentError::InvalidFileName(name)) => {
                warn!(file = %name, "Rejected file name");
                ApiError::Validation(vec![FieldError::new(
                    "files",
                    format!("Invalid file name: {}", name),
                )])
            }
            ClaimError::Storage(e) => {
                error!(error = %e, "Attachment storage failed");
                ApiError::Internal("File upload failed. Please try again.".to_string())
            }
            ClaimError::Report(e) => {
                error!(error = %e, "Report rendering failed");
                ApiError::Internal("Report could not be generated.".to_string())
            }
            ClaimError::Port(e) => e.into(),
        }
    }
}

impl From<PortError> for ApiError {
    fn from(err: PortError) -> Self {
        match &err {
            PortError::NotFound { .. } => {
                warn!(error = %err, "Entity not found");
                ApiError::NotFound(err.to_string())
            }
            PortError::Conflict { message } => {
                warn!(error = %err, "Store conflict");
                ApiError::Conflict(message.clone())
            }
            PortError::Validation { message, field } => {
                warn!(error = %err, "Store rejected input");
                ApiError::Validation(vec![FieldError::new(
                    field.clone().unwrap_or_else(|| "request".to_string()),
                    message.clone(),
                )])
            }
            PortError::Connection { .. } | PortError::Internal { .. } => {
                error!(error = %err, "Store failure");
                ApiError::Internal("The request could not be completed.".to_string())
            }
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound(msg) => ApiError::NotFound(msg),
            CoreError::Configuration(msg) => {
                error!(error = %msg, "Configuration error");
                ApiError::Internal(msg)
            }
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        warn!(error = %err, "Malformed multipart body");
        ApiError::BadRequest(err.body_text())
    }
}
