//! Centralized error handling for HavenStay
//!
//! `BookingError` is the domain taxonomy shared by the booking, ledger and
//! inventory services; `ApiError` maps generic failures onto HTTP status
//! codes and JSON error responses at the handler boundary.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::booking::BookingStatus;

/// Domain error taxonomy for the booking core
#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid transition from {current}: allowed next states are {allowed:?}")]
    InvalidTransition {
        current: BookingStatus,
        allowed: &'static [BookingStatus],
    },

    #[error("Invalid status: expected {expected}, booking is {current}")]
    InvalidStatus {
        expected: BookingStatus,
        current: BookingStatus,
    },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Persistence failure: {0}")]
    Persistence(#[from] sqlx::Error),
}

impl BookingError {
    /// Current authoritative state to hand back to the caller, when the
    /// error carries one (lets clients resynchronize without re-querying).
    pub fn current_state(&self) -> Option<serde_json::Value> {
        match self {
            BookingError::InvalidTransition { current, allowed } => Some(serde_json::json!({
                "current_status": current,
                "allowed_next": allowed,
            })),
            BookingError::InvalidStatus { current, .. } => Some(serde_json::json!({
                "current_status": current,
            })),
            _ => None,
        }
    }

    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            BookingError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            BookingError::InvalidTransition { .. } => (StatusCode::CONFLICT, "INVALID_TRANSITION"),
            BookingError::InvalidStatus { .. } => (StatusCode::CONFLICT, "INVALID_STATUS"),
            BookingError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            BookingError::Persistence(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "PERSISTENCE_ERROR")
            }
        }
    }
}

impl IntoResponse for BookingError {
    fn into_response(self) -> Response {
        match &self {
            BookingError::Persistence(e) => {
                tracing::error!(error = %e, "Persistence failure while handling request");
            }
            _ => {
                tracing::debug!(error = %self, "Request rejected");
            }
        }

        let (status, code) = self.status_and_code();
        let body = ErrorResponse {
            error: ErrorDetails {
                code: code.to_string(),
                message: self.to_string(),
                current: self.current_state(),
            },
        };
        (status, Json(body)).into_response()
    }
}

/// API error type with HTTP status code mapping
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// JSON error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

/// Error details in the response
#[derive(Serialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
    /// Current authoritative state, present on rejected mutations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<serde_json::Value>,
}

impl ApiError {
    /// Get the error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::UnprocessableEntity(_) => "UNPROCESSABLE_ENTITY",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
            ApiError::DatabaseError(_) => "DATABASE_ERROR",
            ApiError::ValidationError(_) => "VALIDATION_ERROR",
        }
    }

    /// Get the HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.to_string();

        // Log server errors
        match &self {
            ApiError::InternalError(_) | ApiError::DatabaseError(_) => {
                tracing::error!(error = %message, code = %error_code, "Server error occurred");
            }
            _ => {
                tracing::debug!(error = %message, code = %error_code, "Client error occurred");
            }
        }

        let body = ErrorResponse {
            error: ErrorDetails {
                code: error_code.to_string(),
                message,
                current: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

// Convenience conversions from common error types

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            _ => ApiError::DatabaseError(err.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::ValidationError(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::BadRequest(format!("Invalid JSON: {}", err))
    }
}

/// Result type alias using ApiError
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            ApiError::NotFound("test".to_string()).error_code(),
            "NOT_FOUND"
        );
        assert_eq!(
            ApiError::ValidationError("test".to_string()).error_code(),
            "VALIDATION_ERROR"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::NotFound("test".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::InternalError("test".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_invalid_transition_carries_current_state() {
        let err = BookingError::InvalidTransition {
            current: BookingStatus::PaymentPending,
            allowed: &[BookingStatus::PaymentSuccess],
        };
        let state = err.current_state().unwrap();
        assert_eq!(state["current_status"], "payment_pending");
        assert_eq!(state["allowed_next"][0], "payment_success");
    }

    #[test]
    fn test_booking_error_status_mapping() {
        let (status, code) = BookingError::NotFound("booking".to_string()).status_and_code();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(code, "NOT_FOUND");

        let (status, _) = BookingError::Validation("bad dates".to_string()).status_and_code();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
