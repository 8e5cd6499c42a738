//! Error handling module for the MuniServe backend.
//!
//! Provides centralized error types with mapping to HTTP status codes and response envelopes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Error codes as constants to avoid stringly-typed errors.
#[allow(dead_code)]
pub mod codes {
    pub const INVALID_CREDENTIALS: &str = "INVALID_CREDENTIALS";
    pub const SESSION_PREEMPTED: &str = "SESSION_PREEMPTED";
    pub const SESSION_NOT_FOUND: &str = "SESSION_NOT_FOUND";
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const FORBIDDEN: &str = "FORBIDDEN";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
}

/// Application error type.
///
/// Triage failures are deliberately absent: the triage advisor degrades to a
/// fallback classification and never surfaces as an error to callers.
#[derive(Debug)]
pub enum AppError {
    /// Login with an unknown email or a mismatched credential
    InvalidCredentials,
    /// A newer login overwrote the account's authoritative session token
    SessionPreempted,
    /// The account behind a session vanished from the registry
    SessionNotFound,
    /// No session where an authenticated caller is required
    Unauthorized(String),
    /// Caller is authenticated but not allowed to perform the operation
    Forbidden(String),
    /// Resource not found
    NotFound(String),
    /// Validation error
    Validation(String),
    /// Record store I/O failure; propagated unchanged, never retried
    Database(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::SessionPreempted => StatusCode::UNAUTHORIZED,
            AppError::SessionNotFound => StatusCode::UNAUTHORIZED,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidCredentials => codes::INVALID_CREDENTIALS,
            AppError::SessionPreempted => codes::SESSION_PREEMPTED,
            AppError::SessionNotFound => codes::SESSION_NOT_FOUND,
            AppError::Unauthorized(_) => codes::UNAUTHORIZED,
            AppError::Forbidden(_) => codes::FORBIDDEN,
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::Validation(_) => codes::VALIDATION_ERROR,
            AppError::Database(_) => codes::DATABASE_ERROR,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            AppError::InvalidCredentials => {
                "Authentication failed: invalid credentials".to_string()
            }
            AppError::SessionPreempted => {
                "Session preempted: this account was logged in from another location".to_string()
            }
            AppError::SessionNotFound => {
                "Session invalid: the account no longer exists".to_string()
            }
            AppError::Unauthorized(msg) => msg.clone(),
            AppError::Forbidden(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::Validation(msg) => msg.clone(),
            AppError::Database(msg) => msg.clone(),
        }
    }

    /// Whether the UI must treat this as a blocking identity notice
    /// rather than transient feedback.
    pub fn is_identity_event(&self) -> bool {
        matches!(
            self,
            AppError::InvalidCredentials | AppError::SessionPreempted | AppError::SessionNotFound
        )
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        AppError::Database(format!("Database error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("Record serialization error: {:?}", err);
        AppError::Database(format!("Record serialization error: {}", err))
    }
}

/// Error details in the response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
    /// True when the UI must show a blocking, acknowledge-to-continue notice.
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub blocking: bool,
}

/// Error response envelope.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetails,
}

impl ErrorResponse {
    pub fn new(error: &AppError) -> Self {
        Self {
            success: false,
            error: ErrorDetails {
                code: error.error_code().to_string(),
                message: error.message(),
                blocking: error.is_identity_event(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse::new(&self);
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_events_are_blocking() {
        assert!(AppError::InvalidCredentials.is_identity_event());
        assert!(AppError::SessionPreempted.is_identity_event());
        assert!(AppError::SessionNotFound.is_identity_event());
        assert!(!AppError::NotFound("x".into()).is_identity_event());
        assert!(!AppError::Database("x".into()).is_identity_event());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::SessionPreempted.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Forbidden("no".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::NotFound("gone".into()).status_code(),
            StatusCode::NOT_FOUND
        );
    }
}
