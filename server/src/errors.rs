use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::store::StoreError;

/// Failure result of the auth mutations.
///
/// Implements [`IntoResponse`] so handlers can return it directly.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Malformed or missing input, including an unknown role.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unknown email or wrong password. The reason only goes to the logs.
    #[error("Invalid email or password")]
    Authentication,

    /// The email is already registered.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A bounded operation did not finish in time.
    #[error("Timed out during {0}")]
    Timeout(&'static str),

    /// The store could not be reached.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AuthError>;

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(email) => {
                AuthError::Conflict(format!("email {email} is already registered"))
            }
            StoreError::Unavailable(msg) => AuthError::Unavailable(msg),
            StoreError::Backend(msg) => AuthError::Internal(msg),
        }
    }
}

/// A body that is not valid JSON or lacks a field is a validation failure.
impl From<JsonRejection> for AuthError {
    fn from(rejection: JsonRejection) -> Self {
        AuthError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AuthError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AuthError::Authentication => (
                StatusCode::UNAUTHORIZED,
                "AUTHENTICATION_ERROR",
                self.to_string(),
            ),
            AuthError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AuthError::Timeout(op) => (
                StatusCode::GATEWAY_TIMEOUT,
                "TIMEOUT",
                format!("Timed out during {op}"),
            ),
            AuthError::Unavailable(msg) => {
                tracing::error!(error = %msg, "Credential store unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "UNAVAILABLE",
                    "Service temporarily unavailable".to_string(),
                )
            }
            AuthError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, Json(body)).into_response()
    }
}
