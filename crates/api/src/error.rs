use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use parttrack_core::error::CoreError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `parttrack_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::LockConflict { .. } => {
                    (StatusCode::CONFLICT, "LOCK_CONFLICT", core.to_string())
                }
                CoreError::LockRequired { .. } => {
                    (StatusCode::LOCKED, "LOCK_REQUIRED", core.to_string())
                }
                CoreError::NotOwner { .. } => {
                    (StatusCode::FORBIDDEN, "NOT_OWNER", core.to_string())
                }
                CoreError::InvalidTransition { .. } => (
                    StatusCode::CONFLICT,
                    "INVALID_TRANSITION",
                    core.to_string(),
                ),
                CoreError::TriggerDataUnavailable { .. } => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "TRIGGER_DATA_UNAVAILABLE",
                    core.to_string(),
                ),
            },

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });

        // A lock conflict carries enough detail for the caller to decide
        // whether to wait or escalate: the expiry is required, the
        // holder is a courtesy.
        if let AppError::Core(CoreError::LockConflict {
            held_by,
            expires_at,
            ..
        }) = &self
        {
            body["held_by"] = json!(held_by);
            body["expires_at"] = json!(expires_at);
        }

        (status, axum::Json(body)).into_response()
    }
}
