//! Error types for the notes service
//!
//! Provides unified error handling using thiserror.
//!
//! Infrastructure failures (cache, store internals) are absorbed or folded
//! into `Internal`; domain errors carry enough context for the HTTP boundary.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

// == App Error Enum ==
/// Unified error type for the notes service.
#[derive(Error, Debug)]
pub enum AppError {
    /// Note does not exist or the caller has no access to it
    #[error("Note not found: {0}")]
    NoteNotFound(Uuid),

    /// Label does not exist for this user
    #[error("Label not found: {0}")]
    LabelNotFound(Uuid),

    /// No user registered under the given identifier or email
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The invitation task could not be durably enqueued.
    /// Surfaced to the caller: a silently lost invitation is a correctness
    /// bug, not a degradation.
    #[error("Failed to publish notification: {0}")]
    PublishFailure(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NoteNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::LabelNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::UserNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::PublishFailure(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the notes service.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let err = AppError::NoteNotFound(Uuid::nil());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_invalid_request_maps_to_400() {
        let err = AppError::InvalidRequest("bad input".to_string());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_publish_failure_maps_to_502() {
        let err = AppError::PublishFailure("broker down".to_string());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_internal_maps_to_500() {
        let err = AppError::Internal("boom".to_string());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
