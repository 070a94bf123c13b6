//! Request-level errors and their JSON bodies

use crate::core::constants::text;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Failures that reach the HTTP layer
///
/// Per-provider failures never arrive here; they are folded into the
/// response map by the fan-out.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing required input (400)
    #[error("{0}")]
    Validation(&'static str),

    /// Unrecognized path segment (404)
    #[error("{0}")]
    NotFound(&'static str),

    /// Malformed body or unexpected failure (500)
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            // The cause is logged where it occurs; clients get a fixed message.
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, text::FETCH_FAILED),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
