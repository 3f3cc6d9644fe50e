// SPDX-License-Identifier: MIT

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
///
/// Every client-visible failure is a 400-class response with a short
/// `error` string; internal detail is logged server-side only.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Provider token failed verification for any reason (network fault,
    /// malformed response, unknown key, bad signature, wrong audience,
    /// expired). Detail never crosses this boundary.
    #[error("Invalid or expired provider token")]
    InvalidToken,

    #[error("Identity provider did not supply an email")]
    MissingEmail,

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error = match &self {
            AppError::BadRequest(msg) => msg.clone(),
            AppError::InvalidToken => "invalid or expired provider token".to_string(),
            AppError::MissingEmail => "email not provided by identity provider".to_string(),
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                "internal error".to_string()
            }
        };

        let body = ErrorResponse { error };

        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
