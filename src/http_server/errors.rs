//! # HTTP API Errors
//!
//! Error types for the HTTP surface and their JSON rendering.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::observability::Event;
use crate::tokenizer::TokenError;

/// Result type for HTTP handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// HTTP API errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body could not be decoded
    #[error("Token record malformed: {0}")]
    Malformed(String),

    /// Batch body was an empty list
    #[error("No tokens were provided")]
    EmptyBatch,

    #[error("{0}")]
    Token(#[from] TokenError),

    /// Worker task failed
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Malformed(_) | ApiError::EmptyBatch => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Token(e) => {
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Malformed(_) => "REQUEST_MALFORMED",
            ApiError::EmptyBatch => "REQUEST_EMPTY_BATCH",
            ApiError::Token(e) => e.code(),
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    pub code: String,
    pub status: u16,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        Self {
            message: err.to_string(),
            code: err.code().to_string(),
            status: err.status_code().as_u16(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        warn!(
            event = Event::RequestFailed.as_str(),
            status = status.as_u16(),
            code = self.code(),
            error = %self,
            "request failed"
        );
        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}
