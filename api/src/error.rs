//! Error handling for the HTTP surface
//!
//! Maps core task errors and transport rejections to status codes and
//! JSON error bodies. Storage failures are logged here and never echoed.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use task_core::TaskError;
use thiserror::Error;
use tracing::error;

/// Errors returned to HTTP callers
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid task ID")]
    InvalidId,

    #[error("Task not found")]
    NotFound,

    #[error("Validation failed")]
    Validation(Vec<String>),

    #[error("No valid fields to update")]
    NoFieldsToUpdate,

    #[error("Invalid JSON body")]
    InvalidJson(String),

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Route not found")]
    RouteNotFound,

    #[error("Too many requests, please try again later.")]
    RateLimited,

    /// Unexpected failure; only `message` reaches the caller
    #[error("{message}")]
    Internal {
        message: &'static str,
        source: TaskError,
    },
}

impl ApiError {
    /// Map a core error, using `message` as the public text for 500s
    pub fn from_task_error(err: TaskError, message: &'static str) -> Self {
        match err {
            TaskError::NotFound(_) => ApiError::NotFound,
            TaskError::InvalidId(_) => ApiError::InvalidId,
            TaskError::Validation(details) => ApiError::Validation(details),
            TaskError::NoFieldsToUpdate => ApiError::NoFieldsToUpdate,
            source => ApiError::Internal { message, source },
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidId
            | ApiError::Validation(_)
            | ApiError::NoFieldsToUpdate
            | ApiError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound | ApiError::RouteNotFound => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge
        } else {
            ApiError::InvalidJson(rejection.body_text())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            ApiError::Validation(details) => json!({
                "error": self.to_string(),
                "details": details,
            }),
            ApiError::Internal { message, source } => {
                error!(error = %source, "{message}");
                json!({ "error": message })
            }
            ApiError::InvalidJson(reason) => {
                tracing::debug!(reason = %reason, "Rejected malformed JSON body");
                json!({ "error": self.to_string() })
            }
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
