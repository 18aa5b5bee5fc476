use axum::{
    Json,
    body::Body,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::application::UploadError;

/// Failures a handler reports to the client as a plain-text response.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("Range not satisfiable")]
    RangeNotSatisfiable { size: u64 },

    #[error("Error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::RangeNotSatisfiable { .. } => StatusCode::RANGE_NOT_SATISFIABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::RangeNotSatisfiable { size } => Response::builder()
                .status(StatusCode::RANGE_NOT_SATISFIABLE)
                .header(header::CONTENT_RANGE, format!("bytes */{size}"))
                .body(Body::empty())
                .unwrap_or_else(|_| StatusCode::RANGE_NOT_SATISFIABLE.into_response()),
            Self::Internal(ref message) => {
                error!(error = %message, "Request failed");
                (self.status(), self.to_string()).into_response()
            }
            other => (other.status(), other.to_string()).into_response(),
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Io(err) => Self::Internal(err.to_string()),
            too_large @ UploadError::TooLarge => Self::PayloadTooLarge(too_large.to_string()),
            other => Self::BadRequest(other.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Failures of the JSON API, rendered as `{"error": "..."}`.
#[derive(Debug)]
pub struct JsonError(pub ApiError);

impl IntoResponse for JsonError {
    fn into_response(self) -> Response {
        let status = self.0.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self.0, "API request failed");
        }
        let message = match self.0 {
            ApiError::Internal(message) => message,
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<ApiError> for JsonError {
    fn from(err: ApiError) -> Self {
        Self(err)
    }
}

impl From<tokio::task::JoinError> for JsonError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self(err.into())
    }
}
