//! API error type shared by the HTTP server and the Lambda adapter.
//!
//! Failed verification is not an error: it is a normal 200 response with
//! `isValid: false`. Only malformed requests, unknown routes and unexpected
//! failures end up here.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Not found")]
    NotFound,

    #[error("Payload too large")]
    PayloadTooLarge,

    /// The detail is logged and never sent to the caller.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error body
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> ErrorBody {
        match self {
            ApiError::InvalidRequest(hint) => ErrorBody {
                error: "Invalid request".to_string(),
                message: Some(hint.clone()),
            },
            ApiError::NotFound => ErrorBody {
                error: "Not found".to_string(),
                message: None,
            },
            ApiError::PayloadTooLarge => ErrorBody {
                error: "Payload too large".to_string(),
                message: Some(format!(
                    "Request body must not exceed {} bytes",
                    crate::common::handler::MAX_BODY_BYTES
                )),
            },
            ApiError::Internal(_) => ErrorBody {
                error: "Failed to verify signature".to_string(),
                message: Some("Internal server error".to_string()),
            },
        }
    }

    /// Logs the error at a level matching who caused it
    pub fn log(&self) {
        match self {
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "Error verifying signature");
            }
            _ => {
                tracing::debug!(error = %self, "Rejected request");
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log();
        (self.status_code(), Json(self.body())).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
