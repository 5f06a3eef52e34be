//! HTTP error responses for the JSON API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::domain::error::SwingscanError;

/// Rendered as `{"error": message}` with the given status.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<SwingscanError> for ApiError {
    fn from(err: SwingscanError) -> Self {
        Self::new(status_from_error(&err), err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

pub fn status_from_error(err: &SwingscanError) -> StatusCode {
    match err {
        SwingscanError::MissingKey { .. }
        | SwingscanError::InvalidField { .. }
        | SwingscanError::InvalidParameter { .. } => StatusCode::BAD_REQUEST,
        SwingscanError::DataUnavailable { .. } | SwingscanError::InsufficientData { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        SwingscanError::UnorderedSeries { .. }
        | SwingscanError::Provider { .. }
        | SwingscanError::ConfigParse { .. }
        | SwingscanError::ConfigMissing { .. }
        | SwingscanError::ConfigInvalid { .. }
        | SwingscanError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
