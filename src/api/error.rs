use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::core::job::InvalidJobError;
use crate::source::SourceError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    InvalidJob(#[from] InvalidJobError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("text rendering unavailable: no font loaded")]
    NoFont,
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::InvalidJob(_) => StatusCode::BAD_REQUEST,
            // A font that fails at render time is a server problem, not the caller's
            ApiError::Source(SourceError::Font(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Source(_) => StatusCode::BAD_REQUEST,
            ApiError::NoFont => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected: {}", self);
        }
        (status, Json(json!({ "ok": false, "error": self.to_string() }))).into_response()
    }
}
