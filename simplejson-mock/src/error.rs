use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid timestamp in {field}: '{value}'")]
    InvalidTimestamp { field: &'static str, value: String },

    #[error("invalid request body: {0}")]
    Decode(#[from] JsonRejection),

    #[error("request has no targets")]
    MissingTarget,

    #[error("target is not numeric: '{0}'")]
    InvalidTarget(String),

    #[error("step must be a positive number of hours, got '{0}'")]
    InvalidStep(String),

    #[error("range would produce {count} points, the limit is {max}")]
    TooManyPoints { count: u64, max: u64 },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            // Unparseable timestamps are reported as a server fault, not a client error
            ApiError::InvalidTimestamp { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            // 400 for bad JSON, 413 over the body limit, 415 without a JSON content type,
            // 422 when fields are missing or mistyped
            ApiError::Decode(rejection) => rejection.status(),
            ApiError::MissingTarget
            | ApiError::InvalidTarget(_)
            | ApiError::InvalidStep(_)
            | ApiError::TooManyPoints { .. } => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Rejected request: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
