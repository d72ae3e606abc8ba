use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation Error: {0}")]
    Validation(String),

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Pivot row at {timestamp} has no value for column {column}")]
    IncompletePivot { timestamp: String, column: String },

    #[error("Sink write failed: {0}")]
    SinkWrite(String),

    #[error("Invalid ISO 8601 duration string: {0}")]
    InvalidDuration(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn upstream<E: ToString>(err: E) -> Self {
        AppError::UpstreamUnavailable(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        // Choose status codes per variant. The timeshift-path errors
        // (InvalidDuration, MalformedResponse) stay 5xx: the synchronous
        // caller expects a structured response body, never a protocol fault.
        let status = match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            AppError::MalformedResponse(_) => StatusCode::BAD_GATEWAY,
            AppError::InvalidDuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::IncompletePivot { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::SinkWrite(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::MissingConfiguration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let error = match status {
            StatusCode::BAD_REQUEST => "Validation Error",
            StatusCode::BAD_GATEWAY => "Upstream Error",
            _ => "Internal Server Error",
        };

        let body = Json(json!({
            "error": error,
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}
