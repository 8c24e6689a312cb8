use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use strum::IntoEnumIterator;
use thiserror::Error;

use crate::domain::Command;

/// Failures a handler can report. Telemetry trouble is never one of them;
/// it only shows up as a degraded health check.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("no telemetry poll has completed yet")]
    NotReady,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    expected: Vec<String>,
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::UnknownCommand(_) => StatusCode::NOT_FOUND,
            ApiError::NotReady => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn body(&self) -> ErrorBody {
        let (error, expected) = match self {
            ApiError::UnknownCommand(_) => (
                "unknown_command",
                Command::iter().map(|c| c.to_string()).collect(),
            ),
            ApiError::NotReady => ("not_ready", Vec::new()),
        };
        ErrorBody {
            error,
            message: self.to_string(),
            expected,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::debug!(error = %self, "request rejected");
        (self.status_code(), Json(self.body())).into_response()
    }
}
