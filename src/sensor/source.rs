use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT},
    StatusCode, Url,
};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::config::{validate_endpoint, ConfigError};
use crate::domain::TelemetryReading;

/// Transient failure of a single telemetry request.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("telemetry request failed: {0}")]
    Request(String),
    #[error("telemetry endpoint returned HTTP {0}")]
    Status(StatusCode),
    #[error("telemetry payload malformed: {0}")]
    Malformed(String),
    #[error("telemetry request timed out after {0:?}")]
    Timeout(Duration),
}

/// One outbound request to the sensor feed. Implementations never retry.
#[async_trait]
pub trait TelemetrySource: Send + Sync {
    async fn fetch(&self) -> Result<TelemetryReading, TelemetryError>;
}

/// `GET /sensor-data` over HTTP.
#[derive(Clone)]
pub struct HttpTelemetrySource {
    endpoint: Url,
    client: reqwest::Client,
}

impl HttpTelemetrySource {
    /// Fails only when the endpoint itself is unusable.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, ConfigError> {
        let endpoint = validate_endpoint(endpoint)?;
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("greenhouse-twin/0.1"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ConfigError::InvalidEndpoint(endpoint.to_string(), e.to_string()))?;
        Ok(Self { endpoint, client })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl TelemetrySource for HttpTelemetrySource {
    async fn fetch(&self) -> Result<TelemetryReading, TelemetryError> {
        let resp = self
            .client
            .get(self.endpoint.clone())
            .send()
            .await
            .map_err(|e| TelemetryError::Request(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(TelemetryError::Status(status));
        }
        let body = resp
            .text()
            .await
            .map_err(|e| TelemetryError::Request(e.to_string()))?;
        let reading: TelemetryReading =
            serde_json::from_str(&body).map_err(|e| TelemetryError::Malformed(e.to_string()))?;
        debug!(endpoint = %self.endpoint, ?reading, "telemetry fetched");
        Ok(reading)
    }
}
