use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, time::Duration};
use thiserror::Error;

use crate::sensor::drift::{DriftBounds, DriftConfig};

/// Misconfiguration that must abort startup rather than degrade silently.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid telemetry endpoint '{0}': {1}")]
    InvalidEndpoint(String, String),
    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),
    #[error("drift bounds for {field}: {reason}")]
    InvalidDriftBounds { field: &'static str, reason: String },
    #[error("scene setting {0} is out of range")]
    InvalidScene(&'static str),
    #[error("invalid log filter '{0}': {1}")]
    InvalidLogFilter(String, String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub telemetry: TelemetryConfig,
    pub drift: DriftConfig,
    pub scene: SceneConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8088,
            request_timeout_secs: 10,
            enable_cors: false,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

/// `RUST_LOG`, when set, replaces `filter`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: String,
    /// JSON lines when true, human-readable otherwise
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info,greenhouse_twin=info,hyper=warn,reqwest=warn,tower_http=info".into(),
            json: true,
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        tracing_subscriber::EnvFilter::try_new(&self.filter)
            .map(|_| ())
            .map_err(|e| ConfigError::InvalidLogFilter(self.filter.clone(), e.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Full URL of the `GET /sensor-data` endpoint
    pub endpoint: String,
    pub poll_interval_ms: u64,
    /// Defaults to one polling interval when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:5000/sensor-data".into(),
            poll_interval_ms: 5_000,
            timeout_ms: None,
        }
    }
}

impl TelemetryConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.unwrap_or(self.poll_interval_ms))
    }
}

/// Layout and motion constants for the procedural scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Seed for mount-time randomisation (plant baselines, bird paths)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub random_seed: Option<u64>,
    pub frame_rate_hz: u32,
    pub beds: usize,
    pub plants_per_bed: usize,
    /// Cap on growth relative to each plant's baseline scale
    pub max_growth_factor: f64,
    pub growth_pulse: f64,
    pub growth_frequency: f64,
    pub droplets_per_plant: usize,
    pub spray_particles: usize,
    /// Radians added per tick while a fan runs
    pub fan_speed: f64,
    pub fan_blades: usize,
    pub solar_panels: usize,
    pub energy_particles: usize,
    pub birds: usize,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            random_seed: None,
            frame_rate_hz: 30,
            beds: 3,
            plants_per_bed: 6,
            max_growth_factor: 1.3,
            growth_pulse: 0.002,
            growth_frequency: 2.0,
            droplets_per_plant: 3,
            spray_particles: 60,
            fan_speed: 0.2,
            fan_blades: 4,
            solar_panels: 6,
            energy_particles: 24,
            birds: 5,
        }
    }
}

impl SceneConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.frame_rate_hz.max(1)))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_rate_hz == 0 {
            return Err(ConfigError::ZeroValue("scene.frame_rate_hz"));
        }
        if !(self.max_growth_factor.is_finite() && self.max_growth_factor >= 1.0) {
            return Err(ConfigError::InvalidScene("max_growth_factor"));
        }
        if !(self.growth_pulse.is_finite() && self.growth_pulse >= 0.0) {
            return Err(ConfigError::InvalidScene("growth_pulse"));
        }
        if !self.growth_frequency.is_finite() {
            return Err(ConfigError::InvalidScene("growth_frequency"));
        }
        if !(self.fan_speed.is_finite() && self.fan_speed > 0.0) {
            return Err(ConfigError::InvalidScene("fan_speed"));
        }
        if self.fan_blades == 0 {
            return Err(ConfigError::ZeroValue("scene.fan_blades"));
        }
        Ok(())
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("config/default.toml"))
            .merge(Env::prefixed("GREENHOUSE__").split("__"));
        let cfg: Config = figment.extract()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.logging.validate()?;
        validate_endpoint(&self.telemetry.endpoint)?;
        if self.telemetry.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroValue("telemetry.poll_interval_ms"));
        }
        if self.telemetry.timeout_ms == Some(0) {
            return Err(ConfigError::ZeroValue("telemetry.timeout_ms"));
        }
        self.drift.validate()?;
        self.scene.validate()
    }
}

pub fn validate_endpoint(endpoint: &str) -> Result<reqwest::Url, ConfigError> {
    let url = reqwest::Url::parse(endpoint)
        .map_err(|e| ConfigError::InvalidEndpoint(endpoint.to_string(), e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidEndpoint(
            endpoint.to_string(),
            format!("unsupported scheme '{other}'"),
        )),
    }
}

impl DriftConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_bounds("temperature", &self.temperature, false)?;
        check_bounds("humidity", &self.humidity, true)?;
        check_bounds("solar_output", &self.solar_output, true)?;
        check_bounds("water_level", &self.water_level, true)?;
        check_bounds("energy_efficiency", &self.energy_efficiency, true)?;
        check_bounds("co2_saved", &self.co2_saved, false)
    }
}

fn check_bounds(
    field: &'static str,
    bounds: &DriftBounds,
    percentage: bool,
) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidDriftBounds { field, reason };
    if !(bounds.step.is_finite() && bounds.step >= 0.0) {
        return Err(invalid(format!("step {} must be finite and >= 0", bounds.step)));
    }
    if !(bounds.min.is_finite() && bounds.max.is_finite()) || bounds.min > bounds.max {
        return Err(invalid(format!("min {} > max {}", bounds.min, bounds.max)));
    }
    if percentage && (bounds.min < 0.0 || bounds.max > 100.0) {
        return Err(invalid(format!(
            "[{}, {}] leaves the 0-100% range",
            bounds.min, bounds.max
        )));
    }
    Ok(())
}
