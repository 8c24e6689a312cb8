//! # Sensor Reconciliation
//!
//! Keeps exactly one current `SensorSnapshot`, fed by a remote sensor
//! endpoint when it answers and by a bounded random walk when it does not.
//!
//! - **source**: the single-request `TelemetrySource` seam and its HTTP client
//! - **drift**: the seedable synthetic generator used as fallback
//! - **model**: `ReconciledSensorModel`, polling, ordering and atomic replacement

pub mod drift;
pub mod model;
pub mod source;

pub use drift::{DriftBounds, DriftConfig, DriftGenerator};
pub use model::{PollStats, ReconciledSensorModel, RefreshOutcome};
pub use source::{HttpTelemetrySource, TelemetryError, TelemetrySource};
