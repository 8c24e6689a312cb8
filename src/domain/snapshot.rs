//! Canonical environmental state and the payload it is reconciled from.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Immutable record of the greenhouse environment.
///
/// A snapshot is never edited in place once published; the sensor model
/// builds a new one and swaps it in whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorSnapshot {
    /// °C
    pub temperature: f64,
    /// %
    pub humidity: f64,
    /// %
    pub solar_output: f64,
    /// %
    pub water_level: f64,
    /// %
    pub energy_efficiency: f64,
    /// kg
    pub co2_saved: f64,
    pub source_is_live: bool,
    pub last_updated: DateTime<Utc>,
    /// Ticket of the poll that produced this snapshot; 0 for the seed
    pub revision: u64,
}

impl SensorSnapshot {
    /// Start-of-day values shown before the first poll completes.
    pub fn seed(now: DateTime<Utc>) -> Self {
        Self {
            temperature: 24.5,
            humidity: 65.0,
            solar_output: 78.0,
            water_level: 85.0,
            energy_efficiency: 92.0,
            co2_saved: 1_250.0,
            source_is_live: false,
            last_updated: now,
            revision: 0,
        }
    }

    /// Human-readable source indicator for status displays.
    pub fn status_label(&self) -> &'static str {
        if self.source_is_live {
            "live"
        } else {
            "simulated"
        }
    }

    /// Timestamp for a successor snapshot; strictly later than this one.
    pub fn next_timestamp(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.max(self.last_updated + Duration::microseconds(1))
    }

    /// Overlay a live reading: present fields win, absent fields keep the
    /// previous value. Percentages are clamped to 0-100.
    pub fn reconcile(
        &self,
        reading: &TelemetryReading,
        revision: u64,
        now: DateTime<Utc>,
    ) -> SensorSnapshot {
        SensorSnapshot {
            temperature: reading.temperature.unwrap_or(self.temperature),
            humidity: percent(reading.humidity, self.humidity),
            solar_output: percent(reading.solar(), self.solar_output),
            water_level: percent(reading.water_level, self.water_level),
            energy_efficiency: percent(reading.energy_efficiency, self.energy_efficiency),
            co2_saved: reading.co2_saved.unwrap_or(self.co2_saved),
            source_is_live: true,
            last_updated: self.next_timestamp(now),
            revision,
        }
    }
}

fn percent(remote: Option<f64>, previous: f64) -> f64 {
    remote.map(|v| v.clamp(0.0, 100.0)).unwrap_or(previous)
}

/// Body of `GET /sensor-data`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryReading {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub solar_output: Option<f64>,
    /// Older feeds report solar output under this name
    pub sunlight: Option<f64>,
    pub water_level: Option<f64>,
    pub energy_efficiency: Option<f64>,
    pub co2_saved: Option<f64>,
}

impl TelemetryReading {
    pub fn solar(&self) -> Option<f64> {
        self.solar_output.or(self.sunlight)
    }
}
