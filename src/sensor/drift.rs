//! Bounded random walk used while the sensor feed is unreachable.

use chrono::{DateTime, Utc};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::domain::SensorSnapshot;

/// Per-field walk parameters: each step moves at most `step / 2` either way.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriftBounds {
    pub step: f64,
    pub min: f64,
    pub max: f64,
}

impl DriftBounds {
    pub const fn new(step: f64, min: f64, max: f64) -> Self {
        Self { step, min, max }
    }

    /// `clamp(prev + (u - 0.5) * step, min, max)` with `u` in [0, 1).
    pub fn walk(&self, prev: f64, u: f64) -> f64 {
        let next = prev + (u - 0.5) * self.step;
        if next.is_finite() {
            next.clamp(self.min, self.max)
        } else {
            self.min
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftConfig {
    /// None seeds from entropy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub random_seed: Option<u64>,
    pub temperature: DriftBounds,
    pub humidity: DriftBounds,
    pub solar_output: DriftBounds,
    pub water_level: DriftBounds,
    pub energy_efficiency: DriftBounds,
    pub co2_saved: DriftBounds,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            random_seed: None,
            temperature: DriftBounds::new(2.0, 20.0, 35.0),
            humidity: DriftBounds::new(4.0, 40.0, 90.0),
            solar_output: DriftBounds::new(8.0, 0.0, 100.0),
            water_level: DriftBounds::new(4.0, 20.0, 100.0),
            energy_efficiency: DriftBounds::new(2.0, 70.0, 100.0),
            co2_saved: DriftBounds::new(2.0, 0.0, 100_000.0),
        }
    }
}

/// Synthetic telemetry generator. Owns its RNG so runs with a fixed seed
/// are reproducible.
pub struct DriftGenerator {
    config: DriftConfig,
    rng: StdRng,
}

impl DriftGenerator {
    pub fn new(config: DriftConfig) -> Self {
        let rng = match config.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { config, rng }
    }

    /// Next synthetic snapshot derived from `prev`, marked offline.
    pub fn step(&mut self, prev: &SensorSnapshot, revision: u64, now: DateTime<Utc>) -> SensorSnapshot {
        let c = &self.config;
        let rng = &mut self.rng;
        SensorSnapshot {
            temperature: c.temperature.walk(prev.temperature, rng.gen()),
            humidity: c.humidity.walk(prev.humidity, rng.gen()),
            solar_output: c.solar_output.walk(prev.solar_output, rng.gen()),
            water_level: c.water_level.walk(prev.water_level, rng.gen()),
            energy_efficiency: c.energy_efficiency.walk(prev.energy_efficiency, rng.gen()),
            co2_saved: c.co2_saved.walk(prev.co2_saved, rng.gen()),
            source_is_live: false,
            last_updated: prev.next_timestamp(now),
            revision,
        }
    }
}
