use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::drift::{DriftConfig, DriftGenerator};
use super::source::{HttpTelemetrySource, TelemetryError, TelemetrySource};
use crate::config::{Config, ConfigError};
use crate::domain::{SensorSnapshot, TelemetryReading};

/// What a single `refresh` did to the published snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshOutcome {
    /// Remote values were merged in
    Live,
    /// The feed failed and the drift generator produced the snapshot
    Simulated,
    /// A newer poll had already published; this result was dropped
    Superseded,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct PollStats {
    pub live: u64,
    pub simulated: u64,
    pub superseded: u64,
}

/// Owner of the canonical `SensorSnapshot`.
///
/// Readers get an `Arc` to an immutable snapshot; writers build a complete
/// successor and swap it in under the lock, so no reader ever sees a mix of
/// two polls. Results are only published if their revision is newer than
/// the one already current.
pub struct ReconciledSensorModel {
    source: Arc<dyn TelemetrySource>,
    snapshot: RwLock<Arc<SensorSnapshot>>,
    drift: Mutex<DriftGenerator>,
    next_revision: AtomicU64,
    poll_interval: Duration,
    timeout: Duration,
    live: AtomicU64,
    simulated: AtomicU64,
    superseded: AtomicU64,
    /// Revision of the first failed poll of the current outage; 0 while live
    outage_start: AtomicU64,
}

impl ReconciledSensorModel {
    pub fn new(
        source: Arc<dyn TelemetrySource>,
        drift: DriftConfig,
        poll_interval: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            source,
            snapshot: RwLock::new(Arc::new(SensorSnapshot::seed(Utc::now()))),
            drift: Mutex::new(DriftGenerator::new(drift)),
            next_revision: AtomicU64::new(0),
            poll_interval,
            timeout,
            live: AtomicU64::new(0),
            simulated: AtomicU64::new(0),
            superseded: AtomicU64::new(0),
            outage_start: AtomicU64::new(0),
        }
    }

    /// HTTP-backed model; a bad endpoint is a startup error.
    pub fn from_config(cfg: &Config) -> Result<Self, ConfigError> {
        cfg.drift.validate()?;
        let timeout = cfg.telemetry.timeout();
        let source = HttpTelemetrySource::new(&cfg.telemetry.endpoint, timeout)?;
        Ok(Self::new(
            Arc::new(source),
            cfg.drift.clone(),
            cfg.telemetry.poll_interval(),
            timeout,
        ))
    }

    /// The published snapshot. Never waits on network I/O.
    pub fn current(&self) -> Arc<SensorSnapshot> {
        self.snapshot.read().clone()
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn stats(&self) -> PollStats {
        PollStats {
            live: self.live.load(Ordering::Relaxed),
            simulated: self.simulated.load(Ordering::Relaxed),
            superseded: self.superseded.load(Ordering::Relaxed),
        }
    }

    /// Revision at which the current outage began, if the feed is down.
    pub fn offline_since(&self) -> Option<u64> {
        match self.outage_start.load(Ordering::Acquire) {
            0 => None,
            revision => Some(revision),
        }
    }

    /// Poll the feed once. Failures fall back to synthetic drift and are
    /// never returned to the caller. Safe to call while the background
    /// loop is polling.
    pub async fn refresh(&self) -> RefreshOutcome {
        let revision = self.next_revision.fetch_add(1, Ordering::SeqCst) + 1;
        let result = match tokio::time::timeout(self.timeout, self.source.fetch()).await {
            Ok(result) => result,
            Err(_) => Err(TelemetryError::Timeout(self.timeout)),
        };
        self.publish(revision, result, Utc::now())
    }

    fn publish(
        &self,
        revision: u64,
        result: Result<TelemetryReading, TelemetryError>,
        now: DateTime<Utc>,
    ) -> RefreshOutcome {
        let mut slot = self.snapshot.write();
        if revision <= slot.revision {
            debug!(revision, current = slot.revision, "discarding out-of-order poll result");
            self.superseded.fetch_add(1, Ordering::Relaxed);
            return RefreshOutcome::Superseded;
        }

        let was_live = slot.source_is_live;
        let (next, outcome) = match result {
            Ok(reading) => (slot.reconcile(&reading, revision, now), RefreshOutcome::Live),
            Err(e) => {
                if was_live || revision == 1 {
                    warn!(error = %e, revision, "telemetry unavailable, switching to simulation");
                } else {
                    debug!(error = %e, revision, "telemetry still unavailable");
                }
                let next = self.drift.lock().step(&slot, revision, now);
                (next, RefreshOutcome::Simulated)
            }
        };
        if outcome == RefreshOutcome::Live && !was_live {
            info!(revision, "telemetry source live");
        }

        match outcome {
            RefreshOutcome::Live => {
                self.outage_start.store(0, Ordering::Release);
                self.live.fetch_add(1, Ordering::Relaxed);
            }
            _ => {
                if self.outage_start.load(Ordering::Acquire) == 0 {
                    self.outage_start.store(revision, Ordering::Release);
                }
                self.simulated.fetch_add(1, Ordering::Relaxed);
            }
        }
        debug!(
            revision,
            source_is_live = next.source_is_live,
            temperature = next.temperature,
            water_level = next.water_level,
            "snapshot replaced"
        );
        *slot = Arc::new(next);
        outcome
    }

    /// Poll immediately, then every `poll_interval`, until `cancel` fires.
    pub fn spawn_polling(self: Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.poll_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = interval.tick() => {}
                }
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    outcome = self.refresh() => {
                        debug!(?outcome, "scheduled poll complete");
                    }
                }
            }
            info!("telemetry polling stopped");
        })
    }
}
