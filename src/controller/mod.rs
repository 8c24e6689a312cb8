pub mod commands;

use parking_lot::Mutex;
use std::{sync::Arc, time::Duration};
use tokio::{task::JoinHandle, time::Instant, time::MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::{Config, ConfigError};
use crate::sensor::ReconciledSensorModel;
use crate::simulation::{mount_greenhouse, AnimationClock};

pub use commands::CommandSurface;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Config,
    pub sensors: Arc<ReconciledSensorModel>,
    pub commands: Arc<CommandSurface>,
    pub clock: Arc<Mutex<AnimationClock>>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(cfg: Config) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let sensors = Arc::new(ReconciledSensorModel::from_config(&cfg)?);
        Ok(Self::with_sensors(cfg, sensors))
    }

    /// Wire the scene around an already-built sensor model.
    pub fn with_sensors(cfg: Config, sensors: Arc<ReconciledSensorModel>) -> Self {
        let commands = Arc::new(CommandSurface::new());
        let clock = mount_greenhouse(&cfg.scene, sensors.clone(), commands.clone());
        Self {
            cfg,
            sensors,
            commands,
            clock: Arc::new(Mutex::new(clock)),
            started_at: Instant::now(),
        }
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}

/// Handles to the background loops; dropped loops keep running until
/// `shutdown` is called.
pub struct ControllerTasks {
    cancel: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl ControllerTasks {
    pub async fn shutdown(self) {
        self.cancel.cancel();
        for handle in self.handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "controller task ended abnormally");
            }
        }
    }
}

pub fn spawn_controller_tasks(state: &AppState) -> ControllerTasks {
    let cancel = CancellationToken::new();
    let poller = state.sensors.clone().spawn_polling(cancel.clone());
    let frames = spawn_frame_driver(
        state.clock.clone(),
        state.cfg.scene.frame_interval(),
        cancel.clone(),
    );
    ControllerTasks {
        cancel,
        handles: vec![poller, frames],
    }
}

/// Stand-in for a renderer's per-frame callback: ticks the clock at a fixed
/// rate with wall-clock elapsed and delta seconds.
pub fn spawn_frame_driver(
    clock: Arc<Mutex<AnimationClock>>,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let start = Instant::now();
        let mut last = start;
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }
            let now = Instant::now();
            let elapsed = now.duration_since(start).as_secs_f64();
            let delta = now.duration_since(last).as_secs_f64();
            last = now;
            clock.lock().tick(elapsed, delta);
        }
        info!(frames = clock.lock().frames(), "frame driver stopped");
    })
}
