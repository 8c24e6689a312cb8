use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    api::response::ApiResponse,
    controller::AppState,
    domain::CommandState,
    sensor::PollStats,
    simulation::TankLevelController,
};

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    /// "live" or "simulated"
    source: &'static str,
    source_is_live: bool,
    last_updated: DateTime<Utc>,
    revision: u64,
    tank_fill: String,
    commands: CommandState,
    animation: AnimationInfo,
    polls: PollStats,
    system: SystemInfo,
}

#[derive(Debug, Serialize)]
pub struct AnimationInfo {
    frames_rendered: u64,
    elapsed_seconds: f64,
    animators: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct SystemInfo {
    uptime_seconds: u64,
    version: String,
    poll_interval_ms: u64,
}

/// GET /api/v1/status
pub async fn get_status(State(state): State<AppState>) -> Json<ApiResponse<SystemStatus>> {
    let snapshot = state.sensors.current();
    let animation = {
        let clock = state.clock.lock();
        AnimationInfo {
            frames_rendered: clock.frames(),
            elapsed_seconds: clock.last_elapsed(),
            animators: clock.animator_names(),
        }
    };
    let fill = TankLevelController::fill_for(snapshot.water_level);

    Json(ApiResponse::success(SystemStatus {
        source: snapshot.status_label(),
        source_is_live: snapshot.source_is_live,
        last_updated: snapshot.last_updated,
        revision: snapshot.revision,
        tank_fill: format!("{:.0}%", fill * 100.0),
        commands: state.commands.state(),
        animation,
        polls: state.sensors.stats(),
        system: SystemInfo {
            uptime_seconds: state.uptime().as_secs(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            poll_interval_ms: state.sensors.poll_interval().as_millis() as u64,
        },
    }))
}
