use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::str::FromStr;

use crate::{
    api::{error::ApiError, response::ApiResponse, status},
    controller::AppState,
    domain::{Command, CommandState, SensorSnapshot},
    sensor::RefreshOutcome,
    simulation::Scene,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/status", get(status::get_status))
        .route("/sensors", get(get_sensors))
        .route("/sensors/refresh", post(refresh_sensors))
        .route("/commands", get(get_commands))
        .route("/commands/:command", post(apply_command))
        .route("/scene", get(get_scene))
        .with_state(state)
}

pub async fn get_sensors(State(st): State<AppState>) -> Json<ApiResponse<SensorSnapshot>> {
    Json(ApiResponse::success(st.sensors.current().as_ref().clone()))
}

#[derive(Debug, Serialize)]
pub struct RefreshResult {
    pub outcome: RefreshOutcome,
    pub snapshot: SensorSnapshot,
}

/// POST /api/v1/sensors/refresh - poll now; failures still answer 200
pub async fn refresh_sensors(State(st): State<AppState>) -> Json<ApiResponse<RefreshResult>> {
    let outcome = st.sensors.refresh().await;
    let snapshot = st.sensors.current().as_ref().clone();
    Json(ApiResponse::success(RefreshResult { outcome, snapshot }))
}

pub async fn get_commands(State(st): State<AppState>) -> Json<ApiResponse<CommandState>> {
    Json(ApiResponse::success(st.commands.state()))
}

pub async fn apply_command(
    State(st): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<CommandState>>, ApiError> {
    let command = Command::from_str(&name).map_err(|_| ApiError::UnknownCommand(name))?;
    Ok(Json(ApiResponse::success(st.commands.toggle(command))))
}

pub async fn get_scene(State(st): State<AppState>) -> Json<ApiResponse<Scene>> {
    let scene = st.clock.lock().scene().clone();
    Json(ApiResponse::success(scene))
}
