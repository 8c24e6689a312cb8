use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::{api::error::ApiError, controller::AppState};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    timestamp: chrono::DateTime<chrono::Utc>,
    checks: HealthChecks,
}

#[derive(Debug, Serialize)]
pub struct HealthChecks {
    telemetry: ComponentHealth,
    animation: ComponentHealth,
}

#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl ComponentHealth {
    fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            detail: None,
        }
    }

    fn degraded(detail: String) -> Self {
        Self {
            status: "degraded".to_string(),
            detail: Some(detail),
        }
    }
}

/// GET /health
///
/// Always 200: a simulated feed degrades the report but the twin keeps
/// rendering.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.sensors.current();
    let telemetry = if snapshot.source_is_live {
        ComponentHealth::healthy()
    } else {
        ComponentHealth::degraded(outage_detail(state.sensors.offline_since()))
    };
    let animation = ComponentHealth::healthy();

    let status = if telemetry.status == "healthy" {
        "healthy"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status: status.to_string(),
        timestamp: chrono::Utc::now(),
        checks: HealthChecks {
            telemetry,
            animation,
        },
    })
}

fn outage_detail(offline_since: Option<u64>) -> String {
    match offline_since {
        Some(revision) => format!(
            "sensor feed offline since revision {revision}, serving simulated values"
        ),
        None => "no telemetry poll completed yet, serving seed values".to_string(),
    }
}

/// GET /health/ready - ready once the first poll has completed
pub async fn readiness_check(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    if state.sensors.current().revision > 0 {
        Ok(StatusCode::OK)
    } else {
        Err(ApiError::NotReady)
    }
}

/// GET /health/live
pub async fn liveness_check() -> impl IntoResponse {
    StatusCode::OK
}
