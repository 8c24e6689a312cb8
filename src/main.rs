use anyhow::Result;
use greenhouse_twin::{api, config, controller, telemetry};
use config::Config;
use telemetry::init_tracing;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cfg = Config::load()?;
    init_tracing(&cfg.logging);

    let app_state = controller::AppState::new(cfg.clone())?;
    let app = api::router(app_state.clone(), &cfg);

    let addr = cfg.server.socket_addr()?;
    if cfg.server.host == "0.0.0.0" {
        warn!("binding to 0.0.0.0 - the control surface has no authentication");
    }

    info!(
        %addr,
        endpoint = %cfg.telemetry.endpoint,
        poll_interval_ms = cfg.telemetry.poll_interval_ms,
        frame_rate_hz = cfg.scene.frame_rate_hz,
        "starting greenhouse twin"
    );

    let tasks = controller::spawn_controller_tasks(&app_state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(telemetry::shutdown_signal())
        .await?;

    tasks.shutdown().await;
    warn!("shutdown complete");
    Ok(())
}
