use anyhow::Result;
use consumption_forecast::{api, config::Config, service::AppState, telemetry};
use telemetry::init_tracing;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cfg = Config::load()?;
    let addr = cfg.server.socket_addr()?;

    let state = AppState::new(cfg);
    if !state.model.is_loaded() {
        warn!("serving analytic fallback predictions");
    }

    let app = api::router(state.clone());

    info!(%addr, service = %state.cfg.site.service_name, "starting consumption forecast service");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(telemetry::shutdown_signal())
        .await?;

    info!("shutdown complete");
    Ok(())
}
