//! Binary entrypoint for the module server.
//!
//! Configuration comes from `MODSERVER_*` environment variables (see
//! [`ServerConfig::from_env`]). The listener starts immediately; module
//! requests are refused with `503` until every artifact has loaded.

use modserver_server::config::ServerConfig;
use modserver_server::router::build_router;
use modserver_server::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = ServerConfig::from_env()?;
    let addr = format!("0.0.0.0:{}", config.port);

    let state = AppState::new(config);
    let init = state.clone();
    tokio::spawn(async move {
        // Failure is logged and recorded in the readiness state.
        let _ = init.initialize().await;
    });

    let app = build_router(state);

    tracing::info!("module server starting on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
