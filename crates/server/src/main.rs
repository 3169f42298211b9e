use std::sync::Arc;

use anyhow::Context;
use db::DBService;
use server::{AppState, app, config::Config};
use tracing::info;
use utils::{clock::SystemClock, logging::init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing("info");

    let config = Config::from_env()?;
    let db = DBService::new(&config.database_url)
        .await
        .context("failed to open directory database")?;

    let state = AppState::new(db, &config, Arc::new(SystemClock));
    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?;
    info!(address = %listener.local_addr()?, "Directory server listening");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl+C handler: {e}");
    }
    info!("Shutdown signal received");
}
