mod db;
mod reminders;
mod routes;
mod singleton;
mod state;

use std::net::SocketAddr;

use anyhow::{Context, Result};
use taskcal_core::config::TaskcalConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = TaskcalConfig::load()?;

    // Ensure only one instance serves this database
    let _lock = singleton::acquire_lock(&config.database_path())?;
    let state = AppState::open(&config)?;
    state.schedule_all()?;

    let app = routes::app(state);

    let addr: SocketAddr = config
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address '{}'", config.bind))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Could not listen on {addr}"))?;
    info!("taskcal-server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
