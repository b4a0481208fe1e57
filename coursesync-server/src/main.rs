mod routes;
mod state;

use anyhow::{Context, Result};
use coursesync_core::SyncConfig;
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

const DEFAULT_PORT: u16 = 4096;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("coursesync=info")),
        )
        .init();

    let config = SyncConfig::load(None).context("Failed to load coursesync config")?;
    let state = AppState::new(config)?;

    let port = match std::env::var("PORT") {
        Ok(port) => port
            .parse()
            .with_context(|| format!("PORT must be a port number, got '{port}'"))?,
        Err(_) => DEFAULT_PORT,
    };

    let app = routes::app(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    info!("coursesync-server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
