//! Event Manager Server Library
//!
//! REST backend for events and user accounts: JSON document storage for
//! events, SQLite for users, JWT sessions, and reminder dispatch through a
//! notification gateway.

pub mod core;
pub mod events;
pub mod notify;

use anyhow::Context;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub use crate::core::{router, AppState, ServerConfig};

/// Initialize tracing from `RUST_LOG`, defaulting to `info`
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_err()
    {
        // Already set, ignore
    }
}

pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    info!("=== Event Manager Server ===");
    info!("Data directory: {:?}", config.data_dir);
    match &config.client_origin {
        Some(origin) => info!("Allowed client origin: {}", origin),
        None => info!("Allowed client origin: any"),
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = AppState::new(config).await?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);

    serve(listener, state).await
}

/// Serve the API on an already-bound listener until a shutdown signal
pub async fn serve(listener: TcpListener, state: AppState) -> anyhow::Result<()> {
    axum::serve(listener, router(state))
        .with_graceful_shutdown(crate::core::shutdown::shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
