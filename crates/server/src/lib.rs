//! Chat API Server Library
//!
//! Friend-request acceptance and message sending on top of a Redis-style
//! key-value store and a real-time publish channel.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod keys;
pub mod models;
pub mod realtime;
pub mod router;
pub mod store;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub use config::{AppState, ChatServerConfig};
pub use error::{Error, Result};
pub use router::router;

/// Install the global tracing subscriber. `RUST_LOG` overrides the default
/// `info` level.
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

pub async fn run() -> anyhow::Result<()> {
    init_tracing();

    let config = ChatServerConfig::from_env().context("failed to load configuration")?;
    info!("=== Chat Server ===");
    info!("Store: {}", if config.redis_url.is_some() { "redis" } else { "memory" });

    let state = AppState::from_config(&config).await?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!("Listening on http://{}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
