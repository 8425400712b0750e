//! HTTP + WebSocket server boundary
//!
//! Everything transport-level lives here; the coordinator, store, and
//! codec are transport-agnostic and reachable without any of this.

pub mod config;
pub mod http;
pub mod ws;

use std::sync::Arc;

use tokio::net::TcpListener;

use crate::error::Result;
use crate::relay::Relay;

pub use config::ServerConfig;
pub use http::build_router;

/// Run the relay server
///
/// Binds the configured address and serves until the process is
/// terminated or a fatal I/O error occurs.
pub async fn serve(config: &ServerConfig, relay: Arc<Relay>) -> Result<()> {
    let router = build_router(relay);
    let listener = TcpListener::bind(config.bind_addr).await?;

    tracing::info!(addr = %config.bind_addr, "Telemetry relay listening");

    axum::serve(listener, router).await?;
    Ok(())
}
