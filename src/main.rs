//! Telemetry relay server binary
//!
//! Binds `0.0.0.0:8080` by default; set `PORT` to override, `RUST_LOG`
//! to control log verbosity.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use telemetry_relay::relay::Relay;
use telemetry_relay::server::{self, ServerConfig};

#[tokio::main]
async fn main() -> telemetry_relay::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env();
    let relay = Arc::new(Relay::new());

    server::serve(&config, relay).await
}
