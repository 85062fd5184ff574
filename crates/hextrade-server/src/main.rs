//! hextrade game server.
//!
//! Serves the engine's action/result contract over WebSockets. Listen
//! address comes from `SERVER_ADDR`, log filtering from `RUST_LOG`.

use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

mod protocol;
mod room;
mod server;

use server::ServerState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let addr: SocketAddr = std::env::var("SERVER_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".into())
        .parse()
        .context("SERVER_ADDR must be a host:port pair")?;

    info!("starting hextrade server");

    let state = Arc::new(ServerState::new());
    server::run_server(addr, state).await
}
