use anyhow::{Context, Result};
use clap::Parser;
use pairline_server::{AppState, RelayConfig, ServerArgs, serve};
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(default_filter: &str) {
    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter_layer)
        .with_target(false)
        .init();
}

async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = ServerArgs::parse();
    let config = RelayConfig::try_from(args)?;
    init_tracing(&config.log_level);

    info!(
        listen_addr = %config.listen_addr,
        outbound_buffer = config.outbound_buffer,
        requeue_partners = config.requeue_partners,
        "Starting pairline signaling relay"
    );

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;

    let state = Arc::new(AppState::new(config));
    serve(listener, state, shutdown_signal()).await
}
