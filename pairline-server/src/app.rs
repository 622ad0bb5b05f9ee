use crate::config::RelayConfig;
use crate::matchmaking::{MemoryStore, RouterHandle, SignalingRouter};
use crate::signaling::{SignalingService, ws_handler};
use anyhow::Context;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared state of one relay instance.
pub struct AppState {
    pub signaling: SignalingService,
    pub router: RouterHandle,
    pub config: RelayConfig,
}

impl AppState {
    /// Wires an in-memory pairing store, the connection registry and a
    /// freshly spawned router actor together.
    pub fn new(config: RelayConfig) -> Self {
        let signaling = SignalingService::new();
        let store = Box::new(MemoryStore::new());
        let router = SignalingRouter::new(store, Arc::new(signaling.clone()))
            .with_partner_requeue(config.requeue_partners);
        let router = RouterHandle::spawn(router, config.command_buffer);

        Self {
            signaling,
            router,
            config,
        }
    }
}

#[derive(Debug, Serialize)]
struct HealthReport {
    status: &'static str,
    connections: usize,
    waiting: usize,
    pairs: usize,
}

async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.router.snapshot().await {
        Ok(snapshot) => Json(HealthReport {
            status: "ok",
            connections: state.signaling.connection_count(),
            waiting: snapshot.waiting.len(),
            pairs: snapshot.pair_count(),
        })
        .into_response(),
        Err(e) => {
            error!("Health check failed: {}", e);
            StatusCode::SERVICE_UNAVAILABLE.into_response()
        }
    }
}

pub fn build_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the relay on `listener` until `shutdown` resolves.
pub async fn serve<F>(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr().context("listener has no local address")?;
    info!("Signaling relay listening on ws://{}/ws", addr);

    axum::serve(listener, build_app(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("server shutdown with error")
}
