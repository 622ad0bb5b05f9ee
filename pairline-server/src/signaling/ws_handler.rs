use crate::app::AppState;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use pairline_core::{ConnectionId, Frame};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.max_message_size(state.config.max_message_bytes)
        .on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let connection_id = ConnectionId::new();
    info!("New WebSocket connection: {}", connection_id);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<Message>(state.config.outbound_buffer);

    state.signaling.register(connection_id, tx);

    let ping_interval = state.config.ping_interval;
    let mut send_task = tokio::spawn(async move {
        let mut ping = ping_interval
            .map(|every| tokio::time::interval_at(tokio::time::Instant::now() + every, every));

        loop {
            let msg = match ping.as_mut() {
                Some(ping) => tokio::select! {
                    msg = rx.recv() => msg,
                    _ = ping.tick() => Some(Message::Ping(Bytes::new())),
                },
                None => rx.recv().await,
            };

            let Some(msg) = msg else {
                break;
            };
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let idle_timeout = state.config.idle_timeout();
    let mut recv_task = tokio::spawn({
        let state = state.clone();

        async move {
            loop {
                // Any inbound frame, pongs included, proves the peer is alive.
                let next = match idle_timeout {
                    Some(limit) => match tokio::time::timeout(limit, receiver.next()).await {
                        Ok(next) => next,
                        Err(_) => {
                            info!("No traffic from {} for {:?}, closing", connection_id, limit);
                            break;
                        }
                    },
                    None => receiver.next().await,
                };
                let Some(frame) = next else {
                    break;
                };

                let msg = match frame {
                    Ok(msg) => msg,
                    Err(e) => {
                        debug!("WebSocket error on {}: {}", connection_id, e);
                        break;
                    }
                };

                match msg {
                    Message::Text(text) => match Frame::parse(text.as_str()) {
                        Ok(frame) => {
                            if let Err(e) = state.router.dispatch(connection_id, frame).await {
                                error!("Router died: {}", e);
                                break;
                            }
                        }
                        Err(e) => warn!("Invalid envelope from {}: {}", connection_id, e),
                    },
                    Message::Binary(data) => warn!(
                        "Ignoring {}-byte binary frame from {}",
                        data.len(),
                        connection_id
                    ),
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    state.signaling.unregister(&connection_id);
    if let Err(e) = state.router.disconnect(connection_id).await {
        error!("Failed to release {}: {}", connection_id, e);
    }
    info!("WebSocket disconnected: {}", connection_id);
}
