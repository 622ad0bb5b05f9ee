use crate::signaling::SignalingOutput;
use async_trait::async_trait;
use axum::extract::ws::Message;
use dashmap::DashMap;
use pairline_core::{ConnectionId, Frame};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, error, warn};

struct SignalingInner {
    connections: DashMap<ConnectionId, mpsc::Sender<Message>>,
}

/// Registry of open connections and their outbound queues.
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
}

impl SignalingService {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SignalingInner {
                connections: DashMap::new(),
            }),
        }
    }

    pub fn register(&self, connection_id: ConnectionId, tx: mpsc::Sender<Message>) {
        self.inner.connections.insert(connection_id, tx);
    }

    pub fn unregister(&self, connection_id: &ConnectionId) -> bool {
        self.inner.connections.remove(connection_id).is_some()
    }

    pub fn is_connected(&self, connection_id: &ConnectionId) -> bool {
        self.inner.connections.contains_key(connection_id)
    }

    pub fn connection_count(&self) -> usize {
        self.inner.connections.len()
    }

    /// Queues the wire text of `frame` without waiting. A full queue drops
    /// the frame instead of stalling the router.
    pub fn send_frame(&self, connection_id: &ConnectionId, frame: &Frame) -> bool {
        let Some(connection) = self.inner.connections.get(connection_id) else {
            debug!(
                "Attempted to send '{}' to disconnected connection {}",
                frame.kind(),
                connection_id
            );
            return false;
        };

        let text = match frame.to_text() {
            Ok(text) => text.into_owned(),
            Err(e) => {
                error!("Failed to serialize '{}' envelope: {}", frame.kind(), e);
                return false;
            }
        };

        match connection.try_send(Message::Text(text.into())) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!(
                    "Outbound queue full for {}, dropping '{}'",
                    connection_id,
                    frame.kind()
                );
                false
            }
            Err(TrySendError::Closed(_)) => {
                debug!("Outbound queue closed for {}", connection_id);
                false
            }
        }
    }
}

impl Default for SignalingService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SignalingOutput for SignalingService {
    async fn send(&self, connection_id: &ConnectionId, frame: &Frame) -> bool {
        self.send_frame(connection_id, frame)
    }
}
