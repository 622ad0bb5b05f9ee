use async_trait::async_trait;
use pairline_core::{ConnectionId, Envelope, Frame};
use pairline_server::SignalingOutput;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

/// One envelope the router handed to the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub to: ConnectionId,
    pub envelope: Envelope,
}

/// Mock SignalingOutput that captures all outgoing envelopes.
#[derive(Clone)]
pub struct MockSignalingOutput {
    /// Channel to send captured envelopes.
    tx: mpsc::UnboundedSender<Outbound>,
    /// Every frame handed over, wire text included (for verification).
    sent: Arc<Mutex<Vec<(ConnectionId, Frame)>>>,
    /// Connections whose sends fail, as if the socket died.
    offline: Arc<Mutex<HashSet<ConnectionId>>>,
}

impl MockSignalingOutput {
    /// Create a new MockSignalingOutput and its receiver channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Outbound>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let signaling = Self {
            tx,
            sent: Arc::new(Mutex::new(Vec::new())),
            offline: Arc::new(Mutex::new(HashSet::new())),
        };
        (signaling, rx)
    }

    /// Make every later send to `connection_id` report failure.
    pub async fn go_offline(&self, connection_id: ConnectionId) {
        self.offline.lock().await.insert(connection_id);
    }

    /// Everything delivered to `connection_id` so far.
    pub async fn sent_to(&self, connection_id: &ConnectionId) -> Vec<Envelope> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|(to, _)| to == connection_id)
            .map(|(_, frame)| frame.envelope().clone())
            .collect()
    }

    /// Exact wire text of everything delivered to `connection_id` so far.
    pub async fn sent_text_to(&self, connection_id: &ConnectionId) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|(to, _)| to == connection_id)
            .map(|(_, frame)| {
                frame
                    .to_text()
                    .expect("frame should encode")
                    .into_owned()
            })
            .collect()
    }
}

#[async_trait]
impl SignalingOutput for MockSignalingOutput {
    async fn send(&self, connection_id: &ConnectionId, frame: &Frame) -> bool {
        if self.offline.lock().await.contains(connection_id) {
            tracing::debug!("[MockSignaling] {} is offline", connection_id);
            return false;
        }

        tracing::debug!("[MockSignaling] '{}' to {}", frame.kind(), connection_id);
        let outbound = Outbound {
            to: *connection_id,
            envelope: frame.envelope().clone(),
        };

        self.sent.lock().await.push((*connection_id, frame.clone()));
        let _ = self.tx.send(outbound);
        true
    }
}
