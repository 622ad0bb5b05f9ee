use async_trait::async_trait;
use pairline_core::{ConnectionId, Frame};

/// Outbound half of the transport as seen by the router.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    /// Queues `frame` for delivery to `connection_id`.
    ///
    /// Returns `false` when the connection is gone or cannot take the frame.
    /// Callers treat that exactly like a partner that no longer exists.
    async fn send(&self, connection_id: &ConnectionId, frame: &Frame) -> bool;
}
