use crate::error::RelayError;
use crate::matchmaking::pairing_store::StoreSnapshot;
use pairline_core::{ConnectionId, Frame};
use tokio::sync::oneshot;

/// Commands delivered to the router actor by the transport layer.
#[derive(Debug)]
pub enum RouterCommand {
    /// A decoded frame from a client, original text included.
    Frame {
        connection_id: ConnectionId,
        frame: Frame,
    },

    /// The connection is closed. `done` fires once its pairing state is gone.
    Disconnect {
        connection_id: ConnectionId,
        done: oneshot::Sender<()>,
    },

    Snapshot {
        reply: oneshot::Sender<Result<StoreSnapshot, RelayError>>,
    },
}
