use pairline_core::ConnectionId;
use thiserror::Error;

/// Failures reported by a [`PairingStore`](crate::PairingStore) backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("connection {0} cannot be paired with itself")]
    SelfPairing(ConnectionId),

    #[error("connection {0} already has a partner")]
    AlreadyPaired(ConnectionId),

    #[error("pairing backend failure: {0}")]
    Backend(String),
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("router is no longer running")]
    RouterClosed,

    #[error(transparent)]
    Store(#[from] StoreError),
}
