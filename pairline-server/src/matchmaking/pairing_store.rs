use crate::error::StoreError;
use async_trait::async_trait;
use pairline_core::ConnectionId;
use std::collections::{HashMap, HashSet};

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage contract for the matchmaking pool and the pairing table.
///
/// The router is the only caller and it serializes every call, so
/// implementations do not need to guard against interleaving of their own
/// operations. A backend shared between several relay processes has to
/// provide that guarantee itself.
#[async_trait]
pub trait PairingStore: Send + Sync + 'static {
    /// Pool membership test.
    async fn is_waiting(&self, id: &ConnectionId) -> StoreResult<bool>;

    /// Puts `id` into the pool. Already-waiting ids are left in place.
    async fn enqueue(&mut self, id: ConnectionId) -> StoreResult<()>;

    /// Removes `id` from the pool and reports whether it was there.
    async fn dequeue(&mut self, id: &ConnectionId) -> StoreResult<bool>;

    /// First waiting id in iteration order that is not `exclude`.
    async fn pick_waiting(&self, exclude: &ConnectionId) -> StoreResult<Option<ConnectionId>>;

    async fn partner_of(&self, id: &ConnectionId) -> StoreResult<Option<ConnectionId>>;

    /// Records `a <-> b` and takes both out of the pool.
    async fn pair(&mut self, a: ConnectionId, b: ConnectionId) -> StoreResult<()>;

    /// Drops both directions of the pairing `id` belongs to and returns the
    /// former partner.
    async fn unpair(&mut self, id: &ConnectionId) -> StoreResult<Option<ConnectionId>>;

    async fn snapshot(&self) -> StoreResult<StoreSnapshot>;
}

/// Point-in-time copy of the pool and the pairing table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSnapshot {
    pub waiting: Vec<ConnectionId>,
    pub table: HashMap<ConnectionId, ConnectionId>,
}

impl StoreSnapshot {
    /// Number of active pairings (half the table entries).
    pub fn pair_count(&self) -> usize {
        self.table.len() / 2
    }

    pub fn partner_of(&self, id: &ConnectionId) -> Option<ConnectionId> {
        self.table.get(id).copied()
    }

    pub fn is_waiting(&self, id: &ConnectionId) -> bool {
        self.waiting.contains(id)
    }

    /// Pool and table keys are disjoint, the table is symmetric and nobody
    /// is paired with themselves.
    pub fn is_consistent(&self) -> bool {
        let waiting: HashSet<_> = self.waiting.iter().collect();
        if waiting.len() != self.waiting.len() {
            return false;
        }

        self.table.iter().all(|(id, partner)| {
            id != partner
                && !waiting.contains(id)
                && self.table.get(partner) == Some(id)
        })
    }
}
