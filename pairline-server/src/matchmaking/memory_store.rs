use crate::error::StoreError;
use crate::matchmaking::pairing_store::{PairingStore, StoreResult, StoreSnapshot};
use async_trait::async_trait;
use pairline_core::ConnectionId;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::error;

/// In-process pool and pairing table.
///
/// The pool keeps arrival order in `queue` next to the `members` set, so
/// membership checks stay O(1) and partner selection is first come, first
/// served.
#[derive(Debug, Default)]
pub struct MemoryStore {
    members: HashSet<ConnectionId>,
    queue: VecDeque<ConnectionId>,
    pairs: HashMap<ConnectionId, ConnectionId>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn remove_waiting(&mut self, id: &ConnectionId) -> bool {
        if !self.members.remove(id) {
            return false;
        }
        self.queue.retain(|queued| queued != id);
        true
    }
}

#[async_trait]
impl PairingStore for MemoryStore {
    async fn is_waiting(&self, id: &ConnectionId) -> StoreResult<bool> {
        Ok(self.members.contains(id))
    }

    async fn enqueue(&mut self, id: ConnectionId) -> StoreResult<()> {
        if self.pairs.contains_key(&id) {
            return Err(StoreError::AlreadyPaired(id));
        }
        if self.members.insert(id) {
            self.queue.push_back(id);
        }
        Ok(())
    }

    async fn dequeue(&mut self, id: &ConnectionId) -> StoreResult<bool> {
        Ok(self.remove_waiting(id))
    }

    async fn pick_waiting(&self, exclude: &ConnectionId) -> StoreResult<Option<ConnectionId>> {
        Ok(self.queue.iter().find(|id| *id != exclude).copied())
    }

    async fn partner_of(&self, id: &ConnectionId) -> StoreResult<Option<ConnectionId>> {
        Ok(self.pairs.get(id).copied())
    }

    async fn pair(&mut self, a: ConnectionId, b: ConnectionId) -> StoreResult<()> {
        if a == b {
            return Err(StoreError::SelfPairing(a));
        }
        for id in [a, b] {
            if self.pairs.contains_key(&id) {
                return Err(StoreError::AlreadyPaired(id));
            }
        }

        self.remove_waiting(&a);
        self.remove_waiting(&b);
        self.pairs.insert(a, b);
        self.pairs.insert(b, a);
        Ok(())
    }

    async fn unpair(&mut self, id: &ConnectionId) -> StoreResult<Option<ConnectionId>> {
        let Some(partner) = self.pairs.remove(id) else {
            return Ok(None);
        };

        match self.pairs.get(&partner) {
            Some(back) if back == id => {
                self.pairs.remove(&partner);
                Ok(Some(partner))
            }
            other => {
                error!(
                    "Pairing table asymmetric: {} -> {}, but {} -> {:?}; dropped the stale entry",
                    id, partner, partner, other
                );
                debug_assert!(false, "asymmetric pairing table entry for {id}");
                Ok(None)
            }
        }
    }

    async fn snapshot(&self) -> StoreResult<StoreSnapshot> {
        Ok(StoreSnapshot {
            waiting: self.queue.iter().copied().collect(),
            table: self.pairs.clone(),
        })
    }
}
