use crate::error::RelayError;
use crate::matchmaking::pairing_store::{PairingStore, StoreSnapshot};
use crate::signaling::SignalingOutput;
use pairline_core::{ConnectionId, Envelope, Frame};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Matchmaking state machine.
///
/// Every connection is in exactly one of three states: unknown to the
/// store, waiting in the pool, or paired. The router is the only code that
/// moves connections between them. It is not internally synchronized; wrap
/// it in a [`RouterActor`](crate::RouterActor) to share it between
/// connections.
pub struct SignalingRouter {
    store: Box<dyn PairingStore>,
    signaling: Arc<dyn SignalingOutput>,
    requeue_partners: bool,
}

impl SignalingRouter {
    pub fn new(store: Box<dyn PairingStore>, signaling: Arc<dyn SignalingOutput>) -> Self {
        Self {
            store,
            signaling,
            requeue_partners: false,
        }
    }

    /// When enabled, the side left behind by a `leave` or a disconnect goes
    /// straight back into matchmaking instead of going idle.
    pub fn with_partner_requeue(mut self, enabled: bool) -> Self {
        self.requeue_partners = enabled;
        self
    }

    /// Applies one client frame. Negotiation frames reach the partner with
    /// their original text untouched.
    pub async fn handle_frame(
        &mut self,
        connection_id: ConnectionId,
        frame: Frame,
    ) -> Result<(), RelayError> {
        if frame.envelope().is_negotiation() {
            return self.forward(connection_id, frame).await;
        }

        match frame.envelope() {
            Envelope::Ready => self.on_ready(connection_id).await,
            Envelope::Leave => self.release(&connection_id).await,
            relay_only => {
                warn!(
                    "Dropping relay-only '{}' sent by {}",
                    relay_only.kind(),
                    connection_id
                );
                Ok(())
            }
        }
    }

    /// Same end state as a `leave` immediately before the close.
    pub async fn handle_disconnect(
        &mut self,
        connection_id: &ConnectionId,
    ) -> Result<(), RelayError> {
        self.release(connection_id).await
    }

    pub async fn snapshot(&self) -> Result<StoreSnapshot, RelayError> {
        Ok(self.store.snapshot().await?)
    }

    async fn on_ready(&mut self, connection_id: ConnectionId) -> Result<(), RelayError> {
        // A ready from a paired client asks for a new partner; the old
        // partner is told to leave and is not requeued.
        self.end_pairing(&connection_id).await?;
        self.store.dequeue(&connection_id).await?;
        self.pair_or_wait(connection_id).await
    }

    async fn pair_or_wait(&mut self, connection_id: ConnectionId) -> Result<(), RelayError> {
        let Some(partner) = self.store.pick_waiting(&connection_id).await? else {
            self.store.enqueue(connection_id).await?;
            info!("{} is waiting for a partner", connection_id);
            return Ok(());
        };

        self.store.pair(connection_id, partner).await?;
        info!("Paired {} with {}", connection_id, partner);

        // The table entries exist before the initiator can possibly answer.
        let start_offer = Frame::from(Envelope::StartOffer);
        if !self.signaling.send(&connection_id, &start_offer).await {
            debug!("Initiator {} went away before start_offer", connection_id);
        }
        Ok(())
    }

    async fn forward(&mut self, from: ConnectionId, frame: Frame) -> Result<(), RelayError> {
        let Some(partner) = self.store.partner_of(&from).await? else {
            debug!("Dropping '{}' from {}: no partner", frame.kind(), from);
            return Ok(());
        };

        if self.signaling.send(&partner, &frame).await {
            debug!("Forwarded '{}' {} -> {}", frame.kind(), from, partner);
        } else {
            debug!("Dropping '{}' from {}: {} is gone", frame.kind(), from, partner);
        }
        Ok(())
    }

    async fn release(&mut self, connection_id: &ConnectionId) -> Result<(), RelayError> {
        let partner = self.end_pairing(connection_id).await?;
        self.store.dequeue(connection_id).await?;

        if let Some(partner) = partner.filter(|_| self.requeue_partners) {
            self.pair_or_wait(partner).await?;
        }
        Ok(())
    }

    /// Removes the pairing `connection_id` belongs to and sends `leave` to
    /// the former partner.
    async fn end_pairing(
        &mut self,
        connection_id: &ConnectionId,
    ) -> Result<Option<ConnectionId>, RelayError> {
        let Some(partner) = self.store.unpair(connection_id).await? else {
            return Ok(None);
        };

        info!("Pairing {} <-> {} ended", connection_id, partner);
        if !self.signaling.send(&partner, &Frame::from(Envelope::Leave)).await {
            debug!("Partner {} already gone, leave not delivered", partner);
        }
        Ok(Some(partner))
    }
}
