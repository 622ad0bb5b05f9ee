use crate::error::RelayError;
use crate::matchmaking::pairing_store::StoreSnapshot;
use crate::matchmaking::router::SignalingRouter;
use crate::matchmaking::router_command::RouterCommand;
use pairline_core::{ConnectionId, Frame};
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info};

/// Owns the router and applies mailbox commands one at a time.
pub struct RouterActor {
    router: SignalingRouter,
    command_rx: mpsc::Receiver<RouterCommand>,
}

impl RouterActor {
    pub fn new(router: SignalingRouter, command_rx: mpsc::Receiver<RouterCommand>) -> Self {
        Self { router, command_rx }
    }

    pub async fn run(mut self) {
        info!("Router event loop started");

        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd).await;
        }

        info!("Command channel closed. Router event loop finished");
    }

    async fn handle_command(&mut self, cmd: RouterCommand) {
        match cmd {
            RouterCommand::Frame {
                connection_id,
                frame,
            } => {
                let kind = frame.kind();
                if let Err(e) = self.router.handle_frame(connection_id, frame).await {
                    error!("Failed to handle '{}' from {}: {}", kind, connection_id, e);
                }
            }

            RouterCommand::Disconnect {
                connection_id,
                done,
            } => {
                if let Err(e) = self.router.handle_disconnect(&connection_id).await {
                    error!("Failed to clean up {}: {}", connection_id, e);
                }
                let _ = done.send(());
            }

            RouterCommand::Snapshot { reply } => {
                let _ = reply.send(self.router.snapshot().await);
            }
        }
    }
}

/// Cloneable entry point into a running [`RouterActor`].
#[derive(Clone)]
pub struct RouterHandle {
    command_tx: mpsc::Sender<RouterCommand>,
}

impl RouterHandle {
    pub fn new(command_tx: mpsc::Sender<RouterCommand>) -> Self {
        Self { command_tx }
    }

    /// Starts an actor for `router` on the current tokio runtime.
    pub fn spawn(router: SignalingRouter, capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity);
        tokio::spawn(RouterActor::new(router, rx).run());

        Self::new(tx)
    }

    /// Hands a client frame to the router without waiting for it to be
    /// processed.
    pub async fn dispatch(
        &self,
        connection_id: ConnectionId,
        frame: impl Into<Frame>,
    ) -> Result<(), RelayError> {
        self.command_tx
            .send(RouterCommand::Frame {
                connection_id,
                frame: frame.into(),
            })
            .await
            .map_err(|_| RelayError::RouterClosed)
    }

    /// Resolves once the router has dropped every trace of `connection_id`.
    pub async fn disconnect(&self, connection_id: ConnectionId) -> Result<(), RelayError> {
        let (done, done_rx) = oneshot::channel();
        self.command_tx
            .send(RouterCommand::Disconnect {
                connection_id,
                done,
            })
            .await
            .map_err(|_| RelayError::RouterClosed)?;

        done_rx.await.map_err(|_| RelayError::RouterClosed)
    }

    pub async fn snapshot(&self) -> Result<StoreSnapshot, RelayError> {
        let (reply, reply_rx) = oneshot::channel();
        self.command_tx
            .send(RouterCommand::Snapshot { reply })
            .await
            .map_err(|_| RelayError::RouterClosed)?;

        reply_rx.await.map_err(|_| RelayError::RouterClosed)?
    }
}
