use tokio::sync::mpsc;

use super::messages::ServerMessage;
use super::registry::RoomRegistry;
use super::types::{ConnId, OutboundMessage, RelayError, RoomId};

/// Commands sent to the registry actor
pub(crate) enum RelayCommand {
    Join {
        conn_id: ConnId,
        room_id: RoomId,
        name: String,
        peer_tx: mpsc::UnboundedSender<OutboundMessage>,
    },
    Relay {
        conn_id: ConnId,
        message: ServerMessage,
    },
    Leave {
        conn_id: ConnId,
    },
}

/// Drains the command channel into the registry, one command at a time.
/// This is the only task that touches room state.
pub(crate) async fn registry_actor(mut registry: RoomRegistry, mut rx: mpsc::Receiver<RelayCommand>) {
    while let Some(cmd) = rx.recv().await {
        match cmd {
            RelayCommand::Join {
                conn_id,
                room_id,
                name,
                peer_tx,
            } => registry.join(conn_id, room_id, name, peer_tx),

            RelayCommand::Relay { conn_id, message } => registry.relay(conn_id, &message),

            RelayCommand::Leave { conn_id } => registry.leave(conn_id),
        }
    }
}

/// Handle to communicate with the registry actor
#[derive(Clone)]
pub struct RelayHandle {
    pub(crate) tx: mpsc::Sender<RelayCommand>,
}

impl RelayHandle {
    /// Enter a room under a display name
    pub async fn join(
        &self,
        conn_id: ConnId,
        room_id: RoomId,
        name: String,
        peer_tx: mpsc::UnboundedSender<OutboundMessage>,
    ) -> Result<(), RelayError> {
        self.tx
            .send(RelayCommand::Join {
                conn_id,
                room_id,
                name,
                peer_tx,
            })
            .await
            .map_err(|_| RelayError::Internal("relay actor stopped".to_string()))
    }

    /// Forward a negotiation message to the other members of the sender's room
    pub async fn relay(&self, conn_id: ConnId, message: ServerMessage) -> Result<(), RelayError> {
        self.tx
            .send(RelayCommand::Relay { conn_id, message })
            .await
            .map_err(|_| RelayError::Internal("relay actor stopped".to_string()))
    }

    /// Leave the current room, if any
    pub async fn leave(&self, conn_id: ConnId) {
        let _ = self.tx.send(RelayCommand::Leave { conn_id }).await;
    }
}
