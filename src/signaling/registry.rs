use std::collections::HashMap;

use tokio::sync::mpsc;
use tracing::{debug, info};

use super::messages::ServerMessage;
use super::types::{ConnId, OutboundMessage, Participant, Room, RoomId};

/// In-memory room state for one relay instance.
///
/// Owned exclusively by the relay's registry actor, which applies one
/// command at a time; every broadcast therefore observes a consistent
/// membership. A room is present in the map iff it has at least one member.
pub(crate) struct RoomRegistry {
    rooms: HashMap<RoomId, Room>,
    memberships: HashMap<ConnId, RoomId>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: HashMap::new(),
            memberships: HashMap::new(),
        }
    }

    /// Add a connection to a room, creating the room on first join, and
    /// announce the new member to everyone already there.
    ///
    /// A repeated join to the same room overwrites the stored name without
    /// duplicating membership. A connection is a member of at most one
    /// room, so joining a different room leaves the old one first.
    ///
    /// Existing members are not replayed to the joiner; peers discover
    /// each other through the offer/answer exchange they initiate.
    pub fn join(
        &mut self,
        conn_id: ConnId,
        room_id: RoomId,
        name: String,
        tx: mpsc::UnboundedSender<OutboundMessage>,
    ) {
        if let Some(current) = self.memberships.get(&conn_id) {
            if *current != room_id {
                self.leave(conn_id);
            }
        }

        let room = self.rooms.entry(room_id.clone()).or_insert_with(|| {
            info!("Room {} created", room_id);
            Room {
                participants: HashMap::new(),
            }
        });
        room.participants.insert(
            conn_id,
            Participant {
                name: name.clone(),
                tx,
            },
        );
        self.memberships.insert(conn_id, room_id.clone());

        info!("Connection {} joined room {} as {}", conn_id, room_id, name);
        self.broadcast(&room_id, conn_id, &ServerMessage::ParticipantJoined { name });
    }

    /// Relay a negotiation message to every other member of the sender's
    /// room. A sender outside any room is dropped.
    pub fn relay(&mut self, sender: ConnId, message: &ServerMessage) {
        let Some(room_id) = self.memberships.get(&sender).cloned() else {
            debug!("Dropping relay from {}: not in a room", sender);
            return;
        };
        self.broadcast(&room_id, sender, message);
    }

    /// Remove a connection from its room, announce the departure to the
    /// remaining members, and delete the room once empty.
    ///
    /// No-op for a connection that never joined. Used for explicit leave,
    /// transport close, and liveness reaping alike.
    pub fn leave(&mut self, conn_id: ConnId) {
        let Some(room_id) = self.memberships.remove(&conn_id) else {
            return;
        };
        let Some(room) = self.rooms.get_mut(&room_id) else {
            return;
        };

        let name = room.participants.remove(&conn_id).map(|p| p.name);

        if room.participants.is_empty() {
            self.rooms.remove(&room_id);
            info!("Room {} removed (empty)", room_id);
        } else if let Some(name) = name {
            self.broadcast(&room_id, conn_id, &ServerMessage::ParticipantLeft { name });
        }
        info!("Connection {} left room {}", conn_id, room_id);
    }

    /// Fan a message out to every member of the room except `sender`.
    ///
    /// The recipient list is snapshotted before any send; a peer whose
    /// channel has already closed is skipped without affecting the rest.
    fn broadcast(&self, room_id: &RoomId, sender: ConnId, message: &ServerMessage) {
        let Some(room) = self.rooms.get(room_id) else {
            return;
        };

        let json = serde_json::to_string(message)
            .expect("ServerMessage serialization should never fail");
        let out = OutboundMessage::from(json);

        let recipients: Vec<_> = room
            .participants
            .iter()
            .filter(|(id, _)| **id != sender)
            .map(|(id, p)| (*id, p.tx.clone()))
            .collect();

        for (id, tx) in recipients {
            if tx.send(out.clone()).is_err() {
                debug!("Skipping delivery to {}: channel closed", id);
            }
        }
    }
}
