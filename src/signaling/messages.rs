use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::types::RoomId;

/// Messages sent from peer to relay.
///
/// Wire shape is `{"type": ..., "data": {...}}`; each variant carries only
/// the fields its type requires. Session descriptions and ICE candidates
/// stay opaque `Value`s: the relay routes them, it never inspects them.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientMessage {
    /// Enter a room under a display name, creating the room on first use
    #[serde(rename = "join")]
    Join {
        #[serde(rename = "roomId")]
        room_id: RoomId,
        name: String,
    },

    /// Relay a session description offer to the other room members
    #[serde(rename = "offer")]
    Offer { offer: Value },

    /// Relay a session description answer to the other room members
    #[serde(rename = "answer")]
    Answer { answer: Value },

    /// Relay an ICE candidate to the other room members
    #[serde(rename = "ice-candidate")]
    IceCandidate { candidate: Value },

    /// Leave the current room
    #[serde(rename = "leave")]
    Leave,
}

/// Messages sent from relay to peer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerMessage {
    /// Another peer entered the room
    #[serde(rename = "participant-joined")]
    ParticipantJoined { name: String },

    /// Another peer left the room or disconnected
    #[serde(rename = "participant-left")]
    ParticipantLeft { name: String },

    #[serde(rename = "offer")]
    Offer { offer: Value },

    #[serde(rename = "answer")]
    Answer { answer: Value },

    #[serde(rename = "ice-candidate")]
    IceCandidate { candidate: Value },
}
