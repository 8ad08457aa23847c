use std::collections::HashMap;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Utf8Bytes;

/// Relay errors
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("websocket handshake failed: {0}")]
    Handshake(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

const CONN_ID_LEN: usize = 13;
const HEX_CHARS: &[u8] = b"0123456789abcdef";

/// Connection ID: 13-byte fixed array ("conn_" + 8 hex)
///
/// Assigned at accept time and used as the membership map key; the
/// transport handle itself never identifies a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnId {
    bytes: [u8; CONN_ID_LEN],
    len: u8,
}

impl ConnId {
    pub fn generate() -> Self {
        let mut bytes = [0u8; CONN_ID_LEN];
        bytes[..5].copy_from_slice(b"conn_");

        let mut rng = rand::rng();
        let value: u32 = rng.random();

        for i in 0..8 {
            let nibble = ((value >> (28 - i * 4)) & 0xF) as usize;
            bytes[5 + i] = HEX_CHARS[nibble];
        }
        Self {
            bytes,
            len: CONN_ID_LEN as u8,
        }
    }

    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.bytes[..self.len as usize]).unwrap_or("")
    }
}

impl fmt::Display for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ConnId {
    fn from(s: &str) -> Self {
        let mut bytes = [0u8; CONN_ID_LEN];
        let src = s.as_bytes();
        let len = src.len().min(CONN_ID_LEN);
        bytes[..len].copy_from_slice(&src[..len]);
        Self {
            bytes,
            len: len as u8,
        }
    }
}

/// Room ID: caller-supplied opaque string key.
///
/// Minted by an external collaborator (e.g. a booking confirmation flow)
/// and handed to peers out-of-band. Never validated or truncated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for RoomId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RoomId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Wrapper for outbound WebSocket messages using tungstenite's Utf8Bytes.
#[derive(Debug, Clone)]
pub struct OutboundMessage(Utf8Bytes);

impl OutboundMessage {
    /// Create a new outbound message from any string type
    pub fn new(s: impl Into<Utf8Bytes>) -> Self {
        Self(s.into())
    }

    /// Get the inner Utf8Bytes for tungstenite Message::Text
    pub fn into_inner(self) -> Utf8Bytes {
        self.0
    }
}

impl From<String> for OutboundMessage {
    fn from(s: String) -> Self {
        Self(Utf8Bytes::from(s))
    }
}

#[derive(Debug)]
pub(crate) struct Participant {
    /// Display name recorded at join time, echoed in presence broadcasts.
    pub name: String,
    /// Channel for outbound messages to this peer.
    /// Uses OutboundMessage (Arc<str>) for O(1) broadcast cloning.
    pub tx: mpsc::UnboundedSender<OutboundMessage>,
}

#[derive(Debug)]
pub(crate) struct Room {
    pub participants: HashMap<ConnId, Participant>,
}
