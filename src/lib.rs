//! Room-based signaling relay for peer-to-peer audio/video sessions.
//!
//! Peers connect over WebSocket, join a room by id, and exchange session
//! descriptions and ICE candidates with the other members. Media flows
//! peer-to-peer; the relay only carries negotiation metadata.

pub mod signaling;
