//! WebSocket signaling relay for P2P audio/video sessions

mod actor;
mod messages;
mod registry;
mod server;
mod types;

pub use actor::RelayHandle;
pub use messages::{ClientMessage, ServerMessage};
pub use server::{DEFAULT_RELAY_PORT, RelayServer};
pub use types::{ConnId, OutboundMessage, RelayError, RoomId};
