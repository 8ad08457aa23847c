use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{Bytes, Message};
use tracing::{debug, error, info, warn};

use super::actor::{RelayCommand, RelayHandle, registry_actor};
use super::messages::{ClientMessage, ServerMessage};
use super::registry::RoomRegistry;
use super::types::{ConnId, OutboundMessage, RelayError};

pub const DEFAULT_RELAY_PORT: u16 = 8765;
const DEFAULT_PING_INTERVAL: Duration = Duration::from_secs(30);

/// WebSocket relay endpoint.
///
/// Each instance spawns its own registry actor, so two servers in one
/// process (or one test run) never share room state.
pub struct RelayServer {
    listener: TcpListener,
    handle: RelayHandle,
    ping_interval: Duration,
}

impl RelayServer {
    /// Bind the relay to an address and spawn its registry actor
    pub async fn bind(addr: &str) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!("Relay listening on {}", listener.local_addr()?);

        let (tx, rx) = mpsc::channel::<RelayCommand>(1024);
        tokio::spawn(registry_actor(RoomRegistry::new(), rx));

        Ok(Self {
            listener,
            handle: RelayHandle { tx },
            ping_interval: DEFAULT_PING_INTERVAL,
        })
    }

    /// Override the liveness probe interval (default 30s)
    pub fn with_ping_interval(mut self, interval: Duration) -> Self {
        self.ping_interval = interval;
        self
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub async fn run(self) -> std::io::Result<()> {
        loop {
            let (stream, addr) = self.listener.accept().await?;
            let handle = self.handle.clone();
            let ping_interval = self.ping_interval;

            tokio::spawn(async move {
                if let Err(e) = handle_connection(stream, addr, handle, ping_interval).await {
                    error!("Connection error from {}: {}", addr, e);
                }
            });
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    handle: RelayHandle,
    ping_interval: Duration,
) -> Result<(), RelayError> {
    let ws_stream = tokio_tungstenite::accept_async(stream).await?;
    let (mut ws_tx, mut ws_rx) = ws_stream.split();

    let conn_id = ConnId::generate();
    info!("WebSocket connection from {} as {}", addr, conn_id);

    let (tx, mut rx) = mpsc::unbounded_channel::<OutboundMessage>();
    let (ctrl_tx, mut ctrl_rx) = mpsc::unbounded_channel::<Message>();

    let mut ping_interval = tokio::time::interval(ping_interval);
    // the immediate first tick; a fresh connection counts as alive
    ping_interval.tick().await;
    let mut awaiting_pong = false;

    let send_task = tokio::spawn(async move {
        loop {
            tokio::select! {
                Some(msg) = rx.recv() => {
                    let ws_msg = Message::Text(msg.into_inner());
                    if ws_tx.send(ws_msg).await.is_err() {
                        break;
                    }
                }
                Some(ctrl_msg) = ctrl_rx.recv() => {
                    if ws_tx.send(ctrl_msg).await.is_err() {
                        break;
                    }
                }
                else => break,
            }
        }
    });

    loop {
        tokio::select! {
            _ = ping_interval.tick() => {
                // two strikes: a probe left unanswered for a full
                // interval means the peer is gone
                if awaiting_pong {
                    warn!("No Pong from {} since last probe, disconnecting", addr);
                    break;
                }
                if ctrl_tx.send(Message::Ping(Bytes::new())).is_err() {
                    break;
                }
                awaiting_pong = true;
                debug!("Ping sent to {}", addr);
            }

            msg = ws_rx.next() => {
                let msg = match msg {
                    Some(Ok(m)) => m,
                    Some(Err(e)) => {
                        warn!("WebSocket error from {}: {}", addr, e);
                        break;
                    }
                    None => break,
                };

                match msg {
                    Message::Text(text) => {
                        if let Err(e) = handle_text_message(&text, conn_id, &tx, &handle).await {
                            warn!("Message handling error: {}", e);
                        }
                    }
                    Message::Pong(_) => {
                        awaiting_pong = false;
                        debug!("Pong received from {}", addr);
                    }
                    Message::Close(_) => {
                        info!("Close received from {}", addr);
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    // transport close, error, and liveness reap all end up here; the
    // registry treats it as a leave and is unaffected when the
    // connection never joined a room
    handle.leave(conn_id).await;

    send_task.abort();
    info!("WebSocket disconnected: {} ({})", addr, conn_id);

    Ok(())
}

async fn handle_text_message(
    text: &str,
    conn_id: ConnId,
    tx: &mpsc::UnboundedSender<OutboundMessage>,
    handle: &RelayHandle,
) -> Result<(), RelayError> {
    let client_msg: ClientMessage = match serde_json::from_str(text) {
        Ok(m) => m,
        Err(e) => {
            // best-effort relay: malformed and unrecognized messages are
            // dropped without a reply, and the connection stays open
            warn!("Dropping message from {}: {}", conn_id, e);
            return Ok(());
        }
    };

    match client_msg {
        ClientMessage::Join { room_id, name } => {
            handle.join(conn_id, room_id, name, tx.clone()).await
        }

        ClientMessage::Offer { offer } => {
            handle.relay(conn_id, ServerMessage::Offer { offer }).await
        }

        ClientMessage::Answer { answer } => {
            handle.relay(conn_id, ServerMessage::Answer { answer }).await
        }

        ClientMessage::IceCandidate { candidate } => {
            handle
                .relay(conn_id, ServerMessage::IceCandidate { candidate })
                .await
        }

        ClientMessage::Leave => {
            handle.leave(conn_id).await;
            Ok(())
        }
    }
}
