use axum::extract::ws::Message;
use std::fmt;
use tether_core::model::SignalMessage;
use tokio::sync::mpsc;
use tracing::error;
use uuid::Uuid;

/// Identifies one accepted websocket, independent of the peer id it registers.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outbound side of a peer's rendezvous connection.
///
/// Frames pushed here are written to the socket in order by the connection's
/// writer task.
#[derive(Debug, Clone)]
pub struct PeerHandle {
    connection: ConnectionId,
    tx: mpsc::UnboundedSender<Message>,
}

impl PeerHandle {
    pub fn new(connection: ConnectionId, tx: mpsc::UnboundedSender<Message>) -> Self {
        Self { connection, tx }
    }

    pub fn connection(&self) -> ConnectionId {
        self.connection
    }

    /// False once the writer task has gone away.
    pub fn is_alive(&self) -> bool {
        !self.tx.is_closed()
    }

    pub fn send_text(&self, text: String) -> bool {
        self.tx.send(Message::Text(text.into())).is_ok()
    }

    pub fn send_signal(&self, msg: &SignalMessage) -> bool {
        match msg.to_text() {
            Ok(json) => self.send_text(json),
            Err(e) => {
                error!("Failed to serialize {} message: {}", msg.kind(), e);
                false
            }
        }
    }

    /// Asks the writer task to close the socket.
    pub fn close(&self) {
        let _ = self.tx.send(Message::Close(None));
    }
}
