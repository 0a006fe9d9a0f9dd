use crate::error::PeerError;
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tether_core::ProtocolError;
use tether_core::model::{PeerId, PeerRole, RoomId, SignalMessage};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

/// A peer's connection to the rendezvous server.
///
/// Outbound messages go through an unbounded channel to a writer task; a
/// reader task parses inbound frames. `recv` returns `None` once the server
/// side is gone.
pub struct RendezvousLink {
    outbound: mpsc::UnboundedSender<SignalMessage>,
    inbound: mpsc::UnboundedReceiver<SignalMessage>,
    tasks: Vec<JoinHandle<()>>,
}

impl RendezvousLink {
    pub async fn connect(url: &str) -> Result<Self, PeerError> {
        let (ws, _response) = connect_async(url).await.map_err(|source| PeerError::Connect {
            url: url.to_owned(),
            source,
        })?;
        info!("Connected to rendezvous server at {}", url);

        let (mut sink, mut stream) = ws.split();
        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<SignalMessage>();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();

        let send_task = tokio::spawn(async move {
            while let Some(msg) = outbound_rx.recv().await {
                let text = match msg.to_text() {
                    Ok(text) => text,
                    Err(e) => {
                        error!("Failed to serialize {}: {}", msg.kind(), e);
                        continue;
                    }
                };
                if sink.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
            let _ = sink.close().await;
        });

        let recv_task = tokio::spawn(async move {
            while let Some(frame) = stream.next().await {
                let text = match frame {
                    Ok(Message::Text(text)) => text,
                    Ok(Message::Close(_)) => break,
                    Ok(_) => continue,
                    Err(e) => {
                        warn!("Rendezvous connection error: {}", e);
                        break;
                    }
                };
                match SignalMessage::parse(&text) {
                    Ok(msg) => {
                        if inbound_tx.send(msg).is_err() {
                            break;
                        }
                    }
                    Err(ProtocolError::UnknownType(kind)) => {
                        warn!("Unknown message type from rendezvous server: {}", kind)
                    }
                    Err(e) => warn!("Invalid frame from rendezvous server: {}", e),
                }
            }
            info!("Rendezvous connection closed");
        });

        Ok(Self {
            outbound: outbound_tx,
            inbound: inbound_rx,
            tasks: vec![send_task, recv_task],
        })
    }

    /// Connects, registers and waits for `registered`. Returns the link and
    /// the peer id the server settled on.
    pub async fn connect_and_register(
        url: &str,
        role: PeerRole,
        peer_id: Option<PeerId>,
        room_id: RoomId,
        register_timeout: Duration,
    ) -> Result<(Self, PeerId), PeerError> {
        let mut link = Self::connect(url).await?;
        let peer_id = link.register(role, peer_id, room_id, register_timeout).await?;
        Ok((link, peer_id))
    }

    /// In-process link: what the peer sends shows up on `outbound`, and
    /// whatever is pushed into `inbound`'s sender is what the peer receives.
    pub fn from_channels(
        outbound: mpsc::UnboundedSender<SignalMessage>,
        inbound: mpsc::UnboundedReceiver<SignalMessage>,
    ) -> Self {
        Self {
            outbound,
            inbound,
            tasks: Vec::new(),
        }
    }

    pub async fn register(
        &mut self,
        role: PeerRole,
        peer_id: Option<PeerId>,
        room_id: RoomId,
        register_timeout: Duration,
    ) -> Result<PeerId, PeerError> {
        let requested = peer_id.clone();
        if !self.send(SignalMessage::Register {
            peer_type: role,
            peer_id,
            room_id: room_id.clone(),
        }) {
            return Err(PeerError::RendezvousLost);
        }

        let wait = async {
            while let Some(msg) = self.recv().await {
                match msg {
                    SignalMessage::Registered { peer_id, room_id } => {
                        return Ok((peer_id, room_id));
                    }
                    other => debug!("Ignoring {} before registration", other.kind()),
                }
            }
            Err(PeerError::RendezvousLost)
        };

        let (peer_id, confirmed_room) = timeout(register_timeout, wait)
            .await
            .map_err(|_| PeerError::Registration("timed out waiting for confirmation".into()))??;

        if let Some(requested) = requested.filter(|requested| *requested != peer_id) {
            warn!("Requested id {} but server assigned {}", requested, peer_id);
        }
        if confirmed_room != room_id {
            return Err(PeerError::Registration(format!(
                "registered in room {} instead of {}",
                confirmed_room, room_id
            )));
        }

        info!("Registered as {} {} in room {}", role, peer_id, room_id);
        Ok(peer_id)
    }

    /// False once the link is closed.
    pub fn send(&self, msg: SignalMessage) -> bool {
        self.outbound.send(msg).is_ok()
    }

    pub async fn recv(&mut self) -> Option<SignalMessage> {
        self.inbound.recv().await
    }

    pub fn close(&mut self) {
        self.inbound.close();
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

impl Drop for RendezvousLink {
    fn drop(&mut self) {
        self.close();
    }
}
