use crate::config::ServerConfig;
use crate::registry::{ConnectionId, PeerHandle, PeerRegistry};
use crate::relay::{RelayOutcome, RelayRouter};
use crate::room::{RoomDirectory, RoomSnapshot};
use std::sync::Arc;
use tether_core::ProtocolError;
use tether_core::model::{InboundFrame, PeerId, PeerRole, RelayEnvelope, RoomId, SignalMessage};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// What one websocket has registered as. Owned by that connection's task.
#[derive(Debug)]
pub struct ConnectionSession {
    handle: PeerHandle,
    registered: Option<(PeerId, RoomId)>,
}

impl ConnectionSession {
    pub fn new(handle: PeerHandle) -> Self {
        Self {
            handle,
            registered: None,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.handle.connection()
    }

    pub fn peer_id(&self) -> Option<&PeerId> {
        self.registered.as_ref().map(|(peer_id, _)| peer_id)
    }

    pub fn room_id(&self) -> Option<&RoomId> {
        self.registered.as_ref().map(|(_, room_id)| room_id)
    }
}

struct RendezvousInner {
    registry: Arc<PeerRegistry>,
    /// Also serializes every registry mutation, so register/join/notify and
    /// disconnect cleanup never interleave.
    directory: Mutex<RoomDirectory>,
    relay: RelayRouter,
    config: ServerConfig,
}

/// Ties the registry, the room directory and the relay router together.
/// One instance per process; clones share state.
#[derive(Clone)]
pub struct RendezvousService {
    inner: Arc<RendezvousInner>,
}

impl RendezvousService {
    pub fn new(config: ServerConfig) -> Self {
        let registry = Arc::new(PeerRegistry::new());
        Self {
            inner: Arc::new(RendezvousInner {
                relay: RelayRouter::new(registry.clone()),
                registry,
                directory: Mutex::new(RoomDirectory::new()),
                config,
            }),
        }
    }

    pub fn registry(&self) -> &PeerRegistry {
        &self.inner.registry
    }

    pub async fn snapshot(&self, room_id: &RoomId) -> RoomSnapshot {
        self.inner.directory.lock().await.snapshot(room_id)
    }

    pub async fn room_count(&self) -> usize {
        self.inner.directory.lock().await.room_count()
    }

    /// Entry point for every inbound text frame of a connection.
    pub async fn handle_frame(&self, conn: &mut ConnectionSession, text: &str) {
        let msg = match InboundFrame::parse(text) {
            Ok(InboundFrame::Relay(envelope)) => {
                self.relay(&envelope, text);
                return;
            }
            Ok(InboundFrame::Message(msg)) => msg,
            Err(ProtocolError::UnknownType(kind)) => {
                warn!("Unknown message type '{}' from connection {}", kind, conn.id());
                return;
            }
            Err(e) => {
                warn!("Dropping invalid frame from connection {}: {}", conn.id(), e);
                return;
            }
        };

        match msg {
            SignalMessage::Register {
                peer_type,
                peer_id,
                room_id,
            } => {
                self.register(conn, peer_type, peer_id, room_id).await;
            }
            other => {
                warn!(
                    "Ignoring server-only message '{}' from connection {}",
                    other.kind(),
                    conn.id()
                );
            }
        }
    }

    /// Registers the connection, joins the room, confirms and notifies, all
    /// under the directory lock. Returns the resolved peer id.
    pub async fn register(
        &self,
        conn: &mut ConnectionSession,
        role: PeerRole,
        peer_id: Option<PeerId>,
        room_id: RoomId,
    ) -> PeerId {
        let peer_id = peer_id.unwrap_or_else(|| PeerId::generate(role));
        let mut directory = self.inner.directory.lock().await;

        // Same socket re-registering under another name: drop the old name.
        if let Some((old_id, _)) = conn.registered.take() {
            if old_id != peer_id
                && self.inner.registry.unregister_connection(&old_id, conn.id())
            {
                directory.leave_all(&old_id);
            }
        }

        if let Some(replaced) = self
            .inner
            .registry
            .register(peer_id.clone(), role, conn.handle.clone())
        {
            if replaced.connection() != conn.id() {
                info!("Peer {} re-registered on a new connection", peer_id);
            }
        }

        if let Some(previous) = directory.join(&room_id, &peer_id, role) {
            info!("Peer {} moved from room {} to {}", peer_id, previous, room_id);
        }

        info!("{} {} registered in room {}", role, peer_id, room_id);
        conn.registered = Some((peer_id.clone(), room_id.clone()));

        conn.handle.send_signal(&SignalMessage::Registered {
            peer_id: peer_id.clone(),
            room_id: room_id.clone(),
        });

        self.notify(&directory, &room_id);
        peer_id
    }

    /// Tells clients about the host and the host about the clients, so
    /// whichever side joined first still discovers the other.
    fn notify(&self, directory: &RoomDirectory, room_id: &RoomId) {
        let RoomSnapshot { host, clients } = directory.snapshot(room_id);
        let Some(host_id) = host else {
            debug!("Room {} has no host yet ({} clients)", room_id, clients.len());
            return;
        };

        info!(
            "Notifying peers in room {}: host={}, clients={:?}",
            room_id, host_id, clients
        );

        for client_id in &clients {
            self.send_to(
                client_id,
                &SignalMessage::HostAvailable {
                    host_id: host_id.clone(),
                    room_id: room_id.clone(),
                },
            );
        }

        if !clients.is_empty() {
            self.send_to(
                &host_id,
                &SignalMessage::ClientsAvailable {
                    client_ids: clients,
                    room_id: room_id.clone(),
                },
            );
        }
    }

    /// Forwards a relay frame as the exact text it arrived in.
    pub fn relay(&self, envelope: &RelayEnvelope, frame: &str) -> RelayOutcome {
        let sender = envelope.sender.as_ref().map(PeerId::as_str).unwrap_or("?");
        let outcome = self.inner.relay.relay(&envelope.target, frame);
        match outcome {
            RelayOutcome::Delivered => {
                info!("Relayed {} from {} to {}", envelope.kind, sender, envelope.target);
            }
            RelayOutcome::TargetNotFound => {
                warn!(
                    "Target {} not found for {} from {}",
                    envelope.target, envelope.kind, sender
                );
            }
        }
        outcome
    }

    /// Releases everything the closing connection registered.
    pub async fn disconnect(&self, conn: &ConnectionSession) {
        let Some((peer_id, _)) = conn.registered.as_ref() else {
            debug!("Unregistered connection {} closed", conn.id());
            return;
        };

        let mut directory = self.inner.directory.lock().await;
        let role = self.inner.registry.role_of(peer_id);

        if !self.inner.registry.unregister_connection(peer_id, conn.id()) {
            info!(
                "Peer {} already re-registered elsewhere, keeping its entries",
                peer_id
            );
            return;
        }

        let left = directory.leave_all(peer_id);
        info!("Peer {} disconnected, left {} room(s)", peer_id, left.len());

        if !self.inner.config.notify_departures {
            return;
        }
        for room_id in left {
            let remaining = directory.snapshot(&room_id);
            match role {
                Some(PeerRole::Host) => {
                    for client_id in &remaining.clients {
                        self.send_to(
                            client_id,
                            &SignalMessage::HostDisconnected {
                                peer_id: peer_id.clone(),
                                room_id: room_id.clone(),
                            },
                        );
                    }
                }
                Some(PeerRole::Client) => {
                    if let Some(host_id) = &remaining.host {
                        self.send_to(
                            host_id,
                            &SignalMessage::ClientDisconnected {
                                peer_id: peer_id.clone(),
                                room_id: room_id.clone(),
                            },
                        );
                    }
                }
                None => {}
            }
        }
    }

    fn send_to(&self, peer_id: &PeerId, msg: &SignalMessage) {
        match self.inner.registry.lookup(peer_id) {
            Some(handle) => {
                if !handle.send_signal(msg) {
                    warn!("Failed to queue {} for {}", msg.kind(), peer_id);
                }
            }
            None => warn!("Attempted to send {} to unregistered peer {}", msg.kind(), peer_id),
        }
    }
}
