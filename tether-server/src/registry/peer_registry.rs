use crate::registry::{ConnectionId, PeerHandle};
use dashmap::DashMap;
use tether_core::model::{PeerId, PeerRole};

#[derive(Debug, Clone)]
struct PeerEntry {
    role: PeerRole,
    handle: PeerHandle,
}

/// Peer id -> live connection handle.
///
/// Safe for concurrent lookups from every connection task. Mutations that must
/// stay consistent with the room directory are serialized by the caller.
#[derive(Debug, Default)]
pub struct PeerRegistry {
    peers: DashMap<PeerId, PeerEntry>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces `peer_id`. A replaced handle is returned untouched;
    /// closing it is up to the caller.
    pub fn register(&self, peer_id: PeerId, role: PeerRole, handle: PeerHandle) -> Option<PeerHandle> {
        self.peers
            .insert(peer_id, PeerEntry { role, handle })
            .map(|old| old.handle)
    }

    pub fn lookup(&self, peer_id: &PeerId) -> Option<PeerHandle> {
        self.peers.get(peer_id).map(|entry| entry.handle.clone())
    }

    pub fn role_of(&self, peer_id: &PeerId) -> Option<PeerRole> {
        self.peers.get(peer_id).map(|entry| entry.role)
    }

    /// Idempotent.
    pub fn unregister(&self, peer_id: &PeerId) -> Option<PeerHandle> {
        self.peers.remove(peer_id).map(|(_, entry)| entry.handle)
    }

    /// Removes `peer_id` only while it is still bound to `connection`.
    pub fn unregister_connection(&self, peer_id: &PeerId, connection: ConnectionId) -> bool {
        self.peers
            .remove_if(peer_id, |_, entry| entry.handle.connection() == connection)
            .is_some()
    }

    pub fn contains(&self, peer_id: &PeerId) -> bool {
        self.peers.contains_key(peer_id)
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}
