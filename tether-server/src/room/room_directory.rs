use crate::room::{Room, RoomSnapshot};
use std::collections::HashMap;
use tether_core::model::{PeerId, PeerRole, RoomId};
use tracing::info;

/// Room id -> members.
///
/// A peer belongs to at most one room. Joining another room (or the same room
/// under a different role) moves it: the old membership is dropped first.
#[derive(Debug, Default)]
pub struct RoomDirectory {
    rooms: HashMap<RoomId, Room>,
    membership: HashMap<PeerId, RoomId>,
}

impl RoomDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the room the peer was moved out of, if it was somewhere else.
    pub fn join(&mut self, room_id: &RoomId, peer_id: &PeerId, role: PeerRole) -> Option<RoomId> {
        let previous = self.leave_all(peer_id).into_iter().find(|r| r != room_id);

        let room = self.rooms.entry(room_id.clone()).or_default();
        match role {
            PeerRole::Host => {
                if let Some(displaced) = room.set_host(peer_id.clone()) {
                    info!("Host {} replaces {} in room {}", peer_id, displaced, room_id);
                    self.membership.remove(&displaced);
                }
            }
            PeerRole::Client => room.add_client(peer_id.clone()),
        }
        self.membership.insert(peer_id.clone(), room_id.clone());

        previous
    }

    /// No-op when the room or the peer is unknown.
    pub fn leave(&mut self, room_id: &RoomId, peer_id: &PeerId) {
        let Some(room) = self.rooms.get_mut(room_id) else {
            return;
        };
        if room.remove(peer_id) && self.membership.get(peer_id) == Some(room_id) {
            self.membership.remove(peer_id);
        }
        if room.is_empty() {
            self.rooms.remove(room_id);
        }
    }

    /// Removes `peer_id` from every room that lists it; returns those rooms.
    pub fn leave_all(&mut self, peer_id: &PeerId) -> Vec<RoomId> {
        let rooms: Vec<RoomId> = self
            .rooms
            .iter()
            .filter(|(_, room)| room.contains(peer_id))
            .map(|(id, _)| id.clone())
            .collect();

        for room_id in &rooms {
            self.leave(room_id, peer_id);
        }
        self.membership.remove(peer_id);

        rooms
    }

    pub fn snapshot(&self, room_id: &RoomId) -> RoomSnapshot {
        self.rooms
            .get(room_id)
            .map(|room| RoomSnapshot {
                host: room.host().cloned(),
                clients: room.clients().cloned().collect(),
            })
            .unwrap_or_default()
    }

    pub fn room_of(&self, peer_id: &PeerId) -> Option<&RoomId> {
        self.membership.get(peer_id)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
