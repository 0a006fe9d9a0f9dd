use tether_core::model::PeerId;

/// Point-in-time copy of a room. Clients are sorted by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomSnapshot {
    pub host: Option<PeerId>,
    pub clients: Vec<PeerId>,
}

impl RoomSnapshot {
    pub fn contains(&self, peer_id: &PeerId) -> bool {
        self.host.as_ref() == Some(peer_id) || self.clients.contains(peer_id)
    }
}
