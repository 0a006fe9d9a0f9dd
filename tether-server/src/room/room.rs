use std::collections::BTreeSet;
use tether_core::model::PeerId;

/// At most one host and any number of clients. Holds ids only; the registry
/// owns the connections.
#[derive(Debug, Default, Clone)]
pub struct Room {
    host: Option<PeerId>,
    clients: BTreeSet<PeerId>,
}

impl Room {
    pub fn host(&self) -> Option<&PeerId> {
        self.host.as_ref()
    }

    pub fn clients(&self) -> impl Iterator<Item = &PeerId> {
        self.clients.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.host.is_none() && self.clients.is_empty()
    }

    pub fn contains(&self, peer_id: &PeerId) -> bool {
        self.host.as_ref() == Some(peer_id) || self.clients.contains(peer_id)
    }

    /// Returns the host that was displaced, if any.
    pub(crate) fn set_host(&mut self, peer_id: PeerId) -> Option<PeerId> {
        self.host.replace(peer_id)
    }

    pub(crate) fn add_client(&mut self, peer_id: PeerId) {
        self.clients.insert(peer_id);
    }

    /// Clears `peer_id` from whichever position it holds.
    pub(crate) fn remove(&mut self, peer_id: &PeerId) -> bool {
        if self.host.as_ref() == Some(peer_id) {
            self.host = None;
            return true;
        }
        self.clients.remove(peer_id)
    }
}
