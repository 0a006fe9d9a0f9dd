use crate::registry::PeerRegistry;
use std::sync::Arc;
use tether_core::model::PeerId;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    Delivered,
    TargetNotFound,
}

/// Forwards addressed frames to the target's connection, unchanged.
///
/// Misses are reported, never retried: the target most likely disconnected and
/// the sender has to wait for a fresh availability notice.
#[derive(Debug, Clone)]
pub struct RelayRouter {
    registry: Arc<PeerRegistry>,
}

impl RelayRouter {
    pub fn new(registry: Arc<PeerRegistry>) -> Self {
        Self { registry }
    }

    pub fn relay(&self, target: &PeerId, frame: &str) -> RelayOutcome {
        let Some(handle) = self.registry.lookup(target) else {
            return RelayOutcome::TargetNotFound;
        };

        if handle.send_text(frame.to_owned()) {
            debug!("Relayed {} bytes to {}", frame.len(), target);
            RelayOutcome::Delivered
        } else {
            warn!("Connection of {} is closing, frame dropped", target);
            RelayOutcome::TargetNotFound
        }
    }
}
