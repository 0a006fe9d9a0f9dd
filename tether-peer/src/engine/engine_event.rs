use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tether_core::model::IceCandidate;

static NEXT_ENGINE_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies one engine connection for the lifetime of the process.
///
/// Sessions replace their connection on renegotiation; events still in flight
/// from the discarded one carry its old id and are ignored.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub struct EngineId(u64);

impl EngineId {
    pub fn next() -> Self {
        Self(NEXT_ENGINE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for EngineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "engine#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TransportState {
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

impl TransportState {
    /// The direct connection is gone and will not come back on its own.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TransportState::Disconnected | TransportState::Failed | TransportState::Closed
        )
    }
}

impl fmt::Display for TransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransportState::New => "new",
            TransportState::Connecting => "connecting",
            TransportState::Connected => "connected",
            TransportState::Disconnected => "disconnected",
            TransportState::Failed => "failed",
            TransportState::Closed => "closed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEventKind {
    StateChanged(TransportState),
    CandidateDiscovered(IceCandidate),
    /// First inbound media packet on this connection.
    MediaReceived,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineEvent {
    pub engine: EngineId,
    pub kind: EngineEventKind,
}

impl EngineEvent {
    pub fn new(engine: EngineId, kind: EngineEventKind) -> Self {
        Self { engine, kind }
    }
}
