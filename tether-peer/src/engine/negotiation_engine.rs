use crate::engine::{EngineEvent, EngineId, TransportState};
use anyhow::Result;
use async_trait::async_trait;
use tether_core::model::{IceCandidate, PeerId, SessionDescription};
use tokio::sync::mpsc;

/// One direct connection to one remote peer.
///
/// Descriptions and candidates are passed through opaquely; the session only
/// decides when each call happens.
#[async_trait]
pub trait NegotiationEngine: Send + Sync {
    fn id(&self) -> EngineId;

    fn state(&self) -> TransportState;

    /// Creates the local offer and applies it.
    async fn create_offer(&self) -> Result<SessionDescription>;

    /// Applies a remote offer, then creates and applies the local answer.
    async fn accept_offer(&self, offer: SessionDescription) -> Result<SessionDescription>;

    async fn accept_answer(&self, answer: SessionDescription) -> Result<()>;

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()>;

    async fn close(&self) -> Result<()>;
}

/// Opens engine connections. Events of the new connection go to `events`,
/// tagged with `engine_id`.
#[async_trait]
pub trait EngineFactory: Send + Sync {
    async fn open(
        &self,
        remote: &PeerId,
        engine_id: EngineId,
        events: mpsc::UnboundedSender<EngineEvent>,
    ) -> Result<Box<dyn NegotiationEngine>>;
}
