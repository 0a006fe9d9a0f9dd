use crate::engine::TransportState;
use thiserror::Error;
use tokio_tungstenite::tungstenite;

#[derive(Debug, Error)]
pub enum PeerError {
    #[error("failed to connect to rendezvous server at {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: tungstenite::Error,
    },

    #[error("registration failed: {0}")]
    Registration(String),

    #[error("rendezvous connection lost before a direct connection was established")]
    RendezvousLost,

    #[error("negotiation engine failed: {0:#}")]
    Engine(anyhow::Error),

    #[error("direct connection ended before it was established ({0})")]
    NegotiationFailed(TransportState),
}
