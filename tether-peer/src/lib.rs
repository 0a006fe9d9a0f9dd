//! Peer side of the rendezvous protocol: the host and client session state
//! machines, the websocket link to the rendezvous server and the seam to the
//! WebRTC engine that carries the actual stream.

mod config;
pub mod engine;
mod error;
pub mod media;
pub mod rendezvous;
pub mod session;

pub use config::{DEFAULT_SIGNALING_URL, DEFAULT_STUN_SERVERS, PeerConfig, TransportConfig};
pub use engine::{
    EngineEvent, EngineEventKind, EngineFactory, EngineId, MediaAttachment, NegotiationEngine,
    RtcEngineFactory, TransportState,
};
pub use error::PeerError;
pub use media::{BroadcastSource, CountingSink, EncodedFrame, MediaSink, MediaSource};
pub use rendezvous::RendezvousLink;
pub use session::{ClientSession, ClientState, HostPeerState, HostSession};
