mod candidate;
mod envelope;
mod peer;
mod role;
mod room;
mod session_description;
mod signaling;

pub use candidate::IceCandidate;
pub use envelope::{InboundFrame, RelayEnvelope};
pub use peer::PeerId;
pub use role::PeerRole;
pub use room::RoomId;
pub use session_description::SessionDescription;
pub use signaling::{IceServerConfig, SignalMessage};
