//! Rendezvous server: pairs hosts with clients inside rooms and relays their
//! negotiation messages until they can talk directly.

mod app;
mod config;
mod error;
pub mod registry;
pub mod relay;
pub mod room;
pub mod signaling;

pub use app::{router, serve, serve_on};
pub use config::{DEFAULT_PORT, ServerConfig};
pub use error::RendezvousError;
pub use registry::{ConnectionId, PeerHandle, PeerRegistry};
pub use relay::{RelayOutcome, RelayRouter};
pub use room::{RoomDirectory, RoomSnapshot};
pub use signaling::{ConnectionSession, RendezvousService, ws_handler};
