//! Wire model shared by the rendezvous server and the peers.

pub mod error;
pub mod model;

pub use error::ProtocolError;
