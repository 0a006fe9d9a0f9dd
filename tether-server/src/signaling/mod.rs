mod rendezvous;
mod ws_handler;

pub use rendezvous::{ConnectionSession, RendezvousService};
pub use ws_handler::ws_handler;
