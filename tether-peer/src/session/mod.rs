mod client_session;
mod client_state;
mod host_session;
mod host_state;

pub use client_session::ClientSession;
pub use client_state::ClientState;
pub use host_session::HostSession;
pub use host_state::HostPeerState;

use crate::rendezvous::RendezvousLink;
use tether_core::model::SignalMessage;

/// Next inbound message, or `None` when the link closes. Never resolves
/// when there is no link, so it can sit in a `select!` unconditionally.
async fn next_signal(link: &mut Option<RendezvousLink>) -> Option<SignalMessage> {
    match link {
        Some(link) => link.recv().await,
        None => std::future::pending().await,
    }
}
