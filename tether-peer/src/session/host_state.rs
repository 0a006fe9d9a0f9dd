use std::fmt;

/// Where one client's connection stands from the host's side.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum HostPeerState {
    /// Offer sent, no answer yet.
    Negotiating,
    /// Answer applied.
    Connected,
}

impl fmt::Display for HostPeerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostPeerState::Negotiating => f.write_str("negotiating"),
            HostPeerState::Connected => f.write_str("connected"),
        }
    }
}
