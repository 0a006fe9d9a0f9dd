use std::fmt;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ClientState {
    Connecting,
    Registered,
    /// `client_ready` sent, waiting for the host's offer.
    AwaitingOffer,
    /// Answer sent, waiting for the engine's verdict.
    Negotiating,
    Connected,
    /// Direct connection up and the rendezvous link gone.
    Independent,
    Terminated,
}

impl ClientState {
    /// Reached a working direct connection.
    pub fn is_direct(self) -> bool {
        matches!(self, ClientState::Connected | ClientState::Independent)
    }
}

impl fmt::Display for ClientState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ClientState::Connecting => "connecting",
            ClientState::Registered => "registered",
            ClientState::AwaitingOffer => "awaiting_offer",
            ClientState::Negotiating => "negotiating",
            ClientState::Connected => "connected",
            ClientState::Independent => "independent",
            ClientState::Terminated => "terminated",
        };
        f.write_str(name)
    }
}
