use std::time::Duration;
use tether_core::model::{IceServerConfig, PeerId, RoomId};

pub const DEFAULT_SIGNALING_URL: &str = "ws://localhost:8765";

pub const DEFAULT_STUN_SERVERS: [&str; 2] = [
    "stun:stun.l.google.com:19302",
    "stun:stun1.l.google.com:19302",
];

/// ICE servers handed to every engine connection.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub ice_servers: Vec<IceServerConfig>,
}

impl TransportConfig {
    pub fn with_turn(
        mut self,
        url: impl Into<String>,
        username: Option<String>,
        credential: Option<String>,
    ) -> Self {
        self.ice_servers.push(IceServerConfig {
            urls: vec![url.into()],
            username,
            credential,
        });
        self
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            ice_servers: DEFAULT_STUN_SERVERS
                .iter()
                .map(|url| IceServerConfig::stun(*url))
                .collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PeerConfig {
    pub signaling_url: String,
    pub room_id: RoomId,
    /// Let the server pick an id when unset.
    pub peer_id: Option<PeerId>,
    pub transport: TransportConfig,
    /// How long to wait for `registered` after sending `register`.
    pub register_timeout: Duration,
    /// Grace period for the first inbound media after negotiation starts.
    pub stream_timeout: Duration,
    pub sweep_interval: Duration,
    pub status_interval: Duration,
    /// Drop the rendezvous link as soon as the direct connection is up.
    pub close_signaling_on_connect: bool,
}

impl Default for PeerConfig {
    fn default() -> Self {
        Self {
            signaling_url: DEFAULT_SIGNALING_URL.to_owned(),
            room_id: RoomId::default(),
            peer_id: None,
            transport: TransportConfig::default(),
            register_timeout: Duration::from_secs(10),
            stream_timeout: Duration::from_secs(10),
            sweep_interval: Duration::from_secs(5),
            status_interval: Duration::from_secs(5),
            close_signaling_on_connect: false,
        }
    }
}
