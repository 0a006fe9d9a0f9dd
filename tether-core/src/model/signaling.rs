use crate::error::ProtocolError;
use crate::model::{IceCandidate, PeerId, PeerRole, RoomId, SessionDescription};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

impl IceServerConfig {
    pub fn stun(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
            username: None,
            credential: None,
        }
    }
}

/// Every frame exchanged with the rendezvous server.
///
/// Relay kinds (`client_ready`, `offer`, `answer`, `ice_candidate`) carry
/// `sender`/`target` and are forwarded verbatim; the rest are produced or
/// consumed by the server itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SignalMessage {
    Register {
        peer_type: PeerRole,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        peer_id: Option<PeerId>,
        #[serde(default)]
        room_id: RoomId,
    },
    Registered {
        peer_id: PeerId,
        room_id: RoomId,
    },
    HostAvailable {
        host_id: PeerId,
        room_id: RoomId,
    },
    ClientsAvailable {
        client_ids: Vec<PeerId>,
        room_id: RoomId,
    },
    ClientReady {
        sender: PeerId,
        target: PeerId,
    },
    Offer {
        sender: PeerId,
        target: PeerId,
        offer: SessionDescription,
    },
    Answer {
        sender: PeerId,
        target: PeerId,
        answer: SessionDescription,
    },
    IceCandidate {
        sender: PeerId,
        target: PeerId,
        candidate: IceCandidate,
    },
    ClientDisconnected {
        peer_id: PeerId,
        #[serde(default)]
        room_id: RoomId,
    },
    HostDisconnected {
        peer_id: PeerId,
        #[serde(default)]
        room_id: RoomId,
    },
}

impl SignalMessage {
    pub const KINDS: [&'static str; 10] = [
        "register",
        "registered",
        "host_available",
        "clients_available",
        "client_ready",
        "offer",
        "answer",
        "ice_candidate",
        "client_disconnected",
        "host_disconnected",
    ];

    /// Parses one text frame, telling apart unknown kinds from broken payloads.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let value: Value = serde_json::from_str(text)?;
        let Some(kind) = value.get("type").and_then(Value::as_str) else {
            return Err(ProtocolError::MissingType);
        };
        if !Self::KINDS.contains(&kind) {
            return Err(ProtocolError::UnknownType(kind.to_owned()));
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_text(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Wire name of the kind. Used for logging instead of the payload.
    pub fn kind(&self) -> &'static str {
        match self {
            SignalMessage::Register { .. } => "register",
            SignalMessage::Registered { .. } => "registered",
            SignalMessage::HostAvailable { .. } => "host_available",
            SignalMessage::ClientsAvailable { .. } => "clients_available",
            SignalMessage::ClientReady { .. } => "client_ready",
            SignalMessage::Offer { .. } => "offer",
            SignalMessage::Answer { .. } => "answer",
            SignalMessage::IceCandidate { .. } => "ice_candidate",
            SignalMessage::ClientDisconnected { .. } => "client_disconnected",
            SignalMessage::HostDisconnected { .. } => "host_disconnected",
        }
    }

    pub fn sender(&self) -> Option<&PeerId> {
        match self {
            SignalMessage::ClientReady { sender, .. }
            | SignalMessage::Offer { sender, .. }
            | SignalMessage::Answer { sender, .. }
            | SignalMessage::IceCandidate { sender, .. } => Some(sender),
            _ => None,
        }
    }

    pub fn target(&self) -> Option<&PeerId> {
        match self {
            SignalMessage::ClientReady { target, .. }
            | SignalMessage::Offer { target, .. }
            | SignalMessage::Answer { target, .. }
            | SignalMessage::IceCandidate { target, .. } => Some(target),
            _ => None,
        }
    }

    pub fn is_relayable(&self) -> bool {
        self.target().is_some()
    }
}
