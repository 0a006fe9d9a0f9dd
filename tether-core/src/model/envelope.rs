use crate::error::ProtocolError;
use crate::model::{PeerId, SignalMessage};
use serde::Deserialize;
use serde_json::Value;

/// Addressing of a relay frame. Everything else in the frame is opaque and
/// travels to the target as received.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RelayEnvelope {
    #[serde(rename = "type")]
    pub kind: String,
    pub target: PeerId,
    #[serde(default)]
    pub sender: Option<PeerId>,
}

impl RelayEnvelope {
    pub const KINDS: [&'static str; 4] = ["client_ready", "offer", "answer", "ice_candidate"];
}

/// A frame as the rendezvous server sees it: relay kinds are only addressed,
/// everything else is fully parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame {
    Relay(RelayEnvelope),
    Message(SignalMessage),
}

impl InboundFrame {
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let value: Value = serde_json::from_str(text)?;
        let Some(kind) = value.get("type").and_then(Value::as_str) else {
            return Err(ProtocolError::MissingType);
        };

        if RelayEnvelope::KINDS.contains(&kind) {
            return Ok(InboundFrame::Relay(serde_json::from_value(value)?));
        }
        if !SignalMessage::KINDS.contains(&kind) {
            return Err(ProtocolError::UnknownType(kind.to_owned()));
        }
        Ok(InboundFrame::Message(serde_json::from_value(value)?))
    }
}
