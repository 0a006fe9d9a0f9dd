use serde::{Deserialize, Serialize};

/// Connectivity candidate in the browser-compatible JSON shape.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct IceCandidate {
    pub candidate: String,
    #[serde(rename = "sdpMid", default)]
    pub sdp_mid: Option<String>,
    #[serde(rename = "sdpMLineIndex", default)]
    pub sdp_mline_index: Option<u16>,
}
