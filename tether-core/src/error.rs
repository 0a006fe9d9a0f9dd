use thiserror::Error;

/// Why an inbound frame could not be turned into a [`SignalMessage`](crate::model::SignalMessage).
///
/// None of these are fatal for the connection that produced the frame.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("frame has no `type` field")]
    MissingType,

    #[error("unknown message type `{0}`")]
    UnknownType(String),

    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),
}
