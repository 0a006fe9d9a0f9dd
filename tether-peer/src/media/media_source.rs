use bytes::Bytes;
use std::time::Duration;
use tokio::sync::broadcast;

/// One already-encoded video frame.
#[derive(Debug, Clone)]
pub struct EncodedFrame {
    pub data: Bytes,
    pub duration: Duration,
}

/// Supplies encoded frames to every host-side engine connection.
///
/// Capture and encoding happen elsewhere; each connection subscribes and
/// writes what it receives into its outbound track.
pub trait MediaSource: Send + Sync {
    /// e.g. `video/VP8`
    fn mime_type(&self) -> &str;

    fn subscribe(&self) -> broadcast::Receiver<EncodedFrame>;
}

/// Fan-out source fed by whoever produces frames.
#[derive(Debug, Clone)]
pub struct BroadcastSource {
    mime_type: String,
    tx: broadcast::Sender<EncodedFrame>,
}

impl BroadcastSource {
    pub fn new(mime_type: impl Into<String>, capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            mime_type: mime_type.into(),
            tx,
        }
    }

    /// Returns how many connections received the frame.
    pub fn publish(&self, frame: EncodedFrame) -> usize {
        self.tx.send(frame).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl MediaSource for BroadcastSource {
    fn mime_type(&self) -> &str {
        &self.mime_type
    }

    fn subscribe(&self) -> broadcast::Receiver<EncodedFrame> {
        self.tx.subscribe()
    }
}
