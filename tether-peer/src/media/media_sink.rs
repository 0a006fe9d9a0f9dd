use bytes::Bytes;
use std::sync::atomic::{AtomicU64, Ordering};

/// Receives inbound media payloads on the client side. Decoding and display
/// happen behind this seam.
pub trait MediaSink: Send + Sync {
    fn on_payload(&self, payload: Bytes);
}

/// Counts what arrives; enough to tell whether the stream is flowing.
#[derive(Debug, Default)]
pub struct CountingSink {
    packets: AtomicU64,
    bytes: AtomicU64,
}

impl CountingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn packets(&self) -> u64 {
        self.packets.load(Ordering::Relaxed)
    }

    pub fn bytes(&self) -> u64 {
        self.bytes.load(Ordering::Relaxed)
    }
}

impl MediaSink for CountingSink {
    fn on_payload(&self, payload: Bytes) {
        self.packets.fetch_add(1, Ordering::Relaxed);
        self.bytes.fetch_add(payload.len() as u64, Ordering::Relaxed);
    }
}
