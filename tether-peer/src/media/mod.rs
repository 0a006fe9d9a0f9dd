mod media_sink;
mod media_source;

pub use media_sink::{CountingSink, MediaSink};
pub use media_source::{BroadcastSource, EncodedFrame, MediaSource};
