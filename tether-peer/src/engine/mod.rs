mod engine_event;
mod negotiation_engine;
mod rtc;

pub use engine_event::{EngineEvent, EngineEventKind, EngineId, TransportState};
pub use negotiation_engine::{EngineFactory, NegotiationEngine};
pub use rtc::{MediaAttachment, RtcEngine, RtcEngineFactory};
