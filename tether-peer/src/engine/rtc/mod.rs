mod rtc_engine;
mod rtc_engine_factory;

pub use rtc_engine::RtcEngine;
pub use rtc_engine_factory::{MediaAttachment, RtcEngineFactory};
