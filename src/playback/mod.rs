//! Playback of a selected channel through an injected streaming engine.

pub mod engine;
pub mod session;

pub use engine::{
    EngineConfig, EngineError, EngineErrorKind, EngineEvent, MediaSink, StreamingEngine,
    StreamingEngineFactory,
};
pub use session::{PlaybackSession, PlaybackState};
