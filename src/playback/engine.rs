//! Contracts between the playback session and the embedding player.
//!
//! The session never talks to a concrete streaming library or media element.
//! It drives these traits and the embedder (or a test) supplies the
//! implementations: an adaptive-streaming engine created per channel, and a
//! long-lived media sink the engine renders into.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::config::duration_serde;

/// One instantiated adaptive-streaming engine, alive for a single channel.
///
/// Created through a [`StreamingEngineFactory`], fed a source URL, attached
/// to the sink, and destroyed before the next engine exists. `destroy` must
/// be idempotent: the session calls it on switch, on clear, and on drop.
pub trait StreamingEngine: Send {
    fn load_source(&mut self, url: &str);
    fn attach_media(&mut self, sink: Arc<dyn MediaSink>);
    /// Ask the engine to recover from a fatal media error in place, keeping
    /// the current source and sink.
    fn recover_media_error(&mut self);
    fn destroy(&mut self);
}

/// Creates engines and answers whether the adaptive path exists at all on
/// this platform.
pub trait StreamingEngineFactory: Send + Sync {
    fn is_supported(&self) -> bool;
    fn create(&self, config: &EngineConfig) -> Box<dyn StreamingEngine>;
}

/// The surface the session renders into: a media element or its stand-in.
///
/// The sink's own ready and error callbacks reach the session through its
/// `handle_sink_ready` and `handle_sink_error` methods; the embedder wires
/// them up.
pub trait MediaSink: Send + Sync {
    /// Point the sink directly at a URL (native and non-adaptive playback).
    fn assign_source(&self, url: &str);
    /// Drop any assigned source.
    fn clear_source(&self);
    /// Start playback. Returns false when the host blocks it (autoplay
    /// policy); the session treats that as benign.
    fn request_play(&self) -> bool;
    /// Whether the sink can play HLS without an engine (e.g. Safari).
    fn supports_hls_natively(&self) -> bool;
}

/// Lifecycle signals an engine reports back to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Manifest parsed; playback can start
    Ready,
    Error(EngineError),
}

/// An engine-reported error, pre-classified for the session's taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineError {
    /// Non-fatal errors are the engine's own business and are only logged
    pub fatal: bool,
    pub kind: EngineErrorKind,
    pub details: String,
}

impl EngineError {
    pub fn fatal(kind: EngineErrorKind, details: impl Into<String>) -> Self {
        Self {
            fatal: true,
            kind,
            details: details.into(),
        }
    }

    pub fn transient(kind: EngineErrorKind, details: impl Into<String>) -> Self {
        Self {
            fatal: false,
            kind,
            details: details.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum EngineErrorKind {
    Network,
    Media,
    Other,
}

/// Tuning handed to every engine instance at creation.
///
/// The session never interprets these values. The retry policy in
/// particular is declarative: fragment and playlist retries happen inside
/// the engine, never in the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Back buffer the engine may keep, in playback time
    #[serde(
        with = "duration_serde::duration",
        default = "default_max_buffer_length"
    )]
    pub max_buffer_length: Duration,
    /// Upper bound on buffered media bytes
    #[serde(default = "default_max_buffer_bytes")]
    pub max_buffer_bytes: u64,
    /// Fragment load retries before the engine reports a fatal error
    #[serde(default = "default_fragment_retry_count")]
    pub fragment_retry_count: u32,
    #[serde(
        with = "duration_serde::duration",
        default = "default_fragment_retry_delay"
    )]
    pub fragment_retry_delay: Duration,
    /// Playlist reload retries before the engine reports a fatal error
    #[serde(default = "default_playlist_retry_count")]
    pub playlist_retry_count: u32,
    #[serde(
        with = "duration_serde::duration",
        default = "default_playlist_retry_delay"
    )]
    pub playlist_retry_delay: Duration,
    /// Initial quality level; None lets the engine choose adaptively
    #[serde(default)]
    pub start_level: Option<u32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_buffer_length: default_max_buffer_length(),
            max_buffer_bytes: default_max_buffer_bytes(),
            fragment_retry_count: default_fragment_retry_count(),
            fragment_retry_delay: default_fragment_retry_delay(),
            playlist_retry_count: default_playlist_retry_count(),
            playlist_retry_delay: default_playlist_retry_delay(),
            start_level: None,
        }
    }
}

fn default_max_buffer_length() -> Duration {
    Duration::from_secs(30)
}

fn default_max_buffer_bytes() -> u64 {
    60 * 1024 * 1024
}

fn default_fragment_retry_count() -> u32 {
    6
}

fn default_fragment_retry_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_playlist_retry_count() -> u32 {
    4
}

fn default_playlist_retry_delay() -> Duration {
    Duration::from_secs(1)
}
