//! Playback session state machine.
//!
//! One session lives as long as the player surface does; each channel
//! selection resolves a final URL, picks a playback path (adaptive engine,
//! native sink, or direct assignment) and owns the engine handle for that
//! channel. The invariant the whole module exists to defend: at most one
//! engine is alive at a time, and the old one is destroyed before a new one
//! is created.

use std::sync::Arc;

use strum::Display;
use tracing::{debug, info, warn};

use crate::models::Channel;
use crate::playback::engine::{
    EngineConfig, EngineErrorKind, EngineEvent, MediaSink, StreamingEngine,
    StreamingEngineFactory,
};
use crate::utils::url::{is_hls_url, resolve_stream_url};

/// Where the session currently is in a channel's playback lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum PlaybackState {
    /// No channel selected
    Idle,
    /// Channel selected, URL composed, nothing attached yet
    Resolving,
    /// Engine or sink attached, waiting for the first playable signal
    Loading,
    /// Playable; the sink may still be paused if autoplay was blocked
    Playing,
    /// Unrecoverable for this channel; see [`PlaybackSession::error`]
    Error,
}

/// Ephemeral playback state for the currently selected channel.
pub struct PlaybackSession {
    factory: Arc<dyn StreamingEngineFactory>,
    sink: Arc<dyn MediaSink>,
    engine_config: EngineConfig,
    engine: Option<Box<dyn StreamingEngine>>,
    state: PlaybackState,
    resolved_url: Option<String>,
    error: Option<String>,
}

impl PlaybackSession {
    pub fn new(
        factory: Arc<dyn StreamingEngineFactory>,
        sink: Arc<dyn MediaSink>,
        engine_config: EngineConfig,
    ) -> Self {
        Self {
            factory,
            sink,
            engine_config,
            engine: None,
            state: PlaybackState::Idle,
            resolved_url: None,
            error: None,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// True while the session waits for the first playable signal.
    pub fn is_loading(&self) -> bool {
        matches!(
            self.state,
            PlaybackState::Resolving | PlaybackState::Loading
        )
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The URL actually handed to the engine or sink, proxy prefix included.
    pub fn resolved_url(&self) -> Option<&str> {
        self.resolved_url.as_deref()
    }

    /// Select a channel, tearing down whatever was playing before.
    ///
    /// The proxy prefix, when present, is prepended to the channel URL
    /// literally. Dispatch happens on the final URL: an HLS URL goes through
    /// the engine when the platform supports it, through the sink when it
    /// plays HLS natively, and fails the session otherwise; any other URL is
    /// assigned to the sink directly.
    pub fn select(&mut self, channel: &Channel, proxy_prefix: Option<&str>) {
        self.teardown_engine();
        self.error = None;
        self.state = PlaybackState::Resolving;

        let final_url = resolve_stream_url(&channel.url, proxy_prefix);
        info!("Selected channel '{}' -> {}", channel.name, final_url);
        self.resolved_url = Some(final_url.clone());

        if is_hls_url(&final_url) {
            if self.factory.is_supported() {
                let mut engine = self.factory.create(&self.engine_config);
                engine.load_source(&final_url);
                engine.attach_media(Arc::clone(&self.sink));
                self.engine = Some(engine);
                self.state = PlaybackState::Loading;
            } else if self.sink.supports_hls_natively() {
                self.sink.assign_source(&final_url);
                self.state = PlaybackState::Loading;
            } else {
                warn!("No playback path for HLS URL: {}", final_url);
                self.fail("This stream format is not supported on this platform");
            }
        } else {
            self.sink.assign_source(&final_url);
            self.state = PlaybackState::Loading;
        }
    }

    /// Deselect: release the engine, reset the sink, back to Idle.
    pub fn clear(&mut self) {
        self.teardown_engine();
        self.sink.clear_source();
        self.state = PlaybackState::Idle;
        self.resolved_url = None;
        self.error = None;
    }

    /// Feed an event from the active engine into the state machine.
    pub fn handle_engine_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Ready => self.on_ready(),
            EngineEvent::Error(error) => {
                if !error.fatal {
                    debug!("Ignoring non-fatal {} engine error: {}", error.kind, error.details);
                    return;
                }
                match error.kind {
                    EngineErrorKind::Media => {
                        // recoverable in place; stay optimistic about state
                        warn!("Fatal media error, attempting recovery: {}", error.details);
                        if let Some(engine) = self.engine.as_mut() {
                            engine.recover_media_error();
                        }
                    }
                    EngineErrorKind::Network => {
                        warn!("Fatal network error: {}", error.details);
                        self.teardown_engine();
                        self.fail(format!(
                            "Network error while streaming: {}. Check your connection, \
                             or configure a CORS proxy in settings.",
                            error.details
                        ));
                    }
                    EngineErrorKind::Other => {
                        warn!("Fatal engine error: {}", error.details);
                        self.teardown_engine();
                        self.fail(format!("Playback failed: {}", error.details));
                    }
                }
            }
        }
    }

    /// The sink reports it can play (native and direct paths).
    pub fn handle_sink_ready(&mut self) {
        self.on_ready();
    }

    /// The sink reports a playback failure (native and direct paths).
    pub fn handle_sink_error(&mut self, details: &str) {
        warn!("Sink error: {}", details);
        self.teardown_engine();
        self.fail(format!("Playback failed: {details}"));
    }

    fn on_ready(&mut self) {
        if self.state != PlaybackState::Loading {
            debug!("Ignoring ready signal in state {}", self.state);
            return;
        }
        self.state = PlaybackState::Playing;
        if !self.sink.request_play() {
            // autoplay policy; the user can press play themselves
            debug!("Play request rejected; leaving the sink paused");
        }
    }

    fn fail(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        self.state = PlaybackState::Error;
    }

    /// Idempotent: called on select, clear, fatal errors and drop.
    fn teardown_engine(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            engine.destroy();
        }
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        self.teardown_engine();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::engine::EngineError;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Counts live engine instances and records calls per engine.
    struct FakeFactory {
        supported: bool,
        alive: Arc<AtomicUsize>,
        created: AtomicUsize,
        recoveries: Arc<AtomicUsize>,
    }

    impl FakeFactory {
        fn new(supported: bool) -> Self {
            Self {
                supported,
                alive: Arc::new(AtomicUsize::new(0)),
                created: AtomicUsize::new(0),
                recoveries: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl StreamingEngineFactory for FakeFactory {
        fn is_supported(&self) -> bool {
            self.supported
        }

        fn create(&self, _config: &EngineConfig) -> Box<dyn StreamingEngine> {
            self.alive.fetch_add(1, Ordering::SeqCst);
            self.created.fetch_add(1, Ordering::SeqCst);
            Box::new(FakeEngine {
                alive: Arc::clone(&self.alive),
                recoveries: Arc::clone(&self.recoveries),
                destroyed: false,
            })
        }
    }

    struct FakeEngine {
        alive: Arc<AtomicUsize>,
        recoveries: Arc<AtomicUsize>,
        destroyed: bool,
    }

    impl StreamingEngine for FakeEngine {
        fn load_source(&mut self, _url: &str) {}

        fn attach_media(&mut self, _sink: Arc<dyn MediaSink>) {}

        fn recover_media_error(&mut self) {
            self.recoveries.fetch_add(1, Ordering::SeqCst);
        }

        fn destroy(&mut self) {
            if !self.destroyed {
                self.destroyed = true;
                self.alive.fetch_sub(1, Ordering::SeqCst);
            }
        }
    }

    struct FakeSink {
        assigned: Mutex<Option<String>>,
        native_hls: bool,
        allow_play: AtomicBool,
        play_requests: AtomicUsize,
    }

    impl FakeSink {
        fn new(native_hls: bool) -> Self {
            Self {
                assigned: Mutex::new(None),
                native_hls,
                allow_play: AtomicBool::new(true),
                play_requests: AtomicUsize::new(0),
            }
        }
    }

    impl MediaSink for FakeSink {
        fn assign_source(&self, url: &str) {
            *self.assigned.lock().unwrap() = Some(url.to_string());
        }

        fn clear_source(&self) {
            *self.assigned.lock().unwrap() = None;
        }

        fn request_play(&self) -> bool {
            self.play_requests.fetch_add(1, Ordering::SeqCst);
            self.allow_play.load(Ordering::SeqCst)
        }

        fn supports_hls_natively(&self) -> bool {
            self.native_hls
        }
    }

    fn channel(name: &str, url: &str) -> Channel {
        Channel {
            id: url.to_string(),
            name: name.to_string(),
            group: "News".to_string(),
            logo: None,
            url: url.to_string(),
            source_name: "Test".to_string(),
        }
    }

    fn session_with(
        factory: Arc<FakeFactory>,
        sink: Arc<FakeSink>,
    ) -> PlaybackSession {
        PlaybackSession::new(factory, sink, EngineConfig::default())
    }

    #[test]
    fn hls_channel_goes_through_the_engine() {
        let factory = Arc::new(FakeFactory::new(true));
        let sink = Arc::new(FakeSink::new(false));
        let mut session = session_with(Arc::clone(&factory), Arc::clone(&sink));

        session.select(&channel("One", "http://host/one.m3u8"), None);

        assert_eq!(session.state(), PlaybackState::Loading);
        assert_eq!(factory.alive.load(Ordering::SeqCst), 1);
        // the engine path never assigns the sink source directly
        assert!(sink.assigned.lock().unwrap().is_none());
    }

    #[test]
    fn switching_channels_never_leaves_two_engines_alive() {
        let factory = Arc::new(FakeFactory::new(true));
        let sink = Arc::new(FakeSink::new(false));
        let mut session = session_with(Arc::clone(&factory), sink);

        session.select(&channel("A", "http://host/a.m3u8"), None);
        // B selected before A ever reaches Playing
        session.select(&channel("B", "http://host/b.m3u8"), None);

        assert_eq!(factory.created.load(Ordering::SeqCst), 2);
        assert_eq!(factory.alive.load(Ordering::SeqCst), 1);
        assert_eq!(session.resolved_url(), Some("http://host/b.m3u8"));
    }

    #[test]
    fn proxy_prefix_reaches_the_resolved_url() {
        let factory = Arc::new(FakeFactory::new(true));
        let sink = Arc::new(FakeSink::new(false));
        let mut session = session_with(factory, sink);

        session.select(
            &channel("One", "http://host/one.m3u8"),
            Some("https://proxy.example/"),
        );

        assert_eq!(
            session.resolved_url(),
            Some("https://proxy.example/http://host/one.m3u8")
        );
    }

    #[test]
    fn native_hls_sink_is_used_when_engine_is_unsupported() {
        let factory = Arc::new(FakeFactory::new(false));
        let sink = Arc::new(FakeSink::new(true));
        let mut session = session_with(Arc::clone(&factory), Arc::clone(&sink));

        session.select(&channel("One", "http://host/one.m3u8"), None);

        assert_eq!(session.state(), PlaybackState::Loading);
        assert_eq!(factory.created.load(Ordering::SeqCst), 0);
        assert_eq!(
            sink.assigned.lock().unwrap().as_deref(),
            Some("http://host/one.m3u8")
        );
    }

    #[test]
    fn no_playback_path_fails_the_session() {
        let factory = Arc::new(FakeFactory::new(false));
        let sink = Arc::new(FakeSink::new(false));
        let mut session = session_with(factory, sink);

        session.select(&channel("One", "http://host/one.m3u8"), None);

        assert_eq!(session.state(), PlaybackState::Error);
        assert!(session.error().unwrap().contains("not supported"));
    }

    #[test]
    fn non_hls_url_is_assigned_to_the_sink_directly() {
        let factory = Arc::new(FakeFactory::new(true));
        let sink = Arc::new(FakeSink::new(false));
        let mut session = session_with(Arc::clone(&factory), Arc::clone(&sink));

        session.select(&channel("One", "http://host/one.ts"), None);

        assert_eq!(session.state(), PlaybackState::Loading);
        assert_eq!(factory.created.load(Ordering::SeqCst), 0);
        assert_eq!(
            sink.assigned.lock().unwrap().as_deref(),
            Some("http://host/one.ts")
        );
    }

    #[test]
    fn ready_transitions_loading_to_playing_and_requests_play() {
        let factory = Arc::new(FakeFactory::new(true));
        let sink = Arc::new(FakeSink::new(false));
        let mut session = session_with(factory, Arc::clone(&sink));

        session.select(&channel("One", "http://host/one.m3u8"), None);
        session.handle_engine_event(EngineEvent::Ready);

        assert_eq!(session.state(), PlaybackState::Playing);
        assert!(!session.is_loading());
        assert_eq!(sink.play_requests.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn rejected_play_is_benign() {
        let factory = Arc::new(FakeFactory::new(true));
        let sink = Arc::new(FakeSink::new(false));
        sink.allow_play.store(false, Ordering::SeqCst);
        let mut session = session_with(factory, Arc::clone(&sink));

        session.select(&channel("One", "http://host/one.m3u8"), None);
        session.handle_engine_event(EngineEvent::Ready);

        // blocked autoplay is not an error; the user presses play themselves
        assert_eq!(session.state(), PlaybackState::Playing);
        assert!(session.error().is_none());
    }

    #[test]
    fn duplicate_ready_signals_are_ignored() {
        let factory = Arc::new(FakeFactory::new(true));
        let sink = Arc::new(FakeSink::new(false));
        let mut session = session_with(factory, Arc::clone(&sink));

        session.select(&channel("One", "http://host/one.m3u8"), None);
        session.handle_engine_event(EngineEvent::Ready);
        session.handle_sink_ready();

        assert_eq!(session.state(), PlaybackState::Playing);
        assert_eq!(sink.play_requests.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn non_fatal_errors_are_ignored() {
        let factory = Arc::new(FakeFactory::new(true));
        let sink = Arc::new(FakeSink::new(false));
        let mut session = session_with(Arc::clone(&factory), sink);

        session.select(&channel("One", "http://host/one.m3u8"), None);
        session.handle_engine_event(EngineEvent::Error(EngineError::transient(
            EngineErrorKind::Network,
            "fragment retry",
        )));

        assert_eq!(session.state(), PlaybackState::Loading);
        assert_eq!(factory.alive.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn fatal_media_error_recovers_in_place() {
        let factory = Arc::new(FakeFactory::new(true));
        let sink = Arc::new(FakeSink::new(false));
        let mut session = session_with(Arc::clone(&factory), sink);

        session.select(&channel("One", "http://host/one.m3u8"), None);
        session.handle_engine_event(EngineEvent::Error(EngineError::fatal(
            EngineErrorKind::Media,
            "decode stall",
        )));

        assert_eq!(session.state(), PlaybackState::Loading);
        assert!(session.error().is_none());
        assert_eq!(factory.recoveries.load(Ordering::SeqCst), 1);
        assert_eq!(factory.alive.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn fatal_network_error_ends_the_session_with_a_proxy_hint() {
        let factory = Arc::new(FakeFactory::new(true));
        let sink = Arc::new(FakeSink::new(false));
        let mut session = session_with(Arc::clone(&factory), sink);

        session.select(&channel("One", "http://host/one.m3u8"), None);
        session.handle_engine_event(EngineEvent::Error(EngineError::fatal(
            EngineErrorKind::Network,
            "manifest load failed",
        )));

        assert_eq!(session.state(), PlaybackState::Error);
        assert!(session.error().unwrap().contains("proxy"));
        assert_eq!(factory.alive.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn fatal_other_error_ends_the_session() {
        let factory = Arc::new(FakeFactory::new(true));
        let sink = Arc::new(FakeSink::new(false));
        let mut session = session_with(Arc::clone(&factory), sink);

        session.select(&channel("One", "http://host/one.m3u8"), None);
        session.handle_engine_event(EngineEvent::Error(EngineError::fatal(
            EngineErrorKind::Other,
            "mux error",
        )));

        assert_eq!(session.state(), PlaybackState::Error);
        assert_eq!(factory.alive.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn clear_releases_the_engine_and_resets_the_sink() {
        let factory = Arc::new(FakeFactory::new(true));
        let sink = Arc::new(FakeSink::new(false));
        let mut session = session_with(Arc::clone(&factory), Arc::clone(&sink));

        session.select(&channel("One", "http://host/one.m3u8"), None);
        session.clear();

        assert_eq!(session.state(), PlaybackState::Idle);
        assert_eq!(factory.alive.load(Ordering::SeqCst), 0);
        assert!(sink.assigned.lock().unwrap().is_none());
        assert!(session.resolved_url().is_none());
    }

    #[test]
    fn selecting_after_an_error_clears_it() {
        let factory = Arc::new(FakeFactory::new(true));
        let sink = Arc::new(FakeSink::new(false));
        let mut session = session_with(factory, sink);

        session.select(&channel("One", "http://host/one.m3u8"), None);
        session.handle_engine_event(EngineEvent::Error(EngineError::fatal(
            EngineErrorKind::Network,
            "down",
        )));
        assert_eq!(session.state(), PlaybackState::Error);

        session.select(&channel("Two", "http://host/two.m3u8"), None);
        assert_eq!(session.state(), PlaybackState::Loading);
        assert!(session.error().is_none());
    }

    #[test]
    fn dropping_the_session_destroys_the_engine() {
        let factory = Arc::new(FakeFactory::new(true));
        let sink = Arc::new(FakeSink::new(false));
        {
            let mut session = session_with(Arc::clone(&factory), sink);
            session.select(&channel("One", "http://host/one.m3u8"), None);
            assert_eq!(factory.alive.load(Ordering::SeqCst), 1);
        }
        assert_eq!(factory.alive.load(Ordering::SeqCst), 0);
    }
}
