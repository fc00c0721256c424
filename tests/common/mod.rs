//! Shared fakes for integration tests: a canned playlist fetcher, a
//! counting engine factory and a recording media sink.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use streamflow::errors::FetchError;
use streamflow::playback::{EngineConfig, MediaSink, StreamingEngine, StreamingEngineFactory};
use streamflow::sources::PlaylistFetcher;

/// Serves canned playlist bodies by URL; unknown URLs fail with a 500.
pub struct StubFetcher {
    bodies: HashMap<String, String>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self {
            bodies: HashMap::new(),
        }
    }

    pub fn with_playlist(mut self, url: &str, body: &str) -> Self {
        self.bodies.insert(url.to_string(), body.to_string());
        self
    }
}

#[async_trait]
impl PlaylistFetcher for StubFetcher {
    async fn fetch_playlist(&self, url: &str) -> Result<String, FetchError> {
        match self.bodies.get(url) {
            Some(body) => Ok(body.clone()),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 500,
            }),
        }
    }
}

/// Factory whose engines count themselves while alive.
pub struct CountingEngineFactory {
    supported: bool,
    pub alive: Arc<AtomicUsize>,
    pub created: AtomicUsize,
    pub loaded_urls: Arc<Mutex<Vec<String>>>,
}

impl CountingEngineFactory {
    pub fn new(supported: bool) -> Self {
        Self {
            supported,
            alive: Arc::new(AtomicUsize::new(0)),
            created: AtomicUsize::new(0),
            loaded_urls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn alive_count(&self) -> usize {
        self.alive.load(Ordering::SeqCst)
    }
}

impl StreamingEngineFactory for CountingEngineFactory {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn create(&self, _config: &EngineConfig) -> Box<dyn StreamingEngine> {
        self.alive.fetch_add(1, Ordering::SeqCst);
        self.created.fetch_add(1, Ordering::SeqCst);
        Box::new(CountingEngine {
            alive: Arc::clone(&self.alive),
            loaded_urls: Arc::clone(&self.loaded_urls),
            destroyed: false,
        })
    }
}

struct CountingEngine {
    alive: Arc<AtomicUsize>,
    loaded_urls: Arc<Mutex<Vec<String>>>,
    destroyed: bool,
}

impl StreamingEngine for CountingEngine {
    fn load_source(&mut self, url: &str) {
        self.loaded_urls.lock().unwrap().push(url.to_string());
    }

    fn attach_media(&mut self, _sink: Arc<dyn MediaSink>) {}

    fn recover_media_error(&mut self) {}

    fn destroy(&mut self) {
        if !self.destroyed {
            self.destroyed = true;
            self.alive.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

/// Records the assigned source and play requests.
pub struct RecordingSink {
    pub assigned: Mutex<Option<String>>,
    pub native_hls: bool,
    pub allow_play: AtomicBool,
    pub play_requests: AtomicUsize,
}

impl RecordingSink {
    pub fn new(native_hls: bool) -> Self {
        Self {
            assigned: Mutex::new(None),
            native_hls,
            allow_play: AtomicBool::new(true),
            play_requests: AtomicUsize::new(0),
        }
    }
}

impl MediaSink for RecordingSink {
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
