//! The orchestrating shell: one struct owning all UI-facing state.
//!
//! A UI binds to this instead of holding its own copies: catalog status,
//! search text, expanded groups, the selected channel and the playback
//! session all live here, and every capability the shell touches (fetcher,
//! engine factory, sink, preference store) is injected at construction so
//! tests can substitute fakes.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::browse::{ChannelGroup, filter_channels, group_channels};
use crate::catalog::CatalogBuilder;
use crate::config::AppConfig;
use crate::models::{Catalog, Channel};
use crate::playback::{
    EngineEvent, MediaSink, PlaybackSession, PlaybackState, StreamingEngineFactory,
};
use crate::preferences::{PROXY_URL_KEY, PreferenceStore};
use crate::sources::PlaylistFetcher;

/// Where the catalog load currently stands.
#[derive(Debug, Clone)]
pub enum CatalogState {
    Loading,
    Ready(Catalog),
    /// Every source failed; holds the single user-visible message.
    Failed(String),
}

/// Application shell composing catalog, browse state and playback.
pub struct StreamflowApp {
    config: AppConfig,
    fetcher: Arc<dyn PlaylistFetcher>,
    preferences: Arc<dyn PreferenceStore>,
    catalog: CatalogState,
    search: String,
    expanded_groups: HashSet<String>,
    selected: Option<Channel>,
    session: PlaybackSession,
    proxy_url: String,
}

impl StreamflowApp {
    /// Assemble the shell. Reads the persisted proxy URL once; an absent
    /// preference means no proxy.
    pub fn new(
        config: AppConfig,
        fetcher: Arc<dyn PlaylistFetcher>,
        engine_factory: Arc<dyn StreamingEngineFactory>,
        sink: Arc<dyn MediaSink>,
        preferences: Arc<dyn PreferenceStore>,
    ) -> Self {
        let proxy_url = preferences.get(PROXY_URL_KEY).unwrap_or_default();
        let session = PlaybackSession::new(engine_factory, sink, config.engine.clone());
        Self {
            config,
            fetcher,
            preferences,
            catalog: CatalogState::Loading,
            search: String::new(),
            expanded_groups: HashSet::new(),
            selected: None,
            session,
            proxy_url,
        }
    }

    /// Build the catalog from the configured sources. Safe to call again for
    /// a full reload; browse state survives, the channel list is replaced.
    pub async fn load_catalog(&mut self) {
        self.catalog = CatalogState::Loading;
        let builder = CatalogBuilder::new(self.config.sources.clone(), Arc::clone(&self.fetcher));
        self.catalog = match builder.build().await {
            Ok(catalog) => {
                info!("Channel list ready: {} channels", catalog.channels.len());
                CatalogState::Ready(catalog)
            }
            Err(e) => {
                error!("Catalog build failed: {}", e);
                CatalogState::Failed(
                    "Failed to load channel list. Please try again later.".to_string(),
                )
            }
        };
    }

    pub fn catalog_state(&self) -> &CatalogState {
        &self.catalog
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search = text.into();
    }

    /// Browse groups for the current search, in display order. Empty until
    /// the catalog is ready.
    pub fn visible_groups(&self) -> Vec<ChannelGroup> {
        match &self.catalog {
            CatalogState::Ready(catalog) => {
                group_channels(&filter_channels(&catalog.channels, &self.search))
            }
            _ => Vec::new(),
        }
    }

    pub fn toggle_group(&mut self, name: &str) {
        if !self.expanded_groups.remove(name) {
            self.expanded_groups.insert(name.to_string());
        }
    }

    pub fn is_group_expanded(&self, name: &str) -> bool {
        self.expanded_groups.contains(name)
    }

    /// Select a channel by catalog id and start playback. Returns false when
    /// the catalog is not ready or the id is unknown.
    pub fn select_channel(&mut self, id: &str) -> bool {
        let CatalogState::Ready(catalog) = &self.catalog else {
            warn!("Ignoring selection before the catalog is ready");
            return false;
        };
        let Some(channel) = catalog.channel_by_id(id).cloned() else {
            warn!("Unknown channel id: {}", id);
            return false;
        };
        let prefix = (!self.proxy_url.is_empty()).then_some(self.proxy_url.as_str());
        self.session.select(&channel, prefix);
        self.selected = Some(channel);
        true
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.session.clear();
    }

    pub fn selected_channel(&self) -> Option<&Channel> {
        self.selected.as_ref()
    }

    pub fn proxy_url(&self) -> &str {
        &self.proxy_url
    }

    /// Change the proxy URL: persisted immediately, and an active session is
    /// restarted so the new prefix takes effect on the current channel.
    pub fn set_proxy_url(&mut self, url: &str) {
        self.proxy_url = url.to_string();
        self.preferences.set(PROXY_URL_KEY, url);
        if let Some(channel) = self.selected.clone() {
            let prefix = (!self.proxy_url.is_empty()).then_some(self.proxy_url.as_str());
            self.session.select(&channel, prefix);
        }
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.session.state()
    }

    pub fn playback_error(&self) -> Option<&str> {
        self.session.error()
    }

    pub fn resolved_url(&self) -> Option<&str> {
        self.session.resolved_url()
    }

    /// Forward an event from the embedder's engine wiring.
    pub fn handle_engine_event(&mut self, event: EngineEvent) {
        self.session.handle_engine_event(event);
    }

    /// Forward the sink's ready callback.
    pub fn handle_sink_ready(&mut self) {
        self.session.handle_sink_ready();
    }

    /// Forward the sink's error callback.
    pub fn handle_sink_error(&mut self, details: &str) {
        self.session.handle_sink_error(details);
    }
}
