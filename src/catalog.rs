//! Catalog construction: concurrent playlist fetch, merge and de-duplication.
//!
//! One build per application session. Every configured source is fetched in
//! parallel and parsed independently; a failing source is recorded on the
//! catalog and contributes nothing. Only the case where every source fails
//! surfaces as an error.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use tracing::{info, warn};

use crate::errors::CatalogError;
use crate::models::{Catalog, Channel, PlaylistSource, SourceFailure};
use crate::sources::{PlaylistFetcher, parse_playlist};

/// Builds the channel catalog from a fixed list of playlist sources.
pub struct CatalogBuilder {
    sources: Vec<PlaylistSource>,
    fetcher: Arc<dyn PlaylistFetcher>,
}

impl CatalogBuilder {
    pub fn new(sources: Vec<PlaylistSource>, fetcher: Arc<dyn PlaylistFetcher>) -> Self {
        Self { sources, fetcher }
    }

    /// Fetch and parse every source, then merge.
    ///
    /// All fetches are issued concurrently and the build waits for every one
    /// to settle; a failure never cancels the others. Err only when all
    /// sources failed. A builder with no sources yields an empty catalog.
    pub async fn build(&self) -> Result<Catalog, CatalogError> {
        let fetches = self.sources.iter().map(|source| {
            let fetcher = Arc::clone(&self.fetcher);
            async move { (source, fetcher.fetch_playlist(&source.url).await) }
        });

        let mut channels = Vec::new();
        let mut failures = Vec::new();
        for (source, result) in join_all(fetches).await {
            match result {
                Ok(body) => channels.extend(parse_playlist(&body, &source.name)),
                Err(error) => {
                    warn!("Playlist source '{}' failed: {}", source.name, error);
                    failures.push(SourceFailure {
                        source_name: source.name.clone(),
                        error: error.to_string(),
                    });
                }
            }
        }

        if !self.sources.is_empty() && failures.len() == self.sources.len() {
            return Err(CatalogError::AllSourcesFailed {
                attempted: self.sources.len(),
            });
        }

        let total = channels.len();
        let channels = dedup_by_url(channels);
        info!(
            "Catalog built: {} channels ({} duplicates removed, {} of {} sources ok)",
            channels.len(),
            total - channels.len(),
            self.sources.len() - failures.len(),
            self.sources.len()
        );

        Ok(Catalog {
            channels,
            failures,
            built_at: Utc::now(),
        })
    }
}

/// Collapse records sharing a stream URL.
///
/// Policy: the last occurrence's fields win, seated at the position of the
/// URL's first occurrence. This mirrors building a map keyed by URL in
/// encounter order, where a later insert overwrites the value but keeps the
/// original slot.
fn dedup_by_url(channels: Vec<Channel>) -> Vec<Channel> {
    let mut slot_by_url: HashMap<String, usize> = HashMap::with_capacity(channels.len());
    let mut deduped: Vec<Channel> = Vec::with_capacity(channels.len());

    for channel in channels {
        match slot_by_url.get(&channel.url) {
            Some(&slot) => deduped[slot] = channel,
            None => {
                slot_by_url.insert(channel.url.clone(), deduped.len());
                deduped.push(channel);
            }
        }
    }

    deduped
}
