//! Core domain records shared across the crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single playable channel parsed from a playlist source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Catalog identifier: the playlist's `tvg-id` when present, otherwise the
    /// stream URL. Distinct URLs declaring the same `tvg-id` therefore produce
    /// colliding ids; lookups take the first match.
    pub id: String,
    /// Display name, from `tvg-name` or the text after the final `#EXTINF` comma.
    pub name: String,
    /// Raw group label (`group-title`), falling back to the source name.
    pub group: String,
    /// Logo URL when the playlist declares one.
    pub logo: Option<String>,
    /// Stream URL. Unique within a built catalog.
    pub url: String,
    /// Name of the playlist source this record came from.
    pub source_name: String,
}

/// A remote playlist declared in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistSource {
    pub name: String,
    pub url: String,
}

impl PlaylistSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Result of building the channel catalog from every configured source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub channels: Vec<Channel>,
    /// Sources that could not be fetched. Informational: the surviving
    /// sources still contribute their channels.
    pub failures: Vec<SourceFailure>,
    pub built_at: DateTime<Utc>,
}

impl Catalog {
    /// Look up a channel by id. First match wins when ids collide.
    pub fn channel_by_id(&self, id: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.id == id)
    }
}

/// A playlist source that failed to fetch during a catalog build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFailure {
    pub source_name: String,
    pub error: String,
}
