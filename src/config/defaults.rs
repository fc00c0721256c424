//! Configuration default values, kept in one place so they are easy to
//! change.

use std::time::Duration;

use crate::models::PlaylistSource;

// Fetch defaults
pub const DEFAULT_USER_AGENT: &str = "StreamFlow/0.1";

pub fn default_fetch_timeout() -> Duration {
    Duration::from_secs(30)
}

pub fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

/// Playlist sources used when the config file declares none: a starter set
/// of iptv-org country indexes whose names double as the browse group
/// prefix.
pub fn default_sources() -> Vec<PlaylistSource> {
    [
        (
            "United States",
            "https://iptv-org.github.io/iptv/countries/us.m3u",
        ),
        (
            "United Kingdom",
            "https://iptv-org.github.io/iptv/countries/uk.m3u",
        ),
        ("Canada", "https://iptv-org.github.io/iptv/countries/ca.m3u"),
        ("Germany", "https://iptv-org.github.io/iptv/countries/de.m3u"),
        ("France", "https://iptv-org.github.io/iptv/countries/fr.m3u"),
        ("Brazil", "https://iptv-org.github.io/iptv/countries/br.m3u"),
    ]
    .into_iter()
    .map(|(name, url)| PlaylistSource::new(name, url))
    .collect()
}
