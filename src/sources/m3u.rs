//! Extended-M3U playlist parsing.
//!
//! Converts raw playlist text into channel records. The format is a loose
//! line-oriented convention rather than a strict grammar: an `#EXTINF:` line
//! carries metadata for the stream URL on the following non-comment line.
//! Anything that does not complete into a name plus URL pair is dropped
//! without raising an error.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::models::Channel;

/// Parse playlist text fetched from one source into channel records.
///
/// Entries missing a display name or a URL line are dropped silently; a
/// playlist that parses to nothing yields an empty vec, never an error.
pub fn parse_playlist(content: &str, source_name: &str) -> Vec<Channel> {
    let mut channels = Vec::new();
    let mut pending: Option<PendingChannel> = None;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(extinf) = line.strip_prefix("#EXTINF:") {
            // a second #EXTINF before any URL replaces the unfinished entry
            pending = Some(PendingChannel::from_extinf(extinf, source_name));
        } else if line.starts_with('#') {
            // header and unrelated directives
            continue;
        } else {
            match pending.take() {
                Some(entry) if !entry.name.is_empty() => {
                    channels.push(entry.into_channel(line));
                }
                Some(_) => {
                    debug!("Dropping entry without display name for URL: {}", line);
                }
                None => {
                    debug!("Ignoring stream URL without #EXTINF metadata: {}", line);
                }
            }
        }
    }

    info!(
        "Parsed {} channels from playlist source: {}",
        channels.len(),
        source_name
    );
    channels
}

/// Accumulator for an `#EXTINF:` entry awaiting its URL line.
struct PendingChannel {
    id: Option<String>,
    name: String,
    logo: Option<String>,
    group: String,
    source_name: String,
}

impl PendingChannel {
    fn from_extinf(extinf: &str, source_name: &str) -> Self {
        let attributes = parse_attributes(extinf);

        // display name sits after the final comma; with no comma at all the
        // whole remainder serves as the name
        let comma_name = match extinf.rfind(',') {
            Some(pos) => extinf[pos + 1..].trim(),
            None => extinf.trim(),
        };

        let tvg_id = non_empty(&attributes, "tvg-id");
        let tvg_name = non_empty(&attributes, "tvg-name");
        let tvg_logo = non_empty(&attributes, "tvg-logo");
        let group_title = non_empty(&attributes, "group-title");

        Self {
            id: tvg_id,
            name: tvg_name.unwrap_or_else(|| comma_name.to_string()),
            logo: tvg_logo,
            group: group_title.unwrap_or_else(|| source_name.to_string()),
            source_name: source_name.to_string(),
        }
    }

    fn into_channel(self, url: &str) -> Channel {
        Channel {
            // deterministic fallback keeps ids stable across rebuilds
            id: self.id.unwrap_or_else(|| url.to_string()),
            name: self.name,
            group: self.group,
            logo: self.logo,
            url: url.to_string(),
            source_name: self.source_name,
        }
    }
}

/// Empty attribute values count as absent (`tvg-logo=""` means no logo).
fn non_empty(attributes: &HashMap<String, String>, key: &str) -> Option<String> {
    attributes.get(key).filter(|v| !v.is_empty()).cloned()
}

/// Scan `key="value"` attribute pairs from an `#EXTINF:` line remainder.
///
/// Hand-written state machine rather than a regex. Keys start accumulating
/// after whitespace, values after `=`, and quoted values may contain spaces
/// and commas. The leading duration field never enters a key because key
/// collection only begins once whitespace has been seen.
fn parse_attributes(extinf: &str) -> HashMap<String, String> {
    let mut attributes = HashMap::new();

    let mut chars = extinf.chars().peekable();
    let mut current_key = String::new();
    let mut current_value = String::new();
    let mut in_quotes = false;
    let mut in_key = false;
    let mut in_value = false;

    while let Some(ch) = chars.next() {
        match ch {
            ' ' | '\t' if !in_quotes => {
                if in_value {
                    // end of an unquoted value
                    if !current_key.is_empty() && !current_value.is_empty() {
                        attributes.insert(current_key.clone(), current_value.clone());
                    }
                    current_key.clear();
                    current_value.clear();
                    in_value = false;
                }
                in_key = true;
            }
            '=' if !in_quotes => {
                in_key = false;
                in_value = true;
                if chars.peek() == Some(&'"') {
                    chars.next(); // consume the opening quote
                    in_quotes = true;
                }
            }
            '"' if in_value => {
                in_quotes = false;
                if !current_key.is_empty() {
                    attributes.insert(current_key.clone(), current_value.clone());
                }
                current_key.clear();
                current_value.clear();
                in_value = false;
            }
            _ => {
                if in_key {
                    current_key.push(ch);
                } else if in_value {
                    current_value.push(ch);
                }
            }
        }
    }

    // trailing unquoted value
    if in_value && !current_key.is_empty() && !current_value.is_empty() {
        attributes.insert(current_key, current_value);
    }

    attributes
}
