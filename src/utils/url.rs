//! Stream URL helpers shared by the playback session.

/// Build the URL handed to the player. An optional proxy prefix is prepended
/// literally, with no encoding or validation; proxies take the target URL
/// appended verbatim (`https://proxy.example/http://host/live.m3u8`).
pub fn resolve_stream_url(url: &str, proxy_prefix: Option<&str>) -> String {
    match proxy_prefix {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}{url}"),
        _ => url.to_string(),
    }
}

/// Whether the final URL names an HLS playlist. Suffix test on the full URL,
/// not the path component, so query-style proxy prefixes
/// (`https://proxy.example/?u=` + url) still match.
pub fn is_hls_url(url: &str) -> bool {
    url.to_lowercase().ends_with(".m3u8")
}
