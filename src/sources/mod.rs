//! Playlist source access: fetching remote playlist documents and parsing
//! them into channel records.

pub mod fetch;
pub mod m3u;

pub use fetch::{HttpPlaylistFetcher, PlaylistFetcher};
pub use m3u::parse_playlist;
