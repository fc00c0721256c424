//! Error types for playlist fetching and catalog construction.
//!
//! Failures stay contained at component boundaries: a single source failing
//! to fetch is recorded on the catalog rather than raised, and only the
//! every-source-failed case surfaces as an error.

use thiserror::Error;

/// Errors raised while fetching playlist text from a source URL.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The request could not be sent or the body could not be read
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status
    #[error("Unexpected HTTP status {status} from {url}")]
    Status { url: String, status: u16 },
}

/// Errors raised while building the channel catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Every configured source failed to fetch, so there is nothing to show.
    /// Partial failures never reach here; they are recorded on the catalog.
    #[error("All {attempted} playlist sources failed to load")]
    AllSourcesFailed { attempted: usize },
}
