//! HTTP retrieval of playlist documents.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::config::FetchConfig;
use crate::errors::FetchError;

/// Fetches raw playlist text for the catalog builder.
///
/// Behind a trait so catalog construction can run against canned fixtures in
/// tests. One call per source per build; there is no application-level retry.
#[async_trait]
pub trait PlaylistFetcher: Send + Sync {
    async fn fetch_playlist(&self, url: &str) -> Result<String, FetchError>;
}

/// Production fetcher backed by a shared reqwest client.
pub struct HttpPlaylistFetcher {
    client: Client,
}

impl HttpPlaylistFetcher {
    pub fn new(config: &FetchConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client }
    }
}

#[async_trait]
impl PlaylistFetcher for HttpPlaylistFetcher {
    async fn fetch_playlist(&self, url: &str) -> Result<String, FetchError> {
        debug!("Fetching playlist from {}", url);

        let response = self.client.get(url).send().await.map_err(|source| {
            FetchError::Request {
                url: url.to_string(),
                source,
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })
    }
}
