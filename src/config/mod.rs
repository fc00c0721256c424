//! Application configuration.
//!
//! Loaded from a TOML file; a missing file is replaced with a written-out
//! default so a fresh deployment starts with a working source list. Every
//! field has a default, so partial files are fine.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub mod defaults;
pub mod duration_serde;

use crate::models::PlaylistSource;
use crate::playback::EngineConfig;
use defaults::*;

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Playlist sources fetched on startup, in declaration order.
    #[serde(default = "default_sources")]
    pub sources: Vec<PlaylistSource>,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    /// Preference file location. None selects the per-user default path.
    #[serde(default)]
    pub preferences_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            fetch: FetchConfig::default(),
            engine: EngineConfig::default(),
            preferences_file: None,
        }
    }
}

/// Settings for the playlist download client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Per-request timeout for playlist downloads
    #[serde(with = "duration_serde::duration", default = "default_fetch_timeout")]
    pub timeout: Duration,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: default_fetch_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl AppConfig {
    /// Load from `STREAMFLOW_CONFIG`, falling back to `streamflow.toml` in
    /// the working directory.
    pub fn load() -> Result<Self> {
        let config_file =
            std::env::var("STREAMFLOW_CONFIG").unwrap_or_else(|_| "streamflow.toml".to_string());
        Self::load_from_file(&config_file)
    }

    /// Load a config file, writing out the defaults when it does not exist.
    pub fn load_from_file(config_file: &str) -> Result<Self> {
        if Path::new(config_file).exists() {
            let contents = std::fs::read_to_string(config_file)?;
            let config: AppConfig = toml::from_str(&contents)?;
            config.validate();
            Ok(config)
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(config_file, contents)?;
            info!("Created default config file: {}", config_file);
            Ok(default_config)
        }
    }

    /// Warn about source entries that cannot fetch. Loading still succeeds;
    /// a bad source simply ends up in the catalog's failure roster.
    fn validate(&self) {
        if self.sources.is_empty() {
            warn!("No playlist sources configured; the catalog will be empty");
        }
        for source in &self.sources {
            match url::Url::parse(&source.url) {
                Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
                Ok(parsed) => warn!(
                    "Source '{}' uses unsupported scheme '{}'",
                    source.name,
                    parsed.scheme()
                ),
                Err(e) => warn!("Source '{}' has an invalid URL: {}", source.name, e),
            }
        }
    }
}
