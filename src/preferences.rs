//! Small string preferences persisted across runs.
//!
//! The only preference the shell uses today is the proxy URL, but the store
//! is a plain key-value contract so embedders can share it. Writes are
//! synchronous; the file store rewrites its whole file on every set and
//! treats write failures as a logged warning, never an error the caller
//! sees.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::{debug, warn};

/// Preference key for the optional CORS proxy prefix.
pub const PROXY_URL_KEY: &str = "proxy_url";

/// Synchronous process-local key-value store for user preferences.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

/// In-memory store for tests and embedders without persistence.
#[derive(Default)]
pub struct MemoryPreferenceStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }
}

/// TOML-file-backed store. Loaded once at open; rewritten on every set.
pub struct FilePreferenceStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl FilePreferenceStore {
    /// Open a store at `path`. A missing file means no preferences yet; a
    /// corrupt file is discarded with a warning rather than failing startup.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str::<BTreeMap<String, String>>(&contents) {
                Ok(values) => values,
                Err(e) => {
                    warn!("Ignoring corrupt preference file {}: {}", path.display(), e);
                    BTreeMap::new()
                }
            },
            Err(_) => BTreeMap::new(),
        };
        debug!(
            "Opened preference store {} ({} entries)",
            path.display(),
            values.len()
        );
        Self {
            path,
            values: Mutex::new(values),
        }
    }

    /// Per-user default location: `<config dir>/streamflow/preferences.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("streamflow").join("preferences.toml"))
    }

    fn persist(&self, values: &BTreeMap<String, String>) {
        if let Some(parent) = self.path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!("Cannot create preference directory {}: {}", parent.display(), e);
            return;
        }
        match toml::to_string_pretty(values) {
            Ok(contents) => {
                if let Err(e) = std::fs::write(&self.path, contents) {
                    warn!("Failed to write preferences to {}: {}", self.path.display(), e);
                }
            }
            Err(e) => warn!("Failed to serialize preferences: {}", e),
        }
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut values = self.values.lock().unwrap();
        values.insert(key.to_string(), value.to_string());
        self.persist(&values);
    }
}
