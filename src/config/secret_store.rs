use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument, warn};

use crate::error::{DescriberError, Result};

/// A source of secret values looked up by name.
///
/// Implementations return `None` when the key is absent. Blank values are
/// returned as-is; [`load_api_key`] decides whether they are usable.
pub trait SecretStore {
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads secrets from the process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSecretStore;

impl SecretStore for EnvSecretStore {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Secrets held in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySecretStore {
    secrets: HashMap<String, String>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a secret, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.secrets.insert(key.into(), value.into());
        self
    }
}

impl SecretStore for MemorySecretStore {
    fn get(&self, key: &str) -> Option<String> {
        self.secrets.get(key).cloned()
    }
}

/// Secrets stored as a flat JSON object in a file.
///
/// The default location is `~/.image-describer/secrets.json`. A missing file
/// is treated as an empty store.
#[derive(Debug, Clone)]
pub struct FileSecretStore {
    secrets: HashMap<String, String>,
}

impl FileSecretStore {
    /// Default secrets file path, if a home directory can be determined.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".image-describer").join("secrets.json"))
    }

    /// Load the store from `path`.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file exists but cannot be read, and `Config` if its
    /// contents are not a JSON object of strings.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file_path = path.as_ref().to_path_buf();
        let secrets = match fs::read_to_string(&file_path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
                DescriberError::Config(format!(
                    "Secrets file {} is not a JSON object of strings: {}",
                    file_path.display(),
                    e
                ))
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Secrets file not found, using empty store");
                HashMap::new()
            }
            Err(e) => return Err(DescriberError::io(file_path, e)),
        };

        Ok(Self { secrets })
    }
}

impl SecretStore for FileSecretStore {
    fn get(&self, key: &str) -> Option<String> {
        self.secrets.get(key).cloned()
    }
}

/// Consults several stores in order and returns the first value found.
#[derive(Default)]
pub struct ChainedSecretStore {
    stores: Vec<Box<dyn SecretStore + Send + Sync>>,
}

impl ChainedSecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, store: impl SecretStore + Send + Sync + 'static) -> Self {
        self.stores.push(Box::new(store));
        self
    }

    /// Append the secrets file at `path` if it can be loaded.
    ///
    /// An unreadable or malformed file is logged and skipped, so a key found
    /// in an earlier store still wins.
    pub fn with_file(self, path: impl AsRef<Path>) -> Self {
        match FileSecretStore::open(path.as_ref()) {
            Ok(store) => self.with(store),
            Err(e) => {
                warn!(error = %e, "Ignoring secrets file");
                self
            }
        }
    }
}

/// Environment first, then `~/.image-describer/secrets.json` when a home
/// directory is known.
pub fn default_secret_store() -> ChainedSecretStore {
    let store = ChainedSecretStore::new().with(EnvSecretStore);
    match FileSecretStore::default_path() {
        Some(path) => store.with_file(path),
        None => {
            warn!("Could not determine home directory, skipping secrets file");
            store
        }
    }
}

impl SecretStore for ChainedSecretStore {
    fn get(&self, key: &str) -> Option<String> {
        self.stores.iter().find_map(|store| store.get(key))
    }
}

/// Look up the API key named `key_name`.
///
/// This performs no network access, so a missing key stops the run before
/// any remote call is made. Calling it again with the same store yields the
/// same value.
///
/// # Errors
///
/// Returns [`DescriberError::Config`] if the key is absent or blank.
pub fn load_api_key(store: &dyn SecretStore, key_name: &str) -> Result<String> {
    match store.get(key_name) {
        Some(value) if !value.trim().is_empty() => {
            debug!(key = key_name, "API key found");
            Ok(value)
        }
        _ => Err(DescriberError::Config(format!(
            "API key is not set. Please set {} in the environment or the secrets file.",
            key_name
        ))),
    }
}
