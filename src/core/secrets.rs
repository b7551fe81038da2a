//! Per-hostname registry credentials

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Secrets-related errors
#[derive(Debug, thiserror::Error)]
pub enum SecretsError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid secrets file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Lookup of registry hostname to credential.
///
/// A hostname without an entry simply has no credential; most registries are public.
#[derive(Debug, Clone, Default)]
pub struct SecretStore {
    secrets: HashMap<String, String>,
}

impl SecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from `(hostname, credential)` pairs
    pub fn from_pairs<I, H, C>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (H, C)>,
        H: Into<String>,
        C: Into<String>,
    {
        Self {
            secrets: pairs
                .into_iter()
                .map(|(h, c)| (h.into(), c.into()))
                .collect(),
        }
    }

    /// Load a JSON object of `{ "hostname": "credential" }`.
    ///
    /// A missing file yields an empty store.
    pub fn load_from_file(path: &Path) -> Result<Self, SecretsError> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = std::fs::read_to_string(path).map_err(|source| SecretsError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let secrets: HashMap<String, String> =
            serde_json::from_str(&content).map_err(|e| SecretsError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        Ok(Self { secrets })
    }

    pub fn find_for_hostname(&self, hostname: &str) -> Option<&str> {
        self.secrets.get(hostname).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }
}
