//! Configuration file loading (`clib.toml`)

use crate::core::pipeline::DEFAULT_TMP_DIR;
use crate::core::registry::DEFAULT_REGISTRY_URL;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Project-level configuration file name
pub const CONFIG_FILE: &str = "clib.toml";

/// Secrets file looked up in the current directory when none is configured
pub const SECRETS_FILE: &str = "clib_secrets.json";

fn default_registry() -> String {
    DEFAULT_REGISTRY_URL.to_string()
}

fn default_tmp_dir() -> PathBuf {
    PathBuf::from(DEFAULT_TMP_DIR)
}

fn default_http_timeout_secs() -> u64 {
    120
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Settings for one invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClibConfig {
    /// Extra registries, searched before the default listing in this order
    #[serde(default)]
    pub registries: Vec<String>,

    #[serde(default = "default_registry")]
    pub default_registry: String,

    /// Temporary storage root for archives and extracted trees
    #[serde(default = "default_tmp_dir")]
    pub tmp_dir: PathBuf,

    #[serde(default)]
    pub secrets_file: Option<PathBuf>,

    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Unset means extraction and actions may run indefinitely
    #[serde(default)]
    pub action_timeout_secs: Option<u64>,
}

impl Default for ClibConfig {
    fn default() -> Self {
        Self {
            registries: Vec::new(),
            default_registry: default_registry(),
            tmp_dir: default_tmp_dir(),
            secrets_file: None,
            http_timeout_secs: default_http_timeout_secs(),
            action_timeout_secs: None,
        }
    }
}

impl ClibConfig {
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Resolve configuration: an explicit path must exist; otherwise
    /// `./clib.toml`, then `<config dir>/clib/config.toml`, then defaults.
    pub fn resolve(explicit: Option<&Path>, current_dir: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }

        for candidate in search_paths(current_dir) {
            if candidate.exists() {
                tracing::debug!("Loading configuration from {}", candidate.display());
                return Self::load_from_file(&candidate);
            }
        }

        Ok(Self::default())
    }

    /// Secrets file to read, if any
    pub fn secrets_path(&self, current_dir: &Path) -> PathBuf {
        match self.secrets_file {
            Some(ref path) if path.is_absolute() => path.clone(),
            Some(ref path) => current_dir.join(path),
            None => current_dir.join(SECRETS_FILE),
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn action_timeout(&self) -> Option<Duration> {
        self.action_timeout_secs.map(Duration::from_secs)
    }
}

/// Configuration locations checked in order
pub fn search_paths(current_dir: &Path) -> Vec<PathBuf> {
    let mut paths = vec![current_dir.join(CONFIG_FILE)];
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("clib").join("config.toml"));
    }
    paths
}
