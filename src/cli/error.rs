//! CLI-specific error types

use clib::core::{BatchError, ConfigError, PipelineError, RegistryError, SecretsError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Secrets error: {0}")]
    Secrets(#[from] SecretsError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("{0}")]
    Batch(#[from] BatchError),

    #[error("Package not found: {0}")]
    PackageNotFound(String),

    #[error("No registry could be listed ({0} attempted)")]
    NoRegistries(usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl CliError {
    /// Process exit code for this error; malformed input exits 2, everything else 1
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Batch(BatchError {
                source: PipelineError::Precondition(_) | PipelineError::InvalidIdentifier(_),
                ..
            }) => 2,
            _ => 1,
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;
