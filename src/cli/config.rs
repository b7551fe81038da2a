//! Configuration resolution and wiring of registries and the pipeline for CLI commands

use crate::cli::error::CliResult;
use clib::core::registry::manager::default_client;
use clib::core::{
    ClibConfig, HttpArchiveFetcher, Pipeline, RegistryManager, Reporter, SecretStore,
};
use clib::ShellExecutor;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Everything a command needs, resolved once per invocation
pub struct CliContext {
    pub config: ClibConfig,
    pub current_dir: PathBuf,
    pub reporter: Arc<dyn Reporter>,
}

impl CliContext {
    /// Load configuration; `--registry` urls are searched before configured ones
    pub fn load(
        config_path: Option<&Path>,
        extra_registries: &[String],
        reporter: Arc<dyn Reporter>,
    ) -> CliResult<Self> {
        let current_dir = env::current_dir()?;
        let mut config = ClibConfig::resolve(config_path, &current_dir)?;

        if !extra_registries.is_empty() {
            let mut registries = extra_registries.to_vec();
            registries.append(&mut config.registries);
            config.registries = registries;
        }

        debug!(
            "Using {} registries, tmp dir {}",
            config.registries.len(),
            config.tmp_dir.display()
        );

        Ok(Self {
            config,
            current_dir,
            reporter,
        })
    }

    pub fn secrets(&self) -> CliResult<SecretStore> {
        let path = self.config.secrets_path(&self.current_dir);
        let secrets = SecretStore::load_from_file(&path)?;
        debug!("Loaded {} secrets from {}", secrets.len(), path.display());
        Ok(secrets)
    }

    /// Registries from configuration followed by the default listing
    pub fn registry_manager(&self) -> CliResult<RegistryManager> {
        let secrets = self.secrets()?;
        let manager = RegistryManager::init_registries_with_default(
            &self.config.registries,
            &secrets,
            &self.config.default_registry,
            self.reporter.clone(),
        )?;
        let client = default_client(Some(self.config.http_timeout()))?;
        Ok(manager.with_client(client))
    }

    pub fn pipeline(&self) -> CliResult<Pipeline> {
        let client = default_client(Some(self.config.http_timeout()))?;
        Ok(Pipeline::new(
            Arc::new(HttpArchiveFetcher::new(client)),
            Arc::new(ShellExecutor::with_timeout(self.config.action_timeout())),
            self.reporter.clone(),
        )
        .with_tmp_dir(&self.config.tmp_dir))
    }
}
