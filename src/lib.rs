//! # clib
//!
//! A package manager for C source libraries. Packages are discovered through one
//! or more remote registries and installed or uninstalled by fetching a source
//! tarball, unpacking it and running a build action inside it.
//!
//! ## Architecture
//!
//! - Registry aggregation: wiki listing pages and GitLab-hosted listings, searched
//!   in priority order with the community listing always last
//! - Per-hostname credentials for private registries
//! - The fetch/extract/act pipeline driving `install` and `uninstall`
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use clib::core::{RegistryManager, SecretStore, TracingReporter};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let reporter = Arc::new(TracingReporter::new());
//!     let urls = vec!["https://gitlab.com/my-team/registry".to_string()];
//!
//!     let mut manager = RegistryManager::init_registries(&urls, &SecretStore::new(), reporter)?;
//!     manager.fetch_registries().await;
//!
//!     if let Some(package) = manager.find_package("clibs/buffer") {
//!         println!("{} - {}", package.id, package.description);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod execution;

pub use core::config::ClibConfig;
pub use core::package::{Package, PackageId};
pub use core::pipeline::{PackageAction, Pipeline, PipelineError};
pub use core::registry::{Registry, RegistryError, RegistryKind, RegistryManager};
pub use core::report::{Reporter, TracingReporter};
pub use core::secrets::SecretStore;
pub use execution::{ProcessExecutor, ShellExecutor};

/// Version of the package manager
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging (safe for testing)
pub fn init_logging(verbose: bool) {
    // Only initialize logging once
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;

        let fallback = if verbose { "clib=debug" } else { "clib=warn" };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into());

        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .finish();

        // This will fail silently if already initialized
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}
