//! Core package-management modules

pub mod config;
pub mod descriptor;
pub mod package;
pub mod pipeline;
pub mod registry;
pub mod report;
pub mod secrets;

// Re-export main types for convenience
pub use config::{ClibConfig, ConfigError};
pub use descriptor::{Descriptor, DescriptorError};
pub use package::{Package, PackageId, PackageIdError};
pub use pipeline::{
    ArchiveFetchError, ArchiveFetcher, ArchivePlan, BatchError, HttpArchiveFetcher,
    PackageAction, Pipeline, PipelineError, ResolvedAction,
};
pub use registry::{
    Registry, RegistryBackend, RegistryError, RegistryKind, RegistryManager,
    DEFAULT_REGISTRY_URL,
};
pub use report::{Level, MemoryReporter, Reporter, TracingReporter};
pub use secrets::{SecretStore, SecretsError};
