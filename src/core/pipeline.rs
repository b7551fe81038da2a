//! Install/uninstall pipeline
//!
//! Every call follows the same steps for one `owner/name@version`:
//!
//! 1. derive the archive url and local paths ([`ArchivePlan`])
//! 2. download the archive into the temporary root
//! 3. extract it there with `tar`
//! 4. read the action from the package descriptor, falling back to a default
//! 5. run `cd {extracted dir} && {action}`
//!
//! Install and uninstall differ only in the descriptor field consulted and the
//! default action ([`PackageAction`]).

use crate::core::descriptor::Descriptor;
use crate::core::package::{PackageId, PackageIdError};
use crate::core::report::Reporter;
use crate::execution::{ExecutionError, ProcessExecutor};
use reqwest::Client;
use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Temporary storage root used when none is configured
pub const DEFAULT_TMP_DIR: &str = "/tmp";

pub const DEFAULT_INSTALL_ACTION: &str = "make install";
pub const DEFAULT_UNINSTALL_ACTION: &str = "make uninstall";

/// What the pipeline does with an extracted package
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageAction {
    Install,
    Uninstall,
}

impl PackageAction {
    /// Descriptor field that overrides the default action
    pub fn descriptor_field(&self) -> &'static str {
        match self {
            PackageAction::Install => "install",
            PackageAction::Uninstall => "uninstall",
        }
    }

    pub fn default_command(&self) -> &'static str {
        match self {
            PackageAction::Install => DEFAULT_INSTALL_ACTION,
            PackageAction::Uninstall => DEFAULT_UNINSTALL_ACTION,
        }
    }
}

impl fmt::Display for PackageAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.descriptor_field())
    }
}

/// Pipeline errors
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("missing {0}")]
    Precondition(&'static str),

    #[error("invalid package identifier: {0}")]
    InvalidIdentifier(#[from] PackageIdError),

    #[error("failed to fetch tarball {url}: {source}")]
    FetchFailed {
        url: String,
        #[source]
        source: ArchiveFetchError,
    },

    #[error("failed to untar {archive}: {reason}")]
    ExtractFailed { archive: PathBuf, reason: String },

    #[error("action '{command}' exited with status {code}")]
    ActionFailed { command: String, code: i32 },

    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

/// A pipeline failure for one identifier of a batch
#[derive(Debug, thiserror::Error)]
#[error("failed to {action} {identifier}: {source}")]
pub struct BatchError {
    pub action: PackageAction,
    pub identifier: String,
    #[source]
    pub source: PipelineError,
}

/// Where an archive comes from and where it lands, derived from owner, name and version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivePlan {
    pub archive_url: String,
    /// `{name}-{version}.tar.gz`
    pub archive_file: String,
    pub archive_path: PathBuf,
    /// `{tmp}/{name}-{version}`
    pub extract_dir: PathBuf,
    tmp_dir: PathBuf,
}

impl ArchivePlan {
    pub fn derive(
        owner: &str,
        name: &str,
        version: &str,
        tmp_dir: &Path,
    ) -> Result<Self, PipelineError> {
        if owner.is_empty() {
            return Err(PipelineError::Precondition("owner"));
        }
        if name.is_empty() {
            return Err(PipelineError::Precondition("name"));
        }
        if version.is_empty() {
            return Err(PipelineError::Precondition("version"));
        }

        let archive_file = format!("{}-{}.tar.gz", name, version);
        Ok(Self {
            archive_url: archive_url(owner, name, version),
            archive_path: tmp_dir.join(&archive_file),
            archive_file,
            extract_dir: tmp_dir.join(format!("{}-{}", name, version)),
            tmp_dir: tmp_dir.to_path_buf(),
        })
    }

    /// Shell command that unpacks the archive inside the temporary root
    pub fn extract_command(&self) -> String {
        format!(
            "cd {} && tar -xf {}",
            shell_quote(&self.tmp_dir.to_string_lossy()),
            shell_quote(&self.archive_file)
        )
    }

    /// Shell command that runs `action` inside the extracted directory.
    ///
    /// Paths are quoted; `action` is passed through as a shell snippet.
    pub fn action_command(&self, action: &str) -> String {
        format!(
            "cd {} && {}",
            shell_quote(&self.extract_dir.to_string_lossy()),
            action
        )
    }
}

/// Quote `word` for `sh`, leaving plain paths untouched
fn shell_quote(word: &str) -> Cow<'_, str> {
    shell_escape::unix::escape(Cow::Borrowed(word))
}

/// Source tarball url for a package version
pub fn archive_url(owner: &str, name: &str, version: &str) -> String {
    format!(
        "https://github.com/{}/{}/archive/{}.tar.gz",
        owner, name, version
    )
}

/// The action chosen for an extracted package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAction {
    /// Action as read from the descriptor or the default
    pub action: String,
    /// Full shell command, including the `cd` into the package
    pub command: String,
    /// True when the descriptor did not supply the action
    pub defaulted: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ArchiveFetchError {
    #[error("{0}")]
    Transport(String),

    #[error("HTTP {0}")]
    Http(u16),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Downloads an archive to a local path
#[async_trait::async_trait]
pub trait ArchiveFetcher: Send + Sync {
    async fn fetch(&self, url: &str, destination: &Path) -> Result<(), ArchiveFetchError>;
}

/// Fetches archives over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpArchiveFetcher {
    client: Client,
}

impl HttpArchiveFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl ArchiveFetcher for HttpArchiveFetcher {
    async fn fetch(&self, url: &str, destination: &Path) -> Result<(), ArchiveFetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ArchiveFetchError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ArchiveFetchError::Http(response.status().as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ArchiveFetchError::Transport(e.to_string()))?;

        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(destination, &bytes).await?;

        tracing::debug!("Wrote {} bytes to {}", bytes.len(), destination.display());
        Ok(())
    }
}

/// Fetch, extract and act on packages
pub struct Pipeline {
    fetcher: Arc<dyn ArchiveFetcher>,
    executor: Arc<dyn ProcessExecutor>,
    reporter: Arc<dyn Reporter>,
    tmp_dir: PathBuf,
}

impl Pipeline {
    pub fn new(
        fetcher: Arc<dyn ArchiveFetcher>,
        executor: Arc<dyn ProcessExecutor>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            fetcher,
            executor,
            reporter,
            tmp_dir: PathBuf::from(DEFAULT_TMP_DIR),
        }
    }

    pub fn with_tmp_dir(mut self, tmp_dir: impl Into<PathBuf>) -> Self {
        self.tmp_dir = tmp_dir.into();
        self
    }

    pub fn tmp_dir(&self) -> &Path {
        &self.tmp_dir
    }

    /// Derive everything about a package without touching network or disk
    pub fn plan(
        &self,
        owner: &str,
        name: &str,
        version: &str,
    ) -> Result<ArchivePlan, PipelineError> {
        ArchivePlan::derive(owner, name, version, &self.tmp_dir)
    }

    pub async fn install(
        &self,
        owner: &str,
        name: &str,
        version: &str,
    ) -> Result<(), PipelineError> {
        self.run(PackageAction::Install, owner, name, version).await
    }

    pub async fn uninstall(
        &self,
        owner: &str,
        name: &str,
        version: &str,
    ) -> Result<(), PipelineError> {
        self.run(PackageAction::Uninstall, owner, name, version).await
    }

    /// Run the full pipeline for one package. Succeeds only if the action exits 0.
    pub async fn run(
        &self,
        action: PackageAction,
        owner: &str,
        name: &str,
        version: &str,
    ) -> Result<(), PipelineError> {
        let plan = self.plan(owner, name, version)?;

        self.reporter.info("fetch", &plan.archive_url);
        if let Err(source) = self.fetcher.fetch(&plan.archive_url, &plan.archive_path).await {
            self.reporter.error("error", "failed to fetch tarball");
            return Err(PipelineError::FetchFailed {
                url: plan.archive_url,
                source,
            });
        }

        self.reporter.info("untar", &plan.archive_path.display().to_string());
        self.extract(&plan).await?;

        let resolved = self.resolve_action(action, &plan);
        let status = self.executor.run(&resolved.command).await?;
        if !status.success() {
            return Err(PipelineError::ActionFailed {
                command: resolved.command,
                code: status.code_or_signal(),
            });
        }

        Ok(())
    }

    async fn extract(&self, plan: &ArchivePlan) -> Result<(), PipelineError> {
        let reason = match self.executor.run(&plan.extract_command()).await {
            Ok(status) if status.success() => return Ok(()),
            Ok(status) => format!("tar exited with status {}", status.code_or_signal()),
            Err(e) => e.to_string(),
        };

        self.reporter.error("error", "failed to untar");
        Err(PipelineError::ExtractFailed {
            archive: plan.archive_path.clone(),
            reason,
        })
    }

    /// Pick the action from the extracted descriptor, or the default with a warning.
    pub fn resolve_action(&self, action: PackageAction, plan: &ArchivePlan) -> ResolvedAction {
        let field = action.descriptor_field();
        let configured = match Descriptor::load(&plan.extract_dir) {
            Ok(descriptor) => descriptor.string_field(field).map(str::to_string),
            Err(e) => {
                tracing::debug!("No usable descriptor for {}: {}", plan.extract_dir.display(), e);
                None
            }
        };

        let (action_str, defaulted) = match configured {
            Some(value) => (value, false),
            None => {
                let default = action.default_command();
                self.reporter.warn(
                    "warning",
                    &format!("No {} target specified.  Defaulting to '{}'.", field, default),
                );
                (default.to_string(), true)
            }
        };

        ResolvedAction {
            command: plan.action_command(&action_str),
            action: action_str,
            defaulted,
        }
    }

    /// Run the pipeline for each `owner/name[@version]` in order, stopping at the first failure.
    ///
    /// Returns how many packages were processed.
    pub async fn run_batch<S: AsRef<str>>(
        &self,
        action: PackageAction,
        identifiers: &[S],
    ) -> Result<usize, BatchError> {
        for identifier in identifiers {
            let identifier = identifier.as_ref();
            let result = match PackageId::parse(identifier) {
                Ok(id) => self.run(action, &id.owner, &id.name, &id.version).await,
                Err(e) => Err(PipelineError::from(e)),
            };

            if let Err(source) = result {
                self.reporter
                    .error("error", &format!("Failed to {} {}", action, identifier));
                return Err(BatchError {
                    action,
                    identifier: identifier.to_string(),
                    source,
                });
            }
        }

        Ok(identifiers.len())
    }
}
