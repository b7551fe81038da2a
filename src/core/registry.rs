//! Remote package registries
//!
//! A [`Registry`] is one remote source of package listings. How the listing is
//! obtained depends on the backend chosen when the registry is created:
//!
//! - [`wiki::WikiPageBackend`] scrapes an HTML listing page (GitHub wiki).
//! - [`gitlab::HostedApiBackend`] reads the listing through the GitLab API, using the
//!   registry's credential when one is configured.
//!
//! Registries are aggregated in priority order by [`manager::RegistryManager`].

pub mod gitlab;
pub mod manager;
pub mod wiki;

pub use gitlab::HostedApiBackend;
pub use manager::{FetchFailure, RegistryManager, DEFAULT_REGISTRY_URL};
pub use wiki::WikiPageBackend;

use crate::core::package::Package;
use reqwest::Client;
use std::fmt;
use url::Url;

/// Registry-related errors
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Unknown registry kind for {0}")]
    UnknownKind(String),

    #[error("Invalid registry url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("Unauthorized for {url} (HTTP {status})")]
    Unauthorized { url: String, status: u16 },

    #[error("Listing not found at {0}")]
    NotFound(String),

    #[error("Request to {url} failed: HTTP {status}")]
    Http { url: String, status: u16 },

    #[error("Malformed listing from {url}: {reason}")]
    Malformed { url: String, reason: String },

    #[error("Failed to create HTTP client: {0}")]
    Client(String),
}

/// Backend family a registry url belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryKind {
    WikiPage,
    HostedApi,
}

impl RegistryKind {
    /// Classify a registry url; order matters, the first family that matches wins.
    pub fn classify(url: &str) -> Option<Self> {
        const FAMILIES: &[(&str, RegistryKind)] = &[
            ("github.com", RegistryKind::WikiPage),
            ("gitlab", RegistryKind::HostedApi),
        ];

        FAMILIES
            .iter()
            .find(|(pattern, _)| url.contains(pattern))
            .map(|(_, kind)| *kind)
    }
}

impl fmt::Display for RegistryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryKind::WikiPage => write!(f, "wiki"),
            RegistryKind::HostedApi => write!(f, "gitlab"),
        }
    }
}

/// Listing capability every backend provides
#[async_trait::async_trait]
pub trait RegistryBackend: Send + Sync {
    fn kind(&self) -> RegistryKind;

    /// Retrieve the complete listing; partial listings are never returned.
    async fn fetch_packages(&self, client: &Client) -> Result<Vec<Package>, RegistryError>;
}

/// One remote source of packages
pub struct Registry {
    url: String,
    hostname: String,
    secret: Option<String>,
    backend: Box<dyn RegistryBackend>,
    packages: Option<Vec<Package>>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("url", &self.url)
            .field("hostname", &self.hostname)
            .field("kind", &self.backend.kind())
            .field("has_secret", &self.secret.is_some())
            .field("packages", &self.packages.as_ref().map(Vec::len))
            .finish()
    }
}

impl Registry {
    /// Create a registry for `url`, picking the backend from the url itself.
    ///
    /// Urls that match no known backend yield [`RegistryError::UnknownKind`].
    pub fn create(url: &str, secret: Option<&str>) -> Result<Self, RegistryError> {
        let kind = RegistryKind::classify(url)
            .ok_or_else(|| RegistryError::UnknownKind(url.to_string()))?;
        let parsed = parse_registry_url(url)?;
        let hostname = hostname_of(&parsed, url)?;
        let secret = secret.map(str::to_string);

        let backend: Box<dyn RegistryBackend> = match kind {
            RegistryKind::WikiPage => Box::new(WikiPageBackend::new(url)),
            RegistryKind::HostedApi => Box::new(HostedApiBackend::new(&parsed, secret.clone())?),
        };

        Ok(Self::with_backend(url, hostname, secret, backend))
    }

    /// Create a registry around an already built backend
    pub fn with_backend(
        url: impl Into<String>,
        hostname: impl Into<String>,
        secret: Option<String>,
        backend: Box<dyn RegistryBackend>,
    ) -> Self {
        Self {
            url: url.into(),
            hostname: hostname.into(),
            secret,
            backend,
            packages: None,
        }
    }

    pub fn get_url(&self) -> &str {
        &self.url
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn kind(&self) -> RegistryKind {
        self.backend.kind()
    }

    pub fn has_secret(&self) -> bool {
        self.secret.is_some()
    }

    /// Whether a fetch has succeeded; an empty listing still counts as fetched.
    pub fn is_fetched(&self) -> bool {
        self.packages.is_some()
    }

    /// Fetch the listing. On failure the previous listing state is left untouched.
    pub async fn fetch(&mut self, client: &Client) -> Result<(), RegistryError> {
        let packages = self.backend.fetch_packages(client).await?;
        tracing::debug!(
            "Fetched {} packages from {} registry {}",
            packages.len(),
            self.backend.kind(),
            self.url
        );
        self.packages = Some(packages);
        Ok(())
    }

    /// Packages in listing order; empty until a fetch succeeds.
    pub fn packages(&self) -> impl Iterator<Item = &Package> + '_ {
        self.packages.iter().flatten()
    }

    /// First package whose id equals `id`. Never fetches implicitly.
    pub fn find_package(&self, id: &str) -> Option<&Package> {
        self.packages().find(|p| p.id == id)
    }
}

fn parse_registry_url(url: &str) -> Result<Url, RegistryError> {
    Url::parse(url).map_err(|e| RegistryError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

fn hostname_of(parsed: &Url, url: &str) -> Result<String, RegistryError> {
    parsed
        .host_str()
        .map(str::to_string)
        .ok_or_else(|| RegistryError::InvalidUrl {
            url: url.to_string(),
            reason: "url has no host".to_string(),
        })
}

/// Hostname of a registry url, used to look up its credential
pub fn registry_hostname(url: &str) -> Result<String, RegistryError> {
    let parsed = parse_registry_url(url)?;
    hostname_of(&parsed, url)
}

/// Map a non-success listing response status onto a registry error
pub(crate) fn status_error(url: &str, status: reqwest::StatusCode) -> RegistryError {
    match status.as_u16() {
        401 | 403 => RegistryError::Unauthorized {
            url: url.to_string(),
            status: status.as_u16(),
        },
        404 => RegistryError::NotFound(url.to_string()),
        code => RegistryError::Http {
            url: url.to_string(),
            status: code,
        },
    }
}

pub(crate) fn transport_error(url: &str, err: reqwest::Error) -> RegistryError {
    RegistryError::Transport {
        url: url.to_string(),
        message: err.to_string(),
    }
}
