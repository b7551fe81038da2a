//! Priority-ordered aggregation of registries

use super::{registry_hostname, Registry, RegistryError, WikiPageBackend};
use crate::core::package::Package;
use crate::core::report::Reporter;
use crate::core::secrets::SecretStore;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// Canonical community package listing, always searched last
pub const DEFAULT_REGISTRY_URL: &str = "https://github.com/clibs/clib/wiki/Packages";

/// A registry whose listing could not be fetched
#[derive(Debug)]
pub struct FetchFailure {
    pub url: String,
    pub error: RegistryError,
}

/// Owns the registries of one invocation, in search priority order.
///
/// Caller-supplied registries come first in the order given; exactly one
/// default listing registry is always appended after them.
pub struct RegistryManager {
    registries: Vec<Registry>,
    client: Client,
    reporter: Arc<dyn Reporter>,
}

impl RegistryManager {
    /// Build registries for `urls` followed by the default listing.
    pub fn init_registries(
        urls: &[String],
        secrets: &SecretStore,
        reporter: Arc<dyn Reporter>,
    ) -> Result<Self, RegistryError> {
        Self::init_registries_with_default(urls, secrets, DEFAULT_REGISTRY_URL, reporter)
    }

    /// Same as [`Self::init_registries`] with a custom default listing url.
    ///
    /// Urls that cannot become a registry are reported and skipped; the rest
    /// keep their relative order.
    pub fn init_registries_with_default(
        urls: &[String],
        secrets: &SecretStore,
        default_url: &str,
        reporter: Arc<dyn Reporter>,
    ) -> Result<Self, RegistryError> {
        let mut registries = Vec::with_capacity(urls.len() + 1);

        for url in urls {
            match create_registry(url, secrets) {
                Ok(registry) => registries.push(registry),
                Err(e) => {
                    reporter.warn("registry", &format!("ignoring registry {}: {}", url, e));
                }
            }
        }

        registries.push(default_registry(default_url)?);

        Ok(Self {
            registries,
            client: default_client(None)?,
            reporter,
        })
    }

    /// Wrap registries that were built elsewhere, keeping their order as given.
    pub fn from_registries(
        registries: Vec<Registry>,
        reporter: Arc<dyn Reporter>,
    ) -> Result<Self, RegistryError> {
        Ok(Self {
            registries,
            client: default_client(None)?,
            reporter,
        })
    }

    /// Replace the HTTP client used for fetching
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Fetch every registry in order.
    ///
    /// A failing registry is reported and skipped; the remaining ones are still fetched.
    pub async fn fetch_registries(&mut self) -> Vec<FetchFailure> {
        let mut failures = Vec::new();

        for registry in self.registries.iter_mut() {
            if let Err(error) = registry.fetch(&self.client).await {
                self.reporter.error(
                    "registry",
                    &format!("could not list packages from {}: {}", registry.get_url(), error),
                );
                failures.push(FetchFailure {
                    url: registry.get_url().to_string(),
                    error,
                });
            }
        }

        failures
    }

    /// First match for `id` across registries in priority order.
    pub fn find_package(&self, id: &str) -> Option<&Package> {
        self.find_package_with_registry(id).map(|(_, package)| package)
    }

    /// Like [`Self::find_package`], also returning the registry that served it.
    pub fn find_package_with_registry(&self, id: &str) -> Option<(&Registry, &Package)> {
        self.registries
            .iter()
            .find_map(|registry| registry.find_package(id).map(|package| (registry, package)))
    }

    /// Every package matching `query`, in registry priority then listing order
    pub fn search<'a>(
        &'a self,
        query: &'a str,
    ) -> impl Iterator<Item = (&'a Registry, &'a Package)> + 'a {
        self.registries.iter().flat_map(move |registry| {
            registry
                .packages()
                .filter(move |package| package.matches(query))
                .map(move |package| (registry, package))
        })
    }

    pub fn registries(&self) -> impl Iterator<Item = &Registry> {
        self.registries.iter()
    }

    pub fn len(&self) -> usize {
        self.registries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registries.is_empty()
    }
}

fn create_registry(url: &str, secrets: &SecretStore) -> Result<Registry, RegistryError> {
    let hostname = registry_hostname(url)?;
    let secret = secrets.find_for_hostname(&hostname);
    Registry::create(url, secret)
}

/// The default listing is always a wiki page, whatever its url looks like
fn default_registry(url: &str) -> Result<Registry, RegistryError> {
    let hostname = registry_hostname(url)?;
    Ok(Registry::with_backend(
        url,
        hostname,
        None,
        Box::new(WikiPageBackend::new(url)),
    ))
}

/// HTTP client shared by all registries of a manager
pub fn default_client(timeout: Option<Duration>) -> Result<Client, RegistryError> {
    let mut builder = Client::builder().user_agent(concat!("clib/", env!("CARGO_PKG_VERSION")));
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| RegistryError::Client(e.to_string()))
}
