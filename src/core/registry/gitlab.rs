//! Hosted-API registry backend (GitLab)
//!
//! The registry url names a GitLab project; its `README.md` is the listing, read
//! through the repository files API so private projects work with a token.

use super::{status_error, transport_error, RegistryBackend, RegistryError, RegistryKind};
use crate::core::package::{package_id_from_href, Package};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use url::Url;

/// File read from the registry project
const LISTING_FILE: &str = "README.md";

/// Branch the listing file is read from
const LISTING_REF: &str = "master";

#[allow(clippy::expect_used)]
static ENTRY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*[-*+]\s+\[([^\]]*)\]\(([^)\s]+)\)\s*(?:[-:]\s*)?(.*)$")
        .expect("static regex")
});

/// Backend reading the listing from a GitLab project
#[derive(Clone)]
pub struct HostedApiBackend {
    api_url: String,
    secret: Option<String>,
}

impl std::fmt::Debug for HostedApiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostedApiBackend")
            .field("api_url", &self.api_url)
            .field("has_secret", &self.secret.is_some())
            .finish()
    }
}

impl HostedApiBackend {
    pub fn new(registry_url: &Url, secret: Option<String>) -> Result<Self, RegistryError> {
        Ok(Self {
            api_url: listing_api_url(registry_url)?,
            secret,
        })
    }

    /// Endpoint the listing is fetched from
    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

#[async_trait::async_trait]
impl RegistryBackend for HostedApiBackend {
    fn kind(&self) -> RegistryKind {
        RegistryKind::HostedApi
    }

    async fn fetch_packages(&self, client: &Client) -> Result<Vec<Package>, RegistryError> {
        let mut request = client.get(&self.api_url);
        if let Some(ref secret) = self.secret {
            request = request.header("PRIVATE-TOKEN", secret);
        }

        let response = request
            .send()
            .await
            .map_err(|e| transport_error(&self.api_url, e))?;

        if !response.status().is_success() {
            return Err(status_error(&self.api_url, response.status()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| transport_error(&self.api_url, e))?;

        Ok(parse_listing_markdown(&body))
    }
}

/// GitLab repository-files url for the listing:
/// `{scheme}://{host[:port]}/api/v4/projects/{encoded path}/repository/files/README.md/raw?ref=master`
pub fn listing_api_url(registry_url: &Url) -> Result<String, RegistryError> {
    let host = registry_url
        .host_str()
        .ok_or_else(|| RegistryError::InvalidUrl {
            url: registry_url.to_string(),
            reason: "url has no host".to_string(),
        })?;

    let project = registry_url
        .path()
        .trim_matches('/')
        .trim_end_matches(".git");
    if project.is_empty() {
        return Err(RegistryError::InvalidUrl {
            url: registry_url.to_string(),
            reason: "url does not name a project".to_string(),
        });
    }

    let authority = match registry_url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };
    let encoded: String = url::form_urlencoded::byte_serialize(project.as_bytes()).collect();

    Ok(format!(
        "{}://{}/api/v4/projects/{}/repository/files/{}/raw?ref={}",
        registry_url.scheme(),
        authority,
        encoded,
        LISTING_FILE,
        LISTING_REF
    ))
}

/// Extract packages from listing markdown.
///
/// `#` headings set the category; `- [text](href) - description` items are packages.
pub fn parse_listing_markdown(markdown: &str) -> Vec<Package> {
    let mut packages = Vec::new();
    let mut category = String::new();

    for line in markdown.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with('#') {
            category = trimmed.trim_start_matches('#').trim().to_string();
            continue;
        }

        let Some(captures) = ENTRY_PATTERN.captures(line) else {
            continue;
        };
        let href = &captures[2];
        let Some(id) = package_id_from_href(href) else {
            continue;
        };

        packages.push(Package {
            id,
            href: href.to_string(),
            description: captures[3].trim().to_string(),
            category: category.clone(),
        });
    }

    packages
}
