//! Package listings and package identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Version used when an identifier carries no `@version` suffix
pub const DEFAULT_VERSION: &str = "master";

/// A package entry from a registry listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// `namespace/name`
    pub id: String,
    pub href: String,
    pub description: String,
    pub category: String,
}

impl Package {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn href(&self) -> &str {
        &self.href
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// Case-insensitive match against id and description
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.id.to_lowercase().contains(&query) || self.description.to_lowercase().contains(&query)
    }
}

/// Derive a `namespace/name` id from a listing link target.
///
/// Only absolute http(s) links with at least two path segments qualify:
/// `https://github.com/clibs/buffer` -> `clibs/buffer`.
pub fn package_id_from_href(href: &str) -> Option<String> {
    let parsed = Url::parse(href.trim()).ok()?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return None;
    }

    let mut segments = parsed.path_segments()?.filter(|s| !s.is_empty());
    let namespace = segments.next()?;
    let name = segments.next()?.trim_end_matches(".git");
    if name.is_empty() {
        return None;
    }

    Some(format!("{}/{}", namespace, name))
}

/// Errors raised while parsing a package identifier
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PackageIdError {
    #[error("missing owner in '{0}' (expected owner/name[@version])")]
    MissingOwner(String),

    #[error("missing name in '{0}' (expected owner/name[@version])")]
    MissingName(String),

    #[error("empty version in '{0}'")]
    MissingVersion(String),
}

/// A package reference given on the command line: `owner/name[@version]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageId {
    pub owner: String,
    pub name: String,
    pub version: String,
}

impl PackageId {
    pub fn parse(input: &str) -> Result<Self, PackageIdError> {
        let input = input.trim();
        let (repo, version) = match input.split_once('@') {
            Some((repo, version)) => {
                if version.is_empty() {
                    return Err(PackageIdError::MissingVersion(input.to_string()));
                }
                (repo, version)
            }
            None => (input, DEFAULT_VERSION),
        };

        let (owner, name) = repo
            .split_once('/')
            .ok_or_else(|| PackageIdError::MissingOwner(input.to_string()))?;
        if owner.is_empty() {
            return Err(PackageIdError::MissingOwner(input.to_string()));
        }
        if name.is_empty() || name.contains('/') {
            return Err(PackageIdError::MissingName(input.to_string()));
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
            version: version.to_string(),
        })
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.owner, self.name, self.version)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_package_id_from_href() {
        assert_eq!(
            package_id_from_href("https://github.com/clibs/buffer").as_deref(),
            Some("clibs/buffer")
        );
        assert_eq!(
            package_id_from_href("https://gitlab.com/group/lib.git/").as_deref(),
            Some("group/lib")
        );
        assert_eq!(
            package_id_from_href("https://github.com/stephenmathieson/trim.c/tree/master")
                .as_deref(),
            Some("stephenmathieson/trim.c")
        );
    }

    #[test]
    fn test_package_id_from_href_rejects_non_repos() {
        assert_eq!(package_id_from_href("#fragment"), None);
        assert_eq!(package_id_from_href("/relative/path"), None);
        assert_eq!(package_id_from_href("https://github.com/clibs"), None);
        assert_eq!(package_id_from_href("mailto:someone@example.com"), None);
    }

    #[test]
    fn test_parse_package_id() {
        let id = PackageId::parse("clibs/buffer@0.4.0").unwrap();
        assert_eq!(id.owner, "clibs");
        assert_eq!(id.name, "buffer");
        assert_eq!(id.version, "0.4.0");
        assert_eq!(id.to_string(), "clibs/buffer@0.4.0");
    }

    #[test]
    fn test_parse_package_id_defaults_version() {
        let id = PackageId::parse("clibs/list").unwrap();
        assert_eq!(id.version, DEFAULT_VERSION);
    }

    #[test]
    fn test_parse_package_id_errors() {
        assert_eq!(
            PackageId::parse("buffer"),
            Err(PackageIdError::MissingOwner("buffer".to_string()))
        );
        assert!(matches!(
            PackageId::parse("/buffer"),
            Err(PackageIdError::MissingOwner(_))
        ));
        assert!(matches!(
            PackageId::parse("clibs/"),
            Err(PackageIdError::MissingName(_))
        ));
        assert!(matches!(
            PackageId::parse("clibs/buffer@"),
            Err(PackageIdError::MissingVersion(_))
        ));
    }

    #[test]
    fn test_package_matches_query() {
        let pkg = Package {
            id: "clibs/buffer".to_string(),
            href: "https://github.com/clibs/buffer".to_string(),
            description: "Tiny C String Library".to_string(),
            category: "String manipulation".to_string(),
        };
        assert!(pkg.matches("BUFFER"));
        assert!(pkg.matches("string"));
        assert!(!pkg.matches("json"));
    }
}
