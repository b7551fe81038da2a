//! Package descriptor (`package.json`) lookups

use serde_json::Value;
use std::path::{Path, PathBuf};

/// Descriptor file name at the root of an extracted package
pub const DESCRIPTOR_FILE: &str = "package.json";

/// Why a descriptor could not supply a value
#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    #[error("descriptor not found: {0}")]
    NotFound(PathBuf),

    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid descriptor {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("descriptor {path} is not a JSON object")]
    NotAnObject { path: PathBuf },
}

/// Parsed `package.json`
#[derive(Debug, Clone)]
pub struct Descriptor {
    root: serde_json::Map<String, Value>,
}

impl Descriptor {
    /// Read the descriptor from a package directory
    pub fn load(package_dir: &Path) -> Result<Self, DescriptorError> {
        let path = package_dir.join(DESCRIPTOR_FILE);
        if !path.exists() {
            return Err(DescriptorError::NotFound(path));
        }

        let content = std::fs::read_to_string(&path).map_err(|source| DescriptorError::Io {
            path: path.clone(),
            source,
        })?;

        Self::parse(&content).map_err(|e| match e {
            DescriptorError::Parse { message, .. } => DescriptorError::Parse {
                path: path.clone(),
                message,
            },
            DescriptorError::NotAnObject { .. } => DescriptorError::NotAnObject {
                path: path.clone(),
            },
            other => other,
        })
    }

    pub fn parse(content: &str) -> Result<Self, DescriptorError> {
        let value: Value = serde_json::from_str(content).map_err(|e| DescriptorError::Parse {
            path: PathBuf::from(DESCRIPTOR_FILE),
            message: e.to_string(),
        })?;

        match value {
            Value::Object(root) => Ok(Self { root }),
            _ => Err(DescriptorError::NotAnObject {
                path: PathBuf::from(DESCRIPTOR_FILE),
            }),
        }
    }

    /// A string field; non-string values count as absent.
    pub fn string_field(&self, field: &str) -> Option<&str> {
        self.root.get(field).and_then(Value::as_str)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_string_fields() {
        let descriptor = Descriptor::parse(
            r#"{"name": "buffer", "version": "0.4.0", "uninstall": "rm -rf build", "install": 3}"#,
        )
        .unwrap();
        assert_eq!(descriptor.string_field("name"), Some("buffer"));
        assert_eq!(descriptor.string_field("version"), Some("0.4.0"));
        assert_eq!(descriptor.string_field("uninstall"), Some("rm -rf build"));
        assert_eq!(descriptor.string_field("install"), None);
        assert_eq!(descriptor.string_field("missing"), None);
    }

    #[test]
    fn test_load_missing() {
        let temp_dir = TempDir::new().unwrap();
        let err = Descriptor::load(temp_dir.path()).unwrap_err();
        assert!(matches!(err, DescriptorError::NotFound(_)));
    }

    #[test]
    fn test_load_invalid_json_names_file() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(DESCRIPTOR_FILE), "{ not json").unwrap();

        match Descriptor::load(temp_dir.path()).unwrap_err() {
            DescriptorError::Parse { path, .. } => {
                assert_eq!(path, temp_dir.path().join(DESCRIPTOR_FILE))
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_load_rejects_non_object() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(DESCRIPTOR_FILE), "\"just a string\"").unwrap();
        assert!(matches!(
            Descriptor::load(temp_dir.path()),
            Err(DescriptorError::NotAnObject { .. })
        ));
    }
}
