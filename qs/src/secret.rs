//! Operator secret loading

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::SECRET_KEY_VAR;

/// Errors raised while reading the secret file
#[derive(Debug, Error)]
pub enum SecretError {
    #[error("Secret file {path} could not be read")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{var} not found in secret file {path}")]
    Missing { var: &'static str, path: PathBuf },
}

/// Process-wide secret used to key the store and answer digests
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(Vec<u8>);

impl Secret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Read `SECRET_KEY=...` from an env-style file
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self, SecretError> {
        let path = path.as_ref();
        debug!(?path, "Secret::from_env_file: called");
        let content = fs::read_to_string(path).map_err(|source| SecretError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

        parse_env(&content).map(Self::new).ok_or_else(|| SecretError::Missing {
            var: SECRET_KEY_VAR,
            path: path.to_path_buf(),
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret(<{} bytes>)", self.0.len())
    }
}

fn parse_env(content: &str) -> Option<String> {
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        if key.trim() != SECRET_KEY_VAR {
            continue;
        }
        let value = unquote(value.trim());
        if value.is_empty() {
            return None;
        }
        return Some(value.to_string());
    }
    None
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_env_skips_comments() {
        let content = "# bashquest\n\nOTHER=1\nSECRET_KEY=hunter2\n";
        assert_eq!(parse_env(content), Some("hunter2".to_string()));
    }

    #[test]
    fn test_parse_env_keeps_equals_in_value() {
        assert_eq!(parse_env("SECRET_KEY=a=b=c"), Some("a=b=c".to_string()));
    }

    #[test]
    fn test_parse_env_strips_quotes() {
        assert_eq!(parse_env("SECRET_KEY=\"quoted value\""), Some("quoted value".to_string()));
        assert_eq!(parse_env("SECRET_KEY='single'"), Some("single".to_string()));
    }

    #[test]
    fn test_parse_env_empty_value_is_missing() {
        assert_eq!(parse_env("SECRET_KEY="), None);
        assert_eq!(parse_env("SECRET_KEY=\"\""), None);
    }

    #[test]
    fn test_from_env_file_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = Secret::from_env_file(temp.path().join("env")).unwrap_err();
        assert!(matches!(err, SecretError::Unreadable { .. }));
    }

    #[test]
    fn test_from_env_file_without_key() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("env");
        fs::write(&path, "NOT_THE_KEY=x\n").unwrap();

        let err = Secret::from_env_file(&path).unwrap_err();
        assert!(matches!(err, SecretError::Missing { .. }));
        assert!(err.to_string().contains("SECRET_KEY"));
    }

    #[test]
    fn test_debug_hides_bytes() {
        let secret = Secret::new("topsecret");
        let shown = format!("{:?}", secret);
        assert!(!shown.contains("topsecret"));
        assert!(shown.contains("9 bytes"));
    }
}
