//! Bashquest configuration types and loading

use eyre::{Context, Result};
use queststore::Secret;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::challenge::builtin::DEFAULT_ORDER;
use crate::challenge::{Catalog, Registry};

/// Name of the active-workspace pointer file inside the state directory
const POINTER_FILE: &str = "active-workspace";

/// Main Bashquest configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Ordered challenge manifest
    pub challenges: Vec<String>,

    /// Workspace used when none is given on the command line
    pub workspace: PathBuf,

    /// Env-style file holding `SECRET_KEY`
    #[serde(rename = "secret-file")]
    pub secret_file: PathBuf,

    /// Operator data directory (active-workspace pointer)
    #[serde(rename = "state-dir")]
    pub state_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        let data_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            challenges: DEFAULT_ORDER.iter().map(|id| id.to_string()).collect(),
            workspace: PathBuf::from("workspace"),
            secret_file: config_dir.join("bashquest").join("env"),
            state_dir: data_dir.join("bashquest"),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, it must load
        if let Some(path) = config_path {
            return Self::load_from_file(path).with_context(|| format!("Failed to load config from {}", path.display()));
        }

        // Project-local .bashquest.yml, then ~/.config/bashquest/bashquest.yml
        let mut candidates = vec![PathBuf::from(".bashquest.yml")];
        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join("bashquest").join("bashquest.yml"));
        }
        Self::load_first(&candidates)
    }

    /// Load the first candidate that exists; a file that exists but fails to load is an error
    fn load_first(candidates: &[PathBuf]) -> Result<Self> {
        match candidates.iter().find(|path| path.exists()) {
            Some(path) => {
                Self::load_from_file(path).with_context(|| format!("Failed to load config from {}", path.display()))
            }
            None => {
                tracing::info!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let mut config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        config.workspace = expand(&config.workspace);
        config.secret_file = expand(&config.secret_file);
        config.state_dir = expand(&config.state_dir);

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Active-workspace pointer location
    pub fn pointer_path(&self) -> PathBuf {
        self.state_dir.join(POINTER_FILE)
    }

    /// Read the operator secret
    pub fn load_secret(&self) -> Result<Secret> {
        Secret::from_env_file(&self.secret_file)
            .with_context(|| format!("Failed to load secret from {}", self.secret_file.display()))
    }

    /// Resolve the manifest against `catalog`
    pub fn load_registry(&self, catalog: &Catalog) -> Result<Registry> {
        Registry::load(&self.challenges, catalog).context("Invalid challenge manifest")
    }
}

/// Log file location, under the platform's local data directory
pub fn log_file() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("bashquest")
        .join("logs")
        .join("bashquest.log")
}

/// Resolve a leading `~/` against the home directory
fn expand(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::LoadError;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.challenges.len(), DEFAULT_ORDER.len());
        assert_eq!(config.challenges[0], "cat_file");
        assert_eq!(config.workspace, PathBuf::from("workspace"));
        assert!(config.secret_file.ends_with("bashquest/env"));
        assert!(config.pointer_path().starts_with(&config.state_dir));
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
challenges:
  - cat_file
  - mkdir_single_directory
workspace: /tmp/quest
secret-file: /etc/bashquest/env
state-dir: /var/lib/bashquest
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.challenges, vec!["cat_file", "mkdir_single_directory"]);
        assert_eq!(config.workspace, PathBuf::from("/tmp/quest"));
        assert_eq!(config.secret_file, PathBuf::from("/etc/bashquest/env"));
        assert_eq!(config.pointer_path(), PathBuf::from("/var/lib/bashquest/active-workspace"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
workspace: quest
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.workspace, PathBuf::from("quest"));
        assert_eq!(config.challenges.len(), DEFAULT_ORDER.len());
    }

    #[test]
    fn test_explicit_config_must_exist() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.yml");

        assert!(Config::load(Some(&missing)).is_err());
    }

    #[test]
    fn test_load_from_explicit_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bashquest.yml");
        fs::write(&path, "challenges: [list_dir]\nsecret-file: ~/quest.env\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.challenges, vec!["list_dir"]);
        if let Some(home) = dirs::home_dir() {
            assert_eq!(config.secret_file, home.join("quest.env"));
        }
    }

    #[test]
    fn test_log_file_under_data_dir() {
        let path = log_file();
        assert!(path.ends_with("bashquest/logs/bashquest.log"));
        if let Some(data) = dirs::data_local_dir() {
            assert!(path.starts_with(data));
        }
    }

    #[test]
    fn test_fallback_takes_first_existing() {
        let temp = TempDir::new().unwrap();
        let local = temp.path().join("local.yml");
        let user = temp.path().join("user.yml");
        fs::write(&user, "challenges: [list_dir]\n").unwrap();

        let config = Config::load_first(&[local.clone(), user.clone()]).unwrap();
        assert_eq!(config.challenges, vec!["list_dir"]);

        fs::write(&local, "challenges: [cat_file]\n").unwrap();
        let config = Config::load_first(&[local, user]).unwrap();
        assert_eq!(config.challenges, vec!["cat_file"]);
    }

    #[test]
    fn test_fallback_without_files_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let config = Config::load_first(&[temp.path().join("missing.yml")]).unwrap();
        assert_eq!(config.challenges.len(), DEFAULT_ORDER.len());
    }

    #[test]
    fn test_invalid_fallback_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let local = temp.path().join("local.yml");
        let user = temp.path().join("user.yml");
        fs::write(&local, "challenges: cat_file\n").unwrap();
        fs::write(&user, "challenges: [list_dir]\n").unwrap();

        let err = Config::load_first(&[local, user]).unwrap_err();
        assert!(format!("{:?}", err).contains("local.yml"));
    }

    #[test]
    fn test_load_secret() {
        let temp = TempDir::new().unwrap();
        let config = Config {
            secret_file: temp.path().join("env"),
            ..Config::default()
        };
        assert!(config.load_secret().is_err());

        fs::write(&config.secret_file, "SECRET_KEY=hunter2\n").unwrap();
        assert_eq!(config.load_secret().unwrap().as_bytes(), b"hunter2");
    }

    #[test]
    fn test_load_registry_rejects_unknown_id() {
        let config = Config {
            challenges: vec!["cat_file".into(), "no_such_thing".into()],
            ..Config::default()
        };

        let err = config.load_registry(&Catalog::builtin()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<LoadError>(),
            Some(&LoadError::UnknownChallenge("no_such_thing".into()))
        );
    }
}
