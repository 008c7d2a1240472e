// src/config.rs

//! Runtime configuration
//!
//! Loaded from TOML. Every field has a default, so an empty file (or no
//! file at all) is valid. CLI flags override what is loaded here.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};
use tracing::debug;

/// Default system-wide configuration file
pub const DEFAULT_CONFIG_PATH: &str = "/etc/epoch-audit/config.toml";

/// Environment variable naming an alternate configuration file
pub const CONFIG_ENV: &str = "EPOCH_AUDIT_CONFIG";

/// Default snapshot archive
pub const DEFAULT_SNAPSHOT_URL: &str = "https://snapshot.debian.org";

/// Default summary cache location
pub const DEFAULT_CACHE_PATH: &str = "/var/cache/epoch-audit/summaries.db";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Base URL of the snapshot archive
    pub snapshot_url: String,
    /// SQLite file holding minimized summaries
    pub cache_path: PathBuf,
    /// Concurrent history fetches while seeding
    pub jobs: usize,
    /// Per-request HTTP timeout
    pub http_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snapshot_url: DEFAULT_SNAPSHOT_URL.to_string(),
            cache_path: PathBuf::from(DEFAULT_CACHE_PATH),
            jobs: 4,
            http_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load configuration
    ///
    /// An explicit path must exist. Without one, `$EPOCH_AUDIT_CONFIG` and
    /// then the system path are tried, falling back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        let candidate = env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

        if candidate.exists() {
            Self::from_file(&candidate)
        } else {
            debug!("No configuration file at {}, using defaults", candidate.display());
            Ok(Self::default())
        }
    }

    /// Parse a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!("Failed to read {}: {e}", path.display()))
        })?;
        let config = Self::from_toml(&text)
            .map_err(|e| Error::ConfigError(format!("{}: {e}", path.display())))?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| Error::ConfigError(e.to_string()))?;
        if config.jobs == 0 {
            return Err(Error::ConfigError("jobs must be at least 1".to_string()));
        }
        Ok(config)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_config() {
        let config = Config::from_toml(
            r#"
            snapshot_url = "http://snapshot.local"
            jobs = 8
            "#,
        )
        .unwrap();

        assert_eq!(config.snapshot_url, "http://snapshot.local");
        assert_eq!(config.jobs, 8);
        assert_eq!(config.cache_path, PathBuf::from(DEFAULT_CACHE_PATH));
        assert_eq!(config.http_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(matches!(
            Config::from_toml("snapshot_host = \"x\""),
            Err(Error::ConfigError(_))
        ));
    }

    #[test]
    fn test_zero_jobs_rejected() {
        assert!(Config::from_toml("jobs = 0").is_err());
    }

    #[test]
    fn test_explicit_missing_path_is_error() {
        let result = Config::load(Some(Path::new("/nonexistent/epoch-audit.toml")));
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_load_from_file() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "cache_path = \"/tmp/summaries.db\"\n").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.cache_path, PathBuf::from("/tmp/summaries.db"));
    }
}
