//! TOML-based core configuration.
//!
//! Every field has a default, so an empty document is a valid config:
//!
//! ```toml
//! [database]
//! path = "/var/lib/studybadge/studybadge.db"
//!
//! [logging]
//! level = "info"
//! dir = "/var/log/studybadge"
//!
//! [notifications]
//! enabled = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULT_DB_FILE: &str = "studybadge.db";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

/// `[logging]`; file logging stays off while `dir` is unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub dir: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

fn default_db_path() -> PathBuf {
    PathBuf::from(DEFAULT_DB_FILE)
}

fn default_true() -> bool {
    true
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
        }
    }
}

impl CoreConfig {
    /// Reads and parses a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig};
    use std::path::PathBuf;

    #[test]
    fn empty_document_uses_defaults() {
        let config = CoreConfig::from_toml_str("").unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.database.path, PathBuf::from("studybadge.db"));
        assert!(config.notifications.enabled);
        assert!(config.logging.dir.is_none());
    }

    #[test]
    fn sections_override_defaults() {
        let config = CoreConfig::from_toml_str(
            r#"
            [database]
            path = "/tmp/study.db"

            [logging]
            level = "warn"
            dir = "/tmp/study-logs"

            [notifications]
            enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(config.database.path, PathBuf::from("/tmp/study.db"));
        assert_eq!(config.logging.level.as_deref(), Some("warn"));
        assert_eq!(config.logging.dir.as_deref(), Some("/tmp/study-logs"));
        assert!(!config.notifications.enabled);
    }

    #[test]
    fn malformed_document_is_a_parse_error() {
        let err = CoreConfig::from_toml_str("[database\npath = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_reads_file_and_reports_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("studybadge.toml");
        std::fs::write(&path, "[notifications]\nenabled = false\n").unwrap();

        let config = CoreConfig::load(&path).unwrap();
        assert!(!config.notifications.enabled);

        let missing = CoreConfig::load(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));
    }
}
