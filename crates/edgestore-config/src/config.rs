//! Configuration types

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File that failed to load
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The file extension maps to no known format
    #[error("Cannot infer configuration format from {0}")]
    UnknownFormat(PathBuf),

    /// The content is not valid for its format
    #[error("Parse error: {0}")]
    Parse(String),

    /// A value is outside its accepted range
    #[error("Invalid value for {field}: {message}")]
    InvalidValue {
        /// Dotted path of the offending field
        field: String,
        /// What is wrong with it
        message: String,
    },
}

impl ConfigError {
    fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

#[cfg(feature = "yaml")]
impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

#[cfg(feature = "toml")]
impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Top-level edgestore configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgestoreConfig {
    /// Which backend holds the graph
    pub storage: StorageConfig,
    /// Log output settings for the binary
    pub logging: LoggingConfig,
}

impl EdgestoreConfig {
    /// Check every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.storage.validate()?;
        self.logging.validate()
    }
}

/// Storage backend selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Backend kind
    pub backend: BackendKind,
    /// Settings used when `backend` is `sqlite`
    pub sqlite: SqliteSettings,
}

impl StorageConfig {
    /// Check the settings of the selected backend
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.backend {
            BackendKind::Memory => Ok(()),
            BackendKind::Sqlite => self.sqlite.validate(),
        }
    }
}

/// Available storage backends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Process memory; nothing survives exit
    Memory,
    /// A SQLite database file
    #[default]
    Sqlite,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => f.write_str("memory"),
            Self::Sqlite => f.write_str("sqlite"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(ConfigError::invalid(
                "storage.backend",
                format!("unknown backend '{}'", other),
            )),
        }
    }
}

/// SQLite database settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqliteSettings {
    /// Database file, or `:memory:`
    pub path: PathBuf,
    /// Enable write-ahead logging
    pub wal_mode: bool,
    /// Enforce foreign keys
    pub foreign_keys: bool,
    /// Lock wait before giving up, in milliseconds
    pub busy_timeout_ms: u32,
    /// SQLite `cache_size` pragma
    pub cache_size: i64,
    /// Memory-mapped bytes; 0 disables
    pub mmap_size: u64,
}

impl SqliteSettings {
    /// Reject settings SQLite cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.path.as_os_str().is_empty() {
            return Err(ConfigError::invalid(
                "storage.sqlite.path",
                "must not be empty",
            ));
        }
        if self.busy_timeout_ms == 0 {
            return Err(ConfigError::invalid(
                "storage.sqlite.busy_timeout_ms",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

impl Default for SqliteSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("edgestore.db"),
            wal_mode: true,
            foreign_keys: true,
            busy_timeout_ms: 5_000,
            cache_size: -64_000,
            mmap_size: 256 * 1024 * 1024,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogFormat {
    /// One JSON object per event
    #[serde(rename = "json")]
    Json,
    /// Single-line human readable
    #[serde(rename = "text")]
    #[default]
    Text,
    /// Multi-line human readable
    #[serde(rename = "pretty")]
    Pretty,
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `edgestore_sqlite=debug`
    pub level: String,
    /// Output format
    pub format: LogFormat,
}

impl LoggingConfig {
    /// Reject an empty filter directive
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.level.trim().is_empty() {
            return Err(ConfigError::invalid("logging.level", "must not be empty"));
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}
