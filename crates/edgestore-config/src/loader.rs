//! Configuration loading

use std::path::Path;

use tracing::{debug, info};

use crate::config::{ConfigError, EdgestoreConfig};

/// Prefix of every environment override
pub const ENV_PREFIX: &str = "EDGESTORE_";

/// Serialization format of a configuration source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML document
    Yaml,
    /// TOML document
    Toml,
    /// JSON document
    Json,
    /// Infer from the file extension
    Auto,
}

impl ConfigFormat {
    /// Map a file extension to its format
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Loads [`EdgestoreConfig`] from files, strings and the environment
pub struct ConfigLoader;

impl ConfigLoader {
    /// Read, parse, apply environment overrides and validate a configuration file
    pub async fn load_from_file(path: impl AsRef<Path>) -> Result<EdgestoreConfig, ConfigError> {
        let path = path.as_ref();
        let format =
            ConfigFormat::from_path(path).ok_or_else(|| ConfigError::UnknownFormat(path.into()))?;

        info!(path = %path.display(), ?format, "Loading configuration");
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let mut config = Self::load_from_str(&content, format)?;
        Self::apply_env_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Like [`Self::load_from_file`], but fall back to defaults when `path` is `None`
    pub async fn load_or_default(path: Option<&Path>) -> Result<EdgestoreConfig, ConfigError> {
        match path {
            Some(path) => Self::load_from_file(path).await,
            None => {
                let mut config = EdgestoreConfig::default();
                Self::apply_env_overrides(&mut config);
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Parse configuration text. `Auto` tries TOML, then YAML.
    pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<EdgestoreConfig, ConfigError> {
        match format {
            #[cfg(feature = "yaml")]
            ConfigFormat::Yaml => Ok(serde_yaml::from_str(content)?),
            #[cfg(not(feature = "yaml"))]
            ConfigFormat::Yaml => Err(ConfigError::Parse("YAML support is disabled".into())),
            #[cfg(feature = "toml")]
            ConfigFormat::Toml => Ok(toml::from_str(content)?),
            #[cfg(not(feature = "toml"))]
            ConfigFormat::Toml => Err(ConfigError::Parse("TOML support is disabled".into())),
            ConfigFormat::Json => Ok(serde_json::from_str(content)?),
            ConfigFormat::Auto => Self::load_from_str(content, ConfigFormat::Toml)
                .or_else(|_| Self::load_from_str(content, ConfigFormat::Yaml)),
        }
    }

    /// Apply `EDGESTORE_*` variables from the process environment
    pub fn apply_env_overrides(config: &mut EdgestoreConfig) {
        Self::apply_overrides_from(config, |key| std::env::var(key).ok());
    }

    /// Apply overrides read through `lookup`.
    ///
    /// Recognised keys: `EDGESTORE_BACKEND`, `EDGESTORE_DB_PATH`, `EDGESTORE_LOG_LEVEL`.
    /// Values that do not parse are ignored.
    pub fn apply_overrides_from<F>(config: &mut EdgestoreConfig, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

        if let Some(backend) = var("BACKEND").and_then(|v| v.parse().ok()) {
            debug!(%backend, "Backend overridden from environment");
            config.storage.backend = backend;
        }
        if let Some(path) = var("DB_PATH") {
            debug!(path = %path, "Database path overridden from environment");
            config.storage.sqlite.path = path.into();
        }
        if let Some(level) = var("LOG_LEVEL") {
            config.logging.level = level;
        }
    }
}
