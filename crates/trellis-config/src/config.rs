use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Log levels accepted in `[logging] level`
pub const LOG_LEVELS: &[&str] = &["off", "error", "warn", "info", "debug", "trace"];

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// File that was being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for this schema
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// File that was being parsed
        path: PathBuf,
        /// Underlying TOML error
        #[source]
        source: toml::de::Error,
    },

    /// A field holds a value outside its allowed range
    #[error("invalid value '{value}' for {field}")]
    InvalidValue {
        /// Dotted field name
        field: String,
        /// Offending value
        value: String,
    },
}

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TrellisConfig {
    /// Where the address book is persisted
    pub storage: StorageConfig,

    /// Log output settings
    pub logging: LoggingConfig,
}

/// Snapshot storage settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file holding contacts and the tag hierarchy
    pub data_file: PathBuf,

    /// Write indented JSON instead of a single line
    pub pretty_json: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            pretty_json: true,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of [`LOG_LEVELS`]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl TrellisConfig {
    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, the file at
    /// [`default_config_path`] is used when present and defaults otherwise.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        match path {
            Some(path) => Self::load_file(path),
            None => {
                let path = default_config_path();
                if path.exists() {
                    Self::load_file(&path)
                } else {
                    debug!(path = %path.display(), "no config file, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load and validate a specific file
    pub fn load_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> ConfigResult<Self> {
        let mut config: TrellisConfig = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.normalize()?;
        Ok(config)
    }

    /// Override the data file, as done by `--data-file`
    pub fn with_data_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage.data_file = expand_path(&path.into());
        self
    }

    fn normalize(&mut self) -> ConfigResult<()> {
        self.logging.level = self.logging.level.trim().to_ascii_lowercase();
        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                value: self.logging.level.clone(),
            });
        }
        if self.storage.data_file.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "storage.data_file".to_string(),
                value: String::new(),
            });
        }
        self.storage.data_file = expand_path(&self.storage.data_file);
        Ok(())
    }
}

/// `~/.config/trellis/config.toml` or the platform equivalent
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("trellis")
        .join("config.toml")
}

/// `~/.local/share/trellis/addressbook.json` or the platform equivalent
pub fn default_data_file() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("data"))
        .join("trellis")
        .join("addressbook.json")
}

fn expand_path(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(raw) => PathBuf::from(shellexpand::tilde(raw).as_ref()),
        None => path.to_path_buf(),
    }
}
