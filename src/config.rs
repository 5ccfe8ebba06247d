//! TOML-backed board configuration.
//!
//! Every section and key is optional; missing values take the defaults shown
//! below.
//!
//! ```toml
//! [unit_of_work]
//! mode = "staged"
//!
//! [tasks]
//! default_status = "active"
//! default_priority = "medium"
//! member_role = "member"
//!
//! [logging]
//! filter = "info,taskboard=debug"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::ports::TransactionMode;
use crate::services::TaskSettings;

/// Filter used when neither `RUST_LOG` nor the configuration sets one.
pub const DEFAULT_LOG_FILTER: &str = "info,taskboard=debug";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Transaction behaviour of the unit of work.
    pub unit_of_work: UnitOfWorkConfig,
    /// Defaults for task creation.
    pub tasks: TaskSettings,
    /// Log output settings.
    pub logging: LoggingConfig,
}

/// Unit-of-work section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitOfWorkConfig {
    /// Whether writes inside a transaction are staged or applied immediately.
    pub mode: TransactionMode,
}

/// Logging section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive string.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_owned(),
        }
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration from {path}: {source}")]
    Io {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration text is not valid TOML for [`BoardConfig`].
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

impl BoardConfig {
    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown enum
    /// values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read and
    /// [`ConfigError::Parse`] when its content is invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), mode = ?config.unit_of_work.mode, "configuration loaded");
        Ok(config)
    }
}
