use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::types::ChannelSettings;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

impl ChannelSettings {
    /// Loads channel settings from a TOML file.
    ///
    /// Missing keys fall back to defaults. Returns an error if reading,
    /// parsing, or validation fails.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let settings: ChannelSettings =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                source: e,
            })?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backlog_warning == 0 {
            return Err(ConfigError::ValidationError {
                message: "backlog_warning must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
