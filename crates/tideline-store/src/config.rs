//! Configuration loading and typed config structures for the event store.
//!
//! The store has a single tunable: how many entries a range cursor pulls
//! from the index per lock acquisition. Larger batches mean fewer lock
//! round-trips; smaller batches mean a cursor reflects concurrent writes
//! more promptly.

use std::path::Path;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but holds an unusable value.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Event store configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct StoreConfig {
    /// Maximum number of index entries a cursor buffers per refill.
    #[serde(default = "default_cursor_batch_size")]
    pub cursor_batch_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            cursor_batch_size: default_cursor_batch_size(),
        }
    }
}

impl StoreConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `cursor_batch_size` is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cursor_batch_size == 0 {
            return Err(ConfigError::Invalid {
                reason: "cursor_batch_size must be at least 1".to_owned(),
            });
        }
        Ok(())
    }
}

const fn default_cursor_batch_size() -> usize {
    64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = StoreConfig::default();
        assert_eq!(config.cursor_batch_size, 64);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_full_yaml() {
        let config = StoreConfig::parse("cursor_batch_size: 8\n");
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();
        assert_eq!(config.cursor_batch_size, 8);
    }

    #[test]
    fn parse_empty_yaml() {
        let config = StoreConfig::parse("");
        assert_eq!(config.ok(), Some(StoreConfig::default()));
    }

    #[test]
    fn zero_batch_size_rejected() {
        let config = StoreConfig::parse("cursor_batch_size: 0\n");
        assert!(matches!(config, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn malformed_yaml_rejected() {
        let config = StoreConfig::parse("cursor_batch_size: [nope\n");
        assert!(matches!(config, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn missing_file_is_io_error() {
        let config = StoreConfig::from_file(Path::new("/nonexistent/tideline.yaml"));
        assert!(matches!(config, Err(ConfigError::Io { .. })));
    }
}
