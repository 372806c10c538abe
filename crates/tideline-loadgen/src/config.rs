//! Configuration for the load generator.
//!
//! Mirrors the structure of `tideline.yaml`:
//!
//! ```yaml
//! store:
//!   cursor_batch_size: 64
//! workload:
//!   producers: 3
//!   events_per_producer: 100
//!   deleters: 0
//!   deletes_per_deleter: 0
//!   queriers: 1
//!   queries_per_querier: 100
//!   event_type: "some type"
//!   max_age_seconds: 10000000
//! logging:
//!   level: "info"
//!   format: "text"
//! ```
//!
//! Every section and field is optional.

use std::path::Path;

use serde::Deserialize;
use tideline_store::{ConfigError, StoreConfig};

/// Environment variable that overrides `logging.level`.
pub const LOG_LEVEL_ENV: &str = "TIDELINE_LOG";

/// Top-level load generator configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoadgenConfig {
    /// Settings for the store under load.
    #[serde(default)]
    pub store: StoreConfig,

    /// Worker counts and event shape.
    #[serde(default)]
    pub workload: WorkloadConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl LoadgenConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `TIDELINE_LOG` overrides `logging.level` when set.
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
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.logging.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.store.validate()?;
        if self.workload.event_type.is_empty() {
            return Err(ConfigError::Invalid {
                reason: "workload.event_type must not be empty".to_owned(),
            });
        }
        if self.workload.max_age_seconds == 0 {
            return Err(ConfigError::Invalid {
                reason: "workload.max_age_seconds must be at least 1".to_owned(),
            });
        }
        Ok(())
    }
}

/// Worker counts and the shape of generated events.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorkloadConfig {
    /// Number of concurrent inserting workers.
    #[serde(default = "default_producers")]
    pub producers: u32,

    /// Events each producer inserts.
    #[serde(default = "default_events_per_producer")]
    pub events_per_producer: u32,

    /// Number of concurrent workers deleting through cursors.
    #[serde(default)]
    pub deleters: u32,

    /// Deletion attempts per deleter. Each attempt removes the earliest
    /// matching event, if any.
    #[serde(default)]
    pub deletes_per_deleter: u32,

    /// Number of concurrent querying workers.
    #[serde(default = "default_queriers")]
    pub queriers: u32,

    /// Full-range queries each querier drains.
    #[serde(default = "default_queries_per_querier")]
    pub queries_per_querier: u32,

    /// Type stamped on every generated event.
    #[serde(default = "default_event_type")]
    pub event_type: String,

    /// Generated timestamps fall uniformly in `(now - max_age_seconds, now]`.
    #[serde(default = "default_max_age_seconds")]
    pub max_age_seconds: u32,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            producers: default_producers(),
            events_per_producer: default_events_per_producer(),
            deleters: 0,
            deletes_per_deleter: 0,
            queriers: default_queriers(),
            queries_per_querier: default_queries_per_querier(),
            event_type: default_event_type(),
            max_age_seconds: default_max_age_seconds(),
        }
    }
}

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Subscriber output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl LoggingConfig {
    /// Override the level with `TIDELINE_LOG` when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(LOG_LEVEL_ENV) {
            if !val.trim().is_empty() {
                self.level = val;
            }
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

const fn default_producers() -> u32 {
    3
}

const fn default_events_per_producer() -> u32 {
    100
}

const fn default_queriers() -> u32 {
    1
}

const fn default_queries_per_querier() -> u32 {
    100
}

fn default_event_type() -> String {
    "some type".to_owned()
}

const fn default_max_age_seconds() -> u32 {
    10_000_000
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = LoadgenConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.workload.producers, 3);
        assert_eq!(config.workload.events_per_producer, 100);
        assert_eq!(config.workload.event_type, "some type");
        assert_eq!(config.store.cursor_batch_size, 64);
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
store:
  cursor_batch_size: 16

workload:
  producers: 100
  events_per_producer: 1000
  deleters: 100
  deletes_per_deleter: 1000
  queriers: 2
  queries_per_querier: 10
  event_type: "cpu"
  max_age_seconds: 60

logging:
  level: "debug"
  format: "json"
"#;

        let config = LoadgenConfig::parse(yaml);
        assert!(config.is_ok(), "{config:?}");
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.store.cursor_batch_size, 16);
        assert_eq!(config.workload.producers, 100);
        assert_eq!(config.workload.deleters, 100);
        assert_eq!(config.workload.deletes_per_deleter, 1000);
        assert_eq!(config.workload.queriers, 2);
        assert_eq!(config.workload.event_type, "cpu");
        assert_eq!(config.workload.max_age_seconds, 60);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = LoadgenConfig::parse("workload:\n  producers: 7\n");
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();

        // Producers is overridden
        assert_eq!(config.workload.producers, 7);
        // Everything else uses defaults
        assert_eq!(config.workload.events_per_producer, 100);
        assert_eq!(config.store, StoreConfig::default());
    }

    #[test]
    fn parse_empty_yaml() {
        assert!(LoadgenConfig::parse("").is_ok());
    }

    #[test]
    fn empty_event_type_rejected() {
        let config = LoadgenConfig::parse("workload:\n  event_type: \"\"\n");
        assert!(matches!(config, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn zero_max_age_rejected() {
        let config = LoadgenConfig::parse("workload:\n  max_age_seconds: 0\n");
        assert!(matches!(config, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn zero_batch_size_rejected() {
        let config = LoadgenConfig::parse("store:\n  cursor_batch_size: 0\n");
        assert!(matches!(config, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn unknown_log_format_rejected() {
        let config = LoadgenConfig::parse("logging:\n  format: xml\n");
        assert!(matches!(config, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("tideline.yaml");
        if path.exists() {
            let config = LoadgenConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
