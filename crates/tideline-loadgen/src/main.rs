//! Load generator for the Tideline event store.
//!
//! Builds one in-memory store and drives it from many threads at once:
//! producers inserting randomly-aged events, deleters removing through
//! cursors, and queriers draining full-range queries. Prints a JSON
//! report on stdout when every worker has finished.
//!
//! # Startup Sequence
//!
//! 1. Load configuration (`argv[1]`, `TIDELINE_CONFIG`, or `tideline.yaml`)
//! 2. Initialize structured logging (tracing)
//! 3. Create the store from the `store` section
//! 4. Run the workload and print the report

mod config;
mod error;
mod workload;

use std::path::{Path, PathBuf};

use tideline_store::ConcurrentEventStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoadgenConfig, LoggingConfig};
use crate::error::LoadgenError;

/// Environment variable naming the config file.
const CONFIG_PATH_ENV: &str = "TIDELINE_CONFIG";

/// Config file picked up from the working directory when present.
const DEFAULT_CONFIG_FILE: &str = "tideline.yaml";

/// Application entry point for the load generator.
///
/// # Errors
///
/// Returns an error if configuration fails to load, a worker fails, or
/// the report cannot be serialized.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config_path = resolve_config_path(std::env::args().nth(1));
    let config = load_config(config_path.as_deref())?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!(
        config_path = ?config_path,
        cursor_batch_size = config.store.cursor_batch_size,
        "tideline-loadgen starting"
    );

    // 3. Create the store.
    let store = ConcurrentEventStore::with_config(config.store);

    // 4. Run the workload.
    let report = workload::run(&store, &config.workload).await?;
    let json = serde_json::to_string_pretty(&report).map_err(LoadgenError::from)?;
    println!("{json}");

    Ok(())
}

/// Pick the config file: explicit argument, then env var, then the
/// default file if it exists.
fn resolve_config_path(arg: Option<String>) -> Option<PathBuf> {
    if let Some(path) = arg {
        return Some(PathBuf::from(path));
    }
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return Some(PathBuf::from(path));
    }
    let default = PathBuf::from(DEFAULT_CONFIG_FILE);
    default.exists().then_some(default)
}

fn load_config(path: Option<&Path>) -> Result<LoadgenConfig, LoadgenError> {
    let config = match path {
        Some(path) => LoadgenConfig::from_file(path)?,
        None => LoadgenConfig::parse("")?,
    };
    Ok(config)
}

fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    match logging.format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_argument_wins() {
        let path = resolve_config_path(Some("custom.yaml".to_owned()));
        assert_eq!(path, Some(PathBuf::from("custom.yaml")));
    }

    #[test]
    fn missing_config_file_is_config_error() {
        let result = load_config(Some(Path::new("/nonexistent/tideline.yaml")));
        assert!(matches!(result, Err(LoadgenError::Config { .. })));
    }

    #[test]
    fn no_path_uses_defaults() {
        let result = load_config(None);
        assert!(result.is_ok());
    }
}
