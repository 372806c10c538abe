//! Error types for the load generator binary.
//!
//! [`LoadgenError`] is the top-level error type that wraps every failure
//! mode during startup and workload execution.

/// Top-level error for the load generator.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum LoadgenError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: tideline_store::ConfigError,
    },

    /// A worker task panicked or was cancelled.
    #[error("worker error: {message}")]
    Worker {
        /// Description of the worker failure.
        message: String,
    },

    /// The report could not be serialized.
    #[error("report error: {source}")]
    Report {
        /// The underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}
