//! Error types for window loading.
//!
//! None of these are fatal to the controller: every failure degrades to
//! "no progress this cycle" and the window state stays consistent.

use thiserror::Error;

/// Feed-specific errors.
#[derive(Error, Debug)]
pub enum FeedError {
    /// Count operation against the collection failed. Last known total is kept.
    #[error("Count unavailable: {0}")]
    CountUnavailable(String),

    /// Fetch of the bounded window failed. Fetched length is not advanced.
    #[error("Fetch failed: {0}")]
    FetchFailed(String),

    /// The window owner was torn down; the handle can no longer mutate state.
    #[error("Window detached from its owner")]
    Detached,

    /// Configuration values out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// YAML configuration could not be parsed.
    #[error("Config parse error: {0}")]
    Config(#[from] serde_yaml::Error),

    /// Low-level I/O error while reading configuration.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for feed operations.
pub type Result<T> = std::result::Result<T, FeedError>;
