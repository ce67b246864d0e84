// errors.rs
use crate::scraper::ScraperError;
use thiserror::Error;

/// Startup configuration problems. These are fatal: the poll loop never starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Errors reading or writing the persisted listing snapshot.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("state file I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("state file {path} is corrupt: {reason}")]
    Corrupt { path: String, reason: String },
}

/// Anything that aborts a poll cycle before its snapshot is persisted.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("sweep failed: {0}")]
    Sweep(#[from] ScraperError),
    #[error(transparent)]
    State(#[from] StateError),
}
