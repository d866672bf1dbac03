//! Error types for console-scripts-rs

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for script runner operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for script runner operations
///
/// Only setup failures are surfaced this way; anything a script does while
/// running is folded into a [`RunResult`](crate::RunResult) instead.
#[derive(Error, Debug)]
pub enum Error {
    /// Command matched neither a search-path executable nor a file in the
    /// working directory
    #[error("Cannot find {command}")]
    CommandNotFound { command: String },

    /// Command resolved to a script file, which cannot be loaded into the
    /// test process
    #[error(
        "No entry point named '{command}' is registered; \
         {} can only run in subprocess mode",
        path.display()
    )]
    NotLoadable { command: String, path: PathBuf },

    /// Launch mode string was not one of inprocess|subprocess|both
    #[error("Invalid script launch mode: {mode}")]
    InvalidLaunchMode { mode: String },

    /// In-process stream capture is not available on this target
    #[error("In-process launch mode is not supported on this platform")]
    Unsupported,

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Regex error
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}
