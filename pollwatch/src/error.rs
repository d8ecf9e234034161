//! Error types for the polling watcher.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for watcher operations.
pub type Result<T> = std::result::Result<T, WatcherError>;

/// Errors that can occur in the polling watcher.
#[derive(Error, Debug)]
pub enum WatcherError {
    /// Poll interval must be strictly greater than zero.
    #[error("poll interval must be greater than zero")]
    InvalidInterval,

    /// Event channel capacity must be at least one.
    #[error("event channel capacity must be at least one")]
    InvalidCapacity,

    /// Root path could not be resolved to a canonical absolute path.
    #[error("failed to resolve path {}: {source}", path.display())]
    PathResolution {
        /// The path as given by the caller.
        path: PathBuf,
        /// Underlying resolution failure.
        source: std::io::Error,
    },

    /// A tree scan failed at the root.
    #[error("scan error: {0}")]
    Scan(#[from] walkdir::Error),

    /// IO error.
    ///
    /// Never produced by the watcher itself; exists so callers mixing
    /// [`PathMetadata::for_path`](crate::event::PathMetadata::for_path) or
    /// their own filesystem access into watcher code can use `?` with a
    /// single error type.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
