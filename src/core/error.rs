//! Defines the custom error type for the `core` module.

use std::path::PathBuf;
use thiserror::Error;

/// The primary error type for the `core` module.
///
/// Most core operations degrade gracefully instead of failing (an unreadable
/// root scans to an empty list, an unreadable file is skipped during search),
/// so this enum covers the few seams where an error is worth surfacing.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Represents an I/O error, typically from file system operations.
    #[error("I/O error for path {1}: {0}")]
    Io(#[source] std::io::Error, PathBuf),

    /// Represents a failure to serialize or deserialize persisted state.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Represents an error that occurred when a Tokio task was joined.
    /// This is often due to a task panicking or being cancelled.
    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// Represents a caller-initiated cancellation of an in-flight search.
    #[error("Operation was cancelled")]
    Cancelled,
}
