//! Error types for the template/auto-text core.
//!
//! Validation and lookup failures are plain data returned to the caller;
//! storage failures wrap the backend error so the UI can warn loudly that
//! the no-data-loss guarantee is broken.

use thiserror::Error;

/// Error for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Input rejected before any state change (empty rule shortcut,
    /// empty model or tab name).
    #[error("validation failed: {0}")]
    Validation(String),

    /// No snapshot in the backup history carries the requested timestamp.
    #[error("no backup found for timestamp {timestamp}")]
    SnapshotNotFound { timestamp: String },

    /// A snapshot or import payload could not be parsed into application
    /// state. The live state is left untouched.
    #[error("corrupted backup data: {reason}")]
    CorruptData { reason: String },

    /// The durable write failed. The in-memory state is still the source
    /// of truth, but it is no longer guaranteed to survive a crash.
    #[error("durable storage write failed")]
    Storage(#[source] anyhow::Error),
}

impl CoreError {
    /// Shorthand for a [`CoreError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Shorthand for a [`CoreError::CorruptData`].
    pub fn corrupt(reason: impl Into<String>) -> Self {
        Self::CorruptData {
            reason: reason.into(),
        }
    }
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
