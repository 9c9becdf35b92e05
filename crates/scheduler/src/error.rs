//! Error types for the persistence seam and configuration loading.

use thiserror::Error;

/// Errors reported by a schedule repository.
///
/// The engine never retries on its own; callers inspect
/// [`PersistenceError::is_retryable`] and decide.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PersistenceError {
    /// The backing store could not be reached
    #[error("Storage unavailable: {message}")]
    Unavailable { message: String },

    /// The store rejected the write as a whole
    #[error("Write rejected: {message}")]
    Rejected { message: String },

    /// The requested record does not exist in the store
    #[error("Record not found: {id}")]
    NotFound { id: String },

    /// The call did not complete in time
    #[error("Storage timed out after {elapsed_secs:.1}s")]
    Timeout { elapsed_secs: f64 },
}

impl PersistenceError {
    /// Returns true if this error is potentially transient and retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PersistenceError::Unavailable { .. } | PersistenceError::Timeout { .. }
        )
    }

    /// Returns true if in-memory state should be reloaded from the store.
    pub fn needs_reconcile(&self) -> bool {
        !matches!(self, PersistenceError::NotFound { .. })
    }
}

/// Errors that can occur while loading [`crate::config::SchedulerConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
