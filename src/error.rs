//! # Duplicator Error Types
//!
//! Structured error handling for the fetch-extract-batch-write cycle.
//!
//! Read failures abort a run, mutation failures are recovered per batch by the
//! executor, and configuration failures are rejected before any remote call.

use thiserror::Error;

/// Result type used throughout the crate
pub type DuplicatorResult<T> = Result<T, DuplicatorError>;

/// Error kinds surfaced by a duplication run
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DuplicatorError {
    #[error("Remote query failed during {operation}: {message}")]
    RemoteQuery { operation: String, message: String },

    #[error("Remote mutation failed for batch {batch_number}: {message}")]
    RemoteMutation { batch_number: usize, message: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Run cancelled before {stage}")]
    Cancelled { stage: String },

    #[error("Invalid run state transition: {event} from {from}")]
    InvalidTransition { from: String, event: String },
}

impl DuplicatorError {
    /// Create a remote query error for the named read operation
    pub fn remote_query(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RemoteQuery {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a remote mutation error for a batch
    pub fn remote_mutation(batch_number: usize, message: impl Into<String>) -> Self {
        Self::RemoteMutation {
            batch_number,
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a cancellation error naming the boundary where it was observed
    pub fn cancelled(stage: impl Into<String>) -> Self {
        Self::Cancelled {
            stage: stage.into(),
        }
    }

    /// Check if error is recoverable within a run
    ///
    /// Only mutation failures are; the executor logs them and moves on to the
    /// next batch. Everything else ends the run.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::RemoteMutation { .. })
    }
}

impl From<config::ConfigError> for DuplicatorError {
    fn from(err: config::ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}
