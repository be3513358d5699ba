//! Graph Error Types
//!
//! Error handling shared by every graph backend. Not-found conditions are never
//! errors: operations on unknown nodes return empty results or succeed as no-ops.

use thiserror::Error;

/// Error type for graph store operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Structural argument was rejected (malformed URN, negative paging, empty type list)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The storage engine could not be reached or failed mid-operation
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Timeout error: operation timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Schema registry invariant violation. Indicates a bug, never recoverable.
    #[error("Schema registry corruption: {0}")]
    SchemaCorruption(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for graph operations
pub type GraphResult<T> = Result<T, GraphError>;

impl GraphError {
    /// Create an invalid argument error
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a backend unavailable error
    pub fn backend<S: Into<String>>(msg: S) -> Self {
        Self::BackendUnavailable(msg.into())
    }

    /// Create a serialization error
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        Self::Serialization(msg.into())
    }

    /// Check if the caller may retry the operation
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::BackendUnavailable(_) | Self::Timeout { .. })
    }

    /// Check if the error indicates a broken internal invariant
    pub fn is_corruption(&self) -> bool {
        matches!(self, Self::SchemaCorruption(_))
    }
}

impl From<serde_json::Error> for GraphError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<tokio::task::JoinError> for GraphError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::BackendUnavailable(err.to_string())
    }
}
