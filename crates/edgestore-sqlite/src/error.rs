//! Error types for the SQLite backend

use edgestore_core::GraphError;
use thiserror::Error;

/// SQLite backend error type
#[derive(Error, Debug)]
pub enum SqliteError {
    /// Opening the database failed
    #[error("Connection error: {0}")]
    Connection(String),

    /// Schema/migration error
    #[error("Schema error: {0}")]
    Schema(String),

    /// A stored row could not be decoded
    #[error("Corrupt row: {0}")]
    CorruptRow(String),

    /// Edge properties could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Underlying rusqlite error
    #[error("SQLite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
}

/// Result type for SQLite operations
pub type SqliteResult<T> = Result<T, SqliteError>;

impl From<serde_json::Error> for SqliteError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<SqliteError> for GraphError {
    fn from(err: SqliteError) -> Self {
        match err {
            SqliteError::Connection(msg) => Self::BackendUnavailable(msg),
            SqliteError::Schema(msg) => Self::SchemaCorruption(msg),
            SqliteError::CorruptRow(msg) => Self::SchemaCorruption(msg),
            SqliteError::Serialization(msg) => Self::Serialization(msg),
            SqliteError::Rusqlite(e) => match e.sqlite_error_code() {
                Some(rusqlite::ErrorCode::DatabaseBusy)
                | Some(rusqlite::ErrorCode::DatabaseLocked) => Self::Timeout { duration_ms: 0 },
                _ => Self::BackendUnavailable(e.to_string()),
            },
        }
    }
}
