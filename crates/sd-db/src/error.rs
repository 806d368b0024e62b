//! Error types for sd-db

use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Query execution error (D002)
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Table not found (D003)
    #[error("[D003] Table or view not found: {0}")]
    TableNotFound(String),

    /// Target database does not exist (D004)
    #[error("[D004] Database not found: {0}")]
    DatabaseNotFound(String),

    /// Target database already exists (D005)
    #[error("[D005] Database already exists: {0}")]
    DatabaseExists(String),

    /// Unknown or already awaited long-running operation (D006)
    #[error("[D006] Operation not found: {0}")]
    OperationNotFound(u64),

    /// Transaction could not be started or committed (D007)
    #[error("[D007] Transaction failed: {0}")]
    TransactionError(String),

    /// Mutex poisoned (D008)
    #[error("[D008] Database mutex poisoned: {0}")]
    MutexPoisoned(String),

    /// Client was closed (D009)
    #[error("[D009] Database client is closed")]
    ConnectionClosed,

    /// Internal error (D010)
    #[error("[D010] Internal database error: {0}")]
    Internal(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        // duckdb::Error does not expose structured variants, so missing
        // relations are recognised by message.
        let msg = err.to_string();
        if msg.contains("Table with name")
            || msg.contains("View with name")
            || msg.contains("Table or view with name")
            || (msg.contains("Catalog Error") && msg.contains("Table") && msg.contains("not found"))
        {
            DbError::TableNotFound(msg)
        } else {
            DbError::ExecutionError(msg)
        }
    }
}
