use compact_str::CompactString;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqlPackError {
    /// A single value set cannot fit in one statement, even on its own
    #[error("Value set {index} needs {size} bytes, which exceeds the max allowed for an insert [{max_bytes}]")]
    ExceedsCapacity {
        index: usize,
        size: usize,
        max_bytes: usize,
    },

    /// A returning column was requested that the statement (or model) does not have
    #[error("Unknown returning column: {0}")]
    UnknownReturningColumn(CompactString),

    /// Error executing a statement
    #[error("Execution error: {0}")]
    ExecutionError(String),

    /// Error with transaction
    #[error("Transaction error: {0}")]
    TransactionError(String),

    /// Backend adapter name or server version was not recognized
    #[error("Unsupported backend: {0}")]
    UnsupportedBackend(String),

    /// Invalid import options or statement template
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Rusqlite specific errors
    #[cfg(feature = "rusqlite")]
    #[error("Rusqlite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),

    /// Postgres specific errors
    #[cfg(feature = "postgres-sync")]
    #[error("Postgres error: {0}")]
    Postgres(#[from] postgres::Error),
}

/// Result type for batching operations
pub type Result<T> = std::result::Result<T, SqlPackError>;
