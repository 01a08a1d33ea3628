//! # sqlpack
//!
//! Bulk `INSERT` batching that respects the server's statement size limit.
//!
//! Pre-rendered row value sets are packed, in order, into as few statements as
//! the limit allows. When more than one statement is needed they all run in
//! one transaction, so a batch is committed entirely or not at all. Generated
//! columns (auto-increment ids and any `RETURNING` columns) come back in one
//! result, ordered like the input.
//!
//! ## Quick Start
//!
//! ```rust
//! # #[cfg(feature = "rusqlite")]
//! # fn main() -> sqlpack::Result<()> {
//! use sqlpack::rusqlite::RusqliteDriver;
//! use sqlpack::{Entry, ImportOptions, Importer, Model, Value};
//!
//! let conn = rusqlite::Connection::open_in_memory()?;
//! conn.execute_batch("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)")?;
//!
//! let users = Model::new("users", ["id", "name"]).with_primary_key("id");
//! let options = ImportOptions::default();
//! let mut importer = Importer::new(RusqliteDriver::new(conn))?;
//!
//! let template = importer.insert_template(&users, &["name"], &options)?;
//! let result = importer.import(&template, &["('alice')", "('bob')"], &options, Some(&users))?;
//!
//! assert_eq!(result.statement_count, 1);
//! assert_eq!(result.identifiers, [Entry::Scalar(Value::Integer(1)), Entry::Scalar(Value::Integer(2))]);
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "rusqlite"))]
//! # fn main() {}
//! ```
//!
//! ## Database Support
//!
//! | Database        | Driver   | Feature Flag    | RETURNING        |
//! |-----------------|----------|-----------------|------------------|
//! | SQLite          | rusqlite | `rusqlite`      | 3.35.0 and later |
//! | PostgreSQL      | postgres | `postgres-sync` | 8.2.0 and later  |
//! | MySQL / MariaDB | any      | `mysql`         | MariaDB 10.5.0+  |
//!
//! MySQL and MariaDB ship dialect support only (capability detection and the
//! `max_allowed_packet` probe); plug them into any client by implementing
//! [`Driver`].

mod backend;
mod driver;

pub use backend::{capabilities, capabilities_for_adapter};

pub use sqlpack_core::{
    Backend, BackendCapabilities, BatchExecution, BatchExecutor, BatchResult, Columns, Driver,
    Entry, Executor, ImportOptions, Importer, Model, PackingConfig, QUERY_OVERHEAD,
    RawStatementResult, ReconciliationMode, Result, ReturningRequest, ServerVersion,
    StandardCapabilities, StatementTemplate, Value, partition, reconcile,
};

/// Error types
pub mod error {
    pub use sqlpack_core::error::SqlPackError;
}

/// MySQL and MariaDB dialect support.
#[cfg(feature = "mysql")]
pub use sqlpack_mysql as mysql;

/// SQLite through [`rusqlite`](::rusqlite).
#[cfg(feature = "rusqlite")]
pub mod rusqlite {
    pub use crate::driver::rusqlite::{RusqliteDriver, SQLITE_MAX_SQL_LENGTH};
}

/// PostgreSQL through the synchronous [`postgres`](::postgres) client.
#[cfg(feature = "postgres-sync")]
pub mod postgres {
    pub use crate::driver::postgres_sync::PostgresDriver;
}
