//! Synchronous SQLite driver using [`rusqlite`].
//!
//! # Example
//!
//! ```no_run
//! use sqlpack::rusqlite::RusqliteDriver;
//! use sqlpack::{ImportOptions, Importer, Model};
//!
//! fn main() -> sqlpack::Result<()> {
//!     let conn = ::rusqlite::Connection::open_in_memory()?;
//!     conn.execute_batch("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)")?;
//!
//!     let users = Model::new("users", ["id", "name"]).with_primary_key("id");
//!     let options = ImportOptions::default();
//!     let mut importer = Importer::new(RusqliteDriver::new(conn))?;
//!
//!     let template = importer.insert_template(&users, &["name"], &options)?;
//!     let result = importer.import(&template, &["('alice')", "('bob')"], &options, Some(&users))?;
//!     assert_eq!(result.identifiers.len(), 2);
//!     Ok(())
//! }
//! ```

use compact_str::CompactString;
use rusqlite::Connection;
use rusqlite::limits::Limit;
use rusqlite::types::ValueRef;
use sqlpack_core::{
    BackendCapabilities, Driver, Executor, RawStatementResult, Result, ServerVersion,
    SqlPackError, StandardCapabilities, Value,
};

use super::RawTransactions;

/// SQLite's compiled-in upper bound for the longest accepted statement.
pub const SQLITE_MAX_SQL_LENGTH: usize = 1_000_000_000;

/// SQLite connection wrapped for batching.
///
/// The statement size limit is read from the connection's
/// `SQLITE_LIMIT_SQL_LENGTH`, so a limit lowered with
/// [`Connection::set_limit`] is respected.
#[derive(Debug)]
pub struct RusqliteDriver {
    conn: Connection,
    max_statement_bytes: Option<usize>,
    scope_depth: u32,
}

impl RusqliteDriver {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            max_statement_bytes: None,
            scope_depth: 0,
        }
    }

    /// Reports `max_statement_bytes` to the importer instead of the
    /// connection's own limit.
    pub fn with_max_statement_bytes(mut self, max_statement_bytes: usize) -> Self {
        self.max_statement_bytes = Some(max_statement_bytes);
        self
    }

    /// Gets a reference to the underlying connection
    #[inline]
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn into_inner(self) -> Connection {
        self.conn
    }
}

impl Executor for RusqliteDriver {
    fn execute(&mut self, sql: &str) -> Result<RawStatementResult> {
        let mut stmt = self.conn.prepare(sql)?;
        let columns: Vec<CompactString> = stmt
            .column_names()
            .into_iter()
            .map(CompactString::from)
            .collect();

        let mut rows = Vec::new();
        let mut cursor = stmt.query([])?;
        while let Some(row) = cursor.next()? {
            let mut values = Vec::with_capacity(columns.len());
            for i in 0..columns.len() {
                values.push(to_value(row.get_ref(i)?));
            }
            rows.push(values);
        }
        drop(cursor);
        drop(stmt);

        Ok(RawStatementResult {
            columns,
            rows,
            values: vec![Value::Integer(self.conn.last_insert_rowid())],
            affected_rows: self.conn.changes() as u64,
        })
    }

    fn transaction<R, F>(&mut self, requires_new: bool, f: F) -> Result<R>
    where
        F: FnOnce(&mut Self) -> Result<R>,
    {
        super::transaction(self, requires_new, f)
    }
}

impl Driver for RusqliteDriver {
    fn capabilities(&mut self) -> Result<Box<dyn BackendCapabilities>> {
        let banner: String = self
            .conn
            .query_row("SELECT sqlite_version()", [], |row| row.get(0))?;
        Ok(Box::new(StandardCapabilities::sqlite(ServerVersion::parse(
            &banner,
        )?)))
    }

    fn max_statement_bytes(&mut self) -> Result<usize> {
        if let Some(max) = self.max_statement_bytes {
            return Ok(max);
        }

        let limit = self.conn.limit(Limit::SQLITE_LIMIT_SQL_LENGTH)?;
        usize::try_from(limit).map_err(|_| {
            SqlPackError::ExecutionError(format!("invalid SQLITE_LIMIT_SQL_LENGTH: {limit}"))
        })
    }
}

impl RawTransactions for RusqliteDriver {
    const NAME: &'static str = "sqlite.rusqlite";

    fn execute_raw(&mut self, sql: &str) -> Result<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    fn in_transaction(&mut self) -> Result<bool> {
        Ok(!self.conn.is_autocommit())
    }

    fn scope_depth(&mut self) -> &mut u32 {
        &mut self.scope_depth
    }
}

fn to_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => Value::Integer(v),
        ValueRef::Real(v) => Value::Real(v),
        ValueRef::Text(v) => Value::Text(CompactString::from(String::from_utf8_lossy(v))),
        ValueRef::Blob(v) => Value::Blob(v.to_vec()),
    }
}
