//! Synchronous PostgreSQL driver using the [`postgres`] client.
//!
//! Statements go out over the simple-query protocol, so every returned
//! value arrives as text. PostgreSQL has no statement size limit to respect;
//! batches are only ever split when a caller-supplied limit asks for it.
//!
//! A transaction opened directly on [`PostgresDriver::client`] is detected,
//! and split batches then run inside a savepoint of it.

use compact_str::CompactString;
use postgres::error::SqlState;
use postgres::{Client, SimpleQueryMessage};
use sqlpack_core::{
    BackendCapabilities, Driver, Executor, RawStatementResult, Result, ServerVersion,
    SqlPackError, StandardCapabilities, Value,
};

use super::RawTransactions;

/// Savepoint used only to find out whether a transaction block is open.
const TRANSACTION_CHECK_SAVEPOINT: &str = "sqlpack_tx_check";

pub struct PostgresDriver {
    client: Client,
    max_statement_bytes: usize,
    scope_depth: u32,
}

impl std::fmt::Debug for PostgresDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresDriver")
            .field("max_statement_bytes", &self.max_statement_bytes)
            .field("scope_depth", &self.scope_depth)
            .field("is_closed", &self.client.is_closed())
            .finish()
    }
}

impl PostgresDriver {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            max_statement_bytes: 0,
            scope_depth: 0,
        }
    }

    pub fn with_max_statement_bytes(mut self, max_statement_bytes: usize) -> Self {
        self.max_statement_bytes = max_statement_bytes;
        self
    }

    pub fn client(&mut self) -> &mut Client {
        &mut self.client
    }

    pub fn into_inner(self) -> Client {
        self.client
    }
}

impl Executor for PostgresDriver {
    fn execute(&mut self, sql: &str) -> Result<RawStatementResult> {
        let mut result = RawStatementResult::default();

        for message in self.client.simple_query(sql)? {
            match message {
                SimpleQueryMessage::RowDescription(columns) => {
                    result.columns = columns
                        .iter()
                        .map(|c| CompactString::from(c.name()))
                        .collect();
                }
                SimpleQueryMessage::Row(row) => {
                    if result.columns.is_empty() {
                        result.columns = row
                            .columns()
                            .iter()
                            .map(|c| CompactString::from(c.name()))
                            .collect();
                    }
                    result.rows.push(
                        (0..row.len())
                            .map(|i| row.get(i).map_or(Value::Null, Value::from))
                            .collect(),
                    );
                }
                SimpleQueryMessage::CommandComplete(affected) => {
                    result.affected_rows += affected;
                }
                _ => {}
            }
        }

        Ok(result)
    }

    fn transaction<R, F>(&mut self, requires_new: bool, f: F) -> Result<R>
    where
        F: FnOnce(&mut Self) -> Result<R>,
    {
        super::transaction(self, requires_new, f)
    }
}

impl Driver for PostgresDriver {
    fn capabilities(&mut self) -> Result<Box<dyn BackendCapabilities>> {
        let result = self.execute("SHOW server_version")?;
        let banner = result
            .rows
            .first()
            .and_then(|row| row.first())
            .and_then(Value::as_str)
            .ok_or_else(|| {
                SqlPackError::UnsupportedBackend("server did not report a version".into())
            })?;
        Ok(Box::new(StandardCapabilities::postgres(
            ServerVersion::parse(banner)?,
        )))
    }

    fn max_statement_bytes(&mut self) -> Result<usize> {
        Ok(self.max_statement_bytes)
    }
}

impl RawTransactions for PostgresDriver {
    const NAME: &'static str = "postgres.sync";

    fn execute_raw(&mut self, sql: &str) -> Result<()> {
        self.client.batch_execute(sql)?;
        Ok(())
    }

    /// The client does not expose the server's transaction status, so a
    /// throwaway savepoint is attempted. Outside a transaction block the
    /// server refuses it with `25P01`.
    fn in_transaction(&mut self) -> Result<bool> {
        if self.scope_depth > 0 {
            return Ok(true);
        }

        match self
            .client
            .batch_execute(&format!("SAVEPOINT {TRANSACTION_CHECK_SAVEPOINT}"))
        {
            Ok(()) => {
                self.client
                    .batch_execute(&format!("RELEASE SAVEPOINT {TRANSACTION_CHECK_SAVEPOINT}"))?;
                Ok(true)
            }
            Err(e) if e.code() == Some(&SqlState::NO_ACTIVE_SQL_TRANSACTION) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn scope_depth(&mut self) -> &mut u32 {
        &mut self.scope_depth
    }
}
