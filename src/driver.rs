//! Bundled drivers and the transaction scoping they share.

#[cfg(feature = "postgres-sync")]
pub mod postgres_sync;
#[cfg(feature = "rusqlite")]
pub mod rusqlite;

use sqlpack_core::{Result, sqlpack_trace_tx};

/// Raw statement access a driver needs for [`transaction`].
pub(crate) trait RawTransactions {
    const NAME: &'static str;

    /// Executes SQL that returns nothing.
    fn execute_raw(&mut self, sql: &str) -> Result<()>;

    /// Whether a transaction is open on the connection, ours or the caller's.
    fn in_transaction(&mut self) -> Result<bool>;

    /// Number of scopes opened through [`transaction`] and not yet closed.
    fn scope_depth(&mut self) -> &mut u32;
}

#[derive(Debug)]
enum Scope {
    Transaction,
    Savepoint(String),
}

impl Scope {
    fn begin(&self) -> String {
        match self {
            Scope::Transaction => "BEGIN".into(),
            Scope::Savepoint(name) => format!("SAVEPOINT {name}"),
        }
    }

    fn commit(&self) -> String {
        match self {
            Scope::Transaction => "COMMIT".into(),
            Scope::Savepoint(name) => format!("RELEASE SAVEPOINT {name}"),
        }
    }

    fn rollback(&self) -> String {
        match self {
            Scope::Transaction => "ROLLBACK".into(),
            Scope::Savepoint(name) => {
                format!("ROLLBACK TO SAVEPOINT {name}; RELEASE SAVEPOINT {name}")
            }
        }
    }
}

/// Runs `f` in a new transaction, or in a savepoint when one is already open
/// and `requires_new` is set, or directly inside the open one otherwise.
///
/// Commits when `f` returns `Ok`. Rolls back when it returns `Err` or panics;
/// the panic is resumed afterwards.
pub(crate) fn transaction<D, R, F>(driver: &mut D, requires_new: bool, f: F) -> Result<R>
where
    D: RawTransactions,
    F: FnOnce(&mut D) -> Result<R>,
{
    let scope = if !driver.in_transaction()? {
        Scope::Transaction
    } else if requires_new {
        Scope::Savepoint(format!("sqlpack_sp_{}", driver.scope_depth()))
    } else {
        return f(driver);
    };

    driver.execute_raw(&scope.begin())?;
    sqlpack_trace_tx!("begin", D::NAME);
    *driver.scope_depth() += 1;

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| f(&mut *driver)));

    *driver.scope_depth() -= 1;

    match result {
        Ok(Ok(value)) => match driver.execute_raw(&scope.commit()) {
            Ok(()) => {
                sqlpack_trace_tx!("commit", D::NAME);
                Ok(value)
            }
            Err(e) => {
                let _ = driver.execute_raw(&scope.rollback());
                sqlpack_trace_tx!("rollback", D::NAME);
                Err(e)
            }
        },
        Ok(Err(e)) => {
            let _ = driver.execute_raw(&scope.rollback());
            sqlpack_trace_tx!("rollback", D::NAME);
            Err(e)
        }
        Err(panic_payload) => {
            let _ = driver.execute_raw(&scope.rollback());
            sqlpack_trace_tx!("rollback", D::NAME);
            std::panic::resume_unwind(panic_payload);
        }
    }
}
