//! Core of sqlpack: packing row value sets into as few `INSERT` statements as
//! the server's statement size limit allows, and reading generated columns back.
//!
//! The pipeline is linear:
//!
//! 1. [`partition`] splits pre-rendered value sets into contiguous groups that
//!    fit a [`PackingConfig`] budget.
//! 2. [`BatchExecutor`] assembles one statement per group from a
//!    [`StatementTemplate`] and runs them through an [`Executor`], sharing one
//!    transaction when more than one statement is needed.
//! 3. [`reconcile`] folds the per-statement [`RawStatementResult`]s into a
//!    single [`BatchResult`] ordered like the input.
//!
//! [`Importer`] wraps a [`Driver`] and runs all three, caching what it learns
//! about the server.

pub mod capabilities;
pub mod error;
pub mod executor;
pub mod importer;
pub mod options;
pub mod partition;
pub mod reconcile;
pub mod template;
pub mod tracing;
pub mod value;

#[cfg(test)]
mod testing;

pub use capabilities::{Backend, BackendCapabilities, ServerVersion, StandardCapabilities};
pub use error::{Result, SqlPackError};
pub use executor::{BatchExecution, BatchExecutor, Executor, RawStatementResult};
pub use importer::{Driver, Importer};
pub use options::{Columns, ImportOptions, Model};
pub use partition::{PackingConfig, partition};
pub use reconcile::{BatchResult, ReconciliationMode, ReturningRequest, reconcile};
pub use template::{QUERY_OVERHEAD, StatementTemplate};
pub use value::{Entry, Value};
