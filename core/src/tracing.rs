//! Tracing utilities for statement and transaction observability.
//!
//! Enable the `tracing` feature to emit spans and events via the `tracing` crate.
//! These macros no-op when the feature is disabled, avoiding `#[cfg]` boilerplate
//! at every call site. The feature is checked in the crate that expands the macro,
//! so callers need their own `tracing` feature forwarding to this crate.

/// Emit a debug-level tracing event with the statement size and value count.
///
/// ```ignore
/// sqlpack_trace_statement!(sql.len(), values.len());
/// ```
#[macro_export]
macro_rules! sqlpack_trace_statement {
    ($sql_bytes:expr, $value_count:expr) => {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            bytes = $sql_bytes,
            values = $value_count,
            "sqlpack.statement"
        );
    };
}

/// Emit an info-level tracing event for transaction lifecycle (begin, commit, rollback).
///
/// ```ignore
/// sqlpack_trace_tx!("begin", "sqlite.rusqlite");
/// sqlpack_trace_tx!("rollback", "postgres.sync");
/// ```
#[macro_export]
macro_rules! sqlpack_trace_tx {
    ($event:literal, $driver:expr) => {
        #[cfg(feature = "tracing")]
        tracing::info!(event = $event, driver = $driver, "sqlpack.transaction");
    };
}

/// Emit a debug-level tracing event when a value set is split across statements.
#[macro_export]
macro_rules! sqlpack_trace_split {
    ($groups:expr, $total_bytes:expr, $max_bytes:expr) => {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            groups = $groups,
            total_bytes = $total_bytes,
            max_bytes = $max_bytes,
            "sqlpack.split"
        );
    };
}
