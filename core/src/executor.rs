//! Statement assembly and execution with transactional batching.

use compact_str::CompactString;

use crate::error::Result;
use crate::partition::PackingConfig;
use crate::template::{StatementTemplate, joined_len};
use crate::value::Value;
use crate::{sqlpack_trace_split, sqlpack_trace_statement};

/// Output of one executed statement as reported by a driver.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawStatementResult {
    /// Column names, applying to every row
    pub columns: Vec<CompactString>,
    pub rows: Vec<Vec<Value>>,
    /// Generic insert metadata with no column separation, typically the last
    /// insert id. One entry per statement, not per row.
    pub values: Vec<Value>,
    pub affected_rows: u64,
}

impl RawStatementResult {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// Execution boundary implemented by drivers.
pub trait Executor {
    /// Executes one statement and collects whatever it returns.
    fn execute(&mut self, sql: &str) -> Result<RawStatementResult>;

    /// Runs `f` in a transaction. With `requires_new` a nested scope
    /// (savepoint) is opened when a transaction is already active; otherwise
    /// `f` joins it. The scope commits when `f` returns `Ok` and rolls back
    /// when it returns `Err` or panics.
    fn transaction<R, F>(&mut self, requires_new: bool, f: F) -> Result<R>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> Result<R>;
}

/// What a batch execution produced, in group order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchExecution {
    pub statement_count: usize,
    pub results: Vec<RawStatementResult>,
    /// Whether the values were spread over several statements
    pub split: bool,
}

/// Turns a value set into as few statements as the packing budget allows.
#[derive(Debug, Clone, Copy)]
pub struct BatchExecutor<'a> {
    template: &'a StatementTemplate,
    config: PackingConfig,
    force_single: bool,
    returning: Option<&'a str>,
}

impl<'a> BatchExecutor<'a> {
    pub fn new(template: &'a StatementTemplate, config: PackingConfig) -> Self {
        Self {
            template,
            config,
            force_single: false,
            returning: None,
        }
    }

    /// Always send one statement, whatever its size.
    pub fn force_single(mut self, force_single: bool) -> Self {
        self.force_single = force_single;
        self
    }

    /// Column list for a `RETURNING` clause. Only applied when everything goes
    /// out as a single statement.
    ///
    /// The clause is not counted against the packing budget. Whether the batch
    /// fits is decided on template, values and [`QUERY_OVERHEAD`] alone, so a
    /// long column list can carry the sent statement past `max_bytes`; leave
    /// headroom in the configured limit when returning many columns.
    ///
    /// [`QUERY_OVERHEAD`]: crate::template::QUERY_OVERHEAD
    pub fn returning(mut self, returning: Option<&'a str>) -> Self {
        self.returning = returning;
        self
    }

    pub fn execute<E, V>(&self, executor: &mut E, values: &[V]) -> Result<BatchExecution>
    where
        E: Executor,
        V: AsRef<str>,
    {
        if values.is_empty() {
            return Ok(BatchExecution::default());
        }

        let total_bytes = self.config.reserved_overhead_bytes + joined_len(values);

        if self.force_single || self.config.fits(total_bytes) {
            let sql = self.template.assemble(values, self.returning);
            sqlpack_trace_statement!(sql.len(), values.len());
            let result = executor.execute(&sql)?;
            return Ok(BatchExecution {
                statement_count: 1,
                results: vec![result],
                split: false,
            });
        }

        let groups = self.config.partition(values)?;
        sqlpack_trace_split!(groups.len(), total_bytes, self.config.max_bytes);

        let template = self.template;
        let results = executor.transaction(true, |executor| {
            let mut results = Vec::with_capacity(groups.len());
            for group in &groups {
                let sql = template.assemble(group, None);
                sqlpack_trace_statement!(sql.len(), group.len());
                results.push(executor.execute(&sql)?);
            }
            Ok(results)
        })?;

        Ok(BatchExecution {
            statement_count: results.len(),
            results,
            split: true,
        })
    }
}
