//! In-memory executor for unit tests.

use std::collections::VecDeque;

use crate::capabilities::{BackendCapabilities, StandardCapabilities};
use crate::error::{Result, SqlPackError};
use crate::executor::{Executor, RawStatementResult};
use crate::importer::Driver;
use crate::value::Value;

/// Records every statement and transaction event. Statements answer with the
/// queued responses first, then with a generic result carrying a fake last
/// insert id.
#[derive(Debug, Default)]
pub(crate) struct RecordingExecutor {
    pub statements: Vec<String>,
    pub events: Vec<String>,
    pub fail_at: Option<usize>,
    pub responses: VecDeque<RawStatementResult>,
    pub max_statement_bytes: usize,
    pub returning: bool,
    pub probes: usize,
}

impl RecordingExecutor {
    pub fn failing_at(index: usize) -> Self {
        Self {
            fail_at: Some(index),
            ..Default::default()
        }
    }

    pub fn with_responses(responses: impl IntoIterator<Item = RawStatementResult>) -> Self {
        Self {
            responses: responses.into_iter().collect(),
            ..Default::default()
        }
    }
}

impl Executor for RecordingExecutor {
    fn execute(&mut self, sql: &str) -> Result<RawStatementResult> {
        let index = self.statements.len();
        self.statements.push(sql.to_owned());

        if self.fail_at == Some(index) {
            return Err(SqlPackError::ExecutionError(format!(
                "Duplicate entry in statement {index}"
            )));
        }

        Ok(self
            .responses
            .pop_front()
            .unwrap_or_else(|| RawStatementResult {
                values: vec![Value::Integer(index as i64 + 1)],
                affected_rows: 1,
                ..Default::default()
            }))
    }

    fn transaction<R, F>(&mut self, requires_new: bool, f: F) -> Result<R>
    where
        F: FnOnce(&mut Self) -> Result<R>,
    {
        self.events.push(if requires_new {
            "begin(requires_new)".into()
        } else {
            "begin".into()
        });

        match f(self) {
            Ok(value) => {
                self.events.push("commit".into());
                Ok(value)
            }
            Err(e) => {
                self.events.push("rollback".into());
                Err(e)
            }
        }
    }
}

impl Driver for RecordingExecutor {
    fn capabilities(&mut self) -> Result<Box<dyn BackendCapabilities>> {
        let version = if self.returning { "3.45.0" } else { "3.7.17" };
        Ok(Box::new(StandardCapabilities::sqlite(version.parse()?)))
    }

    fn max_statement_bytes(&mut self) -> Result<usize> {
        self.probes += 1;
        Ok(self.max_statement_bytes)
    }
}
