//! Stitching per-statement results back into one caller-facing result.

use compact_str::CompactString;
use smallvec::SmallVec;

use crate::error::{Result, SqlPackError};
use crate::executor::RawStatementResult;
use crate::value::{Entry, Value};

/// Columns the caller wants back from the inserted rows.
///
/// Identifier columns come first and keep their order; extra columns never
/// repeat an identifier column or each other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReturningRequest {
    identifier_columns: Vec<CompactString>,
    extra_columns: Vec<CompactString>,
}

impl ReturningRequest {
    pub fn new<I, J>(identifier_columns: I, extra_columns: J) -> Self
    where
        I: IntoIterator,
        I::Item: Into<CompactString>,
        J: IntoIterator,
        J::Item: Into<CompactString>,
    {
        let mut identifiers: Vec<CompactString> = Vec::new();
        for column in identifier_columns {
            let column = column.into();
            if !identifiers.contains(&column) {
                identifiers.push(column);
            }
        }

        let mut extras: Vec<CompactString> = Vec::new();
        for column in extra_columns {
            let column = column.into();
            if !identifiers.contains(&column) && !extras.contains(&column) {
                extras.push(column);
            }
        }

        Self {
            identifier_columns: identifiers,
            extra_columns: extras,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.identifier_columns.is_empty() && self.extra_columns.is_empty()
    }

    #[inline]
    pub fn identifier_columns(&self) -> &[CompactString] {
        &self.identifier_columns
    }

    #[inline]
    pub fn extra_columns(&self) -> &[CompactString] {
        &self.extra_columns
    }

    /// Every requested column, identifiers first.
    pub fn columns(&self) -> Vec<CompactString> {
        self.identifier_columns
            .iter()
            .chain(&self.extra_columns)
            .cloned()
            .collect()
    }
}

/// How results of one batch are read back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconciliationMode {
    /// Statements carried a `RETURNING` clause; split rows by column name.
    Columnar(ReturningRequest),
    /// Only whatever generic insert metadata the driver reports.
    Generic,
}

impl ReconciliationMode {
    /// Columnar only when something was requested and the backend can return it.
    pub fn select(request: ReturningRequest, supports_returning: bool) -> Self {
        if supports_returning && !request.is_empty() {
            ReconciliationMode::Columnar(request)
        } else {
            ReconciliationMode::Generic
        }
    }

    pub fn is_columnar(&self) -> bool {
        matches!(self, ReconciliationMode::Columnar(_))
    }
}

/// Outcome of a whole batch, ordered like the caller's values.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BatchResult {
    pub statement_count: usize,
    pub identifiers: Vec<Entry>,
    pub returned: Vec<Entry>,
}

/// Folds the results of every executed statement, in execution order, into
/// one [`BatchResult`].
///
/// In columnar mode each row yields an identifier entry (requested order) and,
/// when extra columns were requested, a returned entry made of every column
/// that is not an identifier (result order). Single-column entries are
/// flattened to scalars. Every result must carry the requested columns,
/// including results without rows.
pub fn reconcile(results: &[RawStatementResult], mode: &ReconciliationMode) -> Result<BatchResult> {
    let mut batch = BatchResult {
        statement_count: results.len(),
        ..Default::default()
    };

    let request = match mode {
        ReconciliationMode::Generic => {
            batch.identifiers = results
                .iter()
                .flat_map(|r| r.values.iter().cloned().map(Entry::Scalar))
                .collect();
            return Ok(batch);
        }
        ReconciliationMode::Columnar(request) => request,
    };

    let flatten_identifiers = request.identifier_columns.len() == 1;
    let want_identifiers = !request.identifier_columns.is_empty();
    let want_returned = !request.extra_columns.is_empty();

    for result in results {
        let identifier_indices = request
            .identifier_columns
            .iter()
            .map(|c| locate(result, c))
            .collect::<Result<SmallVec<[usize; 4]>>>()?;
        for column in &request.extra_columns {
            locate(result, column)?;
        }

        let returned_indices: SmallVec<[usize; 8]> = (0..result.columns.len())
            .filter(|i| !identifier_indices.contains(i))
            .collect();
        let flatten_returned = returned_indices.len() == 1;

        for row in &result.rows {
            if want_identifiers {
                batch
                    .identifiers
                    .push(pick(row, &identifier_indices, flatten_identifiers));
            }
            if want_returned {
                batch
                    .returned
                    .push(pick(row, &returned_indices, flatten_returned));
            }
        }
    }

    Ok(batch)
}

fn locate(result: &RawStatementResult, column: &CompactString) -> Result<usize> {
    result
        .column_index(column)
        .ok_or_else(|| SqlPackError::UnknownReturningColumn(column.clone()))
}

fn pick(row: &[Value], indices: &[usize], flatten: bool) -> Entry {
    let value = |i: &usize| row.get(*i).cloned().unwrap_or(Value::Null);
    match indices {
        [only] if flatten => Entry::Scalar(value(only)),
        _ => Entry::Tuple(indices.iter().map(value).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(columns: &[&str], rows: Vec<Vec<Value>>) -> RawStatementResult {
        RawStatementResult {
            columns: columns.iter().map(|c| CompactString::from(*c)).collect(),
            affected_rows: rows.len() as u64,
            rows,
            values: Vec::new(),
        }
    }

    fn columnar(ids: &[&str], extras: &[&str]) -> ReconciliationMode {
        ReconciliationMode::Columnar(ReturningRequest::new(
            ids.iter().copied(),
            extras.iter().copied(),
        ))
    }

    #[test]
    fn single_identifier_is_flattened() {
        let results = [
            result(&["id"], vec![vec![1.into()], vec![2.into()]]),
            result(&["id"], vec![vec![3.into()]]),
        ];

        let batch = reconcile(&results, &columnar(&["id"], &[])).unwrap();

        assert_eq!(batch.statement_count, 2);
        assert_eq!(
            batch.identifiers,
            [1, 2, 3].map(|i| Entry::Scalar(Value::Integer(i)))
        );
        assert!(batch.returned.is_empty());
    }

    #[test]
    fn composite_identifiers_follow_request_order() {
        let results = [result(
            &["tenant", "id", "name"],
            vec![
                vec![10.into(), 1.into(), "a".into()],
                vec![10.into(), 2.into(), "b".into()],
            ],
        )];

        let batch = reconcile(&results, &columnar(&["id", "tenant"], &[])).unwrap();

        assert_eq!(
            batch.identifiers,
            [
                Entry::Tuple(vec![1.into(), 10.into()]),
                Entry::Tuple(vec![2.into(), 10.into()]),
            ]
        );
        assert!(batch.returned.is_empty());
    }

    #[test]
    fn returned_takes_every_non_identifier_column() {
        let results = [result(
            &["name", "id", "created_at"],
            vec![vec!["a".into(), 1.into(), "2024-01-01".into()]],
        )];

        let batch = reconcile(&results, &columnar(&["id"], &["created_at"])).unwrap();

        assert_eq!(batch.identifiers, [Entry::Scalar(1.into())]);
        assert_eq!(
            batch.returned,
            [Entry::Tuple(vec!["a".into(), "2024-01-01".into()])]
        );
    }

    #[test]
    fn single_returned_column_is_flattened() {
        let results = [result(
            &["id", "name"],
            vec![vec![1.into(), "a".into()], vec![2.into(), "b".into()]],
        )];

        let batch = reconcile(&results, &columnar(&[], &["name"])).unwrap();

        assert!(batch.identifiers.is_empty());
        assert_eq!(
            batch.returned,
            [
                Entry::Tuple(vec![1.into(), "a".into()]),
                Entry::Tuple(vec![2.into(), "b".into()]),
            ]
        );

        let batch = reconcile(&results, &columnar(&["id"], &["name"])).unwrap();
        assert_eq!(
            batch.returned,
            [Entry::Scalar("a".into()), Entry::Scalar("b".into())]
        );
    }

    #[test]
    fn unknown_column_fails_without_partial_result() {
        let results = [
            result(&["id"], vec![vec![1.into()]]),
            result(&["uuid"], vec![vec!["x".into()]]),
        ];

        let err = reconcile(&results, &columnar(&["id"], &[])).unwrap_err();
        assert!(matches!(err, SqlPackError::UnknownReturningColumn(c) if c == "id"));

        let err = reconcile(&results[..1], &columnar(&["id"], &["missing"])).unwrap_err();
        assert!(matches!(err, SqlPackError::UnknownReturningColumn(c) if c == "missing"));
    }

    #[test]
    fn empty_result_still_needs_requested_columns() {
        let results = [result(&["uuid"], Vec::new())];

        let err = reconcile(&results, &columnar(&["id"], &[])).unwrap_err();
        assert!(matches!(err, SqlPackError::UnknownReturningColumn(c) if c == "id"));

        let results = [result(&["id"], Vec::new())];
        let batch = reconcile(&results, &columnar(&["id"], &[])).unwrap();
        assert_eq!(batch.statement_count, 1);
        assert!(batch.identifiers.is_empty());
    }

    #[test]
    fn generic_mode_takes_values_verbatim() {
        let results = [
            RawStatementResult {
                values: vec![Value::Integer(7)],
                ..Default::default()
            },
            RawStatementResult {
                values: vec![Value::Integer(9)],
                ..Default::default()
            },
        ];

        let batch = reconcile(&results, &ReconciliationMode::Generic).unwrap();
        assert_eq!(batch.statement_count, 2);
        assert_eq!(
            batch.identifiers,
            [Entry::Scalar(7.into()), Entry::Scalar(9.into())]
        );
        assert!(batch.returned.is_empty());
    }

    #[test]
    fn mode_selection() {
        let request = ReturningRequest::new(["id"], ["name", "id", "name"]);
        assert_eq!(request.extra_columns(), ["name"]);
        assert_eq!(request.columns(), ["id", "name"]);

        assert!(ReconciliationMode::select(request.clone(), true).is_columnar());
        assert!(!ReconciliationMode::select(request, false).is_columnar());
        assert!(!ReconciliationMode::select(ReturningRequest::default(), true).is_columnar());
    }
}
