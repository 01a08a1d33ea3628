//! Statement templates and assembly.
//!
//! A statement is always `base + values.join(",") + suffix`, optionally followed by
//! ` RETURNING <columns>`. The base carries everything up to and including
//! `VALUES `; the suffix carries trailing clauses such as conflict handling.

use crate::error::{Result, SqlPackError};

/// Bytes reserved per statement on top of the template text itself.
pub const QUERY_OVERHEAD: usize = 8;

/// Separator placed between value sets.
pub const VALUE_SEPARATOR: &str = ",";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementTemplate {
    base: String,
    suffix: String,
}

impl StatementTemplate {
    /// Creates a template from pre-rendered base text. The base must not be empty.
    pub fn new(base: impl Into<String>) -> Result<Self> {
        let base = base.into();
        if base.is_empty() {
            return Err(SqlPackError::Configuration(
                "statement template base must not be empty".into(),
            ));
        }
        Ok(Self {
            base,
            suffix: String::new(),
        })
    }

    /// Builds `INSERT <modifiers> INTO <table> (<columns>) VALUES `.
    ///
    /// `table` and `columns` are used verbatim; quoting is the caller's concern.
    /// Modifiers such as `IGNORE` come from
    /// [`BackendCapabilities::insert_modifiers`](crate::BackendCapabilities::insert_modifiers).
    pub fn insert_into<I, S>(table: &str, columns: I, modifiers: &[&str]) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if table.is_empty() {
            return Err(SqlPackError::Configuration("table name must not be empty".into()));
        }

        let mut base = String::from("INSERT ");
        for modifier in modifiers {
            base.push_str(modifier);
            base.push(' ');
        }
        base.push_str("INTO ");
        base.push_str(table);

        let mut columns = columns.into_iter().peekable();
        if columns.peek().is_some() {
            base.push_str(" (");
            for (i, column) in columns.enumerate() {
                if i > 0 {
                    base.push_str(", ");
                }
                base.push_str(column.as_ref());
            }
            base.push(')');
        }
        base.push_str(" VALUES ");

        Self::new(base)
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    #[inline]
    pub fn base(&self) -> &str {
        &self.base
    }

    #[inline]
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Fixed per-statement byte cost: overhead plus base and suffix text.
    #[inline]
    pub fn reserved_bytes(&self) -> usize {
        QUERY_OVERHEAD + self.base.len() + self.suffix.len()
    }

    /// Total bytes needed to send every value set in one statement built from
    /// this template.
    pub fn total_bytes<V: AsRef<str>>(&self, values: &[V]) -> usize {
        self.reserved_bytes() + joined_len(values)
    }

    /// Concatenates base, comma-joined values and suffix. A non-empty
    /// `returning` column list is appended as ` RETURNING <returning>`.
    pub fn assemble<V: AsRef<str>>(&self, values: &[V], returning: Option<&str>) -> String {
        let returning = returning.filter(|r| !r.is_empty());
        let capacity = self.base.len()
            + joined_len(values)
            + self.suffix.len()
            + returning.map_or(0, |r| r.len() + " RETURNING ".len());

        let mut sql = String::with_capacity(capacity);
        sql.push_str(&self.base);
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                sql.push_str(VALUE_SEPARATOR);
            }
            sql.push_str(value.as_ref());
        }
        sql.push_str(&self.suffix);
        if let Some(returning) = returning {
            sql.push_str(" RETURNING ");
            sql.push_str(returning);
        }
        sql
    }
}

/// Byte length of the values once joined with separators.
pub(crate) fn joined_len<V: AsRef<str>>(values: &[V]) -> usize {
    let data: usize = values.iter().map(|v| v.as_ref().len()).sum();
    data + values.len().saturating_sub(1) * VALUE_SEPARATOR.len()
}
