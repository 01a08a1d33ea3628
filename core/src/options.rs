//! Caller-facing import configuration.

use compact_str::CompactString;

use crate::error::{Result, SqlPackError};
use crate::reconcile::ReturningRequest;

/// One column name or a list of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "OneOrMany"))]
pub struct Columns(Vec<CompactString>);

impl Columns {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompactString> {
        self.0.iter()
    }
}

impl From<&str> for Columns {
    fn from(column: &str) -> Self {
        Columns(vec![column.into()])
    }
}

impl<S: Into<CompactString>> From<Vec<S>> for Columns {
    fn from(columns: Vec<S>) -> Self {
        Columns(columns.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<CompactString>, const N: usize> From<[S; N]> for Columns {
    fn from(columns: [S; N]) -> Self {
        Columns(columns.into_iter().map(Into::into).collect())
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(CompactString),
    Many(Vec<CompactString>),
}

#[cfg(feature = "serde")]
impl From<OneOrMany> for Columns {
    fn from(value: OneOrMany) -> Self {
        match value {
            OneOrMany::One(column) => Columns(vec![column]),
            OneOrMany::Many(columns) => Columns(columns),
        }
    }
}

/// Schema descriptor for the target table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    table: CompactString,
    primary_key: Columns,
    column_names: Vec<CompactString>,
}

impl Model {
    pub fn new<I>(table: impl Into<CompactString>, column_names: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<CompactString>,
    {
        Self {
            table: table.into(),
            primary_key: Columns::default(),
            column_names: column_names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_primary_key(mut self, primary_key: impl Into<Columns>) -> Self {
        self.primary_key = primary_key.into();
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn primary_key(&self) -> &Columns {
        &self.primary_key
    }

    pub fn column_names(&self) -> &[CompactString] {
        &self.column_names
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_names.iter().any(|c| c == name)
    }
}

/// Per-import switches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ImportOptions {
    /// Skip rows that would violate a unique constraint
    pub ignore: bool,
    /// Send one statement no matter how large it gets
    pub force_single_insert: bool,
    /// Identifier columns to read back; defaults to the model's primary key
    pub primary_key: Option<Columns>,
    /// Further columns to read back
    pub returning: Columns,
}

impl ImportOptions {
    pub fn with_ignore(mut self, ignore: bool) -> Self {
        self.ignore = ignore;
        self
    }

    pub fn with_force_single_insert(mut self, force: bool) -> Self {
        self.force_single_insert = force;
        self
    }

    pub fn with_primary_key(mut self, primary_key: impl Into<Columns>) -> Self {
        self.primary_key = Some(primary_key.into());
        self
    }

    pub fn with_returning(mut self, returning: impl Into<Columns>) -> Self {
        self.returning = returning.into();
        self
    }

    /// Resolves which columns to read back. Every column must exist on the
    /// model when one is given.
    pub fn returning_request(&self, model: Option<&Model>) -> Result<ReturningRequest> {
        let identifiers = match (&self.primary_key, model) {
            (Some(primary_key), _) => primary_key.clone(),
            (None, Some(model)) => model.primary_key.clone(),
            (None, None) => Columns::default(),
        };

        if let Some(model) = model {
            if let Some(unknown) = identifiers
                .iter()
                .chain(self.returning.iter())
                .find(|c| !model.has_column(c))
            {
                return Err(SqlPackError::UnknownReturningColumn(unknown.clone()));
            }
        }

        Ok(ReturningRequest::new(
            identifiers.0,
            self.returning.iter().cloned(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> Model {
        Model::new("users", ["id", "name", "email", "created_at"]).with_primary_key("id")
    }

    #[test]
    fn primary_key_defaults_to_model() {
        let request = ImportOptions::default()
            .returning_request(Some(&users()))
            .unwrap();
        assert_eq!(request.identifier_columns(), ["id"]);
        assert!(request.extra_columns().is_empty());
    }

    #[test]
    fn explicit_primary_key_and_returning() {
        let request = ImportOptions::default()
            .with_primary_key(["email", "name"])
            .with_returning(vec!["created_at", "email"])
            .returning_request(Some(&users()))
            .unwrap();
        assert_eq!(request.identifier_columns(), ["email", "name"]);
        assert_eq!(request.extra_columns(), ["created_at"]);
    }

    #[test]
    fn unknown_column_on_model() {
        let err = ImportOptions::default()
            .with_returning("nickname")
            .returning_request(Some(&users()))
            .unwrap_err();
        assert!(matches!(err, SqlPackError::UnknownReturningColumn(c) if c == "nickname"));
    }

    #[test]
    fn no_model_no_request() {
        let request = ImportOptions::default().returning_request(None).unwrap();
        assert!(request.is_empty());
    }
}
