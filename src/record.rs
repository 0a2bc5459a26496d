//! Definitions to help handling CSV data as a set of records.

use serde::{Deserialize, Serialize};

/// One record of a parsed source: an ordered sequence of field strings.
///
/// A row's length is exactly the number of delimiter-separated spans the
/// scanner found on the record; it is never padded or truncated.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Row {
    fields: Vec<String>,
}

impl Row {
    #[must_use]
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    #[must_use]
    pub fn fields(&self) -> &[String] {
        self.fields.as_slice()
    }

    /// Returns the field at position `i`, if the row has one.
    #[inline]
    #[must_use]
    pub fn get(&self, i: usize) -> Option<&str> {
        self.fields.get(i).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn into_fields(self) -> Vec<String> {
        self.fields
    }
}

impl From<Vec<String>> for Row {
    fn from(fields: Vec<String>) -> Self {
        Self::new(fields)
    }
}

/// Collects fields into rows as the scanner emits them.
///
/// A record that contributed nothing (a blank line, or the position after a
/// final newline) is dropped rather than finalized as an empty row.
#[derive(Default)]
pub(crate) struct RowAssembler {
    rows: Vec<Row>,
    current: Vec<String>,
}

impl RowAssembler {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_field(&mut self, field: String) {
        self.current.push(field);
    }

    /// Whether the record under assembly has any field yet.
    pub(crate) fn row_started(&self) -> bool {
        !self.current.is_empty()
    }

    pub(crate) fn end_record(&mut self) {
        if !self.current.is_empty() {
            self.rows.push(Row::new(std::mem::take(&mut self.current)));
        }
    }

    pub(crate) fn finish(self) -> Vec<Row> {
        self.rows
    }
}
