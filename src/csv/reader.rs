//! Drives the scanner over a source and applies an optional row schema.

use crate::csv::tokenizer;
use crate::record::Row;
use crate::schema::{self, FieldKind, RowSchema, ValidationError};
use std::fs;
use std::io;
use std::path::Path;

/// Parses CSV text into ordered rows of raw field strings.
///
/// Every logical record becomes one row, in source order, including any
/// header-like first row. Parsing never fails: malformed quoting closes at
/// end-of-input instead of raising.
#[must_use]
pub fn parse_rows(input: &str) -> Vec<Row> {
    tokenizer::scan(input)
}

/// Parses CSV text and validates every row against `schema`.
///
/// The outcome is strictly all-or-nothing over the whole input: either every
/// row validated and transformed, in source order, or the structured failure
/// of the first row that did not.
///
/// # Errors
///
/// Returns the [`ValidationError`] of the first invalid row.
pub fn parse_records<T>(input: &str, schema: &RowSchema<T>) -> Result<Vec<T>, ValidationError> {
    schema::rows_to_records(&parse_rows(input), schema)
}

/// Reads the file at `path` and parses it into raw rows.
///
/// Acquiring the source text is the only step that can wait or fail; once
/// the content is in memory, parsing is pure.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn read_rows<P: AsRef<Path>>(path: P) -> io::Result<Vec<Row>> {
    Ok(parse_rows(&fs::read_to_string(path)?))
}

/// Reads the file at `path` and validates every row against `schema`.
///
/// The outer `Result` is source acquisition; the inner one is the
/// mutually-exclusive pair of typed records and validation failure, to be
/// branched on by shape.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn read_records<T, P: AsRef<Path>>(
    path: P,
    schema: &RowSchema<T>,
) -> io::Result<Result<Vec<T>, ValidationError>> {
    Ok(parse_records(&fs::read_to_string(path)?, schema))
}

/// Infers the kind of a single field value.
fn infer_field_kind(field: &str) -> FieldKind {
    if field.parse::<i64>().is_ok() {
        FieldKind::Int64
    } else if field.parse::<f64>().is_ok() {
        FieldKind::Float64
    } else if schema::is_email(field) {
        FieldKind::Email
    } else {
        FieldKind::Utf8
    }
}

/// Infers a per-column [`FieldKind`] from the first record of `input`.
///
/// # Errors
///
/// Returns an error if there is no record to read.
pub fn infer_kinds(input: &str) -> Result<Vec<FieldKind>, String> {
    let rows = parse_rows(input);
    let first = rows.first().ok_or("no data available")?;
    Ok(first.fields().iter().map(|f| infer_field_kind(f)).collect())
}
