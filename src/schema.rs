//! Row schemas: per-field coercion rules plus a transform into a record
//! shape, and the structured failure value produced when a row does not
//! satisfy them.

use crate::record::Row;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use strum_macros::{Display, EnumString};
use thiserror::Error;

/// A well-formed email address: a local part free of whitespace and `@`,
/// then a domain containing a dot.
const RX_EMAIL: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// The supported per-field interpretations.
#[derive(Clone, Copy, Debug, Deserialize, Display, EnumString, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "snake_case")]
pub enum FieldKind {
    Int64,
    Float64,
    Utf8,
    Email,
    DateTime,
}

pub struct ParseError {
    inner: Box<dyn std::error::Error>,
}

impl fmt::Debug for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parse error: {}", self.inner)
    }
}

impl From<std::num::ParseFloatError> for ParseError {
    fn from(error: std::num::ParseFloatError) -> Self {
        Self {
            inner: Box::new(error),
        }
    }
}

impl From<std::num::ParseIntError> for ParseError {
    fn from(error: std::num::ParseIntError) -> Self {
        Self {
            inner: Box::new(error),
        }
    }
}

impl From<chrono::format::ParseError> for ParseError {
    fn from(error: chrono::format::ParseError) -> Self {
        Self {
            inner: Box::new(error),
        }
    }
}

pub type Int64Parser = dyn Fn(&str) -> Result<i64, ParseError> + Send + Sync;
pub type Float64Parser = dyn Fn(&str) -> Result<f64, ParseError> + Send + Sync;
pub type TimestampParser = dyn Fn(&str) -> Result<i64, ParseError> + Send + Sync;

/// Per-field coercion capability: turns one raw field string into a
/// [`Value`] of the declared kind, or reports why it cannot.
#[derive(Clone)]
pub enum FieldParser {
    Int64(Arc<Int64Parser>),
    Float64(Arc<Float64Parser>),
    Utf8,
    Email,
    Timestamp(Arc<TimestampParser>),
}

impl FieldParser {
    #[must_use]
    pub fn int64() -> Self {
        Self::Int64(Arc::new(parse::<i64>))
    }

    #[must_use]
    pub fn float64() -> Self {
        Self::Float64(Arc::new(parse::<f64>))
    }

    #[must_use]
    pub fn timestamp() -> Self {
        Self::Timestamp(Arc::new(parse_timestamp))
    }

    #[must_use]
    pub fn int64_with_parser<P>(parser: P) -> Self
    where
        P: Fn(&str) -> Result<i64, ParseError> + Send + Sync + 'static,
    {
        Self::Int64(Arc::new(parser))
    }

    #[must_use]
    pub fn timestamp_with_parser<P>(parser: P) -> Self
    where
        P: Fn(&str) -> Result<i64, ParseError> + Send + Sync + 'static,
    {
        Self::Timestamp(Arc::new(parser))
    }

    #[must_use]
    pub fn from_kind(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Int64 => Self::int64(),
            FieldKind::Float64 => Self::float64(),
            FieldKind::Utf8 => Self::Utf8,
            FieldKind::Email => Self::Email,
            FieldKind::DateTime => Self::timestamp(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Int64(_) => FieldKind::Int64,
            Self::Float64(_) => FieldKind::Float64,
            Self::Utf8 => FieldKind::Utf8,
            Self::Email => FieldKind::Email,
            Self::Timestamp(_) => FieldKind::DateTime,
        }
    }

    fn coerce(&self, field: usize, raw: &str) -> Result<Value, ValidationErrorKind> {
        if raw.is_empty() && !matches!(self, Self::Utf8) {
            return Err(ValidationErrorKind::Missing { field });
        }
        match self {
            Self::Utf8 => Ok(Value::Utf8(raw.to_string())),
            Self::Email => {
                if is_email(raw) {
                    Ok(Value::Utf8(raw.to_string()))
                } else {
                    Err(ValidationErrorKind::Format {
                        field,
                        expected: FieldKind::Email,
                        value: raw.to_string(),
                    })
                }
            }
            Self::Int64(parser) => match parser(raw) {
                Ok(v) => Ok(Value::Int64(v)),
                Err(_) => Err(ValidationErrorKind::Type {
                    field,
                    expected: FieldKind::Int64,
                    value: raw.to_string(),
                }),
            },
            Self::Float64(parser) => match parser(raw) {
                Ok(v) => Ok(Value::Float64(v)),
                Err(_) => Err(ValidationErrorKind::Type {
                    field,
                    expected: FieldKind::Float64,
                    value: raw.to_string(),
                }),
            },
            Self::Timestamp(parser) => match parser(raw) {
                Ok(v) => Ok(Value::Timestamp(v)),
                Err(_) => Err(ValidationErrorKind::Type {
                    field,
                    expected: FieldKind::DateTime,
                    value: raw.to_string(),
                }),
            },
        }
    }
}

impl fmt::Debug for FieldParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int64(_) => write!(f, "Int64"),
            Self::Float64(_) => write!(f, "Float64"),
            Self::Utf8 => write!(f, "Utf8"),
            Self::Email => write!(f, "Email"),
            Self::Timestamp(_) => write!(f, "Timestamp"),
        }
    }
}

fn parse<T>(v: &str) -> Result<T, ParseError>
where
    T: FromStr,
    <T as FromStr>::Err: Into<ParseError>,
{
    v.parse::<T>().map_err(Into::into)
}

/// Parses a timestamp in RFC 3339 format into seconds since the epoch.
fn parse_timestamp(v: &str) -> Result<i64, ParseError> {
    Ok(chrono::NaiveDateTime::parse_from_str(v, "%Y-%m-%dT%H:%M:%S%.f%:z")?.timestamp())
}

pub(crate) fn is_email(v: &str) -> bool {
    if let Ok(re) = Regex::new(RX_EMAIL) {
        re.is_match(v)
    } else {
        false
    }
}

/// A field value after coercion.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Value {
    Int64(i64),
    Float64(f64),
    Utf8(String),
    Timestamp(i64),
}

impl Value {
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int64(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float64(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Utf8(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<i64> {
        match self {
            Self::Timestamp(v) => Some(*v),
            _ => None,
        }
    }
}

/// Why a row failed validation.
#[derive(Clone, Debug, Eq, Error, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationErrorKind {
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },
    #[error("field {field} is empty")]
    Missing { field: usize },
    #[error("field {field}: cannot interpret {value:?} as {expected}")]
    Type {
        field: usize,
        expected: FieldKind,
        value: String,
    },
    #[error("field {field}: {value:?} is not a well-formed {expected}")]
    Format {
        field: usize,
        expected: FieldKind,
        value: String,
    },
}

impl ValidationErrorKind {
    /// The offending field position, if the failure is tied to one field.
    #[must_use]
    pub fn field(&self) -> Option<usize> {
        match self {
            Self::FieldCount { .. } => None,
            Self::Missing { field }
            | Self::Type { field, .. }
            | Self::Format { field, .. } => Some(*field),
        }
    }
}

/// The structured outcome of a row that did not satisfy its schema.
///
/// Validation failure is a normal value, not a panic: the adapter returns it
/// through `Result` and callers branch on the shape.
#[derive(Clone, Debug, Eq, Error, PartialEq, Serialize)]
#[error("row {row}: {kind}")]
pub struct ValidationError {
    row: usize,
    kind: ValidationErrorKind,
}

impl ValidationError {
    #[must_use]
    pub fn new(row: usize, kind: ValidationErrorKind) -> Self {
        Self { row, kind }
    }

    /// Zero-based index of the row that failed.
    #[must_use]
    pub fn row(&self) -> usize {
        self.row
    }

    #[must_use]
    pub fn kind(&self) -> &ValidationErrorKind {
        &self.kind
    }

    #[must_use]
    pub fn field(&self) -> Option<usize> {
        self.kind.field()
    }

    /// Machine-readable report of the failure.
    ///
    /// # Panics
    ///
    /// Panics if serialization fails, which cannot happen for this type.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).expect("validation errors serialize")
    }
}

/// Expected shape of every row: one parser per column, in order, plus a
/// transform from the coerced values to the record shape `T`.
pub struct RowSchema<T> {
    parsers: Vec<FieldParser>,
    build: Arc<dyn Fn(&[Value]) -> T + Send + Sync>,
}

impl<T> RowSchema<T> {
    pub fn new<F>(parsers: Vec<FieldParser>, build: F) -> Self
    where
        F: Fn(&[Value]) -> T + Send + Sync + 'static,
    {
        Self {
            parsers,
            build: Arc::new(build),
        }
    }

    pub fn from_kinds<F>(kinds: &[FieldKind], build: F) -> Self
    where
        F: Fn(&[Value]) -> T + Send + Sync + 'static,
    {
        Self::new(
            kinds.iter().map(|k| FieldParser::from_kind(*k)).collect(),
            build,
        )
    }

    /// Number of fields every row must have.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.parsers.len()
    }

    /// Validates and transforms one row.
    ///
    /// The field count is checked first; an extra or missing column is a
    /// content error like any other. The transform only runs on a fully
    /// coerced row, so it receives exactly `arity()` values matching the
    /// declared kinds.
    ///
    /// # Errors
    ///
    /// Returns the structured failure for the first field that does not
    /// satisfy its parser.
    pub fn validate_row(&self, index: usize, row: &Row) -> Result<T, ValidationError> {
        let fields = row.fields();
        if fields.len() != self.parsers.len() {
            return Err(ValidationError::new(
                index,
                ValidationErrorKind::FieldCount {
                    expected: self.parsers.len(),
                    found: fields.len(),
                },
            ));
        }
        let mut values = Vec::with_capacity(fields.len());
        for (i, (parser, raw)) in self.parsers.iter().zip(fields).enumerate() {
            let value = parser
                .coerce(i, raw)
                .map_err(|kind| ValidationError::new(index, kind))?;
            values.push(value);
        }
        Ok((self.build)(&values))
    }
}

impl<T> Clone for RowSchema<T> {
    fn clone(&self) -> Self {
        Self {
            parsers: self.parsers.clone(),
            build: Arc::clone(&self.build),
        }
    }
}

impl<T> fmt::Debug for RowSchema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowSchema")
            .field("parsers", &self.parsers)
            .finish()
    }
}

/// Validates and transforms every row, in order.
///
/// All rows must satisfy the schema for any record to be returned: the first
/// failing row becomes the whole outcome and already-validated records are
/// discarded.
///
/// # Errors
///
/// Returns the [`ValidationError`] of the first invalid row.
pub fn rows_to_records<T>(rows: &[Row], schema: &RowSchema<T>) -> Result<Vec<T>, ValidationError> {
    let mut records = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        records.push(schema.validate_row(index, row)?);
    }
    Ok(records)
}
