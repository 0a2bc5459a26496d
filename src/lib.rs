pub mod csv;
pub mod record;
mod schema;

pub use record::Row;
pub use schema::{
    rows_to_records, FieldKind, FieldParser, Float64Parser, Int64Parser, ParseError, RowSchema,
    TimestampParser, ValidationError, ValidationErrorKind, Value,
};
