//! Schema-driven CSV parsing for knowledge-graph bulk imports
//!
//! Every header and data cell is a `namespace:value<type>` token. A
//! `CsvSchema` decides which namespaces exist (separately for headers and
//! for values), which of them are closed, what types their values carry and
//! which constraints apply. The `SchemaBasedCsvRecordParser` turns header
//! rows into `CsvHeader`s and data rows into `TypedValue`s, collecting every
//! cell failure of a row into one `CsvError::RecordParsing`.
//!
//! This crate does no I/O; CSV tokenization lives in `kgcsv-ingest`.

pub mod error;
pub mod parser;
pub mod record;
pub mod schema;
pub mod schemes;
pub mod types;
pub mod value;
pub mod xsd;

pub use error::{CsvError, ProblemDetail};
pub use parser::SchemaBasedCsvRecordParser;
pub use record::{CsvHeader, TypedCsvRecord, TypedValue};
pub use schema::{CsvSchema, Namespace, Property, SchemaError, ValidationError, Validator};
pub use types::TypeId;
pub use value::{parse_value, RawValue};
pub use xsd::Xsd;
