//! CSV ingestion around `kgcsv-core`
//!
//! - `reader`: tokenizes CSV documents (files or any `Read`) into numbered rows
//! - `pipeline`: parses a tokenized source against a schema and collects an
//!   `ImportReport` with one located problem per failure cause

pub mod pipeline;
pub mod reader;

pub use pipeline::{ImportReport, Pipeline, RowProblem};
pub use reader::{read_csv, read_csv_path, CsvReadOptions, CsvSource, IngestError, SourceRow};
