//! CSV tokenization.
//!
//! Reads a whole CSV document into a header plus numbered rows. The reader
//! runs in flexible mode: rows of the wrong width are kept as they are so the
//! record parser can report them with their row number.

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Serialize;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

const BOM: char = '\u{feff}';

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Tokenizer settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvReadOptions {
    pub delimiter: u8,
    pub quote: u8,
    /// Trim whitespace around every field.
    pub trim: bool,
    /// Lines starting with this byte are skipped.
    pub comment: Option<u8>,
}

impl Default for CsvReadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            trim: false,
            comment: None,
        }
    }
}

/// One data row as read from the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceRow {
    /// 1-based index among data rows.
    pub item_number: u64,
    /// Physical line the row starts on.
    pub line_number: u64,
    pub values: Vec<String>,
}

impl SourceRow {
    /// Row number in the document, counting the header as row 1.
    pub fn record_row(&self) -> u64 {
        self.item_number + 1
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CsvSource {
    pub header: Vec<String>,
    pub header_line: u64,
    pub rows: Vec<SourceRow>,
}

impl CsvSource {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn read_csv<R: Read>(reader: R, options: &CsvReadOptions) -> Result<CsvSource, IngestError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(options.delimiter)
        .quote(options.quote)
        .comment(options.comment)
        .trim(if options.trim { Trim::All } else { Trim::None })
        .from_reader(reader);

    let mut source = CsvSource::default();
    let mut records = rdr.records();

    let Some(first) = records.next() else {
        tracing::debug!("csv source has no header record");
        return Ok(source);
    };
    let first = first?;
    source.header_line = line_of(&first);
    source.header = first.iter().map(str::to_string).collect();
    if let Some(cell) = source.header.first_mut() {
        if cell.starts_with(BOM) {
            *cell = cell.trim_start_matches(BOM).to_string();
        }
    }

    for (index, record) in records.enumerate() {
        let record = record?;
        source.rows.push(SourceRow {
            item_number: index as u64 + 1,
            line_number: line_of(&record),
            values: record.iter().map(str::to_string).collect(),
        });
    }

    tracing::debug!(
        columns = source.header.len(),
        rows = source.rows.len(),
        "read csv source"
    );
    Ok(source)
}

pub fn read_csv_path(path: impl AsRef<Path>, options: &CsvReadOptions) -> Result<CsvSource, IngestError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| IngestError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    read_csv(file, options)
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}
