//! Parsing failures and their problem-detail rendering.
//!
//! Every variant is a terminal validation failure located by row/column.
//! `RecordParsing` aggregates the per-cell failures of one header or data
//! row; callers usually flatten it with [`CsvError::into_causes`] and report
//! one problem per cause.

use crate::types::TypeId;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use thiserror::Error;

pub const PROBLEM_TYPE_PREFIX: &str = "kgcsv:problem:";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CsvError {
    #[error("The CSV header must not be empty.")]
    EmptyHeader,

    #[error("The CSV header value in column {column} must not be blank.")]
    BlankHeaderValue { column: u64 },

    #[error("Duplicate CSV headers {}.", format_duplicates(.duplicates))]
    DuplicateHeaders {
        duplicates: BTreeMap<String, Vec<u64>>,
    },

    #[error("Unknown namespace \"{namespace}\" for value \"{value}\" in row {row}, column {column}.")]
    UnknownNamespace {
        namespace: String,
        value: String,
        row: u64,
        column: u64,
    },

    #[error("Unknown value \"{value}\" for closed namespace \"{namespace}\" in row {row}, column {column}.")]
    UnknownNamespaceValue {
        namespace: String,
        value: String,
        row: u64,
        column: u64,
    },

    #[error("Invalid type \"{actual}\" for value in row {row}, column {column}. Expected type \"{expected}\".")]
    UnexpectedValueType {
        actual: TypeId,
        expected: TypeId,
        row: u64,
        column: u64,
    },

    #[error("Unknown type \"{tag}\" for value in row {row}, column {column}.")]
    UnknownValueType { tag: String, row: u64, column: u64 },

    #[error("Inconsistent column count in row {row}. Found {actual}, expected {expected}.")]
    InconsistentColumnCount {
        actual: usize,
        expected: usize,
        row: u64,
    },

    #[error("Invalid value \"{value}\" in row {row}, column {column}. Reason: {reason}")]
    InvalidValue {
        value: String,
        row: u64,
        column: u64,
        reason: String,
    },

    #[error("Found {} invalid value(s) in row {row}.", .causes.len())]
    RecordParsing { row: u64, causes: Vec<CsvError> },
}

fn format_duplicates(duplicates: &BTreeMap<String, Vec<u64>>) -> String {
    duplicates
        .iter()
        .map(|(key, columns)| format!("\"{key}\" in columns {columns:?}"))
        .collect::<Vec<_>>()
        .join(", ")
}

impl CsvError {
    /// Failure raised when a literal is outside the lexical space of its type.
    pub fn unparsable(value: &str, row: u64, column: u64, ty: &TypeId) -> Self {
        CsvError::InvalidValue {
            value: value.to_string(),
            row,
            column,
            reason: format!("Value cannot be parsed as type \"{ty}\"."),
        }
    }

    /// Flatten aggregates into their individual causes.
    pub fn into_causes(self) -> Vec<CsvError> {
        match self {
            CsvError::RecordParsing { causes, .. } => {
                causes.into_iter().flat_map(CsvError::into_causes).collect()
            }
            other => vec![other],
        }
    }

    pub fn row(&self) -> Option<u64> {
        match self {
            CsvError::EmptyHeader
            | CsvError::BlankHeaderValue { .. }
            | CsvError::DuplicateHeaders { .. } => Some(1),
            CsvError::UnknownNamespace { row, .. }
            | CsvError::UnknownNamespaceValue { row, .. }
            | CsvError::UnexpectedValueType { row, .. }
            | CsvError::UnknownValueType { row, .. }
            | CsvError::InconsistentColumnCount { row, .. }
            | CsvError::InvalidValue { row, .. }
            | CsvError::RecordParsing { row, .. } => Some(*row),
        }
    }

    pub fn column(&self) -> Option<u64> {
        match self {
            CsvError::BlankHeaderValue { column }
            | CsvError::UnknownNamespace { column, .. }
            | CsvError::UnknownNamespaceValue { column, .. }
            | CsvError::UnexpectedValueType { column, .. }
            | CsvError::UnknownValueType { column, .. }
            | CsvError::InvalidValue { column, .. } => Some(*column),
            _ => None,
        }
    }

    pub fn problem_type(&self) -> &'static str {
        match self {
            CsvError::EmptyHeader => "empty_csv_header",
            CsvError::BlankHeaderValue { .. } => "blank_csv_header_value",
            CsvError::DuplicateHeaders { .. } => "duplicate_csv_headers",
            CsvError::UnknownNamespace { .. } => "unknown_csv_namespace",
            CsvError::UnknownNamespaceValue { .. } => "unknown_namespace_value",
            CsvError::UnexpectedValueType { .. } => "unexpected_csv_value_type",
            CsvError::UnknownValueType { .. } => "unknown_csv_value_type",
            CsvError::InconsistentColumnCount { .. } => "inconsistent_csv_column_count",
            CsvError::InvalidValue { .. } => "invalid_csv_value",
            CsvError::RecordParsing { .. } => "csv_record_parsing",
        }
    }

    /// Problem detail for this error alone (aggregates list their causes
    /// under `errors`).
    pub fn to_problem(&self) -> ProblemDetail {
        let mut properties = BTreeMap::new();
        let mut put = |key: &str, value: Value| {
            properties.insert(key.to_string(), value);
        };
        match self {
            CsvError::EmptyHeader => {}
            CsvError::BlankHeaderValue { column } => put("csv_column", json!(column)),
            CsvError::DuplicateHeaders { duplicates } => put("csv_headers", json!(duplicates)),
            CsvError::UnknownNamespace {
                namespace,
                value,
                row,
                column,
            }
            | CsvError::UnknownNamespaceValue {
                namespace,
                value,
                row,
                column,
            } => {
                put("csv_namespace", json!(namespace));
                put("csv_value", json!(value));
                put("csv_row", json!(row));
                put("csv_column", json!(column));
            }
            CsvError::UnexpectedValueType {
                actual,
                expected,
                row,
                column,
            } => {
                put("actual_csv_cell_value_type", json!(actual));
                put("expected_csv_cell_value_type", json!(expected));
                put("csv_row", json!(row));
                put("csv_column", json!(column));
            }
            CsvError::UnknownValueType { tag, row, column } => {
                put("csv_cell_value_type", json!(tag));
                put("csv_row", json!(row));
                put("csv_column", json!(column));
            }
            CsvError::InconsistentColumnCount {
                actual,
                expected,
                row,
            } => {
                put("actual_csv_column_count", json!(actual));
                put("expected_csv_column_count", json!(expected));
                put("csv_row", json!(row));
            }
            CsvError::InvalidValue {
                value,
                row,
                column,
                reason,
            } => {
                put("csv_cell_value", json!(value));
                put("csv_row", json!(row));
                put("csv_column", json!(column));
                put("reason", json!(reason));
            }
            CsvError::RecordParsing { row, causes } => {
                put("csv_row", json!(row));
                let errors: Vec<ProblemDetail> = causes.iter().map(CsvError::to_problem).collect();
                put("errors", json!(errors));
            }
        }
        ProblemDetail {
            problem_type: format!("{PROBLEM_TYPE_PREFIX}{}", self.problem_type()),
            title: "Bad Request".to_string(),
            status: 400,
            detail: self.to_string(),
            properties,
        }
    }

    /// One problem per individual cause.
    pub fn problems(&self) -> Vec<ProblemDetail> {
        self.clone()
            .into_causes()
            .iter()
            .map(CsvError::to_problem)
            .collect()
    }
}

/// Machine-readable rendering of a `CsvError` (RFC 9457 layout).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemDetail {
    #[serde(rename = "type")]
    pub problem_type: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    #[serde(flatten)]
    pub properties: BTreeMap<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_the_documented_text() {
        let err = CsvError::UnexpectedValueType {
            actual: TypeId::BOOLEAN,
            expected: TypeId::STRING,
            row: 1,
            column: 4,
        };
        assert_eq!(
            err.to_string(),
            "Invalid type \"Boolean\" for value in row 1, column 4. Expected type \"String\"."
        );

        let err = CsvError::unparsable("156541.0", 1, 1, &TypeId::INTEGER);
        assert_eq!(
            err.to_string(),
            "Invalid value \"156541.0\" in row 1, column 1. Reason: Value cannot be parsed as type \"Integer\"."
        );

        let err = CsvError::InconsistentColumnCount {
            actual: 2,
            expected: 3,
            row: 5,
        };
        assert_eq!(
            err.to_string(),
            "Inconsistent column count in row 5. Found 2, expected 3."
        );
    }

    #[test]
    fn duplicate_headers_list_every_group() {
        let mut duplicates = BTreeMap::new();
        duplicates.insert("paper:title".to_string(), vec![1, 3]);
        duplicates.insert("paper:doi".to_string(), vec![2, 4]);
        let err = CsvError::DuplicateHeaders { duplicates };
        assert_eq!(
            err.to_string(),
            "Duplicate CSV headers \"paper:doi\" in columns [2, 4], \"paper:title\" in columns [1, 3]."
        );
    }

    #[test]
    fn aggregates_flatten_recursively() {
        let leaf = |column| CsvError::BlankHeaderValue { column };
        let err = CsvError::RecordParsing {
            row: 1,
            causes: vec![
                leaf(1),
                CsvError::RecordParsing {
                    row: 1,
                    causes: vec![leaf(2), leaf(3)],
                },
            ],
        };
        assert_eq!(err.to_string(), "Found 2 invalid value(s) in row 1.");
        assert_eq!(err.into_causes(), vec![leaf(1), leaf(2), leaf(3)]);
    }

    #[test]
    fn problem_detail_carries_kind_specific_fields() {
        let err = CsvError::UnknownNamespaceValue {
            namespace: "paper".to_string(),
            value: "subtitle".to_string(),
            row: 1,
            column: 2,
        };
        let json = serde_json::to_value(err.to_problem()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "kgcsv:problem:unknown_namespace_value",
                "title": "Bad Request",
                "status": 400,
                "detail": "Unknown value \"subtitle\" for closed namespace \"paper\" in row 1, column 2.",
                "csv_namespace": "paper",
                "csv_value": "subtitle",
                "csv_row": 1,
                "csv_column": 2
            })
        );
    }

    #[test]
    fn problems_expand_aggregates() {
        let err = CsvError::RecordParsing {
            row: 2,
            causes: vec![
                CsvError::unparsable("x", 2, 1, &TypeId::INTEGER),
                CsvError::UnknownValueType {
                    tag: "uuid".to_string(),
                    row: 2,
                    column: 3,
                },
            ],
        };
        let problems = err.problems();
        assert_eq!(problems.len(), 2);
        assert_eq!(problems[0].problem_type, "kgcsv:problem:invalid_csv_value");
        assert_eq!(problems[1].properties["csv_column"], serde_json::json!(3));
        assert_eq!(err.row(), Some(2));
        assert_eq!(err.column(), None);
    }
}
