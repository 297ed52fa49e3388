//! Typed output of header and record parsing.

use crate::types::TypeId;
use serde::{Deserialize, Serialize};

/// One parsed header cell. `column` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CsvHeader {
    pub column: u64,
    pub namespace: Option<String>,
    pub name: String,
    pub column_type: Option<TypeId>,
}

impl CsvHeader {
    /// `namespace:name`, or just `name` without a namespace.
    pub fn key(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{ns}:{}", self.name),
            None => self.name.clone(),
        }
    }
}

/// One parsed cell: resolved namespace, literal value and resolved type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypedValue {
    pub namespace: Option<String>,
    pub value: Option<String>,
    #[serde(rename = "type")]
    pub ty: TypeId,
}

impl TypedValue {
    pub fn new(namespace: Option<String>, value: Option<String>, ty: TypeId) -> Self {
        Self {
            namespace,
            value,
            ty,
        }
    }
}

/// A successfully parsed data row.
///
/// `item_number` counts data rows from 1; `line_number` is the physical line
/// the row starts on in its source (quoted cells may span lines).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedCsvRecord {
    pub item_number: u64,
    pub line_number: u64,
    pub values: Vec<TypedValue>,
}

impl TypedCsvRecord {
    /// The value under the header `namespace:name`, if that column exists.
    pub fn get<'a>(&'a self, headers: &[CsvHeader], namespace: &str, name: &str) -> Option<&'a TypedValue> {
        headers
            .iter()
            .position(|h| h.namespace.as_deref() == Some(namespace) && h.name == name)
            .and_then(|index| self.values.get(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_key_includes_namespace() {
        let header = CsvHeader {
            column: 1,
            namespace: Some("paper".to_string()),
            name: "title".to_string(),
            column_type: Some(TypeId::STRING),
        };
        assert_eq!(header.key(), "paper:title");
    }

    #[test]
    fn typed_value_serializes_type_field() {
        let value = TypedValue::new(None, Some("42".to_string()), TypeId::INTEGER);
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"namespace": null, "value": "42", "type": "Integer"})
        );
    }

    #[test]
    fn record_lookup_by_header() {
        let headers = vec![
            CsvHeader {
                column: 1,
                namespace: None,
                name: "a".to_string(),
                column_type: None,
            },
            CsvHeader {
                column: 2,
                namespace: Some("paper".to_string()),
                name: "doi".to_string(),
                column_type: Some(TypeId::STRING),
            },
        ];
        let record = TypedCsvRecord {
            item_number: 1,
            line_number: 2,
            values: vec![
                TypedValue::new(None, Some("x".to_string()), TypeId::STRING),
                TypedValue::new(None, Some("10.1000/182".to_string()), TypeId::STRING),
            ],
        };
        let doi = record.get(&headers, "paper", "doi").unwrap();
        assert_eq!(doi.value.as_deref(), Some("10.1000/182"));
        assert!(record.get(&headers, "paper", "title").is_none());
    }
}
