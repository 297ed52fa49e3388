//! Schema-driven header and record parsing.
//!
//! The parser is a thin, stateless view over a `CsvSchema`. Header rows are
//! parsed once into `CsvHeader`s; every data row is then parsed against those
//! headers independently, so rows can be handed out to any number of threads.
//!
//! Failures inside a row are collected per cell and surfaced together as
//! `CsvError::RecordParsing`. The only short-circuit is a row whose width does
//! not match the header.

use crate::error::CsvError;
use crate::record::{CsvHeader, TypedValue};
use crate::schema::{CsvSchema, Namespace, ValidationError, Validator};
use crate::types::TypeId;
use crate::value::parse_value;
use crate::xsd::Xsd;
use std::collections::BTreeMap;

/// Header cells are always located in the first row.
pub const HEADER_ROW: u64 = 1;

#[derive(Debug, Clone, Copy)]
pub struct SchemaBasedCsvRecordParser<'a> {
    schema: &'a CsvSchema,
}

impl<'a> SchemaBasedCsvRecordParser<'a> {
    pub fn new(schema: &'a CsvSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &'a CsvSchema {
        self.schema
    }

    /// Parse the header row into one `CsvHeader` per column.
    pub fn parse_header<S: AsRef<str>>(&self, header: &[S]) -> Result<Vec<CsvHeader>, CsvError> {
        if header.is_empty() {
            return Err(CsvError::EmptyHeader);
        }

        let mut headers = Vec::with_capacity(header.len());
        let mut causes = Vec::new();
        for (index, token) in header.iter().enumerate() {
            let column = index as u64 + 1;
            match self.parse_header_cell(token.as_ref(), column) {
                Ok(parsed) => headers.push(parsed),
                Err(err) => causes.push(err),
            }
        }
        if !causes.is_empty() {
            tracing::warn!(errors = causes.len(), "csv header rejected");
            return Err(CsvError::RecordParsing {
                row: HEADER_ROW,
                causes,
            });
        }

        self.check_duplicates(&headers)?;

        tracing::debug!(columns = headers.len(), "parsed csv header");
        Ok(headers)
    }

    fn parse_header_cell(&self, token: &str, column: u64) -> Result<CsvHeader, CsvError> {
        let raw = parse_value(self.schema, token, HEADER_ROW, column)?;
        let Some(value) = raw.value.clone() else {
            return Err(CsvError::BlankHeaderValue { column });
        };

        if let Some(ns) = raw.namespace.as_deref() {
            if !self.schema.headers.contains(ns) {
                return Err(CsvError::UnknownNamespace {
                    namespace: ns.to_string(),
                    value,
                    row: HEADER_ROW,
                    column,
                });
            }
        }

        let resolved = raw
            .namespace
            .as_deref()
            .and_then(|ns| self.schema.headers.resolve(ns));

        let Some(namespace) = resolved else {
            // Pass-through prefixes stay part of the header name.
            return Ok(CsvHeader {
                column,
                namespace: None,
                name: raw.folded_value().unwrap_or(value),
                column_type: raw.ty,
            });
        };

        if namespace.closed && namespace.property(&value).is_none() {
            return Err(CsvError::UnknownNamespaceValue {
                namespace: namespace.name.clone(),
                value,
                row: HEADER_ROW,
                column,
            });
        }
        run_validator(namespace.header_value_validator.as_ref(), &value, HEADER_ROW, column)?;
        run_validator(namespace.column_value_constraint.as_ref(), &value, HEADER_ROW, column)?;

        if let (true, Some(explicit), Some(property)) =
            (namespace.closed, raw.ty.as_ref(), namespace.property(&value))
        {
            if *explicit != property.ty {
                return Err(CsvError::UnexpectedValueType {
                    actual: explicit.clone(),
                    expected: property.ty.clone(),
                    row: HEADER_ROW,
                    column,
                });
            }
        }

        let column_type = namespace.type_for_value(Some(value.as_str())).or(raw.ty);
        Ok(CsvHeader {
            column,
            namespace: Some(namespace.name.clone()),
            name: value,
            column_type,
        })
    }

    /// Closed-namespace headers must be unique; everything else may repeat.
    fn check_duplicates(&self, headers: &[CsvHeader]) -> Result<(), CsvError> {
        let mut groups: BTreeMap<String, Vec<u64>> = BTreeMap::new();
        for header in headers {
            let closed = header
                .namespace
                .as_deref()
                .and_then(|ns| self.schema.headers.resolve(ns))
                .is_some_and(|ns| ns.closed);
            if closed {
                groups.entry(header.key()).or_default().push(header.column);
            }
        }
        groups.retain(|_, columns| columns.len() > 1);
        if groups.is_empty() {
            Ok(())
        } else {
            Err(CsvError::DuplicateHeaders { duplicates: groups })
        }
    }

    /// Parse one data row. `row` is the 1-based position reported in errors.
    pub fn parse_record<S: AsRef<str>>(
        &self,
        values: &[S],
        row: u64,
        headers: &[CsvHeader],
    ) -> Result<Vec<TypedValue>, CsvError> {
        if values.len() != headers.len() {
            return Err(CsvError::InconsistentColumnCount {
                actual: values.len(),
                expected: headers.len(),
                row,
            });
        }

        let mut typed = Vec::with_capacity(values.len());
        let mut causes = Vec::new();
        for (index, (token, header)) in values.iter().zip(headers).enumerate() {
            let column = index as u64 + 1;
            match self.parse_cell(token.as_ref(), row, column, header) {
                Ok(value) => typed.push(value),
                Err(err) => causes.push(err),
            }
        }
        if !causes.is_empty() {
            tracing::debug!(row, errors = causes.len(), "csv record rejected");
            return Err(CsvError::RecordParsing { row, causes });
        }
        Ok(typed)
    }

    fn parse_cell(
        &self,
        token: &str,
        row: u64,
        column: u64,
        header: &CsvHeader,
    ) -> Result<TypedValue, CsvError> {
        let raw = parse_value(self.schema, token, row, column)?;
        let value_ns = raw
            .namespace
            .as_deref()
            .and_then(|ns| self.schema.values.resolve(ns));
        let value = match value_ns {
            Some(_) => raw.value.clone(),
            None => raw.folded_value(),
        };
        let header_ns = header
            .namespace
            .as_deref()
            .and_then(|ns| self.schema.headers.resolve(ns));

        let cell = Cell {
            header,
            value_ns,
            header_ns,
            value: value.as_deref(),
            row,
            column,
        };
        let ty = cell.validate_type(raw.ty)?;
        cell.validate_value()?;

        Ok(TypedValue::new(
            value_ns.map(|ns| ns.name.clone()),
            value,
            ty,
        ))
    }
}

/// Everything known about one data cell after namespace resolution.
struct Cell<'s> {
    header: &'s CsvHeader,
    value_ns: Option<&'s Namespace>,
    header_ns: Option<&'s Namespace>,
    value: Option<&'s str>,
    row: u64,
    column: u64,
}

impl Cell<'_> {
    fn validate_type(&self, explicit: Option<TypeId>) -> Result<TypeId, CsvError> {
        let from_value_ns = self
            .value_ns
            .and_then(|ns| ns.type_for_value(self.value));
        let declared = explicit
            .or_else(|| from_value_ns.clone())
            .or_else(|| self.header.column_type.clone())
            .unwrap_or_else(|| Xsd::infer(self.value).class());

        let expected = from_value_ns.or_else(|| {
            self.header_ns
                .filter(|ns| ns.closed)
                .and_then(|_| self.header.column_type.clone())
        });
        if let Some(expected) = expected {
            if declared != expected {
                return Err(CsvError::UnexpectedValueType {
                    actual: declared,
                    expected,
                    row: self.row,
                    column: self.column,
                });
            }
        }

        if let (Some(value), Some(xsd)) = (self.value, Xsd::from_class(&declared)) {
            if !xsd.can_parse(value) {
                return Err(CsvError::unparsable(value, self.row, self.column, &declared));
            }
        }
        Ok(declared)
    }

    fn validate_value(&self) -> Result<(), CsvError> {
        let Some(value) = self.value else {
            return Ok(());
        };

        if let Some(ns) = self.value_ns {
            if ns.closed && ns.property(value).is_none() {
                return Err(CsvError::UnknownNamespaceValue {
                    namespace: ns.name.clone(),
                    value: value.to_string(),
                    row: self.row,
                    column: self.column,
                });
            }
            run_validator(ns.column_value_constraint.as_ref(), value, self.row, self.column)?;
        }

        if let Some(ns) = self.header_ns {
            run_validator(ns.column_value_constraint.as_ref(), value, self.row, self.column)?;
            if ns.closed {
                let validator = ns
                    .property(&self.header.name)
                    .and_then(|p| p.validator.as_ref());
                run_validator(validator, value, self.row, self.column)?;
            }
        }
        Ok(())
    }
}

fn run_validator(
    validator: Option<&Validator>,
    value: &str,
    row: u64,
    column: u64,
) -> Result<(), CsvError> {
    match validator.map(|v| v.validate(value)) {
        Some(Err(ValidationError { reason })) => Err(CsvError::InvalidValue {
            value: value.to_string(),
            row,
            column,
            reason,
        }),
        _ => Ok(()),
    }
}
