//! Declarative CSV schemas.
//!
//! A `CsvSchema` holds two independent namespace registries, one consulted
//! for header tokens and one for cell tokens, plus the table resolving the
//! `<tag>` suffix of a token to a `TypeId`.
//!
//! Schemas are built once with the builders in this module and then shared
//! read-only (`&CsvSchema`) by every parse call.

use crate::types::TypeId;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

pub type Name = String;

// ============================================================================
// Validators
// ============================================================================

/// Rejection reason produced by a `Validator`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct ValidationError {
    pub reason: String,
}

impl ValidationError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

type ValidatorFn = dyn Fn(&str) -> Result<(), ValidationError> + Send + Sync;

/// A value-level check attached to a namespace or property.
#[derive(Clone)]
pub struct Validator {
    check: Arc<ValidatorFn>,
    description: String,
}

impl Validator {
    pub fn new<F>(description: impl Into<String>, check: F) -> Self
    where
        F: Fn(&str) -> Result<(), ValidationError> + Send + Sync + 'static,
    {
        Self {
            check: Arc::new(check),
            description: description.into(),
        }
    }

    /// The whole value must match `pattern`.
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        let anchored = Regex::new(&format!("^(?:{pattern})$"))?;
        let shown = pattern.to_string();
        Ok(Self::new(format!("pattern {pattern}"), move |value| {
            if anchored.is_match(value) {
                Ok(())
            } else {
                Err(ValidationError::new(format!(
                    "Value \"{value}\" does not match pattern \"{shown}\"."
                )))
            }
        }))
    }

    /// The value must be one of `allowed` (ASCII case-insensitive).
    pub fn one_of<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowed: Vec<String> = allowed.into_iter().map(Into::into).collect();
        let listed = allowed.join(", ");
        Self::new(format!("one of {listed}"), move |value| {
            if allowed.iter().any(|a| a.eq_ignore_ascii_case(value)) {
                Ok(())
            } else {
                Err(ValidationError::new(format!(
                    "Value \"{value}\" is not one of [{listed}]."
                )))
            }
        })
    }

    pub fn validate(&self, value: &str) -> Result<(), ValidationError> {
        (self.check)(value)
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Validator").field(&self.description).finish()
    }
}

// ============================================================================
// Properties and namespaces
// ============================================================================

#[derive(Debug, Clone)]
pub struct Property {
    pub name: Name,
    pub ty: TypeId,
    pub validator: Option<Validator>,
}

impl Property {
    pub fn new(name: impl Into<Name>, ty: TypeId) -> Self {
        Self {
            name: name.into(),
            ty,
            validator: None,
        }
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }
}

#[derive(Debug, Clone)]
pub struct Namespace {
    pub name: Name,
    pub closed: bool,
    pub properties: BTreeMap<Name, Property>,
    pub column_value_type: Option<TypeId>,
    pub column_value_constraint: Option<Validator>,
    pub header_value_validator: Option<Validator>,
}

impl Namespace {
    /// A namespace whose legal values are exactly its registered properties.
    pub fn closed(name: impl Into<Name>) -> NamespaceBuilder {
        NamespaceBuilder::new(name.into(), true)
    }

    /// A namespace accepting any value.
    pub fn open(name: impl Into<Name>) -> NamespaceBuilder {
        NamespaceBuilder::new(name.into(), false)
    }

    pub fn property(&self, value: &str) -> Option<&Property> {
        self.properties.get(value)
    }

    /// Per-value type: the property type for closed namespaces, the declared
    /// column value type otherwise.
    pub fn type_for_value(&self, value: Option<&str>) -> Option<TypeId> {
        if self.closed {
            value
                .and_then(|v| self.properties.get(v))
                .map(|p| p.ty.clone())
        } else {
            self.column_value_type.clone()
        }
    }
}

#[derive(Debug)]
pub struct NamespaceBuilder {
    namespace: Namespace,
    errors: Vec<SchemaError>,
}

impl NamespaceBuilder {
    fn new(name: Name, closed: bool) -> Self {
        Self {
            namespace: Namespace {
                name,
                closed,
                properties: BTreeMap::new(),
                column_value_type: None,
                column_value_constraint: None,
                header_value_validator: None,
            },
            errors: Vec::new(),
        }
    }

    pub fn property(mut self, property: Property) -> Self {
        if !self.namespace.closed {
            self.errors.push(SchemaError::PropertyOnOpenNamespace {
                namespace: self.namespace.name.clone(),
                property: property.name,
            });
        } else if self.namespace.properties.contains_key(&property.name) {
            self.errors.push(SchemaError::DuplicateProperty {
                namespace: self.namespace.name.clone(),
                property: property.name,
            });
        } else {
            self.namespace
                .properties
                .insert(property.name.clone(), property);
        }
        self
    }

    pub fn column_value_type(mut self, ty: TypeId) -> Self {
        if self.namespace.closed {
            self.errors.push(SchemaError::ValueTypeOnClosedNamespace {
                namespace: self.namespace.name.clone(),
            });
        } else {
            self.namespace.column_value_type = Some(ty);
        }
        self
    }

    pub fn column_value_constraint(mut self, validator: Validator) -> Self {
        self.namespace.column_value_constraint = Some(validator);
        self
    }

    pub fn header_value_validator(mut self, validator: Validator) -> Self {
        self.namespace.header_value_validator = Some(validator);
        self
    }

    pub fn build(self) -> Result<Namespace, SchemaError> {
        match self.errors.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(self.namespace),
        }
    }
}

// ============================================================================
// Registries and schema
// ============================================================================

/// Namespace names known to one side (headers or values) of a schema.
///
/// A registered name either resolves to a `Namespace` or is a pass-through:
/// known, but folded back into the literal value instead of being resolved.
#[derive(Debug, Clone, Default)]
pub struct NamespaceRegistry {
    entries: BTreeMap<Name, Option<Arc<Namespace>>>,
}

impl NamespaceRegistry {
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn resolve(&self, name: &str) -> Option<&Namespace> {
        self.entries.get(name).and_then(|entry| entry.as_deref())
    }

    pub fn is_pass_through(&self, name: &str) -> bool {
        matches!(self.entries.get(name), Some(None))
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &Namespace> {
        self.entries.values().filter_map(|entry| entry.as_deref())
    }

    pub fn pass_through_names(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.is_none())
            .map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn register(
        &mut self,
        name: Name,
        entry: Option<Arc<Namespace>>,
        side: RegistrySide,
    ) -> Result<(), SchemaError> {
        if self.entries.contains_key(&name) {
            return Err(SchemaError::DuplicateNamespace {
                namespace: name,
                side,
            });
        }
        self.entries.insert(name, entry);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrySide {
    Header,
    Value,
}

impl fmt::Display for RegistrySide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrySide::Header => f.write_str("header"),
            RegistrySide::Value => f.write_str("value"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("namespace \"{namespace}\" is registered twice in the {side} registry")]
    DuplicateNamespace { namespace: Name, side: RegistrySide },
    #[error("property \"{property}\" is declared twice in namespace \"{namespace}\"")]
    DuplicateProperty { namespace: Name, property: Name },
    #[error("open namespace \"{namespace}\" cannot declare property \"{property}\"")]
    PropertyOnOpenNamespace { namespace: Name, property: Name },
    #[error("closed namespace \"{namespace}\" cannot declare a column value type")]
    ValueTypeOnClosedNamespace { namespace: Name },
    #[error("type tag \"{tag}\" is mapped twice")]
    DuplicateTypeMapping { tag: String },
    #[error("invalid namespace name \"{namespace}\"")]
    InvalidNamespaceName { namespace: Name },
    #[error("invalid validator pattern \"{pattern}\": {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

#[derive(Debug, Clone, Default)]
pub struct CsvSchema {
    pub headers: NamespaceRegistry,
    pub values: NamespaceRegistry,
    pub type_mappings: BTreeMap<String, TypeId>,
}

impl CsvSchema {
    pub fn builder() -> CsvSchemaBuilder {
        CsvSchemaBuilder::default()
    }

    pub fn resolve_type_tag(&self, tag: &str) -> Option<&TypeId> {
        self.type_mappings.get(tag)
    }
}

#[derive(Debug, Default)]
pub struct CsvSchemaBuilder {
    schema: CsvSchema,
    errors: Vec<SchemaError>,
}

impl CsvSchemaBuilder {
    pub fn header_namespace(mut self, namespace: Namespace) -> Self {
        let result = check_name(&namespace.name).and_then(|_| {
            self.schema.headers.register(
                namespace.name.clone(),
                Some(Arc::new(namespace)),
                RegistrySide::Header,
            )
        });
        self.record(result)
    }

    /// Register a header prefix that is accepted but kept as part of the name.
    pub fn header_pass_through(mut self, name: impl Into<Name>) -> Self {
        let name = name.into();
        let result = check_name(&name)
            .and_then(|_| self.schema.headers.register(name, None, RegistrySide::Header));
        self.record(result)
    }

    pub fn value_namespace(mut self, namespace: Namespace) -> Self {
        let result = check_name(&namespace.name).and_then(|_| {
            self.schema.values.register(
                namespace.name.clone(),
                Some(Arc::new(namespace)),
                RegistrySide::Value,
            )
        });
        self.record(result)
    }

    pub fn type_mapping(mut self, tag: impl Into<String>, ty: TypeId) -> Self {
        let tag = tag.into();
        if self.schema.type_mappings.contains_key(&tag) {
            self.errors.push(SchemaError::DuplicateTypeMapping { tag });
        } else {
            self.schema.type_mappings.insert(tag, ty);
        }
        self
    }

    pub fn build(self) -> Result<CsvSchema, SchemaError> {
        match self.errors.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(self.schema),
        }
    }

    fn record(mut self, result: Result<(), SchemaError>) -> Self {
        if let Err(err) = result {
            self.errors.push(err);
        }
        self
    }
}

/// Namespace names must be usable as a token prefix (`[\w-]+`).
fn check_name(name: &str) -> Result<(), SchemaError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(SchemaError::InvalidNamespaceName {
            namespace: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_validator_matches_whole_value() {
        let v = Validator::pattern("[A-Za-z ]+").unwrap();
        assert!(v.validate("some words").is_ok());
        let err = v.validate("1 word").unwrap_err();
        assert_eq!(
            err.reason,
            "Value \"1 word\" does not match pattern \"[A-Za-z ]+\"."
        );
    }

    #[test]
    fn one_of_validator_ignores_ascii_case() {
        let v = Validator::one_of(["MANUAL", "AUTOMATIC"]);
        assert!(v.validate("manual").is_ok());
        assert!(v.validate("semi").is_err());
    }

    #[test]
    fn closed_namespace_types_values_by_property() {
        let ns = Namespace::closed("paper")
            .property(Property::new("title", TypeId::STRING))
            .property(Property::new("publication_year", TypeId::INTEGER))
            .build()
            .unwrap();
        assert_eq!(ns.type_for_value(Some("publication_year")), Some(TypeId::INTEGER));
        assert_eq!(ns.type_for_value(Some("missing")), None);
        assert_eq!(ns.type_for_value(None), None);
    }

    #[test]
    fn open_namespace_types_values_uniformly() {
        let ns = Namespace::open("resource")
            .column_value_type(TypeId::RESOURCE)
            .build()
            .unwrap();
        assert_eq!(ns.type_for_value(Some("anything")), Some(TypeId::RESOURCE));
        assert_eq!(ns.type_for_value(None), Some(TypeId::RESOURCE));
    }

    #[test]
    fn builder_rejects_inconsistent_namespaces() {
        let err = Namespace::closed("paper")
            .property(Property::new("title", TypeId::STRING))
            .property(Property::new("title", TypeId::STRING))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateProperty { .. }));

        let err = Namespace::closed("paper")
            .column_value_type(TypeId::STRING)
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::ValueTypeOnClosedNamespace { .. }));

        let err = Namespace::open("orkg")
            .property(Property::new("P1", TypeId::STRING))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::PropertyOnOpenNamespace { .. }));
    }

    #[test]
    fn registries_are_independent_but_reject_duplicates() {
        let ns = || Namespace::open("orkg").build().unwrap();
        let schema = CsvSchema::builder()
            .header_namespace(ns())
            .value_namespace(ns())
            .header_pass_through("https")
            .build()
            .unwrap();
        assert!(schema.headers.resolve("orkg").is_some());
        assert!(schema.values.resolve("orkg").is_some());
        assert!(schema.headers.contains("https"));
        assert!(schema.headers.resolve("https").is_none());
        assert!(schema.headers.is_pass_through("https"));
        assert!(!schema.values.contains("https"));

        let err = CsvSchema::builder()
            .header_namespace(ns())
            .header_pass_through("orkg")
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateNamespace {
                namespace: "orkg".to_string(),
                side: RegistrySide::Header,
            }
        );
    }

    #[test]
    fn builder_rejects_bad_names_and_duplicate_tags() {
        let err = CsvSchema::builder()
            .header_pass_through("has space")
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidNamespaceName { .. }));

        let err = CsvSchema::builder()
            .type_mapping("text", TypeId::STRING)
            .type_mapping("text", TypeId::STRING)
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateTypeMapping { .. }));
    }

    #[test]
    fn schema_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CsvSchema>();
    }
}
