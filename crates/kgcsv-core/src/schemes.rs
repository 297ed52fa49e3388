//! Bundled CSV schemas.
//!
//! Each function builds a fresh, immutable `CsvSchema`; callers own it and
//! pass it to the parser by reference.

use crate::schema::{CsvSchema, Namespace, Property, SchemaError, ValidationError, Validator};
use crate::types::TypeId;

pub const PAPER_NS: &str = "paper";
pub const CONTRIBUTION_NS: &str = "contribution";
pub const ORKG_NS: &str = "orkg";
pub const RESOURCE_NS: &str = "resource";

const THING_ID: &str = r"[a-zA-Z0-9:_-]+";
const DOI: &str = r"(?i)10\.\d{4,9}/[-._;()/:a-z0-9]+";

/// Extraction methods accepted by `contribution:extraction_method`.
pub const EXTRACTION_METHODS: [&str; 3] = ["MANUAL", "AUTOMATIC", "UNKNOWN"];

fn pattern(pattern: &str) -> Result<Validator, SchemaError> {
    Validator::pattern(pattern).map_err(|err| SchemaError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: err.to_string(),
    })
}

fn month() -> Validator {
    Validator::new("month 1-12", |value| match value.parse::<u8>() {
        Ok(1..=12) => Ok(()),
        _ => Err(ValidationError::new(format!(
            "Value \"{value}\" is not a month between 1 and 12."
        ))),
    })
}

/// The paper bulk-import format.
///
/// ```text
/// paper:title,paper:doi,paper:research_field,orkg:P32
/// Some Title,10.1000/182,R12,resource:Some problem
/// ```
pub fn paper_csv() -> Result<CsvSchema, SchemaError> {
    let paper = Namespace::closed(PAPER_NS)
        .property(Property::new("title", TypeId::STRING))
        .property(Property::new("authors", TypeId::STRING))
        .property(Property::new("publication_month", TypeId::INTEGER).with_validator(month()))
        .property(Property::new("publication_year", TypeId::INTEGER))
        .property(Property::new("research_field", TypeId::RESOURCE).with_validator(pattern(THING_ID)?))
        .property(Property::new("doi", TypeId::STRING).with_validator(pattern(DOI)?))
        .property(Property::new("url", TypeId::URI))
        .property(Property::new("published_in", TypeId::STRING))
        .build()?;

    let contribution = Namespace::closed(CONTRIBUTION_NS)
        .property(Property::new("research_problem", TypeId::RESOURCE))
        .property(
            Property::new("extraction_method", TypeId::STRING)
                .with_validator(Validator::one_of(EXTRACTION_METHODS)),
        )
        .build()?;

    let predicates = Namespace::open(ORKG_NS)
        .header_value_validator(pattern(THING_ID)?)
        .build()?;

    let things = Namespace::open(ORKG_NS)
        .column_value_type(TypeId::RESOURCE)
        .column_value_constraint(pattern(THING_ID)?)
        .build()?;

    let resources = Namespace::open(RESOURCE_NS)
        .column_value_type(TypeId::RESOURCE)
        .build()?;

    CsvSchema::builder()
        .header_namespace(paper)
        .header_namespace(contribution)
        .header_namespace(predicates)
        .header_pass_through("http")
        .header_pass_through("https")
        .value_namespace(things)
        .value_namespace(resources)
        .type_mapping("resource", TypeId::RESOURCE)
        .type_mapping("text", TypeId::STRING)
        .type_mapping("string", TypeId::STRING)
        .type_mapping("int", TypeId::INTEGER)
        .type_mapping("integer", TypeId::INTEGER)
        .type_mapping("decimal", TypeId::DECIMAL)
        .type_mapping("float", TypeId::FLOAT)
        .type_mapping("double", TypeId::DOUBLE)
        .type_mapping("boolean", TypeId::BOOLEAN)
        .type_mapping("date", TypeId::DATE)
        .type_mapping("datetime", TypeId::DATE_TIME)
        .type_mapping("time", TypeId::TIME)
        .type_mapping("duration", TypeId::DURATION)
        .type_mapping("url", TypeId::URI)
        .type_mapping("uri", TypeId::URI)
        .build()
}
