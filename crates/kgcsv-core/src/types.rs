//! Class identifiers used as cell/column types.
//!
//! A `TypeId` names the class a typed value is written as in the graph
//! (`String`, `Integer`, `Resource`, ...). The well-known identifiers are
//! associated constants so schemas and tests can refer to them without
//! allocating.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(Cow<'static, str>);

impl TypeId {
    pub const RESOURCE: TypeId = TypeId::from_static("Resource");

    pub const STRING: TypeId = TypeId::from_static("String");
    pub const INTEGER: TypeId = TypeId::from_static("Integer");
    pub const INT: TypeId = TypeId::from_static("Int");
    pub const LONG: TypeId = TypeId::from_static("Long");
    pub const SHORT: TypeId = TypeId::from_static("Short");
    pub const BYTE: TypeId = TypeId::from_static("Byte");
    pub const NON_NEGATIVE_INTEGER: TypeId = TypeId::from_static("NonNegativeInteger");
    pub const POSITIVE_INTEGER: TypeId = TypeId::from_static("PositiveInteger");
    pub const NON_POSITIVE_INTEGER: TypeId = TypeId::from_static("NonPositiveInteger");
    pub const NEGATIVE_INTEGER: TypeId = TypeId::from_static("NegativeInteger");
    pub const UNSIGNED_LONG: TypeId = TypeId::from_static("UnsignedLong");
    pub const UNSIGNED_INT: TypeId = TypeId::from_static("UnsignedInt");
    pub const UNSIGNED_SHORT: TypeId = TypeId::from_static("UnsignedShort");
    pub const UNSIGNED_BYTE: TypeId = TypeId::from_static("UnsignedByte");
    pub const DECIMAL: TypeId = TypeId::from_static("Decimal");
    pub const FLOAT: TypeId = TypeId::from_static("Float");
    pub const DOUBLE: TypeId = TypeId::from_static("Double");
    pub const BOOLEAN: TypeId = TypeId::from_static("Boolean");
    pub const DATE: TypeId = TypeId::from_static("Date");
    pub const DATE_TIME: TypeId = TypeId::from_static("DateTime");
    pub const DATE_TIME_STAMP: TypeId = TypeId::from_static("DateTimeStamp");
    pub const TIME: TypeId = TypeId::from_static("Time");
    pub const DURATION: TypeId = TypeId::from_static("Duration");
    pub const DAY_TIME_DURATION: TypeId = TypeId::from_static("DayTimeDuration");
    pub const YEAR_MONTH_DURATION: TypeId = TypeId::from_static("YearMonthDuration");
    pub const GREGORIAN_YEAR: TypeId = TypeId::from_static("GregorianYear");
    pub const GREGORIAN_YEAR_MONTH: TypeId = TypeId::from_static("GregorianYearMonth");
    pub const GREGORIAN_MONTH_DAY: TypeId = TypeId::from_static("GregorianMonthDay");
    pub const GREGORIAN_DAY: TypeId = TypeId::from_static("GregorianDay");
    pub const GREGORIAN_MONTH: TypeId = TypeId::from_static("GregorianMonth");
    pub const HEX_BINARY: TypeId = TypeId::from_static("HexBinary");
    pub const BASE_64_BINARY: TypeId = TypeId::from_static("Base64Binary");
    pub const NORMALIZED_STRING: TypeId = TypeId::from_static("NormalizedString");
    pub const TOKEN: TypeId = TypeId::from_static("Token");
    pub const LANGUAGE: TypeId = TypeId::from_static("Language");
    pub const URI: TypeId = TypeId::from_static("URI");

    pub const fn from_static(id: &'static str) -> Self {
        TypeId(Cow::Borrowed(id))
    }

    pub fn new(id: impl Into<String>) -> Self {
        TypeId(Cow::Owned(id.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeId {
    fn from(id: &str) -> Self {
        TypeId::new(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn borrowed_and_owned_ids_compare_equal() {
        assert_eq!(TypeId::new("String"), TypeId::STRING);
        assert_ne!(TypeId::new("string"), TypeId::STRING);
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&TypeId::BOOLEAN).unwrap();
        assert_eq!(json, "\"Boolean\"");
        let back: TypeId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TypeId::BOOLEAN);
    }
}
