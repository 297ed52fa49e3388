//! Builtin literal datatypes (XML Schema) and their lexical rules.
//!
//! Every datatype knows its class id, its prefixed URI and whether a literal
//! is in its lexical space. Calendar forms are additionally checked with
//! `chrono` so that `2011-02-30` or `10:89:30` are rejected.
//!
//! `Xsd::infer` is the ordered lexical inference used when neither the cell,
//! the namespace nor the column declares a type.

use crate::types::TypeId;
use chrono::{NaiveDate, NaiveTime};
use regex::{Captures, Regex};
use std::sync::OnceLock;

const TIMEZONE: &str = r"(Z|[+-][0-9]{2}:[0-9]{2})?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Xsd {
    String,
    Integer,
    Int,
    Long,
    Short,
    Byte,
    NonNegativeInteger,
    PositiveInteger,
    NonPositiveInteger,
    NegativeInteger,
    UnsignedLong,
    UnsignedInt,
    UnsignedShort,
    UnsignedByte,
    Decimal,
    Float,
    Double,
    Boolean,
    Date,
    DateTime,
    DateTimeStamp,
    Time,
    Duration,
    DayTimeDuration,
    YearMonthDuration,
    GregorianYear,
    GregorianYearMonth,
    GregorianMonthDay,
    GregorianDay,
    GregorianMonth,
    HexBinary,
    Base64Binary,
    NormalizedString,
    Token,
    Language,
    Uri,
}

impl Xsd {
    pub const ALL: [Xsd; 36] = [
        Xsd::String,
        Xsd::Integer,
        Xsd::Int,
        Xsd::Long,
        Xsd::Short,
        Xsd::Byte,
        Xsd::NonNegativeInteger,
        Xsd::PositiveInteger,
        Xsd::NonPositiveInteger,
        Xsd::NegativeInteger,
        Xsd::UnsignedLong,
        Xsd::UnsignedInt,
        Xsd::UnsignedShort,
        Xsd::UnsignedByte,
        Xsd::Decimal,
        Xsd::Float,
        Xsd::Double,
        Xsd::Boolean,
        Xsd::Date,
        Xsd::DateTime,
        Xsd::DateTimeStamp,
        Xsd::Time,
        Xsd::Duration,
        Xsd::DayTimeDuration,
        Xsd::YearMonthDuration,
        Xsd::GregorianYear,
        Xsd::GregorianYearMonth,
        Xsd::GregorianMonthDay,
        Xsd::GregorianDay,
        Xsd::GregorianMonth,
        Xsd::HexBinary,
        Xsd::Base64Binary,
        Xsd::NormalizedString,
        Xsd::Token,
        Xsd::Language,
        Xsd::Uri,
    ];

    /// Order in which untyped literals are matched; anything else is a string.
    const INFERENCE_ORDER: [Xsd; 5] = [
        Xsd::Integer,
        Xsd::Decimal,
        Xsd::Boolean,
        Xsd::Date,
        Xsd::DateTime,
    ];

    pub fn class(self) -> TypeId {
        match self {
            Xsd::String => TypeId::STRING,
            Xsd::Integer => TypeId::INTEGER,
            Xsd::Int => TypeId::INT,
            Xsd::Long => TypeId::LONG,
            Xsd::Short => TypeId::SHORT,
            Xsd::Byte => TypeId::BYTE,
            Xsd::NonNegativeInteger => TypeId::NON_NEGATIVE_INTEGER,
            Xsd::PositiveInteger => TypeId::POSITIVE_INTEGER,
            Xsd::NonPositiveInteger => TypeId::NON_POSITIVE_INTEGER,
            Xsd::NegativeInteger => TypeId::NEGATIVE_INTEGER,
            Xsd::UnsignedLong => TypeId::UNSIGNED_LONG,
            Xsd::UnsignedInt => TypeId::UNSIGNED_INT,
            Xsd::UnsignedShort => TypeId::UNSIGNED_SHORT,
            Xsd::UnsignedByte => TypeId::UNSIGNED_BYTE,
            Xsd::Decimal => TypeId::DECIMAL,
            Xsd::Float => TypeId::FLOAT,
            Xsd::Double => TypeId::DOUBLE,
            Xsd::Boolean => TypeId::BOOLEAN,
            Xsd::Date => TypeId::DATE,
            Xsd::DateTime => TypeId::DATE_TIME,
            Xsd::DateTimeStamp => TypeId::DATE_TIME_STAMP,
            Xsd::Time => TypeId::TIME,
            Xsd::Duration => TypeId::DURATION,
            Xsd::DayTimeDuration => TypeId::DAY_TIME_DURATION,
            Xsd::YearMonthDuration => TypeId::YEAR_MONTH_DURATION,
            Xsd::GregorianYear => TypeId::GREGORIAN_YEAR,
            Xsd::GregorianYearMonth => TypeId::GREGORIAN_YEAR_MONTH,
            Xsd::GregorianMonthDay => TypeId::GREGORIAN_MONTH_DAY,
            Xsd::GregorianDay => TypeId::GREGORIAN_DAY,
            Xsd::GregorianMonth => TypeId::GREGORIAN_MONTH,
            Xsd::HexBinary => TypeId::HEX_BINARY,
            Xsd::Base64Binary => TypeId::BASE_64_BINARY,
            Xsd::NormalizedString => TypeId::NORMALIZED_STRING,
            Xsd::Token => TypeId::TOKEN,
            Xsd::Language => TypeId::LANGUAGE,
            Xsd::Uri => TypeId::URI,
        }
    }

    pub fn local_name(self) -> &'static str {
        match self {
            Xsd::String => "string",
            Xsd::Integer => "integer",
            Xsd::Int => "int",
            Xsd::Long => "long",
            Xsd::Short => "short",
            Xsd::Byte => "byte",
            Xsd::NonNegativeInteger => "nonNegativeInteger",
            Xsd::PositiveInteger => "positiveInteger",
            Xsd::NonPositiveInteger => "nonPositiveInteger",
            Xsd::NegativeInteger => "negativeInteger",
            Xsd::UnsignedLong => "unsignedLong",
            Xsd::UnsignedInt => "unsignedInt",
            Xsd::UnsignedShort => "unsignedShort",
            Xsd::UnsignedByte => "unsignedByte",
            Xsd::Decimal => "decimal",
            Xsd::Float => "float",
            Xsd::Double => "double",
            Xsd::Boolean => "boolean",
            Xsd::Date => "date",
            Xsd::DateTime => "dateTime",
            Xsd::DateTimeStamp => "dateTimeStamp",
            Xsd::Time => "time",
            Xsd::Duration => "duration",
            Xsd::DayTimeDuration => "dayTimeDuration",
            Xsd::YearMonthDuration => "yearMonthDuration",
            Xsd::GregorianYear => "gYear",
            Xsd::GregorianYearMonth => "gYearMonth",
            Xsd::GregorianMonthDay => "gMonthDay",
            Xsd::GregorianDay => "gDay",
            Xsd::GregorianMonth => "gMonth",
            Xsd::HexBinary => "hexBinary",
            Xsd::Base64Binary => "base64Binary",
            Xsd::NormalizedString => "normalizedString",
            Xsd::Token => "token",
            Xsd::Language => "language",
            Xsd::Uri => "anyURI",
        }
    }

    pub fn prefixed_uri(self) -> String {
        format!("xsd:{}", self.local_name())
    }

    /// Datatype for a class, if the class is a literal datatype at all.
    pub fn from_class(class: &TypeId) -> Option<Xsd> {
        Xsd::ALL.iter().copied().find(|xsd| &xsd.class() == class)
    }

    /// Infer the datatype of an untyped literal. Missing values are strings.
    pub fn infer(value: Option<&str>) -> Xsd {
        value
            .and_then(|value| {
                Xsd::INFERENCE_ORDER
                    .iter()
                    .copied()
                    .find(|xsd| xsd.can_parse(value))
            })
            .unwrap_or(Xsd::String)
    }

    pub fn can_parse(self, value: &str) -> bool {
        match self {
            Xsd::String => true,
            Xsd::Integer => is_integer(value),
            Xsd::Int => in_range(value, i32::MIN as i128, i32::MAX as i128),
            Xsd::Long => in_range(value, i64::MIN as i128, i64::MAX as i128),
            Xsd::Short => in_range(value, i16::MIN as i128, i16::MAX as i128),
            Xsd::Byte => in_range(value, i8::MIN as i128, i8::MAX as i128),
            Xsd::NonNegativeInteger => is_integer(value) && (is_zero(value) || !value.starts_with('-')),
            Xsd::PositiveInteger => is_integer(value) && !is_zero(value) && !value.starts_with('-'),
            Xsd::NonPositiveInteger => is_integer(value) && (is_zero(value) || value.starts_with('-')),
            Xsd::NegativeInteger => is_integer(value) && !is_zero(value) && value.starts_with('-'),
            Xsd::UnsignedLong => in_range(value, 0, u64::MAX as i128),
            Xsd::UnsignedInt => in_range(value, 0, u32::MAX as i128),
            Xsd::UnsignedShort => in_range(value, 0, u16::MAX as i128),
            Xsd::UnsignedByte => in_range(value, 0, u8::MAX as i128),
            Xsd::Decimal => is_decimal(value),
            Xsd::Float | Xsd::Double => is_floating(value),
            Xsd::Boolean => matches!(value, "true" | "false" | "1" | "0"),
            Xsd::Date => is_date(value),
            Xsd::DateTime => is_date_time(value, false),
            Xsd::DateTimeStamp => is_date_time(value, true),
            Xsd::Time => is_time(value),
            Xsd::Duration => duration_parts(value).is_some(),
            Xsd::DayTimeDuration => duration_parts(value)
                .map(|parts| !parts.has_year_month)
                .unwrap_or(false),
            Xsd::YearMonthDuration => duration_parts(value)
                .map(|parts| !parts.has_day_time)
                .unwrap_or(false),
            Xsd::GregorianYear => is_gregorian_year(value),
            Xsd::GregorianYearMonth => is_gregorian_year_month(value),
            Xsd::GregorianMonthDay => is_gregorian_month_day(value),
            Xsd::GregorianDay => is_gregorian_day(value),
            Xsd::GregorianMonth => is_gregorian_month(value),
            Xsd::HexBinary => is_hex_binary(value),
            Xsd::Base64Binary => is_base64_binary(value),
            Xsd::NormalizedString => is_normalized(value),
            Xsd::Token => is_token(value),
            Xsd::Language => is_language(value),
            Xsd::Uri => is_uri(value),
        }
    }
}

fn cached(cell: &'static OnceLock<Regex>, pattern: impl FnOnce() -> String) -> &'static Regex {
    cell.get_or_init(|| Regex::new(&pattern()).expect("builtin datatype pattern is valid"))
}

fn is_integer(value: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached(&RE, || r"^[+-]?[0-9]+$".to_string()).is_match(value)
}

fn is_zero(value: &str) -> bool {
    value
        .trim_start_matches(['+', '-'])
        .chars()
        .all(|c| c == '0')
}

fn in_range(value: &str, min: i128, max: i128) -> bool {
    is_integer(value)
        && value
            .parse::<i128>()
            .map(|n| (min..=max).contains(&n))
            .unwrap_or(false)
}

fn is_decimal(value: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached(&RE, || r"^[+-]?([0-9]+(\.[0-9]*)?|\.[0-9]+)$".to_string()).is_match(value)
}

fn is_floating(value: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached(&RE, || {
        r"^([+-]?([0-9]+(\.[0-9]*)?|\.[0-9]+)([eE][+-]?[0-9]+)?|[+-]?INF|NaN)$".to_string()
    })
    .is_match(value)
}

fn is_timezone(tz: Option<regex::Match<'_>>) -> bool {
    let Some(tz) = tz.map(|m| m.as_str()) else {
        return true;
    };
    if tz == "Z" {
        return true;
    }
    let hours: u32 = tz[1..3].parse().unwrap_or(99);
    let minutes: u32 = tz[4..6].parse().unwrap_or(99);
    minutes < 60 && (hours < 14 || (hours == 14 && minutes == 0))
}

fn capture_u32(caps: &Captures<'_>, index: usize) -> Option<u32> {
    caps.get(index).and_then(|m| m.as_str().parse().ok())
}

fn capture_year(caps: &Captures<'_>, index: usize) -> Option<i32> {
    caps.get(index).and_then(|m| m.as_str().parse().ok())
}

fn is_calendar_date(caps: &Captures<'_>) -> bool {
    match (capture_year(caps, 1), capture_u32(caps, 2), capture_u32(caps, 3)) {
        (Some(year), Some(month), Some(day)) => NaiveDate::from_ymd_opt(year, month, day).is_some(),
        _ => false,
    }
}

fn is_date(value: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = cached(&RE, || {
        format!(r"^(-?[0-9]{{4,}})-([0-9]{{2}})-([0-9]{{2}}){TIMEZONE}$")
    });
    re.captures(value)
        .map(|caps| is_calendar_date(&caps) && is_timezone(caps.get(4)))
        .unwrap_or(false)
}

fn is_date_time(value: &str, require_timezone: bool) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = cached(&RE, || {
        format!(
            r"^(-?[0-9]{{4,}})-([0-9]{{2}})-([0-9]{{2}})T([0-9]{{2}}):([0-9]{{2}}):([0-9]{{2}})(\.[0-9]+)?{TIMEZONE}$"
        )
    });
    let Some(caps) = re.captures(value) else {
        return false;
    };
    if require_timezone && caps.get(8).is_none() {
        return false;
    }
    let time = match (capture_u32(&caps, 4), capture_u32(&caps, 5), capture_u32(&caps, 6)) {
        (Some(h), Some(m), Some(s)) => NaiveTime::from_hms_opt(h, m, s).is_some(),
        _ => false,
    };
    is_calendar_date(&caps) && time && is_timezone(caps.get(8))
}

fn is_time(value: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = cached(&RE, || {
        format!(r"^([0-9]{{2}}):([0-9]{{2}})(?::([0-9]{{2}})(\.[0-9]+)?)?{TIMEZONE}$")
    });
    let Some(caps) = re.captures(value) else {
        return false;
    };
    let seconds = if caps.get(3).is_some() {
        capture_u32(&caps, 3)
    } else {
        Some(0)
    };
    let valid = match (capture_u32(&caps, 1), capture_u32(&caps, 2), seconds) {
        (Some(h), Some(m), Some(s)) => NaiveTime::from_hms_opt(h, m, s).is_some(),
        _ => false,
    };
    valid && is_timezone(caps.get(5))
}

struct DurationParts {
    has_year_month: bool,
    has_day_time: bool,
}

fn duration_parts(value: &str) -> Option<DurationParts> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = cached(&RE, || {
        r"^-?P(?:([0-9]+)Y)?(?:([0-9]+)M)?(?:([0-9]+)D)?(?:(T)(?:([0-9]+)H)?(?:([0-9]+)M)?(?:([0-9]+(?:\.[0-9]+)?)S)?)?$"
            .to_string()
    });
    let caps = re.captures(value)?;
    let has = |index: usize| caps.get(index).is_some();
    let has_time = has(5) || has(6) || has(7);
    if has(4) && !has_time {
        return None;
    }
    if !(has(1) || has(2) || has(3) || has_time) {
        return None;
    }
    Some(DurationParts {
        has_year_month: has(1) || has(2),
        has_day_time: has(3) || has_time,
    })
}

fn is_gregorian_year(value: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = cached(&RE, || format!(r"^-?[0-9]{{4,}}{TIMEZONE}$"));
    re.captures(value)
        .map(|caps| is_timezone(caps.get(1)))
        .unwrap_or(false)
}

fn is_gregorian_year_month(value: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = cached(&RE, || format!(r"^-?[0-9]{{4,}}-([0-9]{{2}}){TIMEZONE}$"));
    re.captures(value)
        .map(|caps| {
            capture_u32(&caps, 1).is_some_and(|m| (1..=12).contains(&m)) && is_timezone(caps.get(2))
        })
        .unwrap_or(false)
}

fn is_gregorian_month_day(value: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = cached(&RE, || format!(r"^--([0-9]{{2}})-([0-9]{{2}}){TIMEZONE}$"));
    re.captures(value)
        .map(|caps| {
            // 2000 is a leap year, so --02-29 stays valid.
            let date = match (capture_u32(&caps, 1), capture_u32(&caps, 2)) {
                (Some(month), Some(day)) => NaiveDate::from_ymd_opt(2000, month, day).is_some(),
                _ => false,
            };
            date && is_timezone(caps.get(3))
        })
        .unwrap_or(false)
}

fn is_gregorian_day(value: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = cached(&RE, || format!(r"^---([0-9]{{2}}){TIMEZONE}$"));
    re.captures(value)
        .map(|caps| {
            capture_u32(&caps, 1).is_some_and(|d| (1..=31).contains(&d)) && is_timezone(caps.get(2))
        })
        .unwrap_or(false)
}

fn is_gregorian_month(value: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = cached(&RE, || format!(r"^--([0-9]{{2}}){TIMEZONE}$"));
    re.captures(value)
        .map(|caps| {
            capture_u32(&caps, 1).is_some_and(|m| (1..=12).contains(&m)) && is_timezone(caps.get(2))
        })
        .unwrap_or(false)
}

fn is_hex_binary(value: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached(&RE, || r"^([0-9a-fA-F]{2})*$".to_string()).is_match(value)
}

fn is_base64_binary(value: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached(&RE, || {
        r"^(?:[A-Za-z0-9+/]{4})*(?:[A-Za-z0-9+/]{2}==|[A-Za-z0-9+/]{3}=)?$".to_string()
    })
    .is_match(value)
}

fn is_normalized(value: &str) -> bool {
    !value.contains(['\n', '\r', '\t'])
}

fn is_token(value: &str) -> bool {
    is_normalized(value)
        && !value.is_empty()
        && !value.starts_with(' ')
        && !value.ends_with(' ')
        && !value.contains("  ")
}

fn is_language(value: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached(&RE, || r"^[a-zA-Z]{1,8}(-[a-zA-Z0-9]{1,8})*$".to_string()).is_match(value)
}

fn is_uri(value: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached(&RE, || r#"^[A-Za-z][A-Za-z0-9+.-]*:[^\s<>"{}|\\^`]*$"#.to_string()).is_match(value)
}
