//! The `namespace:value<type>` token micro-syntax.
//!
//! Grammar: `(namespace:)?(value)?(<type-tag>)?`
//! - `namespace` is made of word characters and hyphens, followed directly by `:`
//! - `value` is matched lazily and may be empty
//! - `type-tag` is a trailing `<...>` without `<`, `>` or newlines inside
//!
//! The token and the value body are trimmed; an empty body becomes `None` so
//! "no value" stays distinguishable from a value downstream.

use crate::error::CsvError;
use crate::schema::CsvSchema;
use crate::types::TypeId;
use regex::Regex;
use std::sync::OnceLock;

/// A token split into its parts, before namespace resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawValue {
    pub namespace: Option<String>,
    pub value: Option<String>,
    pub ty: Option<TypeId>,
}

impl RawValue {
    /// Re-join an unresolved namespace prefix with the value body.
    pub fn folded_value(&self) -> Option<String> {
        match (&self.namespace, &self.value) {
            (Some(ns), Some(value)) => Some(format!("{ns}:{value}")),
            (Some(ns), None) => Some(format!("{ns}:")),
            (None, value) => value.clone(),
        }
    }
}

fn token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)^(?:([\w-]+):)?(.*?)(?:<([^<>\n]*)>)?$").expect("token grammar is valid")
    })
}

/// Split a raw token; `row`/`column` only locate a failing type tag.
pub fn parse_value(
    schema: &CsvSchema,
    token: &str,
    row: u64,
    column: u64,
) -> Result<RawValue, CsvError> {
    let token = token.trim();
    let Some(caps) = token_regex().captures(token) else {
        // The grammar matches every input; keep the token as a plain value.
        return Ok(RawValue {
            namespace: None,
            value: non_empty(token),
            ty: None,
        });
    };

    let namespace = caps.get(1).map(|m| m.as_str().to_string());
    let value = caps.get(2).and_then(|m| non_empty(m.as_str()));
    let ty = match caps.get(3) {
        None => None,
        Some(tag) => {
            let tag = tag.as_str().trim();
            let ty = schema
                .resolve_type_tag(tag)
                .cloned()
                .ok_or_else(|| CsvError::UnknownValueType {
                    tag: tag.to_string(),
                    row,
                    column,
                })?;
            Some(ty)
        }
    };

    Ok(RawValue {
        namespace,
        value,
        ty,
    })
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> CsvSchema {
        CsvSchema::builder()
            .type_mapping("text", TypeId::STRING)
            .type_mapping("int", TypeId::INTEGER)
            .build()
            .unwrap()
    }

    fn parse(token: &str) -> RawValue {
        parse_value(&schema(), token, 1, 1).unwrap()
    }

    #[test]
    fn splits_all_three_parts() {
        assert_eq!(
            parse("paper:title<text>"),
            RawValue {
                namespace: Some("paper".to_string()),
                value: Some("title".to_string()),
                ty: Some(TypeId::STRING),
            }
        );
    }

    #[test]
    fn every_part_is_optional() {
        assert_eq!(
            parse("plain"),
            RawValue {
                namespace: None,
                value: Some("plain".to_string()),
                ty: None,
            }
        );
        assert_eq!(parse("<int>").value, None);
        assert_eq!(parse("<int>").ty, Some(TypeId::INTEGER));
        assert_eq!(parse("ns:").namespace.as_deref(), Some("ns"));
        assert_eq!(parse("ns:").value, None);
    }

    #[test]
    fn blank_tokens_have_no_value() {
        for token in ["", "   ", "\t", " \n "] {
            let raw = parse(token);
            assert_eq!(raw.value, None, "token {token:?}");
            assert_eq!(raw.namespace, None);
        }
    }

    #[test]
    fn value_body_is_trimmed() {
        assert_eq!(parse("  ns:  spaced out  <int> ").value.as_deref(), Some("spaced out"));
    }

    #[test]
    fn only_first_colon_separates_the_namespace() {
        let raw = parse("https://example.org/a:b");
        assert_eq!(raw.namespace.as_deref(), Some("https"));
        assert_eq!(raw.value.as_deref(), Some("//example.org/a:b"));
        assert_eq!(raw.folded_value().as_deref(), Some("https://example.org/a:b"));
    }

    #[test]
    fn only_trailing_tag_is_a_type() {
        let raw = parse("a<b>c<int>");
        assert_eq!(raw.value.as_deref(), Some("a<b>c"));
        assert_eq!(raw.ty, Some(TypeId::INTEGER));

        let raw = parse("x < y");
        assert_eq!(raw.value.as_deref(), Some("x < y"));
        assert_eq!(raw.ty, None);
    }

    #[test]
    fn values_may_span_lines() {
        let raw = parse("line one\nline two<text>");
        assert_eq!(raw.value.as_deref(), Some("line one\nline two"));
        assert_eq!(raw.ty, Some(TypeId::STRING));
    }

    #[test]
    fn unknown_tags_fail_with_coordinates() {
        let err = parse_value(&schema(), "abc<string>", 3, 7).unwrap_err();
        assert_eq!(
            err,
            CsvError::UnknownValueType {
                tag: "string".to_string(),
                row: 3,
                column: 7,
            }
        );
        assert!(parse_value(&schema(), "abc<>", 1, 1).is_err());
    }
}
