//! Request pattern evaluation.
//!
//! A request pattern is a list of body patterns evaluated in order:
//!
//! - `equalToJson` compares the canonical form of the payload with the
//!   canonical form of the literal document.
//! - `matchesJsonPath` runs a JSONPath query against the payload and applies
//!   its mode (`partial`, `equals`, `contains`).
//!
//! Any negative element or evaluation error ends the evaluation with that
//! outcome. Otherwise the pattern matches when at least one element produced
//! a positive verdict, so an empty pattern never matches.

mod canonical;
mod json_path;
mod raw_text;

pub use canonical::{canonical_json, canonicalize};
pub use json_path::CompiledJsonPath;

use crate::error::EvalError;
use crate::mock::{BodyPattern, DittoRequest};
use once_cell::unsync::OnceCell;
use serde_json::Value;

/// Incoming payload, parsed lazily and at most once per match call.
#[derive(Debug)]
pub struct Payload<'a> {
    raw: &'a [u8],
    parsed: OnceCell<Result<Value, String>>,
    canonical: OnceCell<Value>,
}

impl<'a> Payload<'a> {
    pub fn new(raw: &'a [u8]) -> Self {
        Self {
            raw,
            parsed: OnceCell::new(),
            canonical: OnceCell::new(),
        }
    }

    pub fn raw(&self) -> &'a [u8] {
        self.raw
    }

    /// Parsed payload.
    pub fn value(&self) -> Result<&Value, EvalError> {
        self.parsed
            .get_or_init(|| serde_json::from_slice(self.raw).map_err(|e| e.to_string()))
            .as_ref()
            .map_err(|reason| EvalError::InvalidPayload {
                reason: reason.clone(),
            })
    }

    /// Canonical form of the payload.
    pub fn canonical(&self) -> Result<&Value, EvalError> {
        let value = self.value()?;
        Ok(self
            .canonical
            .get_or_init(|| canonicalize(value.clone())))
    }
}

/// Compiled body pattern.
#[derive(Debug)]
pub struct CompiledBodyPattern {
    /// Canonical form of `equalToJson`
    pub equal_to_json: Option<Value>,
    pub json_path: Option<CompiledJsonPath>,
}

impl CompiledBodyPattern {
    pub fn compile(pattern: &BodyPattern) -> Self {
        CompiledBodyPattern {
            equal_to_json: pattern.equal_to_json.clone().map(canonicalize),
            json_path: pattern
                .matches_json_path
                .as_ref()
                .map(CompiledJsonPath::compile),
        }
    }
}

/// Compiled request pattern.
#[derive(Debug, Default)]
pub struct CompiledRequestPattern {
    pub patterns: Vec<CompiledBodyPattern>,
}

impl CompiledRequestPattern {
    pub fn compile(request: &DittoRequest) -> Self {
        CompiledRequestPattern {
            patterns: request
                .body_patterns
                .iter()
                .map(CompiledBodyPattern::compile)
                .collect(),
        }
    }

    /// JSONPath patterns whose expression failed to parse.
    pub fn invalid_queries(&self) -> impl Iterator<Item = &CompiledJsonPath> {
        self.patterns
            .iter()
            .filter_map(|p| p.json_path.as_ref())
            .filter(|q| q.parse_error().is_some())
    }

    /// Evaluate the pattern against a payload.
    pub fn evaluate(&self, payload: &Payload<'_>) -> Result<bool, EvalError> {
        let mut matched = false;

        for pattern in &self.patterns {
            if let Some(expected) = &pattern.equal_to_json {
                if payload.canonical()? != expected {
                    return Ok(false);
                }
                matched = true;
            }

            if let Some(json_path) = &pattern.json_path {
                if !json_path.matches(payload)? {
                    return Ok(false);
                }
                matched = true;
            }
        }

        Ok(matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::JsonPathPattern;
    use serde_json::json;

    fn request(patterns: Vec<BodyPattern>) -> CompiledRequestPattern {
        CompiledRequestPattern::compile(&DittoRequest {
            method: "svc/Call".to_string(),
            body_patterns: patterns,
        })
    }

    #[test]
    fn test_equal_to_json_ignores_order_and_format() {
        let pattern = request(vec![BodyPattern::equal_to_json(json!({ "a": 1, "b": 2 }))]);

        assert_eq!(pattern.evaluate(&Payload::new(br#"{"b":2, "a":1}"#)), Ok(true));
        assert_eq!(pattern.evaluate(&Payload::new(b"{\n \"a\": 1.0,\n \"b\": 2\n}")), Ok(true));
        assert_eq!(pattern.evaluate(&Payload::new(br#"{"a":1}"#)), Ok(false));
        assert_eq!(pattern.evaluate(&Payload::new(br#"{"a":1,"b":2,"c":3}"#)), Ok(false));
    }

    #[test]
    fn test_empty_pattern_never_matches() {
        let pattern = request(vec![]);
        assert_eq!(pattern.evaluate(&Payload::new(b"{}")), Ok(false));

        let blank = request(vec![BodyPattern::default()]);
        assert_eq!(blank.evaluate(&Payload::new(b"{}")), Ok(false));
    }

    #[test]
    fn test_failing_element_after_success_rejects_pattern() {
        let pattern = request(vec![
            BodyPattern::equal_to_json(json!({ "name": "bob" })),
            BodyPattern::matches_json_path(JsonPathPattern::partial("$.missing")),
        ]);
        assert_eq!(pattern.evaluate(&Payload::new(br#"{"name":"bob"}"#)), Ok(false));
    }

    #[test]
    fn test_unset_mode_after_success_rejects_pattern() {
        let pattern = request(vec![
            BodyPattern::matches_json_path(JsonPathPattern::partial("$.name")),
            BodyPattern::matches_json_path(JsonPathPattern {
                expression: "$.name".to_string(),
                ..Default::default()
            }),
        ]);
        assert_eq!(pattern.evaluate(&Payload::new(br#"{"name":"bob"}"#)), Ok(false));
    }

    #[test]
    fn test_blank_element_does_not_veto_positive_elements() {
        let pattern = request(vec![
            BodyPattern::matches_json_path(JsonPathPattern::partial("$.name")),
            BodyPattern::default(),
        ]);
        assert_eq!(pattern.evaluate(&Payload::new(br#"{"name":"bob"}"#)), Ok(true));
    }

    #[test]
    fn test_both_fields_in_one_element_must_hold() {
        let both = BodyPattern {
            equal_to_json: Some(json!({ "name": "bob" })),
            matches_json_path: Some(JsonPathPattern::equals("$.name", "BOB")),
        };
        assert_eq!(request(vec![both.clone()]).evaluate(&Payload::new(br#"{"name":"bob"}"#)), Ok(true));

        let mut mismatched = both;
        mismatched.matches_json_path = Some(JsonPathPattern::equals("$.name", "alice"));
        assert_eq!(request(vec![mismatched]).evaluate(&Payload::new(br#"{"name":"bob"}"#)), Ok(false));
    }

    #[test]
    fn test_malformed_payload_is_an_error() {
        let pattern = request(vec![BodyPattern::equal_to_json(json!({}))]);
        assert!(matches!(
            pattern.evaluate(&Payload::new(b"{not json")),
            Err(EvalError::InvalidPayload { .. })
        ));
    }

    #[test]
    fn test_invalid_queries_listed() {
        let pattern = request(vec![
            BodyPattern::matches_json_path(JsonPathPattern::partial("$.ok")),
            BodyPattern::matches_json_path(JsonPathPattern::partial("$[")),
        ]);
        let invalid: Vec<_> = pattern.invalid_queries().map(|q| q.expression()).collect();
        assert_eq!(invalid, vec!["$["]);
    }

    #[test]
    fn test_payload_parsed_once() {
        let payload = Payload::new(br#"{"a":[1.0]}"#);
        let first = payload.value().unwrap() as *const Value;
        let second = payload.value().unwrap() as *const Value;
        assert_eq!(first, second);
        assert_eq!(payload.canonical().unwrap(), &json!({ "a": [1] }));
    }
}
