//! Wire types for mock definition documents.
//!
//! Field names follow the definition file format (`request.method`,
//! `request.bodyPatterns[].equalToJson`, `request.bodyPatterns[].matchesJsonPath`).

use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// Mock Types
// ============================================================================

/// A single rule: a request pattern and the response returned when it matches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DittoMock {
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub request: DittoRequest,
    #[serde(default)]
    pub response: DittoResponse,
}

/// Request pattern of a mock.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DittoRequest {
    /// Fully qualified RPC method name the mock applies to
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub method: String,
    /// Body patterns, evaluated in order
    #[serde(
        default,
        deserialize_with = "deserialize_null_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub body_patterns: Vec<BodyPattern>,
}

/// One predicate of a request pattern.
///
/// Either field may be set; both are evaluated when present, equality first.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BodyPattern {
    /// Literal document compared structurally with the payload.
    /// An explicit `null` is kept as `Some(Value::Null)`.
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub equal_to_json: Option<serde_json::Value>,
    /// JSONPath query evaluated against the payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matches_json_path: Option<JsonPathPattern>,
}

impl BodyPattern {
    /// Pattern requiring the payload to equal `document`.
    pub fn equal_to_json(document: serde_json::Value) -> Self {
        Self {
            equal_to_json: Some(document),
            matches_json_path: None,
        }
    }

    /// Pattern evaluating a JSONPath query against the payload.
    pub fn matches_json_path(pattern: JsonPathPattern) -> Self {
        Self {
            equal_to_json: None,
            matches_json_path: Some(pattern),
        }
    }
}

/// JSONPath query with its comparison mode.
///
/// Empty `equals` / `contains` strings are treated as unset, so a document
/// carrying `"equals": ""` behaves as if the field were absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct JsonPathPattern {
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub expression: String,
    #[serde(
        default,
        deserialize_with = "deserialize_null_default",
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub partial: bool,
    #[serde(
        default,
        deserialize_with = "deserialize_null_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub equals: String,
    #[serde(
        default,
        deserialize_with = "deserialize_null_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub contains: String,
}

/// Effective comparison mode of a [`JsonPathPattern`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonPathMode<'a> {
    /// Any non-empty result matches
    Partial,
    /// Single string result, compared case-insensitively
    Equals(&'a str),
    /// Substring of the result's JSON text
    Contains(&'a str),
    /// Nothing configured; never matches
    Unset,
}

impl JsonPathPattern {
    pub fn partial(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            partial: true,
            ..Default::default()
        }
    }

    pub fn equals(expression: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            equals: target.into(),
            ..Default::default()
        }
    }

    pub fn contains(expression: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            contains: target.into(),
            ..Default::default()
        }
    }

    /// Resolve the configured mode. `partial` wins over `equals`, which wins
    /// over `contains`.
    pub fn mode(&self) -> JsonPathMode<'_> {
        if self.partial {
            JsonPathMode::Partial
        } else if !self.equals.is_empty() {
            JsonPathMode::Equals(&self.equals)
        } else if !self.contains.is_empty() {
            JsonPathMode::Contains(&self.contains)
        } else {
            JsonPathMode::Unset
        }
    }
}

// ============================================================================
// Response
// ============================================================================

/// Canned response returned verbatim on match. Not interpreted by the matcher.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct DittoResponse(serde_json::Value);

impl DittoResponse {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn into_value(self) -> serde_json::Value {
        self.0
    }

    /// The conventional `body` member, if the response has one.
    pub fn body(&self) -> Option<&serde_json::Value> {
        self.0.get("body")
    }

    /// The conventional `status` member, if the response has one.
    pub fn status(&self) -> Option<&serde_json::Value> {
        self.0.get("status")
    }
}

impl From<serde_json::Value> for DittoResponse {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// Keep an explicit JSON `null` as `Some(Value::Null)` instead of collapsing
/// it into `None`; absent fields still fall back to `#[serde(default)]`.
fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

/// Treat an explicit `null` like an absent field: the type's default.
fn deserialize_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
