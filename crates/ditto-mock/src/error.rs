//! Error types for loading, evaluating and matching mocks.

use std::path::PathBuf;

/// No mock applies to the request. This is an expected outcome, callers
/// usually answer with an "unmocked request" status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("request not matched: {method}")]
pub struct NotMatched {
    pub method: String,
}

/// Failure to turn a definition source into mock records.
/// Fatal to matcher construction.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse mock definition {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure while evaluating one mock against a payload.
///
/// Recovered inside [`RequestMatcher::match_request`](crate::RequestMatcher::match_request):
/// the error is logged and the mock is skipped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    #[error("Invalid request payload: {reason}")]
    InvalidPayload { reason: String },
    #[error("JSONPath matching: {reason}, expr: {expression}")]
    JsonPath { expression: String, reason: String },
    #[error("JSONPath result is not a single string ({found}), expr: {expression}")]
    NotAString {
        expression: String,
        found: &'static str,
    },
}

/// Failure to load a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}
