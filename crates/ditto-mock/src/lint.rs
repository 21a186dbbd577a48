//! Static checks over loaded mock definitions.
//!
//! These flag definitions that load fine but can never match, so broken
//! fixtures surface before a test run rather than as unexplained
//! `NotMatched` results.

use crate::mock::{DittoMock, JsonPathMode};
use crate::predicate::CompiledJsonPath;
use serde::Serialize;

/// Severity level of a lint issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The mock is broken.
    Error,
    /// The mock (or part of it) will never match.
    Warning,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

/// A single lint finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintIssue {
    pub severity: Severity,
    /// Issue code (e.g. "E001", "W001")
    pub code: &'static str,
    pub message: String,
    /// Location of the issue, e.g. `mocks[0].request.bodyPatterns[1]`
    pub location: String,
}

impl LintIssue {
    fn error(code: &'static str, message: impl Into<String>, location: String) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            location,
        }
    }

    fn warning(code: &'static str, message: impl Into<String>, location: String) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            location,
        }
    }
}

/// Lint a list of mocks.
pub fn lint_mocks<'a>(mocks: impl IntoIterator<Item = &'a DittoMock>) -> Vec<LintIssue> {
    let mut issues = Vec::new();

    for (i, mock) in mocks.into_iter().enumerate() {
        let location = format!("mocks[{i}].request");

        if mock.request.method.is_empty() {
            issues.push(LintIssue::warning(
                "W004",
                "Mock has an empty method name",
                format!("{location}.method"),
            ));
        }

        if mock.request.body_patterns.is_empty() {
            issues.push(LintIssue::warning(
                "W001",
                format!(
                    "Mock for '{}' has no body patterns and can never match",
                    mock.request.method
                ),
                location.clone(),
            ));
        }

        for (j, pattern) in mock.request.body_patterns.iter().enumerate() {
            let location = format!("{location}.bodyPatterns[{j}]");

            let Some(json_path) = &pattern.matches_json_path else {
                if pattern.equal_to_json.is_none() {
                    issues.push(LintIssue::warning(
                        "W002",
                        "Body pattern sets neither equalToJson nor matchesJsonPath",
                        location,
                    ));
                }
                continue;
            };

            if let Some(reason) = CompiledJsonPath::compile(json_path).parse_error() {
                issues.push(LintIssue::error(
                    "E001",
                    format!(
                        "Invalid JSONPath expression '{}': {reason}",
                        json_path.expression
                    ),
                    format!("{location}.matchesJsonPath.expression"),
                ));
            }

            if json_path.mode() == JsonPathMode::Unset {
                issues.push(LintIssue::warning(
                    "W003",
                    "matchesJsonPath sets none of partial, equals or contains and can never match",
                    format!("{location}.matchesJsonPath"),
                ));
            }
        }
    }

    issues
}
