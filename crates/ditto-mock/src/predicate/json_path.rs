//! JSONPath body patterns.

use super::raw_text;
use super::Payload;
use crate::error::EvalError;
use crate::mock::{JsonPathMode, JsonPathPattern};
use serde_json::Value;
use serde_json_path::{JsonPath, LocatedNodeList};

/// Compiled JSONPath pattern.
///
/// The expression is parsed once. A parse failure is kept and reported as an
/// [`EvalError`] every time the pattern is evaluated, so a single malformed
/// definition only disables its own mock.
#[derive(Debug)]
pub struct CompiledJsonPath {
    expression: String,
    query: Result<JsonPath, String>,
    mode: CompiledMode,
}

#[derive(Debug, Clone, PartialEq)]
enum CompiledMode {
    Partial,
    Equals { folded: String },
    Contains(String),
    Unset,
}

impl CompiledJsonPath {
    pub fn compile(pattern: &JsonPathPattern) -> Self {
        let mode = match pattern.mode() {
            JsonPathMode::Partial => CompiledMode::Partial,
            JsonPathMode::Equals(target) => CompiledMode::Equals {
                folded: fold(target).collect(),
            },
            JsonPathMode::Contains(target) => CompiledMode::Contains(target.to_string()),
            JsonPathMode::Unset => CompiledMode::Unset,
        };

        CompiledJsonPath {
            expression: pattern.expression.clone(),
            query: JsonPath::parse(&pattern.expression).map_err(|e| e.to_string()),
            mode,
        }
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Parse error of the expression, if it is malformed.
    pub fn parse_error(&self) -> Option<&str> {
        self.query.as_ref().err().map(String::as_str)
    }

    /// Evaluate against a payload.
    ///
    /// An empty result never matches. `equals` requires exactly one string
    /// node; anything else is an error. `contains` looks at the payload's own
    /// text for the result.
    pub fn matches(&self, payload: &Payload<'_>) -> Result<bool, EvalError> {
        let value = payload.value()?;
        let query = self.query.as_ref().map_err(|reason| EvalError::JsonPath {
            expression: self.expression.clone(),
            reason: reason.clone(),
        })?;

        match &self.mode {
            CompiledMode::Partial => Ok(!query.query(value).is_empty()),
            CompiledMode::Equals { folded } => {
                let nodes = query.query(value);
                if nodes.is_empty() {
                    return Ok(false);
                }
                let actual = match nodes.exactly_one() {
                    Ok(Value::String(s)) => s,
                    Ok(other) => return Err(self.not_a_string(kind_of(other))),
                    Err(_) => return Err(self.not_a_string("multiple nodes")),
                };
                Ok(fold(actual).eq(folded.chars()))
            }
            CompiledMode::Contains(target) => {
                let nodes = query.query_located(value);
                if nodes.is_empty() {
                    return Ok(false);
                }
                Ok(result_text(&nodes, payload.raw()).contains(target.as_str()))
            }
            CompiledMode::Unset => Ok(false),
        }
    }

    fn not_a_string(&self, found: &'static str) -> EvalError {
        EvalError::NotAString {
            expression: self.expression.clone(),
            found,
        }
    }
}

/// Simple case folding, char by char.
fn fold(s: &str) -> impl Iterator<Item = char> + '_ {
    s.chars().flat_map(char::to_lowercase)
}

/// Text of a query result as it appears in the payload: the node itself when
/// there is one, otherwise the nodes joined into an array.
fn result_text(nodes: &LocatedNodeList<'_>, raw: &[u8]) -> String {
    let mut fragments: Vec<String> = nodes
        .iter()
        .map(|node| match raw_text::locate(raw, &node.location().to_json_pointer()) {
            Some(bytes) => String::from_utf8_lossy(bytes).into_owned(),
            None => node.node().to_string(),
        })
        .collect();

    if fragments.len() == 1 {
        fragments.remove(0)
    } else {
        format!("[{}]", fragments.join(","))
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
