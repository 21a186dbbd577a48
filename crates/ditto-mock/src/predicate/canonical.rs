//! Canonical JSON form used for structural equality.
//!
//! Object keys are sorted, whitespace is
//! dropped and every number is normalized through its `f64` value, so `1`,
//! `1.0` and `1e0` share one canonical rendering.

use serde_json::{Map, Number, Value};

/// Largest integer magnitude an `f64` represents exactly.
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

/// Parse `src` and re-serialize it in canonical form.
pub fn canonical_json(src: &[u8]) -> Result<Vec<u8>, serde_json::Error> {
    let value: Value = serde_json::from_slice(src)?;
    serde_json::to_vec(&canonicalize(value))
}

/// Normalize a parsed value into canonical form.
pub fn canonicalize(value: Value) -> Value {
    match value {
        Value::Number(n) => Value::Number(normalize_number(&n)),
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        Value::Object(map) => {
            // Sort explicitly so the form holds even with `preserve_order` enabled
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, canonicalize(v)))
                    .collect::<Map<String, Value>>(),
            )
        }
        other => other,
    }
}

fn normalize_number(n: &Number) -> Number {
    let Some(f) = n.as_f64() else {
        return n.clone();
    };

    if f.fract() == 0.0 && f.abs() <= MAX_EXACT_INT {
        Number::from(f as i64)
    } else {
        Number::from_f64(f).unwrap_or_else(|| n.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_ignores_key_order_and_whitespace() {
        let a = canonical_json(br#"{"a":1,"b":2}"#).unwrap();
        let b = canonical_json(b"{ \"b\": 2,\n  \"a\": 1 }").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, br#"{"a":1,"b":2}"#.to_vec());
    }

    #[test]
    fn test_canonical_normalizes_numbers() {
        assert_eq!(
            canonical_json(b"[1, 1.0, 1e0, -0.5, 2.50]").unwrap(),
            b"[1,1,1,-0.5,2.5]".to_vec()
        );
    }

    #[test]
    fn test_canonical_keeps_array_order() {
        assert_ne!(
            canonical_json(b"[1,2]").unwrap(),
            canonical_json(b"[2,1]").unwrap()
        );
    }

    #[test]
    fn test_canonical_nested_objects_sorted() {
        let out = canonical_json(br#"{"z":{"y":true,"x":null},"a":["s"]}"#).unwrap();
        assert_eq!(out, br#"{"a":["s"],"z":{"x":null,"y":true}}"#.to_vec());
    }

    #[test]
    fn test_canonical_rejects_malformed_input() {
        assert!(canonical_json(b"{\"a\":").is_err());
        assert!(canonical_json(b"").is_err());
    }
}
