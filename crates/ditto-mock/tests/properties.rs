//! Property tests for matching behavior.

use ditto_mock::predicate::canonical_json;
use ditto_mock::{BodyPattern, DittoMock, DittoRequest, DittoResponse, RequestMatcher};
use proptest::prelude::*;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::thread;

fn object_strategy() -> impl Strategy<Value = Vec<(String, i64)>> {
    prop::collection::btree_map("[a-z]{1,6}", any::<i64>(), 1..8)
        .prop_map(|m| m.into_iter().collect())
}

fn render(entries: &[(String, i64)], pretty: bool) -> String {
    let body: Vec<String> = entries
        .iter()
        .map(|(k, v)| format!("\"{k}\": {v}"))
        .collect();
    if pretty {
        format!("{{\n  {}\n}}", body.join(",\n  "))
    } else {
        format!("{{{}}}", body.join(","))
    }
}

fn equality_mock(method: &str, document: Value, tag: usize) -> DittoMock {
    DittoMock {
        request: DittoRequest {
            method: method.to_string(),
            body_patterns: vec![BodyPattern::equal_to_json(document)],
        },
        response: DittoResponse::new(json!({ "tag": tag })),
    }
}

proptest! {
    #[test]
    fn canonical_form_ignores_key_order_and_whitespace(entries in object_strategy()) {
        let mut reversed = entries.clone();
        reversed.reverse();

        let a = canonical_json(render(&entries, false).as_bytes()).unwrap();
        let b = canonical_json(render(&reversed, true).as_bytes()).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn equality_match_is_order_insensitive(entries in object_strategy()) {
        let document: Map<String, Value> = entries
            .iter()
            .map(|(k, v)| (k.clone(), json!(v)))
            .collect();
        let matcher = RequestMatcher::builder()
            .mocks(vec![equality_mock("svc/Eq", Value::Object(document), 0)])
            .build()
            .unwrap();

        let mut reversed = entries.clone();
        reversed.reverse();
        prop_assert!(matcher.match_request("svc/Eq", render(&reversed, true).as_bytes()).is_ok());
    }

    #[test]
    fn matching_is_deterministic(id in 0u32..4, payload_id in 0u32..4) {
        let mocks = (0..4)
            .map(|i| equality_mock("svc/Get", json!({ "id": i }), i as usize))
            .collect();
        let matcher = RequestMatcher::builder().mocks(mocks).build().unwrap();
        let payload = format!("{{\"id\": {payload_id}}}");

        let first = matcher.match_request("svc/Get", payload.as_bytes()).cloned();
        let second = matcher.match_request("svc/Get", payload.as_bytes()).cloned();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(
            first.unwrap().as_value()["tag"].as_u64(),
            Some(u64::from(payload_id))
        );
        // Method isolation: the same payload never matches under another name
        let other_method = format!("svc/Other{id}");
        prop_assert!(matcher.match_request(&other_method, payload.as_bytes()).is_err());
    }
}

#[test]
fn concurrent_matches_agree() {
    let mocks = (0..16)
        .map(|i| equality_mock("svc/Get", json!({ "id": i }), i))
        .collect();
    let matcher = Arc::new(RequestMatcher::builder().mocks(mocks).build().unwrap());

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let matcher = Arc::clone(&matcher);
            thread::spawn(move || {
                for i in 0..16 {
                    let payload = format!("{{\"id\": {i}}}");
                    let response = matcher.match_request("svc/Get", payload.as_bytes()).unwrap();
                    assert_eq!(response.as_value()["tag"], json!(i), "thread {t}");
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}
