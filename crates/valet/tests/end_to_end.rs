//! End-to-end tests: bind a request, run a handler, encode the reply.

use std::cell::Cell;
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, FixedOffset, TimeZone};
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::{Response, StatusCode};
use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use valet::bind::{encode, ContentFormat};
use valet::config::{ConfigLoader, ValetConfig};
use valet::prelude::*;

#[derive(Debug, Default, Bind)]
#[bind(crate = "valet::bind")]
struct Person {
    #[bind(from = "query", min = 0, max = 130)]
    age: u8,
}

#[derive(Debug, Default, Bind)]
#[bind(crate = "valet::bind")]
struct Page {
    #[bind(from = "query", min = 1, max = 50, default = 500)]
    size: u32,
    #[bind(from = "query", min = "1s", max = "1m", default = "30s")]
    timeout: Duration,
    #[bind(from = "header", name = "X-Token", min = 2, max = 4)]
    token: Option<Vec<u8>>,
}

#[derive(Debug, Default, Bind)]
#[bind(crate = "valet::bind")]
struct Lines {
    #[bind(from = "body")]
    lines: Vec<String>,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
struct Pet {
    name: String,
    age: u8,
}

#[derive(Debug, Default, Bind)]
#[bind(crate = "valet::bind")]
struct CreatePet {
    #[bind(from = "body", required)]
    pet: Record<Pet>,
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize, Bind)]
#[bind(crate = "valet::bind")]
struct Shapes {
    #[bind(from = "query")]
    count: i64,
    #[bind(from = "query")]
    ratio: f64,
    #[bind(from = "query")]
    enabled: bool,
    #[bind(from = "query")]
    label: String,
    #[bind(from = "query")]
    #[serde(default, with = "valet::bind::base64::option")]
    data: Option<Vec<u8>>,
    #[bind(from = "query")]
    at: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Serialize)]
struct Sum {
    sum: i64,
}

fn header<'a>(response: &'a Response<Bytes>, name: http::header::HeaderName) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}

fn body_text(response: &Response<Bytes>) -> &str {
    std::str::from_utf8(response.body()).unwrap()
}

fn escape(text: &str) -> String {
    text.replace('%', "%25")
        .replace('+', "%2B")
        .replace('&', "%26")
        .replace('=', "%3D")
        .replace('#', "%23")
        .replace(' ', "%20")
}

/// Binds `Shapes` from a query string rendered from its JSON form.
fn rebind(shapes: &Shapes) -> Shapes {
    let fields = serde_json::to_value(shapes).unwrap();
    let q = fields
        .as_object()
        .unwrap()
        .iter()
        .filter_map(|(key, value)| {
            let text = match value {
                Value::Null => return None,
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some(format!("{key}={}", escape(&text)))
        })
        .collect::<Vec<_>>()
        .join("&");

    Binder::new().bind(&query(&q)).unwrap()
}

fn query(q: &str) -> RequestContext {
    RequestContext::builder()
        .uri(format!("/x?{q}").parse().unwrap())
        .build()
}

#[test]
fn test_age_above_maximum() {
    let called = Cell::new(false);
    let response = Valet::new().handle(&query("age=200"), |_: Person| {
        called.set(true);
        Reply::<()>::empty()
    });

    assert!(!called.get());
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(
        body,
        json!({"error": {"name": "age", "message": "value is above maximum 130", "value": "200"}})
    );
}

#[test]
fn test_bounds_are_inclusive() {
    for q in ["age=0", "age=130"] {
        let person: Person = Binder::new().bind(&query(q)).unwrap();
        assert!(person.age == 0 || person.age == 130);
    }

    let page: Page = Binder::new().bind(&query("timeout=1m")).unwrap();
    assert_eq!(page.timeout, Duration::from_secs(60));

    let err = Binder::new().bind::<Page>(&query("timeout=61s")).unwrap_err();
    assert_eq!(err.field_error().unwrap().message(), "value is above maximum 1m");
}

#[test]
fn test_default_skips_bounds() {
    let page: Page = Binder::new().bind(&query("")).unwrap();
    assert_eq!(page.size, 500);
    assert_eq!(page.timeout, Duration::from_secs(30));
    assert_eq!(page.token, None);

    let err = Binder::new().bind::<Page>(&query("size=500")).unwrap_err();
    assert_eq!(err.field_error().unwrap().name(), "size");
}

#[test]
fn test_byte_bounds_use_decoded_length() {
    // 4 encoded characters, 3 decoded bytes.
    let ctx = RequestContext::builder().header("x-token", "YWJj").build();
    let page: Page = Binder::new().bind(&ctx).unwrap();
    assert_eq!(page.token.as_deref(), Some(&b"abc"[..]));

    // 8 encoded characters, 5 decoded bytes.
    let ctx = RequestContext::builder().header("x-token", "YWJjZGU=").build();
    let err = Binder::new().bind::<Page>(&ctx).unwrap_err();
    assert_eq!(err.field_error().unwrap().message(), "value is above maximum 4");
}

#[test]
fn test_body_lines() {
    let ctx = RequestContext::builder().body("a\nb\nc").build();
    let bound: Lines = Binder::new().bind(&ctx).unwrap();
    assert_eq!(bound.lines, vec!["a", "b", "c"]);
}

#[test]
fn test_indented_json_reply() {
    let ctx = RequestContext::builder()
        .header("accept", "application/json; indent=2")
        .build();

    let response = Valet::new().handle(&ctx, |_: Lines| Reply::data(json!({"sum": 3})));

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(&response), "{\n  \"sum\": 3\n}");
    assert_eq!(
        header(&response, CONTENT_TYPE),
        Some("application/json; charset=utf-8; indent=2")
    );
    assert_eq!(header(&response, CONTENT_LENGTH), Some("14"));
}

#[test]
fn test_raw_passthrough() {
    let raw = Bytes::from_static(b"\x89PNG not json");

    for accept in ["application/json; indent=4", "application/xml", "text/plain", "*/*"] {
        let ctx = RequestContext::builder().header("accept", accept).build();
        let response = Valet::new().handle(&ctx, |_: Lines| Reply::<()>::raw(raw.clone()));
        assert_eq!(response.body(), &raw);
        assert_eq!(header(&response, CONTENT_TYPE), Some("application/octet-stream"));
    }
}

#[test]
fn test_unknown_media_falls_back_to_compact_json() {
    let ctx = RequestContext::builder()
        .header("accept", "image/png; indent=4")
        .build();

    let response = Valet::new().handle(&ctx, |_: Lines| Reply::data(Sum { sum: 3 }));
    assert_eq!(body_text(&response), r#"{"sum":3}"#);
    assert_eq!(header(&response, CONTENT_TYPE), Some("application/json; charset=utf-8"));
}

#[test]
fn test_indent_is_clamped() {
    let ctx = RequestContext::builder()
        .header("accept", "application/json; indent=20")
        .build();

    let response = Valet::new().handle(&ctx, |_: Lines| Reply::data(Sum { sum: 3 }));
    assert_eq!(body_text(&response), format!("{{\n{}\"sum\": 3\n}}", " ".repeat(10)));
    assert_eq!(
        header(&response, CONTENT_TYPE),
        Some("application/json; charset=utf-8; indent=10")
    );
}

#[test]
fn test_xml_request_and_reply() {
    let ctx = RequestContext::builder()
        .header("content-type", "application/xml")
        .header("accept", "application/xml")
        .body("<Pet><name>Rex</name><age>3</age></Pet>")
        .build();

    let response = Valet::new().handle(&ctx, |req: CreatePet| {
        assert_eq!(*req.pet, Pet { name: "Rex".into(), age: 3 });
        Reply::data(Sum { sum: i64::from(req.pet.age) })
    });

    assert_eq!(body_text(&response), "<Sum><sum>3</sum></Sum>");
}

#[test]
fn test_malformed_body_is_server_error() {
    let ctx = RequestContext::builder()
        .header("content-type", "application/json")
        .body("{\"name\":")
        .build();

    let response = Valet::new().handle(&ctx, |_: CreatePet| Reply::<()>::empty());
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = serde_json::from_slice(response.body()).unwrap();
    assert!(body["error"].as_str().unwrap().starts_with("unable to parse json"));
}

#[test]
fn test_missing_required_body() {
    let response = Valet::new().handle(&RequestContext::builder().build(), |_: CreatePet| {
        Reply::<()>::empty()
    });

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body["error"]["message"], "value is required");
}

#[test]
fn test_empty_reply_status_follows_config() {
    let ctx = RequestContext::builder().build();

    let response = Valet::new().handle(&ctx, |_: Lines| Reply::<()>::empty());
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(response.headers().get(CONTENT_TYPE).is_none());
    assert!(response.headers().get(CONTENT_LENGTH).is_none());

    let config = ConfigLoader::new()
        .with_string("[encoder]\nno_content_on_empty = false", "toml")
        .unwrap()
        .load()
        .unwrap();
    let response = Valet::from_config(&config).handle(&ctx, |_: Lines| Reply::<()>::empty());
    assert_eq!(response.status(), StatusCode::OK);
}

#[test]
fn test_config_max_indent() {
    let mut config = ValetConfig::default();
    config.encoder.max_indent = 2;

    let ctx = RequestContext::builder()
        .header("accept", "application/json; indent=8")
        .build();
    let response = Valet::from_config(&config).handle(&ctx, |_: Lines| Reply::data(Sum { sum: 1 }));
    assert_eq!(body_text(&response), "{\n  \"sum\": 1\n}");
}

#[test]
fn test_bytes_round_trip_as_base64() {
    let shapes: Shapes = Binder::new()
        .bind(&query("count=1&ratio=0.5&enabled=t&label=x&data=aGVsbG8%3D"))
        .unwrap();
    assert_eq!(shapes.data.as_deref(), Some(&b"hello"[..]));

    let out = encode(Some("application/json"), &Payload::Data(&shapes)).unwrap();
    let json: Value = serde_json::from_slice(&out.body).unwrap();
    assert_eq!(json["data"], "aGVsbG8=");

    let back: Shapes = ContentFormat::Json.decode(&out.body).unwrap();
    assert_eq!(rebind(&back), shapes);
}

fn shapes_strategy() -> impl Strategy<Value = Shapes> {
    (
        any::<i64>(),
        (-1_000_000i32..1_000_000).prop_map(|n| f64::from(n) / 8.0),
        any::<bool>(),
        "[a-zA-Z0-9]{1,12}",
        proptest::option::of(proptest::collection::vec(any::<u8>(), 1..16)),
        proptest::option::of((0i64..4_000_000_000, -12i32..=12)),
    )
        .prop_map(|(count, ratio, enabled, label, data, at)| Shapes {
            count,
            ratio,
            enabled,
            label,
            data,
            at: at.map(|(secs, hours)| {
                FixedOffset::east_opt(hours * 3600)
                    .unwrap()
                    .timestamp_opt(secs, 0)
                    .unwrap()
            }),
        })
}

proptest! {
    #[test]
    fn prop_shapes_round_trip(shapes in shapes_strategy()) {
        let bound = rebind(&shapes);
        prop_assert_eq!(&bound, &shapes);

        for (accept, format) in [
            ("application/json; indent=2", ContentFormat::Json),
            ("application/xml", ContentFormat::Xml),
        ] {
            let out = encode(Some(accept), &Payload::Data(&bound)).unwrap();
            let decoded: Shapes = format.decode(&out.body).unwrap();
            prop_assert_eq!(&decoded, &bound);
            prop_assert_eq!(&rebind(&decoded), &bound);
        }
    }

    #[test]
    fn prop_age_within_bounds_binds(age in 0u32..=300) {
        let result = Binder::new().bind::<Person>(&query(&format!("age={age}")));
        if age <= 130 {
            prop_assert_eq!(u32::from(result.unwrap().age), age);
        } else {
            let err = result.unwrap_err();
            prop_assert_eq!(err.field_error().unwrap().name(), "age");
        }
    }
}
