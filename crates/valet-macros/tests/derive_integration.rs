//! Integration tests for `#[derive(Bind)]`.
//!
//! These tests check that derived plans compile against the runtime crate
//! and bind requests the same way hand-built plans do.

use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use valet_bind::{Bind, BindError, Binder, Record, RequestContext, Shape};
use valet_macros::Bind;

#[derive(Debug, Default, Deserialize, PartialEq)]
struct Pet {
    name: String,
    age: u8,
}

#[derive(Debug, Default, Bind)]
struct CreatePet {
    #[bind(name = "owner", required, pattern = "^[a-z]+$")]
    owner: String,
    #[bind(from = "header", name = "X-Tenant", required)]
    tenant: String,
    #[bind(from = "query", default = false)]
    dry_run: bool,
    #[bind(from = "query", default = "5s", max = "1m")]
    timeout: Duration,
    #[bind(from = "body")]
    pet: Record<Pet>,
    #[bind(skip)]
    attempts: u32,
}

#[derive(Debug, Default, Bind)]
struct Search {
    #[bind("name:\"q\" from:\"query\" required")]
    term: String,
    #[bind(from = "query", min = 1, max = 100, default = 500)]
    limit: u32,
    #[bind(from = "query")]
    since: Option<DateTime<Utc>>,
    #[bind(from = "query", min = "2", max = "4")]
    avatar: Option<Bytes>,
}

#[derive(Debug, Default, Bind)]
struct Upload {
    #[bind(from = "body", required)]
    lines: Vec<String>,
}

#[derive(Debug, Default, Bind)]
struct Nothing;

fn pet_request() -> RequestContext {
    RequestContext::builder()
        .uri("/owners/alice/pets?dry_run=1".parse().unwrap())
        .header("x-tenant", "acme")
        .header("content-type", "application/json")
        .body(r#"{"name":"Rex","age":3}"#)
        .path_param("owner", "alice")
        .build()
}

#[test]
fn test_derived_plan_shape() {
    let plan = CreatePet::plan();

    assert_eq!(plan.len(), 5);
    assert_eq!(plan.fields()[1].metadata().name, "X-Tenant");
    assert_eq!(plan.fields()[4].shape(), Shape::Record);
    assert!(std::ptr::eq(plan, CreatePet::plan()));
}

#[test]
fn test_binds_derived_record() {
    let req: CreatePet = Binder::new().bind(&pet_request()).unwrap();

    assert_eq!(req.owner, "alice");
    assert_eq!(req.tenant, "acme");
    assert!(req.dry_run);
    assert_eq!(req.timeout, Duration::from_secs(5));
    assert_eq!(*req.pet, Pet { name: "Rex".into(), age: 3 });
    assert_eq!(req.attempts, 0);
}

#[test]
fn test_pattern_attribute() {
    let ctx = RequestContext::builder()
        .header("x-tenant", "acme")
        .path_param("owner", "Alice")
        .build();

    let err = Binder::new().bind::<CreatePet>(&ctx).unwrap_err();
    let field = err.field_error().unwrap();
    assert_eq!(field.name(), "owner");
    assert_eq!(field.message(), "invalid match");
}

#[test]
fn test_malformed_body_is_decode_error() {
    let ctx = RequestContext::builder()
        .header("x-tenant", "acme")
        .header("content-type", "application/json")
        .body("{not json")
        .path_param("owner", "alice")
        .build();

    let err = Binder::new().bind::<CreatePet>(&ctx).unwrap_err();
    assert!(matches!(err, BindError::Decode(_)));
    assert_eq!(err.status_code(), http::StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn test_raw_annotation_and_literal_bounds() {
    let ctx = RequestContext::builder()
        .uri("/search?q=rust&since=2024-05-01".parse().unwrap())
        .build();

    let search: Search = Binder::new().bind(&ctx).unwrap();

    assert_eq!(search.term, "rust");
    // Defaults are not checked against their own bounds.
    assert_eq!(search.limit, 500);
    assert_eq!(
        search.since.unwrap().to_rfc3339(),
        "2024-05-01T00:00:00+00:00"
    );
    assert_eq!(search.avatar, None);
}

#[test]
fn test_found_value_is_bounded() {
    let ctx = RequestContext::builder()
        .uri("/search?q=rust&limit=101".parse().unwrap())
        .build();

    let err = Binder::new().bind::<Search>(&ctx).unwrap_err();
    assert_eq!(err.field_error().unwrap().message(), "value is above maximum 100");
}

#[test]
fn test_bytes_bounds_use_decoded_length() {
    // "YWJj" decodes to 3 bytes.
    let ctx = RequestContext::builder()
        .uri("/search?q=x&avatar=YWJj".parse().unwrap())
        .build();
    let search: Search = Binder::new().bind(&ctx).unwrap();
    assert_eq!(search.avatar.as_deref(), Some(&b"abc"[..]));

    // "YWJjZGU=" decodes to 5 bytes.
    let ctx = RequestContext::builder()
        .uri("/search?q=x&avatar=YWJjZGU%3D".parse().unwrap())
        .build();
    assert!(Binder::new().bind::<Search>(&ctx).is_err());
}

#[test]
fn test_body_lines() {
    let ctx = RequestContext::builder().body("a\nb\nc").build();

    let upload: Upload = Binder::new().bind(&ctx).unwrap();
    assert_eq!(upload.lines, vec!["a", "b", "c"]);

    let err = Binder::new()
        .bind::<Upload>(&RequestContext::builder().build())
        .unwrap_err();
    assert_eq!(err.field_error().unwrap().message(), "value is required");
}

#[test]
fn test_unit_struct() {
    assert!(Nothing::plan().is_empty());
    assert!(Binder::new().bind::<Nothing>(&RequestContext::builder().build()).is_ok());
}
