//! Discriminated-union dispatch.

use jsondef::builder::{discriminator, object, string, timestamp};
use jsondef::Schema;
use serde_json::json;

fn item_event() -> Schema {
    discriminator(
        "type",
        [
            (
                "CREATED",
                object([("itemId", string()), ("createdAt", timestamp())]),
            ),
            (
                "DELETED",
                object([
                    ("itemId", string()),
                    ("createdAt", timestamp()),
                    ("updatedAt", timestamp()),
                    ("deletedAt", timestamp()),
                ]),
            ),
        ],
    )
}

#[test]
fn dispatch_to_matching_variant() {
    let schema = item_event();
    let value = schema
        .parse_value(&json!({
            "type": "CREATED",
            "itemId": "1",
            "createdAt": "2020-01-01T00:00:00Z",
        }))
        .unwrap();
    // The discriminant is injected into the result.
    assert_eq!(value["type"].as_str(), Some("CREATED"));
    assert_eq!(value["itemId"].as_str(), Some("1"));
}

#[test]
fn unknown_discriminant_is_a_pushed_error() {
    let schema = item_event();
    let failure = schema
        .parse_value(&json!({
            "type": "MOVED",
            "itemId": "1",
            "createdAt": "2020-01-01T00:00:00Z",
        }))
        .unwrap_err();
    let error = &failure.errors()[0];
    assert!(error.message.contains("MOVED"));
    assert_eq!(error.instance_path, "/type");
}

#[test]
fn missing_discriminant_field() {
    let failure = item_event().parse_value(&json!({"itemId": "1"})).unwrap_err();
    assert!(failure.errors()[0].message.contains("missing discriminator"));
}

#[test]
fn non_string_discriminant_field() {
    let failure = item_event()
        .parse_value(&json!({"type": 1, "itemId": "1"}))
        .unwrap_err();
    assert!(failure.errors()[0].message.contains("must be a string"));
}

#[test]
fn variant_fields_are_validated_against_their_mapping() {
    let schema = item_event();
    // DELETED requires the two extra timestamps CREATED does not.
    let failure = schema
        .parse_value(&json!({
            "type": "DELETED",
            "itemId": "1",
            "createdAt": "2020-01-01T00:00:00Z",
        }))
        .unwrap_err();
    let paths: Vec<&str> = failure
        .errors()
        .iter()
        .map(|e| e.instance_path.as_str())
        .collect();
    assert_eq!(paths, ["/updatedAt", "/deletedAt"]);
}

#[test]
fn encode_emits_discriminant_first() {
    let schema = item_event();
    let value = schema
        .parse_value(&json!({
            "type": "DELETED",
            "itemId": "1",
            "createdAt": "2020-01-01T00:00:00Z",
            "updatedAt": "2020-01-02T00:00:00Z",
            "deletedAt": "2020-01-03T00:00:00Z",
        }))
        .unwrap();
    let text = schema.serialize(&value).unwrap();
    assert!(
        text.starts_with(r#"{"type":"DELETED""#),
        "expected the tag first, got {text}"
    );
}

#[test]
fn mapping_error_path_includes_the_tag() {
    let schema = item_event();
    let failure = schema
        .parse_value(&json!({"type": "CREATED", "itemId": 1, "createdAt": "2020-01-01T00:00:00Z"}))
        .unwrap_err();
    assert_eq!(
        failure.errors()[0].schema_path,
        "/mapping/CREATED/properties/itemId/type"
    );
}
