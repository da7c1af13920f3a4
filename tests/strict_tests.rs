//! Strict-mode (unknown key) behavior.

use jsondef::builder::{discriminator, object, string, strict_object, ObjectBuilder};
use serde_json::json;

#[test]
fn strict_rejects_extras_loose_accepts_them() {
    let input = json!({"id": "", "name": "", "extra": ""});

    let strict = strict_object([("id", string()), ("name", string())]);
    let failure = strict.parse_value(&input).unwrap_err();
    assert!(failure.errors()[0].message.contains("not allowed"));
    assert_eq!(failure.errors()[0].instance_path, "/extra");

    let loose = object([("id", string()), ("name", string())]);
    assert!(loose.parse_value(&input).is_ok());
}

#[test]
fn strict_violation_precedes_property_errors() {
    // Both an unknown key and a bad property value: the unknown-key scan
    // runs first, so the strict violation is always the first error.
    let schema = strict_object([("id", string())]);
    let failure = schema
        .parse_value(&json!({"extra": true, "id": 7}))
        .unwrap_err();
    let messages: Vec<&str> = failure
        .errors()
        .iter()
        .map(|e| e.message.as_str())
        .collect();
    assert!(messages[0].contains("not allowed"), "got {messages:?}");
    assert!(messages[1].contains("expected string"), "got {messages:?}");
}

#[test]
fn strict_admits_optional_keys() {
    let schema = ObjectBuilder::new()
        .required("id", string())
        .optional("note", string())
        .strict()
        .build();
    assert!(schema.parse_value(&json!({"id": "a", "note": "n"})).is_ok());
    assert!(schema.parse_value(&json!({"id": "a"})).is_ok());
    assert!(schema.parse_value(&json!({"id": "a", "other": "x"})).is_err());
}

#[test]
fn strict_admits_the_active_discriminator_key() {
    let schema = discriminator(
        "type",
        [(
            "A",
            ObjectBuilder::new().required("x", string()).strict().build(),
        )],
    );
    // "type" is not declared inside the mapped object but must be allowed.
    assert!(schema.parse_value(&json!({"type": "A", "x": "1"})).is_ok());
    assert!(schema
        .parse_value(&json!({"type": "A", "x": "1", "y": "2"}))
        .is_err());
}

#[test]
fn strict_object_with_no_declared_keys_rejects_everything() {
    let schema = ObjectBuilder::new().strict().build();
    assert!(schema.parse_value(&json!({})).is_ok());
    assert!(schema.parse_value(&json!({"any": 1})).is_err());
}

#[test]
fn multi_error_summary_lists_affected_properties() {
    let schema = strict_object([("id", string())]);
    let failure = schema
        .parse_value(&json!({"extra": true, "id": 7}))
        .unwrap_err();
    assert_eq!(
        failure.message(),
        "Invalid input. Affected properties [/extra, /id]."
    );
}
