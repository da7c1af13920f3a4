//! Decode (strict parse) behavior.
//!
//! Table-driven good/bad fixtures per schema form: every good fixture must
//! decode with zero errors, every bad fixture with a non-empty error list.

use jsondef::builder::{
    any, boolean, elements, enumeration, int8, int64, nullable, object, record, string, timestamp,
    uint64, ObjectBuilder,
};
use jsondef::Schema;
use serde_json::json;

fn assert_good(schema: &Schema, inputs: &[serde_json::Value]) {
    for input in inputs {
        let result = schema.parse_value(input);
        assert!(result.is_ok(), "expected {input} to decode, got {result:?}");
    }
}

fn assert_bad(schema: &Schema, inputs: &[serde_json::Value]) {
    for input in inputs {
        match schema.parse_value(input) {
            Ok(value) => panic!("expected {input} to fail, decoded to {value}"),
            Err(failure) => assert!(
                !failure.errors().is_empty(),
                "failure for {input} carried no errors"
            ),
        }
    }
}

// =============================================================================
// Scalars
// =============================================================================

#[test]
fn boolean_fixtures() {
    let schema = boolean();
    assert_good(&schema, &[json!(true), json!(false)]);
    assert_bad(&schema, &[json!("true"), json!(1), json!(null), json!([])]);
}

#[test]
fn string_fixtures() {
    let schema = string();
    assert_good(&schema, &[json!(""), json!("hello")]);
    assert_bad(&schema, &[json!(1), json!(true), json!(null), json!({})]);
}

#[test]
fn int8_fixtures() {
    let schema = int8();
    assert_good(&schema, &[json!(127), json!(-128), json!(0)]);
    assert_bad(
        &schema,
        &[json!(128), json!(-129), json!(1.5), json!(true), json!(null)],
    );
}

#[test]
fn int8_accepts_integral_float_representation() {
    // 2.0 is an integer in everything but spelling.
    assert_eq!(int8().parse_value(&json!(2.0)).unwrap().as_i64(), Some(2));
}

#[test]
fn float_fixtures() {
    let schema = jsondef::builder::float64();
    assert_good(&schema, &[json!(1.5), json!(-3), json!(0)]);
    assert_bad(&schema, &[json!("1.5"), json!(null), json!(true)]);
}

#[test]
fn timestamp_fixtures() {
    let schema = timestamp();
    assert_good(
        &schema,
        &[
            json!("2020-01-01T00:00:00Z"),
            json!("1999-12-31T23:59:59.999+05:00"),
        ],
    );
    assert_bad(
        &schema,
        &[json!("2020-01-01"), json!("yesterday"), json!(1_577_836_800), json!(null)],
    );
}

#[test]
fn decoded_timestamp_is_a_date_value() {
    let value = timestamp().parse_value(&json!("2020-06-01T12:30:00Z")).unwrap();
    let ts = value.as_timestamp().expect("timestamp value");
    assert_eq!(ts.timestamp(), 1_591_014_600);
}

// =============================================================================
// 64-bit precision
// =============================================================================

#[test]
fn int64_boundary_precision() {
    let schema = int64();
    let max = schema.parse_value(&json!("9223372036854775807")).unwrap();
    assert_eq!(max.as_i64(), Some(i64::MAX));
    assert_bad(&schema, &[json!("9223372036854775808")]);

    let min = schema.parse_value(&json!("-9223372036854775808")).unwrap();
    assert_eq!(min.as_i64(), Some(i64::MIN));
    assert_bad(&schema, &[json!("-9223372036854775809")]);
}

#[test]
fn uint64_boundary_precision() {
    let schema = uint64();
    let max = schema.parse_value(&json!("18446744073709551615")).unwrap();
    assert_eq!(max.as_u64(), Some(u64::MAX));
    assert_bad(&schema, &[json!("18446744073709551616"), json!("-1"), json!(-1)]);
}

#[test]
fn int64_accepts_native_numbers_too() {
    let schema = int64();
    assert_eq!(
        schema.parse_value(&json!(i64::MAX)).unwrap().as_i64(),
        Some(i64::MAX)
    );
    assert_eq!(
        uint64().parse_value(&json!(u64::MAX)).unwrap().as_u64(),
        Some(u64::MAX)
    );
}

// =============================================================================
// Enum
// =============================================================================

#[test]
fn enum_fixtures() {
    let schema = enumeration(["A", "B"]);
    assert_good(&schema, &[json!("A"), json!("B")]);
    assert_bad(&schema, &[json!("a"), json!("C"), json!(null), json!(0)]);
}

#[test]
fn nullable_enum_accepts_null() {
    let schema = nullable(enumeration(["A", "B"]));
    assert_good(&schema, &[json!("A"), json!(null)]);
    assert_bad(&schema, &[json!("C")]);
}

// =============================================================================
// Containers
// =============================================================================

#[test]
fn elements_fixtures() {
    let schema = elements(string());
    assert_good(&schema, &[json!([]), json!(["a", "b"])]);
    assert_bad(&schema, &[json!(["a", 1]), json!("a"), json!(null), json!({})]);
}

#[test]
fn nullable_composition() {
    let schema = nullable(elements(string()));
    assert_good(&schema, &[json!(null), json!(["a", "b"])]);
    // Element-level nullability is unaffected by the outer wrapper.
    assert_bad(&schema, &[json!(["a", null])]);
}

#[test]
fn record_fixtures() {
    let schema = record(int8());
    assert_good(&schema, &[json!({}), json!({"a": 1, "b": 2})]);
    assert_bad(&schema, &[json!({"a": "x"}), json!([1]), json!(null)]);
}

#[test]
fn record_preserves_keys() {
    let value = record(int8()).parse_value(&json!({"z": 1, "a": 2})).unwrap();
    let keys: Vec<&str> = value
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys, ["z", "a"]);
}

#[test]
fn object_fixtures() {
    let schema = object([("id", string()), ("count", int8())]);
    assert_good(&schema, &[json!({"id": "a", "count": 1})]);
    assert_good(&schema, &[json!({"id": "a", "count": 1, "extra": true})]);
    assert_bad(
        &schema,
        &[
            json!({"id": "a"}),
            json!({"id": 1, "count": 1}),
            json!("not an object"),
            json!(null),
        ],
    );
}

#[test]
fn optional_properties_skipped_when_absent() {
    let schema = ObjectBuilder::new()
        .required("id", string())
        .optional("note", string())
        .build();
    let value = schema.parse_value(&json!({"id": "a"})).unwrap();
    assert!(value.get("note").is_none());

    let value = schema.parse_value(&json!({"id": "a", "note": "n"})).unwrap();
    assert_eq!(value["note"].as_str(), Some("n"));
}

#[test]
fn explicit_null_for_non_nullable_optional_is_an_error() {
    let schema = ObjectBuilder::new()
        .required("id", string())
        .optional("note", string())
        .build();
    let failure = schema.parse_value(&json!({"id": "a", "note": null})).unwrap_err();
    assert_eq!(failure.errors()[0].instance_path, "/note");
}

#[test]
fn object_errors_follow_declaration_order() {
    let schema = object([("a", string()), ("b", string()), ("c", string())]);
    let failure = schema
        .parse_value(&json!({"a": 1, "b": 2, "c": 3}))
        .unwrap_err();
    let paths: Vec<&str> = failure
        .errors()
        .iter()
        .map(|e| e.instance_path.as_str())
        .collect();
    assert_eq!(paths, ["/a", "/b", "/c"]);
}

#[test]
fn nested_error_paths() {
    let schema = object([("items", elements(object([("id", string())])))]);
    let failure = schema
        .parse_value(&json!({"items": [{"id": "ok"}, {"id": 5}]}))
        .unwrap_err();
    let error = &failure.errors()[0];
    assert_eq!(error.instance_path, "/items/1/id");
    assert_eq!(
        error.schema_path,
        "/properties/items/elements/properties/id/type"
    );
}

// =============================================================================
// Any / empty form
// =============================================================================

#[test]
fn any_accepts_everything() {
    let schema = any();
    assert_good(
        &schema,
        &[json!(null), json!(1), json!("x"), json!([1, "a"]), json!({"k": []})],
    );
}

#[test]
fn any_passes_value_through_unchanged() {
    let value = any().parse_value(&json!({"a": [1, true]})).unwrap();
    assert_eq!(value.to_json(), json!({"a": [1, true]}));
}

// =============================================================================
// Root text entry
// =============================================================================

#[test]
fn root_text_scalars() {
    assert_eq!(int8().parse("127").unwrap().as_i64(), Some(127));
    assert!(int8().parse("128").is_err());
    assert_eq!(boolean().parse("TRUE").unwrap().as_bool(), Some(true));
    assert_eq!(string().parse("hello").unwrap().as_str(), Some("hello"));
}

#[test]
fn root_text_containers_parse_json() {
    let schema = object([("id", string())]);
    assert!(schema.parse(r#"{"id": "a"}"#).is_ok());
    let failure = schema.parse(r#"{"id": "#).unwrap_err();
    assert!(failure.errors()[0].message.contains("invalid JSON"));
}

#[test]
fn error_list_is_empty_exactly_on_success() {
    let schema = object([("id", string()), ("n", int8())]);
    let good = [json!({"id": "a", "n": 1})];
    let bad = [json!({"id": 1, "n": "x"}), json!({}), json!(null)];
    for input in &good {
        assert!(schema.parse_value(input).is_ok());
    }
    for input in &bad {
        let failure = schema.parse_value(input).unwrap_err();
        assert!(!failure.errors().is_empty());
    }
}
