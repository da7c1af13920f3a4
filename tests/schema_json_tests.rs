//! JTD document round-trips for every schema form.

use jsondef::builder::{
    any, discriminator, elements, enumeration, int64, nullable, object, record, reference, string,
    timestamp, ObjectBuilder,
};
use jsondef::Schema;
use serde_json::json;

fn assert_document_round_trip(schema: &Schema, expected: serde_json::Value) {
    let document = serde_json::to_value(schema).unwrap();
    assert_eq!(document, expected);
    let parsed: Schema = serde_json::from_value(document).unwrap();
    assert_eq!(&parsed, schema);
}

#[test]
fn empty_form() {
    assert_document_round_trip(&any(), json!({}));
    assert_document_round_trip(&any().nullable(), json!({"nullable": true}));
}

#[test]
fn type_form() {
    assert_document_round_trip(&string(), json!({"type": "string"}));
    assert_document_round_trip(&int64(), json!({"type": "int64"}));
    assert_document_round_trip(&timestamp(), json!({"type": "timestamp"}));
}

#[test]
fn enum_form() {
    assert_document_round_trip(&enumeration(["A", "B"]), json!({"enum": ["A", "B"]}));
}

#[test]
fn elements_form() {
    assert_document_round_trip(
        &elements(nullable(string())),
        json!({"elements": {"type": "string", "nullable": true}}),
    );
}

#[test]
fn properties_form() {
    let schema = ObjectBuilder::new()
        .required("id", string())
        .optional("note", string())
        .strict()
        .build();
    assert_document_round_trip(
        &schema,
        json!({
            "properties": {"id": {"type": "string"}},
            "optionalProperties": {"note": {"type": "string"}},
            "strict": true,
        }),
    );
}

#[test]
fn values_form() {
    assert_document_round_trip(&record(int64()), json!({"values": {"type": "int64"}}));
}

#[test]
fn discriminator_form() {
    let schema = discriminator("kind", [("A", object([("x", string())]))]);
    assert_document_round_trip(
        &schema,
        json!({
            "discriminator": "kind",
            "mapping": {"A": {"properties": {"x": {"type": "string"}}}},
        }),
    );
}

#[test]
fn ref_form() {
    assert_document_round_trip(&reference("Node"), json!({"ref": "Node"}));
}

#[test]
fn metadata_round_trips() {
    let schema = string()
        .with_id("UserName")
        .with_description("display name")
        .deprecated();
    assert_document_round_trip(
        &schema,
        json!({
            "type": "string",
            "metadata": {
                "id": "UserName",
                "description": "display name",
                "isDeprecated": true,
            },
        }),
    );
}

#[test]
fn document_order_is_preserved_for_properties() {
    let text = r#"{"properties":{"z":{"type":"string"},"a":{"type":"string"}}}"#;
    let schema: Schema = serde_json::from_str(text).unwrap();
    let keys: Vec<&str> = schema
        .as_properties()
        .unwrap()
        .properties
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys, ["z", "a"]);
}

#[test]
fn validator_internals_never_appear_in_the_document() {
    let schema = object([("id", string())]);
    let document = serde_json::to_value(&schema).unwrap();
    let keys: Vec<&str> = document.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys, ["properties"]);
}

#[test]
fn unknown_scalar_type_is_rejected() {
    let err = serde_json::from_str::<Schema>(r#"{"type": "int128"}"#).unwrap_err();
    assert!(err.to_string().contains("int128"));
}

#[test]
fn mixed_forms_are_rejected() {
    let err = serde_json::from_str::<Schema>(r#"{"type": "string", "values": {}}"#).unwrap_err();
    assert!(err.to_string().contains("mixes forms"));
}
