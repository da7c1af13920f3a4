//! Property-based round-trip laws.
//!
//! For valid inputs: decoding then serializing then decoding again yields
//! the same value, and validate agrees with decode.

use jsondef::builder::{
    boolean, elements, float64, int32, object, record, string, uint64, ObjectBuilder,
};
use jsondef::Schema;
use proptest::prelude::*;

fn profile_schema() -> Schema {
    ObjectBuilder::new()
        .required("name", string())
        .required("age", int32())
        .required("active", boolean())
        .required("score", float64())
        .required("big", uint64())
        .required("tags", elements(string()))
        .optional("note", string())
        .build()
}

prop_compose! {
    fn profile_input()(
        name in ".*",
        age in any::<i32>(),
        active in any::<bool>(),
        score in prop::num::f64::NORMAL | prop::num::f64::ZERO,
        big in any::<u64>(),
        tags in prop::collection::vec(".*", 0..4),
        note in prop::option::of(".*"),
    ) -> serde_json::Value {
        let mut obj = serde_json::json!({
            "name": name,
            "age": age,
            "active": active,
            "score": score,
            "big": big.to_string(),
            "tags": tags,
        });
        if let Some(note) = note {
            obj["note"] = serde_json::Value::String(note);
        }
        obj
    }
}

proptest! {
    #[test]
    fn decode_serialize_decode_is_identity(input in profile_input()) {
        let schema = profile_schema();
        let decoded = schema.parse_value(&input).unwrap();
        let text = schema.serialize(&decoded).unwrap();
        let again = schema.parse(&text).unwrap();
        prop_assert_eq!(again, decoded);
    }

    #[test]
    fn validate_agrees_with_decode(input in profile_input()) {
        let schema = profile_schema();
        prop_assert_eq!(schema.validate(&input), schema.parse_value(&input).is_ok());
    }

    #[test]
    fn record_round_trip(entries in prop::collection::btree_map("[a-z]{1,8}", any::<i32>(), 0..6)) {
        let schema = record(int32());
        let input = serde_json::Value::Object(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::json!(v)))
                .collect(),
        );
        let decoded = schema.parse_value(&input).unwrap();
        let text = schema.serialize(&decoded).unwrap();
        prop_assert_eq!(schema.parse(&text).unwrap(), decoded);
    }

    #[test]
    fn uint64_text_round_trip(n in any::<u64>()) {
        let schema = uint64();
        let decoded = schema.parse(&n.to_string()).unwrap();
        prop_assert_eq!(decoded.as_u64(), Some(n));
        let text = schema.serialize(&decoded).unwrap();
        prop_assert_eq!(text, n.to_string());
    }

    #[test]
    fn object_extras_never_leak_into_output(extra in "[a-z]{1,8}") {
        prop_assume!(extra != "id");
        let schema = object([("id", string())]);
        let mut map = serde_json::Map::new();
        map.insert("id".to_string(), serde_json::json!("x"));
        map.insert(extra.clone(), serde_json::json!(1));
        let decoded = schema.parse_value(&serde_json::Value::Object(map)).unwrap();
        prop_assert!(decoded.get(&extra).is_none());
    }
}
