//! Recursive schemas, the registry, and depth limiting.

use jsondef::builder::{elements, object, recursive, reference, string, ObjectBuilder};
use jsondef::Options;
use serde_json::json;

#[test]
fn self_referencing_schema_decodes_nested_input() {
    let schema = recursive("RecTestsBinaryTree", |node| {
        ObjectBuilder::new()
            .required("value", string())
            .optional("left", node.clone())
            .optional("right", node)
            .build()
    });
    let input = json!({
        "value": "root",
        "left": {"value": "l", "right": {"value": "lr"}},
        "right": {"value": "r"},
    });
    let value = schema.parse_value(&input).unwrap();
    assert_eq!(value["left"]["right"]["value"].as_str(), Some("lr"));
    assert!(schema.validate(&input));
}

#[test]
fn recursive_round_trip() {
    let schema = recursive("RecTestsCategory", |node| {
        object([("name", string()), ("children", elements(node))])
    });
    let input = json!({
        "name": "a",
        "children": [
            {"name": "b", "children": []},
            {"name": "c", "children": [{"name": "d", "children": []}]},
        ],
    });
    let decoded = schema.parse_value(&input).unwrap();
    let text = schema.serialize(&decoded).unwrap();
    assert_eq!(schema.parse(&text).unwrap(), decoded);
}

#[test]
fn depth_limit_fails_fast() {
    let schema = recursive("RecTestsDeep", |node| {
        ObjectBuilder::new().optional("next", node).build()
    });

    // Build input nested beyond a small limit.
    let mut input = json!({});
    for _ in 0..20 {
        input = json!({"next": input});
    }
    let options = Options::default().with_max_depth(10);
    let failure = schema.parse_value_with(&input, &options).unwrap_err();
    assert!(failure.message().contains("maximum depth"));
    assert!(!schema.validate_with(&input, &options));

    // The default limit is far above 20 levels.
    assert!(schema.parse_value(&input).is_ok());
}

#[test]
fn dangling_reference_reports_an_error() {
    let schema = object([("data", reference("rec_tests_never_registered"))]);
    let failure = schema.parse_value(&json!({"data": {}})).unwrap_err();
    assert!(failure.message().contains("unresolved schema reference"));
}

#[test]
fn recursive_assigns_the_id() {
    let schema = recursive("RecTestsIdCheck", |node| {
        object([("next", node.nullable())])
    });
    assert_eq!(schema.id(), Some("RecTestsIdCheck"));
}
