//! Serialize pass: emits `pub fn serialize(&jsondef::Value) -> String`.
//!
//! The emitted serializer assumes its input already satisfies the schema:
//! shape mismatches degrade to `null` in the output rather than branching
//! into error handling, and required properties absent from the value map
//! are simply omitted. The facade's interpreted serializer is the strict
//! variant; this text is the inspectable/ahead-of-time artifact.

use crate::codegen::{lit, sub_function_key, SubFunctionRegistry, GENERATED_MAX_DEPTH};
use crate::schema::{registry, DiscriminatorForm, Form, PropertiesForm, ScalarType, Schema};

/// Generate the serialize function source for `schema`.
#[must_use]
pub fn compile_serialize(schema: &Schema) -> String {
    let mut subs = SubFunctionRegistry::new("serialize");
    let stmts = emit_node(schema, "input", true, &mut subs);
    format!(
        "#[allow(unused_variables, clippy::all)]\npub fn serialize(input: &jsondef::Value) -> String {{\n    let mut __buf = String::new();\n    {{\n        let out = &mut __buf;\n        let depth = 0usize;\n        {stmts}\n    }}\n    __buf\n}}\n\n{rest}",
        rest = subs.render()
    )
}

fn emit_node(schema: &Schema, val: &str, root: bool, subs: &mut SubFunctionRegistry) -> String {
    if let Some(key) = sub_function_key(schema) {
        let key = key.to_owned();
        let (name, needs_body) = subs.get_or_declare(&key);
        if needs_body {
            let body = match schema.form() {
                Form::Ref(target_name) => registry::resolve(target_name)
                    .map(|target| emit_inline(&target, "input", false, subs)),
                _ => Some(emit_inline(schema, "input", false, subs)),
            };
            let body_stmts =
                body.unwrap_or_else(|| String::from("out.push_str(\"null\");"));
            subs.define(
                &name,
                format!(
                    "#[allow(unused_variables, clippy::all)]\nfn {name}(input: &jsondef::Value, out: &mut String, depth: usize) {{\n    if depth > {GENERATED_MAX_DEPTH} {{\n        out.push_str(\"null\");\n        return;\n    }}\n    {body_stmts}\n}}\n"
                ),
            );
        }
        return format!("{name}({val}, out, depth + 1);");
    }
    emit_inline(schema, val, root, subs)
}

fn emit_inline(schema: &Schema, val: &str, root: bool, subs: &mut SubFunctionRegistry) -> String {
    let base = match schema.form() {
        Form::Empty => format!(
            "out.push_str(&serde_json::to_string({val}).unwrap_or_default());"
        ),
        Form::Type(ty) => emit_scalar(*ty, val, root),
        Form::Enum(_) => emit_string_like(val, root),
        Form::Elements(inner) => {
            let inner_stmts = emit_node(inner, "item", false, subs);
            format!(
                "match ({val}) {{\n        jsondef::Value::Array(items) => {{\n            out.push('[');\n            for (i, item) in items.iter().enumerate() {{\n                if i > 0 {{\n                    out.push(',');\n                }}\n                {inner_stmts}\n            }}\n            out.push(']');\n        }}\n        _ => out.push_str(\"null\"),\n    }}"
            )
        }
        Form::Values(inner) => {
            let inner_stmts = emit_node(inner, "item", false, subs);
            format!(
                "match ({val}) {{\n        jsondef::Value::Object(map) => {{\n            out.push('{{');\n            for (i, (k, item)) in map.iter().enumerate() {{\n                if i > 0 {{\n                    out.push(',');\n                }}\n                out.push_str(&serde_json::to_string(k).unwrap_or_default());\n                out.push(':');\n                {inner_stmts}\n            }}\n            out.push('}}');\n        }}\n        _ => out.push_str(\"null\"),\n    }}"
            )
        }
        Form::Properties(form) => {
            let fields = emit_fields(form, None, subs);
            format!(
                "match ({val}) {{\n        jsondef::Value::Object(map) => {{\n            out.push('{{');\n            let mut first = true;\n{fields}            out.push('}}');\n        }}\n        _ => out.push_str(\"null\"),\n    }}"
            )
        }
        Form::Discriminator(form) => emit_discriminator(form, val, subs),
        Form::Ref(_) => String::from("out.push_str(\"null\");"),
    };
    if schema.is_nullable() {
        format!(
            "if ({val}).is_null() {{\n        out.push_str(\"null\");\n    }} else {{\n        {base}\n    }}"
        )
    } else {
        base
    }
}

fn emit_scalar(ty: ScalarType, val: &str, root: bool) -> String {
    match ty {
        ScalarType::Boolean => format!(
            "match ({val}) {{\n        jsondef::Value::Bool(b) => out.push_str(if *b {{ \"true\" }} else {{ \"false\" }}),\n        _ => out.push_str(\"null\"),\n    }}"
        ),
        ScalarType::String => emit_string_like(val, root),
        ScalarType::Timestamp => {
            let write = if root {
                "out.push_str(&__s);"
            } else {
                "out.push_str(&serde_json::to_string(&__s).unwrap_or_default());"
            };
            let text_arm = if root {
                "out.push_str(s)"
            } else {
                "out.push_str(&serde_json::to_string(s).unwrap_or_default())"
            };
            format!(
                "match ({val}) {{\n        jsondef::Value::Timestamp(ts) => {{\n            let __s = ts.to_rfc3339_opts(chrono::SecondsFormat::Millis, true);\n            {write}\n        }}\n        jsondef::Value::String(s) => {text_arm},\n        _ => out.push_str(\"null\"),\n    }}"
            )
        }
        ScalarType::Float32 | ScalarType::Float64 => format!(
            "match ({val}) {{\n        jsondef::Value::Number(n) if n.as_f64().is_finite() => out.push_str(&n.to_string()),\n        _ => out.push_str(\"null\"),\n    }}"
        ),
        _ => format!(
            "match ({val}) {{\n        jsondef::Value::Number(n) => out.push_str(&n.to_string()),\n        _ => out.push_str(\"null\"),\n    }}"
        ),
    }
}

fn emit_string_like(val: &str, root: bool) -> String {
    let write = if root {
        "out.push_str(s)"
    } else {
        "out.push_str(&serde_json::to_string(s).unwrap_or_default())"
    };
    format!(
        "match ({val}) {{\n        jsondef::Value::String(s) => {write},\n        _ => out.push_str(\"null\"),\n    }}"
    )
}

/// Field statements for an open object. `skip` is the discriminator key the
/// caller already wrote.
fn emit_fields(
    form: &PropertiesForm,
    skip: Option<&str>,
    subs: &mut SubFunctionRegistry,
) -> String {
    let mut body = String::new();
    let fields = form
        .properties
        .iter()
        .chain(form.optional_properties.iter());
    for (key, sub) in fields {
        if skip == Some(key.as_str()) {
            continue;
        }
        let inner = emit_node(sub, "v", false, subs);
        let key_colon = lit(&format!(
            "{}:",
            serde_json::to_string(key).unwrap_or_default()
        ));
        body.push_str(&format!(
            "            if let Some(v) = map.get({key_lit}) {{\n                if !first {{\n                    out.push(',');\n                }}\n                first = false;\n                out.push_str({key_colon});\n                {inner}\n            }}\n",
            key_lit = lit(key),
        ));
    }
    body
}

/// The discriminant field is written first, then the mapped object's fields.
fn emit_discriminator(
    form: &DiscriminatorForm,
    val: &str,
    subs: &mut SubFunctionRegistry,
) -> String {
    let key = form.discriminator.as_str();
    let mut arms = String::new();
    for (tag, mapped) in &form.mapping {
        let Some(mapped_form) = mapped.as_properties() else {
            continue;
        };
        let fields = emit_fields(mapped_form, Some(key), subs);
        let header = lit(&format!(
            "{}:{}",
            serde_json::to_string(key).unwrap_or_default(),
            serde_json::to_string(tag).unwrap_or_default()
        ));
        arms.push_str(&format!(
            "            Some({tag_lit}) => {{\n                out.push('{{');\n                out.push_str({header});\n                let mut first = false;\n{fields}                out.push('}}');\n            }}\n",
            tag_lit = lit(tag)
        ));
    }
    format!(
        "match ({val}) {{\n        jsondef::Value::Object(map) => match map.get({key_lit}).and_then(|v| v.as_str()) {{\n{arms}            _ => out.push_str(\"null\"),\n        }},\n        _ => out.push_str(\"null\"),\n    }}",
        key_lit = lit(key),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder;

    #[test]
    fn root_string_writes_bare_text() {
        let source = compile_serialize(&builder::string());
        assert!(source.contains("pub fn serialize(input: &jsondef::Value) -> String"));
        assert!(source.contains("out.push_str(s)"));
    }

    #[test]
    fn discriminator_writes_tag_first() {
        let schema = builder::discriminator(
            "type",
            [("CREATED", builder::object([("itemId", builder::string())]))],
        );
        let source = compile_serialize(&schema);
        assert!(source.contains(r#""\"type\":\"CREATED\"""#));
    }

    #[test]
    fn recursive_serialize_emits_sub_function() {
        let schema = builder::recursive("CodegenSerializeNode", |node| {
            builder::object([("children", builder::elements(node))])
        });
        let source = compile_serialize(&schema);
        assert!(source.contains("fn serialize_codegen_serialize_node("));
        assert!(source.contains("serialize_codegen_serialize_node(item, out, depth + 1);"));
    }
}
