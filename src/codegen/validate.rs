//! Validate pass: emits a `pub fn validate(&serde_json::Value) -> bool`.

use crate::bounds;
use crate::codegen::{lit, sub_function_key, SubFunctionRegistry, GENERATED_MAX_DEPTH};
use crate::schema::{registry, DiscriminatorForm, Form, PropertiesForm, ScalarType, Schema};

/// Generate the validate function source for `schema`.
#[must_use]
pub fn compile_validate(schema: &Schema) -> String {
    let mut subs = SubFunctionRegistry::new("validate");
    let expr = emit_node(schema, "input", &mut subs);
    format!(
        "{preamble}\n#[allow(unused_variables, clippy::all)]\npub fn validate(input: &serde_json::Value) -> bool {{\n    let depth = 0usize;\n    {expr}\n}}\n\n{rest}",
        preamble = PREAMBLE,
        expr = expr,
        rest = subs.render()
    )
}

const PREAMBLE: &str = r"#[allow(dead_code)]
fn __as_i128(v: &serde_json::Value) -> Option<i128> {
    let n = match v {
        serde_json::Value::Number(n) => n,
        _ => return None,
    };
    if let Some(i) = n.as_i64() {
        return Some(i as i128);
    }
    if let Some(u) = n.as_u64() {
        return Some(u as i128);
    }
    let f = n.as_f64()?;
    if f.is_finite() && f.fract() == 0.0 && f >= i128::MIN as f64 && f <= i128::MAX as f64 {
        Some(f as i128)
    } else {
        None
    }
}

#[allow(dead_code)]
fn __int_text(s: &str) -> Option<i128> {
    if let Ok(i) = s.parse::<i128>() {
        return Some(i);
    }
    let f = s.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f >= i128::MIN as f64 && f <= i128::MAX as f64 {
        Some(f as i128)
    } else {
        None
    }
}
";

fn emit_node(schema: &Schema, val: &str, subs: &mut SubFunctionRegistry) -> String {
    if let Some(key) = sub_function_key(schema) {
        let key = key.to_owned();
        let (name, needs_body) = subs.get_or_declare(&key);
        if needs_body {
            let body = match schema.form() {
                Form::Ref(target_name) => registry::resolve(target_name)
                    .map(|target| emit_inline(&target, "input", subs)),
                _ => Some(emit_inline(schema, "input", subs)),
            };
            // An unresolved ref validates to false.
            let body_expr = body.unwrap_or_else(|| String::from("false"));
            subs.define(
                &name,
                format!(
                    "#[allow(unused_variables, clippy::all)]\nfn {name}(input: &serde_json::Value, depth: usize) -> bool {{\n    if depth > {GENERATED_MAX_DEPTH} {{\n        return false;\n    }}\n    {body_expr}\n}}\n"
                ),
            );
        }
        return format!("{name}({val}, depth + 1)");
    }
    emit_inline(schema, val, subs)
}

fn emit_inline(schema: &Schema, val: &str, subs: &mut SubFunctionRegistry) -> String {
    let base = match schema.form() {
        Form::Empty => String::from("true"),
        Form::Type(ty) => emit_scalar(*ty, val),
        Form::Enum(values) => {
            let pattern = values
                .iter()
                .map(|v| lit(v))
                .collect::<Vec<_>>()
                .join(" | ");
            format!("matches!(({val}).as_str(), Some({pattern}))")
        }
        Form::Elements(inner) => {
            let item = emit_node(inner, "item", subs);
            format!(
                "match ({val}).as_array() {{\n        Some(items) => items.iter().all(|item| {item}),\n        None => false,\n    }}"
            )
        }
        Form::Values(inner) => {
            let item = emit_node(inner, "item", subs);
            format!(
                "match ({val}).as_object() {{\n        Some(entries) => entries.values().all(|item| {item}),\n        None => false,\n    }}"
            )
        }
        Form::Properties(form) => emit_properties(form, val, None, subs),
        Form::Discriminator(form) => emit_discriminator(form, val, subs),
        // Handled by emit_node; a bare ref without extraction cannot occur.
        Form::Ref(_) => String::from("false"),
    };
    if schema.is_nullable() {
        format!("(({val}).is_null() || {base})")
    } else {
        base
    }
}

fn emit_scalar(ty: ScalarType, val: &str) -> String {
    match ty {
        ScalarType::Boolean => format!("({val}).is_boolean()"),
        ScalarType::String => format!("({val}).is_string()"),
        ScalarType::Timestamp => format!(
            "({val}).as_str().map_or(false, |s| chrono::DateTime::parse_from_rfc3339(s).is_ok())"
        ),
        ScalarType::Float32 | ScalarType::Float64 => format!("({val}).is_number()"),
        ScalarType::Int64 | ScalarType::Uint64 => {
            let range = int_range(ty);
            format!(
                "match ({val}) {{\n        serde_json::Value::String(s) => __int_text(s).map_or(false, |n| {range}),\n        other => __as_i128(other).map_or(false, |n| {range}),\n    }}"
            )
        }
        _ => {
            let range = int_range(ty);
            format!("__as_i128({val}).map_or(false, |n| {range})")
        }
    }
}

fn int_range(ty: ScalarType) -> String {
    // Integer scalars always have a range; fall back to an empty one so a
    // generator bug shows up as a failed validation, not a panic.
    bounds::int_range(ty).map_or_else(
        || String::from("false"),
        |range| format!("n >= {}i128 && n <= {}i128", range.min, range.max),
    )
}

fn emit_properties(
    form: &PropertiesForm,
    val: &str,
    discriminator: Option<&str>,
    subs: &mut SubFunctionRegistry,
) -> String {
    let mut checks = String::new();
    if form.strict {
        let mut allowed: Vec<String> = form.declared_keys().map(lit).collect();
        if let Some(key) = discriminator {
            allowed.push(lit(key));
        }
        let pattern = if allowed.is_empty() {
            // No declared keys: every input key is a violation.
            String::from("obj.is_empty()")
        } else {
            format!(
                "obj.keys().all(|k| matches!(k.as_str(), {}))",
                allowed.join(" | ")
            )
        };
        checks.push_str(&format!("            ok = ok && {pattern};\n"));
    }
    for (key, sub) in &form.properties {
        let inner = emit_node(sub, "v", subs);
        checks.push_str(&format!(
            "            ok = ok && match obj.get({key}) {{ Some(v) => {inner}, None => false }};\n",
            key = lit(key)
        ));
    }
    for (key, sub) in &form.optional_properties {
        let inner = emit_node(sub, "v", subs);
        checks.push_str(&format!(
            "            ok = ok && match obj.get({key}) {{ Some(v) => {inner}, None => true }};\n",
            key = lit(key)
        ));
    }
    format!(
        "match ({val}).as_object() {{\n        Some(obj) => {{\n            let mut ok = true;\n{checks}            ok\n        }}\n        None => false,\n    }}"
    )
}

fn emit_discriminator(
    form: &DiscriminatorForm,
    val: &str,
    subs: &mut SubFunctionRegistry,
) -> String {
    let mut arms = String::new();
    for (tag, mapped) in &form.mapping {
        // Mapping values are inlined with the discriminator key admitted to
        // the strict scan; they are never lowered to sub-functions of their
        // own.
        let props = mapped.as_properties().map_or_else(
            || String::from("false"),
            |mapped_form| {
                emit_properties(mapped_form, "obj_val", Some(form.discriminator.as_str()), subs)
            },
        );
        arms.push_str(&format!(
            "            Some({tag}) => {props},\n",
            tag = lit(tag)
        ));
    }
    format!(
        "match ({val}) {{\n        obj_val @ serde_json::Value::Object(obj_map) => match obj_map.get({key}).and_then(serde_json::Value::as_str) {{\n{arms}            _ => false,\n        }},\n        _ => false,\n    }}",
        key = lit(&form.discriminator)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder;

    #[test]
    fn scalar_validate_source_shape() {
        let source = compile_validate(&builder::int8());
        assert!(source.contains("pub fn validate(input: &serde_json::Value) -> bool"));
        assert!(source.contains("n >= -128i128 && n <= 127i128"));
    }

    #[test]
    fn recursive_schema_emits_self_calling_sub_function() {
        let schema = builder::recursive("CodegenValidateNode", |node| {
            builder::object([("children", builder::elements(node))])
        });
        let source = compile_validate(&schema);
        assert!(source.contains("fn validate_codegen_validate_node("));
        assert!(source.contains("validate_codegen_validate_node(item, depth + 1)"));
        assert!(source.contains("if depth > 500"));
    }

    #[test]
    fn strict_object_emits_key_scan() {
        let schema = builder::strict_object([("id", builder::string())]);
        let source = compile_validate(&schema);
        assert!(source.contains(r#"matches!(k.as_str(), "id")"#));
    }
}
