//! Parse/coerce pass: emits `pub fn parse(...)` or `pub fn coerce(...)`.
//!
//! The emitted function takes the root input and an error accumulator and
//! returns `Option<jsondef::Value>`, mirroring the interpreted decode
//! contract: errors are pushed in encounter order, container walks continue
//! past failed children, and the caller judges success by the error list.
//!
//! Two things distinguish the emitted text from a plain transcription of the
//! interpreter. Instance/schema paths are baked in as string literals
//! wherever they are statically known (runtime path strings are only built
//! for array/record indices and sub-function re-entry). And subtrees that
//! need no representation change (no timestamp or 64-bit integer anywhere
//! below) compile to a checked structural copy instead of a field-by-field
//! rebuild.

use crate::bounds;
use crate::codegen::analysis::input_requires_transformation;
use crate::codegen::{lit, sub_function_key, SubFunctionRegistry, GENERATED_MAX_DEPTH};
use crate::schema::{registry, DiscriminatorForm, Form, PropertiesForm, ScalarType, Schema};

/// Generate the strict parse function source for `schema`.
#[must_use]
pub fn compile_parse(schema: &Schema) -> String {
    compile(schema, false)
}

/// Generate the coercing parse function source for `schema`.
#[must_use]
pub fn compile_coerce(schema: &Schema) -> String {
    compile(schema, true)
}

struct Ctx {
    subs: SubFunctionRegistry,
    checks: SubFunctionRegistry,
    coerce: bool,
}

/// Instance-path carrier: a compile-time literal, or the runtime `__p`
/// variable bound by the nearest loop or sub-function entry.
#[derive(Clone)]
enum IPath {
    Lit(String),
    Var,
}

impl IPath {
    /// Expression usable where `Into<String>` is expected.
    fn expr(&self) -> String {
        match self {
            Self::Lit(path) => lit(path),
            Self::Var => String::from("__p.clone()"),
        }
    }

    /// Expression usable where `&str` is expected.
    fn str_expr(&self) -> String {
        match self {
            Self::Lit(path) => lit(path),
            Self::Var => String::from("&__p"),
        }
    }

    /// Descend a static key: literal paths stay literal, runtime paths emit
    /// a shadowing rebind. Returns `(binding_statement, child_path)`.
    fn child(&self, segment: &str) -> (String, IPath) {
        match self {
            Self::Lit(path) => (String::new(), Self::Lit(format!("{path}/{segment}"))),
            Self::Var => (
                format!("let __p = format!(\"{{}}/{{}}\", __p, {});\n", lit(segment)),
                Self::Var,
            ),
        }
    }

    /// Binding statement for a loop variable segment (`i` or `k`).
    fn index_binding(&self, index_var: &str) -> String {
        match self {
            Self::Lit(path) => format!(
                "let __p = format!(\"{{}}/{{}}\", {}, {index_var});\n",
                lit(path)
            ),
            Self::Var => format!("let __p = format!(\"{{}}/{{}}\", __p, {index_var});\n"),
        }
    }
}

const PREAMBLE: &str = r#"#[allow(dead_code)]
fn __type_name(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
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

#[allow(dead_code)]
fn __int(v: &serde_json::Value, allow_text: bool) -> Option<i128> {
    match v {
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(i as i128);
            }
            if let Some(u) = n.as_u64() {
                return Some(u as i128);
            }
            let f = n.as_f64()?;
            if f.is_finite() && f.fract() == 0.0 {
                Some(f as i128)
            } else {
                None
            }
        }
        serde_json::Value::String(s) if allow_text => __int_text(s),
        _ => None,
    }
}

#[allow(dead_code)]
fn __epoch_millis(n: &serde_json::Number) -> Option<chrono::DateTime<chrono::FixedOffset>> {
    use chrono::TimeZone;
    let millis = n.as_i64().or_else(|| {
        n.as_f64()
            .filter(|f| f.is_finite() && f.fract() == 0.0)
            .map(|f| f as i64)
    })?;
    chrono::Utc
        .timestamp_millis_opt(millis)
        .single()
        .map(|ts| ts.fixed_offset())
}
"#;

fn compile(schema: &Schema, coerce: bool) -> String {
    let entry = if coerce { "coerce" } else { "parse" };
    let mut ctx = Ctx {
        subs: SubFunctionRegistry::new(entry),
        checks: SubFunctionRegistry::new("check"),
        coerce,
    };
    let prelude = emit_root_prelude(schema);
    let expr = emit_node(schema, "input", &IPath::Lit(String::new()), "", &mut ctx, true);
    format!(
        "{PREAMBLE}\n#[allow(unused_variables, unused_mut, clippy::all)]\npub fn {entry}(input: &serde_json::Value, errors: &mut Vec<jsondef::ValueError>) -> Option<jsondef::Value> {{\n    let depth = 0usize;\n{prelude}    {expr}\n}}\n\n{subs}{checks}",
        subs = ctx.subs.render(),
        checks = ctx.checks.render(),
    )
}

/// Root special-casing: container forms accept a JSON document inside a
/// string, the empty form falls back to the raw string, and nullable
/// scalars accept the `"null"` sentinel. Scalar bare-text forms are handled
/// by the scalar emitters' text arms (enabled at the root).
fn emit_root_prelude(schema: &Schema) -> String {
    let mut prelude = String::new();
    match effective_form(schema) {
        RootForm::Container => {
            prelude.push_str(
                "    let __parsed_root;\n    let input = match input {\n        serde_json::Value::String(s) => match serde_json::from_str::<serde_json::Value>(s) {\n            Ok(v) => {\n                __parsed_root = v;\n                &__parsed_root\n            }\n            Err(e) => {\n                errors.push(jsondef::ValueError::new(format!(\"invalid JSON: {}\", e), String::new(), String::new()));\n                return None;\n            }\n        },\n        other => other,\n    };\n",
            );
        }
        RootForm::Any => {
            prelude.push_str(
                "    if let serde_json::Value::String(s) = input {\n        if let Ok(v) = serde_json::from_str::<serde_json::Value>(s) {\n            return Some(jsondef::Value::from_json(&v));\n        }\n        return Some(jsondef::Value::String(s.clone()));\n    }\n",
            );
        }
        RootForm::Scalar => {
            if schema.is_nullable() {
                prelude.push_str(
                    "    if matches!(input, serde_json::Value::String(s) if s == \"null\") {\n        return Some(jsondef::Value::Null);\n    }\n",
                );
            }
        }
    }
    prelude
}

enum RootForm {
    Container,
    Any,
    Scalar,
}

fn effective_form(schema: &Schema) -> RootForm {
    let mut current = schema.clone();
    for _ in 0..8 {
        match current.form() {
            Form::Elements(_) | Form::Properties(_) | Form::Values(_) | Form::Discriminator(_) => {
                return RootForm::Container;
            }
            Form::Empty => return RootForm::Any,
            Form::Type(_) | Form::Enum(_) => return RootForm::Scalar,
            Form::Ref(name) => match registry::resolve(name) {
                Some(target) => current = (*target).clone(),
                None => return RootForm::Scalar,
            },
        }
    }
    RootForm::Scalar
}

/// Format-string literal for the enum mismatch message, with the literal
/// values escaped for embedding inside a generated `format!` call.
fn enum_message_format(values: &[String]) -> String {
    let listing = values
        .join(", ")
        .replace('{', "{{")
        .replace('}', "}}");
    lit(&format!("expected one of [{listing}], found {{}}"))
}

fn push_err(message_expr: &str, ip: &IPath, sp: &str) -> String {
    format!(
        "errors.push(jsondef::ValueError::new({message_expr}, {}, {}));",
        ip.expr(),
        lit(sp)
    )
}

/// Emit an `Option<jsondef::Value>` expression decoding `val`.
fn emit_node(
    schema: &Schema,
    val: &str,
    ip: &IPath,
    sp: &str,
    ctx: &mut Ctx,
    root: bool,
) -> String {
    // Pass-through: nothing below here changes representation, so check the
    // subtree and copy the input structurally instead of rebuilding it.
    if !root && !ctx.coerce && !input_requires_transformation(schema, 1) {
        let checks = emit_check_node(schema, val, ip, sp, ctx);
        // Parenthesized so the block can sit in scrutinee position.
        return format!(
            "({{\n        let __before = errors.len();\n        {checks}\n        if errors.len() == __before {{ Some(jsondef::Value::from_json({val})) }} else {{ None }}\n    }})"
        );
    }
    if let Some(key) = sub_function_key(schema) {
        let key = key.to_owned();
        let (name, needs_body) = ctx.subs.get_or_declare(&key);
        if needs_body {
            // Ref targets are inlined here rather than routed back through
            // emit_node: the target usually carries the same id, and
            // re-extracting it would generate a function whose body is only
            // a call to itself.
            let body = match schema.form() {
                Form::Ref(target_name) => registry::resolve(target_name).map(|target| {
                    emit_node_inline(&target, "input", &IPath::Var, sp, ctx, false)
                }),
                _ => Some(emit_node_inline(schema, "input", &IPath::Var, sp, ctx, false)),
            };
            let body_expr = body.unwrap_or_else(|| {
                let err = push_err(
                    &lit(&format!("unresolved schema reference {key:?}")),
                    &IPath::Var,
                    sp,
                );
                format!("{{\n    {err}\n    None\n}}")
            });
            let depth_err = push_err(
                &lit(&format!(
                    "maximum depth of {GENERATED_MAX_DEPTH} exceeded; schema may be infinitely recursive"
                )),
                &IPath::Var,
                sp,
            );
            ctx.subs.define(
                &name,
                format!(
                    "#[allow(unused_variables, unused_mut, clippy::all)]\nfn {name}(input: &serde_json::Value, errors: &mut Vec<jsondef::ValueError>, instance_path: &str, depth: usize) -> Option<jsondef::Value> {{\n    let __p = instance_path.to_string();\n    if depth > {GENERATED_MAX_DEPTH} {{\n        {depth_err}\n        return None;\n    }}\n    {body_expr}\n}}\n"
                ),
            );
        }
        return format!("{name}({val}, errors, {}, depth + 1)", ip.str_expr());
    }
    emit_node_inline(schema, val, ip, sp, ctx, root)
}

fn emit_node_inline(
    schema: &Schema,
    val: &str,
    ip: &IPath,
    sp: &str,
    ctx: &mut Ctx,
    root: bool,
) -> String {
    let allow_text = ctx.coerce || root;
    let base = match schema.form() {
        Form::Empty => format!("Some(jsondef::Value::from_json({val}))"),
        Form::Type(ty) => emit_scalar(*ty, val, ip, sp, allow_text, ctx.coerce),
        Form::Enum(values) => emit_enum(values, val, ip, sp),
        Form::Elements(inner) => emit_elements(inner, val, ip, sp, ctx),
        Form::Values(inner) => emit_values(inner, val, ip, sp, ctx),
        Form::Properties(form) => emit_properties(form, val, ip, sp, None, ctx),
        Form::Discriminator(form) => emit_discriminator(form, val, ip, sp, ctx),
        Form::Ref(_) => {
            // Refs are always lowered by emit_node; reaching here means the
            // node was built outside the builder surface. Fail closed.
            let err = push_err(&lit("unresolved schema reference"), ip, sp);
            format!("{{\n        {err}\n        None\n    }}")
        }
    };
    if schema.is_nullable() {
        format!("if ({val}).is_null() {{ Some(jsondef::Value::Null) }} else {{ {base} }}")
    } else {
        base
    }
}

fn emit_scalar(
    ty: ScalarType,
    val: &str,
    ip: &IPath,
    sp: &str,
    allow_text: bool,
    coerce: bool,
) -> String {
    let sp_type = format!("{sp}/type");
    let mismatch = push_err(
        &format!(
            "format!(\"expected {}, found {{}}\", __type_name(other))",
            ty.name()
        ),
        ip,
        &sp_type,
    );
    let text_failure = if coerce {
        push_err(
            &lit(&format!("unable to coerce string to {}", ty.name())),
            ip,
            &sp_type,
        )
    } else {
        push_err(
            &format!("format!(\"unable to parse {} from {{:?}}\", s)", ty.name()),
            ip,
            &sp_type,
        )
    };
    match ty {
        ScalarType::Boolean => {
            let text_arm = if allow_text {
                format!(
                    "        serde_json::Value::String(s) => match s.as_str() {{\n            \"true\" | \"TRUE\" | \"1\" => Some(jsondef::Value::Bool(true)),\n            \"false\" | \"FALSE\" | \"0\" => Some(jsondef::Value::Bool(false)),\n            _ => {{\n                {text_failure}\n                None\n            }}\n        }},\n        serde_json::Value::Number(n) => match n.as_i64() {{\n            Some(1) => Some(jsondef::Value::Bool(true)),\n            Some(0) => Some(jsondef::Value::Bool(false)),\n            _ => {{\n                {fail}\n                None\n            }}\n        }},\n",
                    fail = push_err(&lit("unable to coerce number to boolean"), ip, &sp_type)
                )
            } else {
                String::new()
            };
            format!(
                "match ({val}) {{\n        serde_json::Value::Bool(b) => Some(jsondef::Value::Bool(*b)),\n{text_arm}        other => {{\n            {mismatch}\n            None\n        }}\n    }}"
            )
        }
        ScalarType::String => format!(
            "match ({val}) {{\n        serde_json::Value::String(s) => Some(jsondef::Value::String(s.clone())),\n        other => {{\n            {mismatch}\n            None\n        }}\n    }}"
        ),
        ScalarType::Timestamp => {
            let ts_failure = push_err(
                &String::from("format!(\"unable to parse timestamp from {:?}\", s)"),
                ip,
                &sp_type,
            );
            let epoch_arm = if coerce {
                format!(
                    "        serde_json::Value::Number(n) => match __epoch_millis(n) {{\n            Some(ts) => Some(jsondef::Value::Timestamp(ts)),\n            None => {{\n                {fail}\n                None\n            }}\n        }},\n",
                    fail = push_err(&lit("unable to coerce number to timestamp"), ip, &sp_type)
                )
            } else {
                String::new()
            };
            format!(
                "match ({val}) {{\n        serde_json::Value::String(s) => match chrono::DateTime::parse_from_rfc3339(s) {{\n            Ok(ts) => Some(jsondef::Value::Timestamp(ts)),\n            Err(_) => {{\n                {ts_failure}\n                None\n            }}\n        }},\n{epoch_arm}        other => {{\n            {mismatch}\n            None\n        }}\n    }}"
            )
        }
        ScalarType::Float32 | ScalarType::Float64 => {
            let ctor = if ty == ScalarType::Float32 {
                "jsondef::Value::Number(jsondef::Number::F32(f as f32))"
            } else {
                "jsondef::Value::Number(jsondef::Number::F64(f))"
            };
            let text_arm = if allow_text {
                format!(
                    "        serde_json::Value::String(s) => match s.parse::<f64>() {{\n            Ok(f) if f.is_finite() => Some({ctor}),\n            _ => {{\n                {text_failure}\n                None\n            }}\n        }},\n"
                )
            } else {
                String::new()
            };
            format!(
                "match ({val}) {{\n        serde_json::Value::Number(n) => {{\n            let f = n.as_f64().unwrap_or(f64::NAN);\n            if f.is_nan() {{\n                {nan}\n                None\n            }} else {{\n                Some({ctor})\n            }}\n        }}\n{text_arm}        other => {{\n            {mismatch}\n            None\n        }}\n    }}",
                nan = push_err(&format!("format!(\"expected {}, found NaN\")", ty.name()), ip, &sp_type)
            )
        }
        _ => emit_integer(ty, val, ip, sp, allow_text),
    }
}

fn emit_integer(ty: ScalarType, val: &str, ip: &IPath, sp: &str, allow_text: bool) -> String {
    let sp_type = format!("{sp}/type");
    // 64-bit integers accept string representations at every depth in both
    // modes; the bounded widths only under coercion or at the text root.
    let allow_text = allow_text || matches!(ty, ScalarType::Int64 | ScalarType::Uint64);
    let Some(range) = bounds::int_range(ty) else {
        return String::from("None");
    };
    let (variant, cast) = match ty {
        ScalarType::Int8 => ("I8", "i8"),
        ScalarType::Uint8 => ("U8", "u8"),
        ScalarType::Int16 => ("I16", "i16"),
        ScalarType::Uint16 => ("U16", "u16"),
        ScalarType::Int32 => ("I32", "i32"),
        ScalarType::Uint32 => ("U32", "u32"),
        ScalarType::Int64 => ("I64", "i64"),
        _ => ("U64", "u64"),
    };
    let out_of_range = push_err(
        &format!("format!(\"{{}} is out of range for {}\", n)", ty.name()),
        ip,
        &sp_type,
    );
    let mismatch = push_err(
        &format!(
            "format!(\"expected {}, found {{}}\", __type_name({val}))",
            ty.name()
        ),
        ip,
        &sp_type,
    );
    format!(
        "match __int({val}, {allow_text}) {{\n        Some(n) if n >= {min}i128 && n <= {max}i128 => Some(jsondef::Value::Number(jsondef::Number::{variant}(n as {cast}))),\n        Some(n) => {{\n            {out_of_range}\n            None\n        }}\n        None => {{\n            {mismatch}\n            None\n        }}\n    }}",
        min = range.min,
        max = range.max,
    )
}

fn emit_enum(values: &[String], val: &str, ip: &IPath, sp: &str) -> String {
    let pattern = values.iter().map(|v| lit(v)).collect::<Vec<_>>().join(" | ");
    let failure = push_err(
        &format!(
            "format!({}, __type_name({val}))",
            enum_message_format(values)
        ),
        ip,
        &format!("{sp}/enum"),
    );
    format!(
        "match ({val}).as_str() {{\n        Some(s @ ({pattern})) => Some(jsondef::Value::String(s.to_string())),\n        _ => {{\n            {failure}\n            None\n        }}\n    }}"
    )
}

fn emit_elements(inner: &Schema, val: &str, ip: &IPath, sp: &str, ctx: &mut Ctx) -> String {
    let binding = ip.index_binding("i");
    let child_sp = format!("{sp}/elements");
    let inner_expr = emit_node(inner, "item", &IPath::Var, &child_sp, ctx, false);
    let failure = push_err(
        &format!("format!(\"expected array, found {{}}\", __type_name({val}))"),
        ip,
        sp,
    );
    format!(
        "match ({val}).as_array() {{\n        Some(items) => {{\n            let __before = errors.len();\n            let mut out = Vec::with_capacity(items.len());\n            for (i, item) in items.iter().enumerate() {{\n                {binding}                if let Some(decoded) = {inner_expr} {{\n                    out.push(decoded);\n                }}\n            }}\n            if errors.len() > __before {{ None }} else {{ Some(jsondef::Value::Array(out)) }}\n        }}\n        None => {{\n            {failure}\n            None\n        }}\n    }}"
    )
}

fn emit_values(inner: &Schema, val: &str, ip: &IPath, sp: &str, ctx: &mut Ctx) -> String {
    let binding = ip.index_binding("k");
    let child_sp = format!("{sp}/values");
    let inner_expr = emit_node(inner, "item", &IPath::Var, &child_sp, ctx, false);
    let failure = push_err(
        &format!("format!(\"expected object, found {{}}\", __type_name({val}))"),
        ip,
        sp,
    );
    format!(
        "match ({val}).as_object() {{\n        Some(entries) => {{\n            let __before = errors.len();\n            let mut out = jsondef::Map::new();\n            for (k, item) in entries {{\n                {binding}                if let Some(decoded) = {inner_expr} {{\n                    out.insert(k.clone(), decoded);\n                }}\n            }}\n            if errors.len() > __before {{ None }} else {{ Some(jsondef::Value::Object(out)) }}\n        }}\n        None => {{\n            {failure}\n            None\n        }}\n    }}"
    )
}

fn emit_properties(
    form: &PropertiesForm,
    val: &str,
    ip: &IPath,
    sp: &str,
    discriminator: Option<(&str, &str)>,
    ctx: &mut Ctx,
) -> String {
    let mut body = String::new();
    body.push_str("            let __before = errors.len();\n");
    body.push_str("            let mut out = jsondef::Map::new();\n");
    if let Some((key, tag)) = discriminator {
        body.push_str(&format!(
            "            out.insert({}.to_string(), jsondef::Value::String({}.to_string()));\n",
            lit(key),
            lit(tag)
        ));
    }
    if form.strict {
        body.push_str(&emit_strict_scan(form, ip, sp, discriminator.map(|(k, _)| k)));
    }
    for (key, sub) in &form.properties {
        let (binding, child_ip) = ip.child(key);
        let child_sp = format!("{sp}/properties/{key}");
        let inner = emit_node(sub, "v", &child_ip, &child_sp, ctx, false);
        let missing = push_err(
            &lit(&format!("missing required property {key:?}")),
            &child_ip,
            &child_sp,
        );
        body.push_str(&format!(
            "            match obj.get({key_lit}) {{\n                Some(v) => {{\n                    {binding}if let Some(decoded) = {inner} {{\n                        out.insert({key_lit}.to_string(), decoded);\n                    }}\n                }}\n                None => {{\n                    {binding}{missing}\n                }}\n            }}\n",
            key_lit = lit(key),
        ));
    }
    for (key, sub) in &form.optional_properties {
        let (binding, child_ip) = ip.child(key);
        let child_sp = format!("{sp}/optionalProperties/{key}");
        let inner = emit_node(sub, "v", &child_ip, &child_sp, ctx, false);
        body.push_str(&format!(
            "            if let Some(v) = obj.get({key_lit}) {{\n                {binding}if let Some(decoded) = {inner} {{\n                    out.insert({key_lit}.to_string(), decoded);\n                }}\n            }}\n",
            key_lit = lit(key),
        ));
    }
    let failure = push_err(
        &format!("format!(\"expected object, found {{}}\", __type_name({val}))"),
        ip,
        sp,
    );
    format!(
        "match ({val}).as_object() {{\n        Some(obj) => {{\n{body}            if errors.len() > __before {{ None }} else {{ Some(jsondef::Value::Object(out)) }}\n        }}\n        None => {{\n            {failure}\n            None\n        }}\n    }}"
    )
}

fn emit_strict_scan(
    form: &PropertiesForm,
    ip: &IPath,
    sp: &str,
    discriminator: Option<&str>,
) -> String {
    let mut allowed: Vec<String> = form.declared_keys().map(lit).collect();
    if let Some(key) = discriminator {
        allowed.push(lit(key));
    }
    let condition = if allowed.is_empty() {
        String::from("true")
    } else {
        format!("!matches!(k.as_str(), {})", allowed.join(" | "))
    };
    let binding = ip.index_binding("k");
    let violation = push_err(
        &String::from("format!(\"key {:?} is not allowed\", k)"),
        &IPath::Var,
        sp,
    );
    format!(
        "            for k in obj.keys() {{\n                if {condition} {{\n                    {binding}                    {violation}\n                }}\n            }}\n"
    )
}

fn emit_discriminator(
    form: &DiscriminatorForm,
    val: &str,
    ip: &IPath,
    sp: &str,
    ctx: &mut Ctx,
) -> String {
    let key = form.discriminator.as_str();
    let (tag_binding, tag_ip) = ip.child(key);
    let sp_disc = format!("{sp}/discriminator");
    let missing = push_err(
        &lit(&format!("missing discriminator property {key:?}")),
        &tag_ip,
        &sp_disc,
    );
    let not_string = push_err(
        &lit(&format!("discriminator property {key:?} must be a string")),
        &tag_ip,
        &sp_disc,
    );
    let unknown = push_err(
        &String::from("format!(\"{:?} is not a valid discriminator value\", other_tag)"),
        &tag_ip,
        &format!("{sp}/mapping"),
    );
    let mut arms = String::new();
    for (tag, mapped) in &form.mapping {
        let child_sp = format!("{sp}/mapping/{tag}");
        let props = mapped.as_properties().map_or_else(
            || String::from("None"),
            |mapped_form| emit_properties(mapped_form, val, ip, &child_sp, Some((key, tag)), ctx),
        );
        arms.push_str(&format!(
            "                Some({tag_lit}) => {props},\n",
            tag_lit = lit(tag)
        ));
    }
    let failure = push_err(
        &format!("format!(\"expected object, found {{}}\", __type_name({val}))"),
        ip,
        sp,
    );
    format!(
        "match ({val}).as_object() {{\n        Some(obj) => match obj.get({key_lit}) {{\n            None => {{\n                {tag_binding}{missing}\n                None\n            }}\n            Some(tag_val) => match tag_val.as_str() {{\n{arms}                Some(other_tag) => {{\n                    {tag_binding}{unknown}\n                    None\n                }}\n                None => {{\n                    {tag_binding}{not_string}\n                    None\n                }}\n            }},\n        }},\n        None => {{\n            {failure}\n            None\n        }}\n    }}",
        key_lit = lit(key),
    )
}

// =============================================================================
// Check-only emission (pass-through subtrees)
// =============================================================================

/// Emit statements that push the same errors the construct emitters would,
/// without building a value. Only reachable in strict mode for subtrees the
/// analysis marked non-transforming, so timestamp and 64-bit arms never
/// appear here.
fn emit_check_node(schema: &Schema, val: &str, ip: &IPath, sp: &str, ctx: &mut Ctx) -> String {
    if let Some(key) = sub_function_key(schema) {
        let key = key.to_owned();
        let (name, needs_body) = ctx.checks.get_or_declare(&key);
        if needs_body {
            let body = match schema.form() {
                Form::Ref(target_name) => registry::resolve(target_name)
                    .map(|target| emit_check_inline(&target, "input", &IPath::Var, sp, ctx)),
                _ => Some(emit_check_inline(schema, "input", &IPath::Var, sp, ctx)),
            };
            let body_stmts = body.unwrap_or_else(|| {
                push_err(
                    &lit(&format!("unresolved schema reference {key:?}")),
                    &IPath::Var,
                    sp,
                )
            });
            let depth_err = push_err(
                &lit(&format!(
                    "maximum depth of {GENERATED_MAX_DEPTH} exceeded; schema may be infinitely recursive"
                )),
                &IPath::Var,
                sp,
            );
            ctx.checks.define(
                &name,
                format!(
                    "#[allow(unused_variables, unused_mut, clippy::all)]\nfn {name}(input: &serde_json::Value, errors: &mut Vec<jsondef::ValueError>, instance_path: &str, depth: usize) {{\n    let __p = instance_path.to_string();\n    if depth > {GENERATED_MAX_DEPTH} {{\n        {depth_err}\n        return;\n    }}\n    {body_stmts}\n}}\n"
                ),
            );
        }
        return format!("{name}({val}, errors, {}, depth + 1);", ip.str_expr());
    }
    emit_check_inline(schema, val, ip, sp, ctx)
}

fn emit_check_inline(schema: &Schema, val: &str, ip: &IPath, sp: &str, ctx: &mut Ctx) -> String {
    let base = match schema.form() {
        Form::Empty => String::new(),
        Form::Type(ty) => emit_check_scalar(*ty, val, ip, sp),
        Form::Enum(values) => {
            let pattern = values.iter().map(|v| lit(v)).collect::<Vec<_>>().join(" | ");
            let failure = push_err(
                &format!(
                    "format!({}, __type_name({val}))",
                    enum_message_format(values)
                ),
                ip,
                &format!("{sp}/enum"),
            );
            format!(
                "if !matches!(({val}).as_str(), Some({pattern})) {{\n            {failure}\n        }}"
            )
        }
        Form::Elements(inner) => {
            let binding = ip.index_binding("i");
            let inner_stmts =
                emit_check_node(inner, "item", &IPath::Var, &format!("{sp}/elements"), ctx);
            let failure = push_err(
                &format!("format!(\"expected array, found {{}}\", __type_name({val}))"),
                ip,
                sp,
            );
            format!(
                "match ({val}).as_array() {{\n            Some(items) => {{\n                for (i, item) in items.iter().enumerate() {{\n                    {binding}                    {inner_stmts}\n                }}\n            }}\n            None => {{\n                {failure}\n            }}\n        }}"
            )
        }
        Form::Values(inner) => {
            let binding = ip.index_binding("k");
            let inner_stmts =
                emit_check_node(inner, "item", &IPath::Var, &format!("{sp}/values"), ctx);
            let failure = push_err(
                &format!("format!(\"expected object, found {{}}\", __type_name({val}))"),
                ip,
                sp,
            );
            format!(
                "match ({val}).as_object() {{\n            Some(entries) => {{\n                for (k, item) in entries {{\n                    {binding}                    {inner_stmts}\n                }}\n            }}\n            None => {{\n                {failure}\n            }}\n        }}"
            )
        }
        Form::Properties(form) => emit_check_properties(form, val, ip, sp, None, ctx),
        Form::Discriminator(form) => emit_check_discriminator(form, val, ip, sp, ctx),
        Form::Ref(_) => push_err(&lit("unresolved schema reference"), ip, sp),
    };
    if schema.is_nullable() {
        format!("if !({val}).is_null() {{\n            {base}\n        }}")
    } else {
        base
    }
}

fn emit_check_scalar(ty: ScalarType, val: &str, ip: &IPath, sp: &str) -> String {
    let sp_type = format!("{sp}/type");
    let mismatch = push_err(
        &format!(
            "format!(\"expected {}, found {{}}\", __type_name({val}))",
            ty.name()
        ),
        ip,
        &sp_type,
    );
    match ty {
        ScalarType::Boolean => {
            format!("if !({val}).is_boolean() {{\n            {mismatch}\n        }}")
        }
        ScalarType::String => {
            format!("if !({val}).is_string() {{\n            {mismatch}\n        }}")
        }
        ScalarType::Float32 | ScalarType::Float64 => {
            format!("if !({val}).is_number() {{\n            {mismatch}\n        }}")
        }
        // Timestamps and 64-bit integers never appear under a pass-through
        // subtree; fall back to the same check the integer widths use.
        _ => {
            let Some(range) = bounds::int_range(ty) else {
                return mismatch;
            };
            let allow_text = matches!(ty, ScalarType::Int64 | ScalarType::Uint64);
            let out_of_range = push_err(
                &format!("format!(\"{{}} is out of range for {}\", n)", ty.name()),
                ip,
                &sp_type,
            );
            format!(
                "match __int({val}, {allow_text}) {{\n            Some(n) if n >= {min}i128 && n <= {max}i128 => {{}}\n            Some(n) => {{\n                {out_of_range}\n            }}\n            None => {{\n                {mismatch}\n            }}\n        }}",
                min = range.min,
                max = range.max,
            )
        }
    }
}

fn emit_check_properties(
    form: &PropertiesForm,
    val: &str,
    ip: &IPath,
    sp: &str,
    discriminator: Option<&str>,
    ctx: &mut Ctx,
) -> String {
    let mut body = String::new();
    if form.strict {
        body.push_str(&emit_strict_scan(form, ip, sp, discriminator));
    }
    for (key, sub) in &form.properties {
        let (binding, child_ip) = ip.child(key);
        let child_sp = format!("{sp}/properties/{key}");
        let inner = emit_check_node(sub, "v", &child_ip, &child_sp, ctx);
        let missing = push_err(
            &lit(&format!("missing required property {key:?}")),
            &child_ip,
            &child_sp,
        );
        body.push_str(&format!(
            "            match obj.get({key_lit}) {{\n                Some(v) => {{\n                    {binding}{inner}\n                }}\n                None => {{\n                    {binding}{missing}\n                }}\n            }}\n",
            key_lit = lit(key),
        ));
    }
    for (key, sub) in &form.optional_properties {
        let (binding, child_ip) = ip.child(key);
        let child_sp = format!("{sp}/optionalProperties/{key}");
        let inner = emit_check_node(sub, "v", &child_ip, &child_sp, ctx);
        body.push_str(&format!(
            "            if let Some(v) = obj.get({key_lit}) {{\n                {binding}{inner}\n            }}\n",
            key_lit = lit(key),
        ));
    }
    let failure = push_err(
        &format!("format!(\"expected object, found {{}}\", __type_name({val}))"),
        ip,
        sp,
    );
    format!(
        "match ({val}).as_object() {{\n        Some(obj) => {{\n{body}        }}\n        None => {{\n            {failure}\n        }}\n    }}"
    )
}

fn emit_check_discriminator(
    form: &DiscriminatorForm,
    val: &str,
    ip: &IPath,
    sp: &str,
    ctx: &mut Ctx,
) -> String {
    let key = form.discriminator.as_str();
    let (tag_binding, tag_ip) = ip.child(key);
    let sp_disc = format!("{sp}/discriminator");
    let missing = push_err(
        &lit(&format!("missing discriminator property {key:?}")),
        &tag_ip,
        &sp_disc,
    );
    let not_string = push_err(
        &lit(&format!("discriminator property {key:?} must be a string")),
        &tag_ip,
        &sp_disc,
    );
    let unknown = push_err(
        &String::from("format!(\"{:?} is not a valid discriminator value\", other_tag)"),
        &tag_ip,
        &format!("{sp}/mapping"),
    );
    let mut arms = String::new();
    for (tag, mapped) in &form.mapping {
        let child_sp = format!("{sp}/mapping/{tag}");
        let props = mapped.as_properties().map_or_else(
            String::new,
            |mapped_form| emit_check_properties(mapped_form, val, ip, &child_sp, Some(key), ctx),
        );
        arms.push_str(&format!(
            "                Some({tag_lit}) => {{\n                    {props}\n                }}\n",
            tag_lit = lit(tag)
        ));
    }
    let failure = push_err(
        &format!("format!(\"expected object, found {{}}\", __type_name({val}))"),
        ip,
        sp,
    );
    format!(
        "match ({val}).as_object() {{\n        Some(obj) => match obj.get({key_lit}) {{\n            None => {{\n                {tag_binding}{missing}\n            }}\n            Some(tag_val) => match tag_val.as_str() {{\n{arms}                Some(other_tag) => {{\n                    {tag_binding}{unknown}\n                }}\n                None => {{\n                    {tag_binding}{not_string}\n                }}\n            }},\n        }},\n        None => {{\n            {failure}\n        }}\n    }}",
        key_lit = lit(key),
    )
}
