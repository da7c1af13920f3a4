//! Interpreted decode and coerce.
//!
//! One walk serves both operations behind [`Mode`]: coercion runs the
//! string/number conversions at every depth, strict decoding only applies
//! them where the contract says (64-bit integers accept string
//! representations everywhere; everything else must already be the right
//! JSON type). Failures accumulate in the context and the walk keeps going
//! through remaining siblings so one pass reports every bad element.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value as Json;

use crate::bounds;
use crate::error::{TraversalContext, ValidationFailure};
use crate::options::Options;
use crate::schema::{registry, DiscriminatorForm, Form, PropertiesForm, ScalarType, Schema};
use crate::value::{Map, Number, Value};

/// Decode strictness.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Types must already match (modulo the 64-bit string rule).
    Strict,
    /// Convert first: `"123"` -> 123, `"TRUE"`/`1` -> true, epoch -> date.
    Coerce,
}

/// Decode raw text: a JSON document for container forms, bare scalar text
/// for scalar forms.
pub fn decode_text(
    schema: &Schema,
    text: &str,
    mode: Mode,
    options: &Options,
) -> Result<Value, ValidationFailure> {
    let mut ctx = TraversalContext::new(options);
    let result = decode_root_text(schema, text, mode, &mut ctx);
    finish(result, ctx)
}

/// Decode an already-parsed JSON value.
pub fn decode_value(
    schema: &Schema,
    input: &Json,
    mode: Mode,
    options: &Options,
) -> Result<Value, ValidationFailure> {
    let mut ctx = TraversalContext::new(options);
    let result = decode_node(schema, input, mode, &mut ctx);
    finish(result, ctx)
}

fn finish(result: Option<Value>, ctx: TraversalContext) -> Result<Value, ValidationFailure> {
    if ctx.errors.is_empty() {
        if let Some(value) = result {
            return Ok(value);
        }
    }
    Err(ValidationFailure::from_errors(ctx.errors))
}

fn decode_root_text(
    schema: &Schema,
    text: &str,
    mode: Mode,
    ctx: &mut TraversalContext,
) -> Option<Value> {
    match schema.form() {
        Form::Elements(_) | Form::Properties(_) | Form::Values(_) | Form::Discriminator(_) => {
            match serde_json::from_str::<Json>(text) {
                Ok(parsed) => decode_node(schema, &parsed, mode, ctx),
                Err(e) => {
                    ctx.push_error(format!("invalid JSON: {e}"));
                    None
                }
            }
        }
        // Any: JSON when it parses, the raw text otherwise.
        Form::Empty => match serde_json::from_str::<Json>(text) {
            Ok(parsed) => Some(Value::from_json(&parsed)),
            Err(_) => Some(Value::String(text.to_owned())),
        },
        Form::Ref(name) => {
            if !ctx.descend() {
                return None;
            }
            let result = match registry::resolve(name) {
                Some(target) => decode_root_text(&target, text, mode, ctx),
                None => {
                    push_ref_error(ctx, name);
                    None
                }
            };
            ctx.ascend();
            result
        }
        Form::Type(_) | Form::Enum(_) => {
            if schema.is_nullable() && text == "null" {
                return Some(Value::Null);
            }
            decode_scalar_text(schema, text, ctx)
        }
    }
}

/// Bare-text scalar decoding used at the root. Conversions here are part of
/// the plain decode contract, not coercion: root input arrives as text.
fn decode_scalar_text(schema: &Schema, text: &str, ctx: &mut TraversalContext) -> Option<Value> {
    match schema.form() {
        Form::Type(ScalarType::Boolean) => match bool_from_text(text) {
            Some(b) => Some(Value::Bool(b)),
            None => {
                push_scalar_error(ctx, "type", format!("unable to parse boolean from {text:?}"));
                None
            }
        },
        Form::Type(ScalarType::String) => Some(Value::String(text.to_owned())),
        Form::Type(ScalarType::Timestamp) => match DateTime::parse_from_rfc3339(text) {
            Ok(ts) => Some(Value::Timestamp(ts)),
            Err(_) => {
                push_scalar_error(ctx, "type", format!("unable to parse timestamp from {text:?}"));
                None
            }
        },
        Form::Type(ty @ (ScalarType::Float32 | ScalarType::Float64)) => {
            match float_from_text(text) {
                Some(f) => Some(float_value(*ty, f)),
                None => {
                    push_scalar_error(ctx, "type", format!("unable to parse {ty} from {text:?}"));
                    None
                }
            }
        }
        Form::Type(ty) => match int_from_text(text) {
            Some(n) => finish_integer(*ty, n, ctx),
            None => {
                push_scalar_error(ctx, "type", format!("unable to parse {ty} from {text:?}"));
                None
            }
        },
        Form::Enum(values) => {
            if values.iter().any(|v| v == text) {
                Some(Value::String(text.to_owned()))
            } else {
                push_scalar_error(
                    ctx,
                    "enum",
                    format!("expected one of [{}], found {text:?}", values.join(", ")),
                );
                None
            }
        }
        _ => None,
    }
}

fn decode_node(
    schema: &Schema,
    input: &Json,
    mode: Mode,
    ctx: &mut TraversalContext,
) -> Option<Value> {
    if input.is_null() && schema.is_nullable() {
        return Some(Value::Null);
    }
    match schema.form() {
        Form::Empty => Some(Value::from_json(input)),
        Form::Type(ty) => decode_scalar(*ty, input, mode, ctx),
        Form::Enum(values) => match input.as_str() {
            Some(s) if values.iter().any(|v| v == s) => Some(Value::String(s.to_owned())),
            _ => {
                push_scalar_error_with_data(
                    ctx,
                    "enum",
                    format!(
                        "expected one of [{}], found {}",
                        values.join(", "),
                        json_type_name(input)
                    ),
                    input.clone(),
                );
                None
            }
        },
        Form::Elements(inner) => decode_elements(inner, input, mode, ctx),
        Form::Properties(form) => decode_properties(form, input, None, mode, ctx),
        Form::Values(inner) => decode_values(inner, input, mode, ctx),
        Form::Discriminator(form) => decode_discriminator(form, input, mode, ctx),
        Form::Ref(name) => {
            if !ctx.descend() {
                return None;
            }
            let result = match registry::resolve(name) {
                Some(target) => decode_node(&target, input, mode, ctx),
                None => {
                    push_ref_error(ctx, name);
                    None
                }
            };
            ctx.ascend();
            result
        }
    }
}

fn decode_elements(
    inner: &Schema,
    input: &Json,
    mode: Mode,
    ctx: &mut TraversalContext,
) -> Option<Value> {
    let Some(items) = input.as_array() else {
        push_type_error(ctx, "array", input);
        return None;
    };
    if !ctx.descend() {
        return None;
    }
    let before = ctx.errors.len();
    let mut out = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let segment = index.to_string();
        let saved = ctx.enter(&segment, "elements");
        if let Some(decoded) = decode_node(inner, item, mode, ctx) {
            out.push(decoded);
        }
        ctx.leave(saved);
    }
    ctx.ascend();
    if ctx.errors.len() > before {
        None
    } else {
        Some(Value::Array(out))
    }
}

fn decode_values(
    inner: &Schema,
    input: &Json,
    mode: Mode,
    ctx: &mut TraversalContext,
) -> Option<Value> {
    let Some(entries) = input.as_object() else {
        push_type_error(ctx, "object", input);
        return None;
    };
    if !ctx.descend() {
        return None;
    }
    let before = ctx.errors.len();
    let mut out = Map::new();
    for (key, value) in entries {
        let saved = ctx.enter(key, "values");
        if let Some(decoded) = decode_node(inner, value, mode, ctx) {
            out.insert(key.clone(), decoded);
        }
        ctx.leave(saved);
    }
    ctx.ascend();
    if ctx.errors.len() > before {
        None
    } else {
        Some(Value::Object(out))
    }
}

/// Decode an object against a properties form. When the form is a
/// discriminator mapping value, `discriminator` carries the tag key and tag
/// value: the key is exempt from the strict scan and the tag is written
/// straight into the result without a sub-schema.
fn decode_properties(
    form: &PropertiesForm,
    input: &Json,
    discriminator: Option<(&str, &str)>,
    mode: Mode,
    ctx: &mut TraversalContext,
) -> Option<Value> {
    let Some(obj) = input.as_object() else {
        push_type_error(ctx, "object", input);
        return None;
    };
    if !ctx.descend() {
        return None;
    }
    let before = ctx.errors.len();
    let mut out = Map::new();
    if let Some((key, tag)) = discriminator {
        out.insert(key.to_owned(), Value::String(tag.to_owned()));
    }

    // Unknown keys are reported before any property is decoded, so a strict
    // violation always precedes property errors for the same object.
    if form.strict {
        for key in obj.keys() {
            let allowed =
                form.declares(key) || discriminator.is_some_and(|(disc, _)| disc == key);
            if !allowed {
                let saved = ctx.enter(key, "");
                ctx.push_error(format!("key {key:?} is not allowed"));
                ctx.leave(saved);
            }
        }
    }

    for (key, sub) in &form.properties {
        let saved = ctx.enter(key, &format!("properties/{key}"));
        match obj.get(key) {
            Some(value) => {
                if let Some(decoded) = decode_node(sub, value, mode, ctx) {
                    out.insert(key.clone(), decoded);
                }
            }
            None => ctx.push_error(format!("missing required property {key:?}")),
        }
        ctx.leave(saved);
    }

    for (key, sub) in &form.optional_properties {
        // Absent optional keys are skipped entirely: no default, no error.
        if let Some(value) = obj.get(key) {
            let saved = ctx.enter(key, &format!("optionalProperties/{key}"));
            if let Some(decoded) = decode_node(sub, value, mode, ctx) {
                out.insert(key.clone(), decoded);
            }
            ctx.leave(saved);
        }
    }

    ctx.ascend();
    if ctx.errors.len() > before {
        None
    } else {
        Some(Value::Object(out))
    }
}

fn decode_discriminator(
    form: &DiscriminatorForm,
    input: &Json,
    mode: Mode,
    ctx: &mut TraversalContext,
) -> Option<Value> {
    let Some(obj) = input.as_object() else {
        push_type_error(ctx, "object", input);
        return None;
    };
    let key = form.discriminator.as_str();
    let Some(tag_value) = obj.get(key) else {
        let saved = ctx.enter(key, "discriminator");
        ctx.push_error(format!("missing discriminator property {key:?}"));
        ctx.leave(saved);
        return None;
    };
    let Some(tag) = tag_value.as_str() else {
        let saved = ctx.enter(key, "discriminator");
        ctx.push_error_with_data(
            format!("discriminator property {key:?} must be a string"),
            tag_value.clone(),
        );
        ctx.leave(saved);
        return None;
    };
    let Some(mapped) = form.mapping.get(tag) else {
        let saved = ctx.enter(key, "mapping");
        ctx.push_error_with_data(
            format!("{tag:?} is not a valid discriminator value"),
            tag_value.clone(),
        );
        ctx.leave(saved);
        return None;
    };
    let Some(mapped_form) = mapped.as_properties() else {
        // Unreachable by construction discipline; report rather than panic.
        ctx.push_error(format!("mapping for {tag:?} is not an object schema"));
        return None;
    };
    let saved = ctx.enter("", &format!("mapping/{tag}"));
    let result = decode_properties(mapped_form, input, Some((key, tag)), mode, ctx);
    ctx.leave(saved);
    result
}

pub(crate) fn decode_scalar(
    ty: ScalarType,
    input: &Json,
    mode: Mode,
    ctx: &mut TraversalContext,
) -> Option<Value> {
    match ty {
        ScalarType::Boolean => match input {
            Json::Bool(b) => Some(Value::Bool(*b)),
            Json::String(s) if mode == Mode::Coerce => match bool_from_text(s) {
                Some(b) => Some(Value::Bool(b)),
                None => {
                    push_coerce_error(ctx, ty, input);
                    None
                }
            },
            Json::Number(n) if mode == Mode::Coerce => match n.as_i64() {
                Some(0) => Some(Value::Bool(false)),
                Some(1) => Some(Value::Bool(true)),
                _ => {
                    push_coerce_error(ctx, ty, input);
                    None
                }
            },
            _ => {
                push_type_error(ctx, ty.name(), input);
                None
            }
        },
        ScalarType::String => match input {
            Json::String(s) => Some(Value::String(s.clone())),
            _ => {
                push_type_error(ctx, ty.name(), input);
                None
            }
        },
        ScalarType::Timestamp => match input {
            Json::String(s) => match DateTime::parse_from_rfc3339(s) {
                Ok(ts) => Some(Value::Timestamp(ts)),
                Err(_) => {
                    push_scalar_error_with_data(
                        ctx,
                        "type",
                        format!("unable to parse timestamp from {s:?}"),
                        input.clone(),
                    );
                    None
                }
            },
            Json::Number(n) if mode == Mode::Coerce => match epoch_millis(n) {
                Some(ts) => Some(Value::Timestamp(ts)),
                None => {
                    push_coerce_error(ctx, ty, input);
                    None
                }
            },
            _ => {
                push_type_error(ctx, ty.name(), input);
                None
            }
        },
        ScalarType::Float32 | ScalarType::Float64 => match input {
            Json::Number(n) => {
                // serde_json numbers are always finite, so no NaN check here;
                // NaN can only arrive through text parsing.
                n.as_f64().map(|f| float_value(ty, f))
            }
            Json::String(s) if mode == Mode::Coerce => match float_from_text(s) {
                Some(f) => Some(float_value(ty, f)),
                None => {
                    push_coerce_error(ctx, ty, input);
                    None
                }
            },
            _ => {
                push_type_error(ctx, ty.name(), input);
                None
            }
        },
        // The 64-bit types accept string representations at every depth in
        // both modes: JSON numbers cannot be trusted to carry them exactly
        // through other tooling.
        ScalarType::Int64 | ScalarType::Uint64 => match input {
            Json::Number(n) => match json_number_as_i128(n) {
                Some(i) => finish_integer(ty, i, ctx),
                None => {
                    push_scalar_error_with_data(
                        ctx,
                        "type",
                        format!("expected {ty}, found non-integer number"),
                        input.clone(),
                    );
                    None
                }
            },
            Json::String(s) => match int_from_text(s) {
                Some(i) => finish_integer(ty, i, ctx),
                None => {
                    push_scalar_error_with_data(
                        ctx,
                        "type",
                        format!("unable to parse {ty} from {s:?}"),
                        input.clone(),
                    );
                    None
                }
            },
            _ => {
                push_type_error(ctx, ty.name(), input);
                None
            }
        },
        _ => match input {
            Json::Number(n) => match json_number_as_i128(n) {
                Some(i) => finish_integer(ty, i, ctx),
                None => {
                    push_scalar_error_with_data(
                        ctx,
                        "type",
                        format!("expected {ty}, found non-integer number"),
                        input.clone(),
                    );
                    None
                }
            },
            Json::String(s) if mode == Mode::Coerce => match int_from_text(s) {
                Some(i) => finish_integer(ty, i, ctx),
                None => {
                    push_coerce_error(ctx, ty, input);
                    None
                }
            },
            _ => {
                push_type_error(ctx, ty.name(), input);
                None
            }
        },
    }
}

/// Bounds-check a widened integer and build the width-specific number.
fn finish_integer(ty: ScalarType, n: i128, ctx: &mut TraversalContext) -> Option<Value> {
    let in_range = bounds::int_range(ty).is_some_and(|range| range.contains(n));
    if !in_range {
        push_scalar_error(ctx, "type", format!("{n} is out of range for {ty}"));
        return None;
    }
    let number = match ty {
        ScalarType::Int8 => i8::try_from(n).ok().map(Number::I8),
        ScalarType::Uint8 => u8::try_from(n).ok().map(Number::U8),
        ScalarType::Int16 => i16::try_from(n).ok().map(Number::I16),
        ScalarType::Uint16 => u16::try_from(n).ok().map(Number::U16),
        ScalarType::Int32 => i32::try_from(n).ok().map(Number::I32),
        ScalarType::Uint32 => u32::try_from(n).ok().map(Number::U32),
        ScalarType::Int64 => i64::try_from(n).ok().map(Number::I64),
        ScalarType::Uint64 => u64::try_from(n).ok().map(Number::U64),
        _ => None,
    };
    number.map(Value::Number)
}

fn float_value(ty: ScalarType, f: f64) -> Value {
    #[allow(clippy::cast_possible_truncation)]
    match ty {
        ScalarType::Float32 => Value::Number(Number::F32(f as f32)),
        _ => Value::Number(Number::F64(f)),
    }
}

fn bool_from_text(text: &str) -> Option<bool> {
    match text {
        "true" | "TRUE" | "1" => Some(true),
        "false" | "FALSE" | "0" => Some(false),
        _ => None,
    }
}

fn float_from_text(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|f| f.is_finite())
}

pub(crate) fn int_from_text(text: &str) -> Option<i128> {
    if let Ok(i) = text.parse::<i128>() {
        return Some(i);
    }
    // Matches decimal forms like "12.0": numeric conversion, then the same
    // integer check every other path applies.
    let f = text.parse::<f64>().ok()?;
    f64_as_i128(f)
}

pub(crate) fn json_number_as_i128(n: &serde_json::Number) -> Option<i128> {
    if let Some(i) = n.as_i64() {
        return Some(i128::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Some(i128::from(u));
    }
    f64_as_i128(n.as_f64()?)
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn f64_as_i128(f: f64) -> Option<i128> {
    if f.is_finite() && f.fract() == 0.0 && f >= i128::MIN as f64 && f <= i128::MAX as f64 {
        Some(f as i128)
    } else {
        None
    }
}

fn epoch_millis(n: &serde_json::Number) -> Option<DateTime<chrono::FixedOffset>> {
    let millis = n.as_i64().or_else(|| {
        n.as_f64()
            .filter(|f| f.is_finite() && f.fract() == 0.0)
            .map(|f| f as i64)
    })?;
    Utc.timestamp_millis_opt(millis)
        .single()
        .map(|ts| ts.fixed_offset())
}

fn json_type_name(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

fn push_type_error(ctx: &mut TraversalContext, expected: &str, input: &Json) {
    let saved = ctx.enter("", "type");
    ctx.push_error_with_data(
        format!("expected {expected}, found {}", json_type_name(input)),
        input.clone(),
    );
    ctx.leave(saved);
}

fn push_coerce_error(ctx: &mut TraversalContext, ty: ScalarType, input: &Json) {
    let saved = ctx.enter("", "type");
    ctx.push_error_with_data(
        format!("unable to coerce {} to {ty}", json_type_name(input)),
        input.clone(),
    );
    ctx.leave(saved);
}

fn push_scalar_error(ctx: &mut TraversalContext, keyword: &str, message: String) {
    let saved = ctx.enter("", keyword);
    ctx.push_error(message);
    ctx.leave(saved);
}

fn push_scalar_error_with_data(
    ctx: &mut TraversalContext,
    keyword: &str,
    message: String,
    data: Json,
) {
    let saved = ctx.enter("", keyword);
    ctx.push_error_with_data(message, data);
    ctx.leave(saved);
}

fn push_ref_error(ctx: &mut TraversalContext, name: &str) {
    let saved = ctx.enter("", "ref");
    ctx.push_error(format!("unresolved schema reference {name:?}"));
    ctx.leave(saved);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder;

    #[test]
    fn scalar_text_root() {
        let schema = builder::int32();
        assert_eq!(schema.parse("127").unwrap().as_i64(), Some(127));
        assert!(schema.parse("abc").is_err());
    }

    #[test]
    fn nested_string_not_parsed_in_strict_mode() {
        let schema = builder::object([("n", builder::int32())]);
        assert!(schema.parse(r#"{"n":"12"}"#).is_err());
        assert_eq!(
            schema.coerce(r#"{"n":"12"}"#).unwrap()["n"].as_i64(),
            Some(12)
        );
    }

    #[test]
    fn array_accumulates_every_bad_element() {
        let schema = builder::elements(builder::string());
        let failure = schema.parse(r#"[1, "ok", 2]"#).unwrap_err();
        let paths: Vec<&str> = failure
            .errors()
            .iter()
            .map(|e| e.instance_path.as_str())
            .collect();
        assert_eq!(paths, ["/0", "/2"]);
    }

    #[test]
    fn null_string_sentinel_only_for_nullable_roots() {
        assert!(builder::string().nullable().parse("null").unwrap().is_null());
        assert_eq!(
            builder::string().parse("null").unwrap().as_str(),
            Some("null")
        );
    }

    #[test]
    fn empty_form_falls_back_to_raw_text() {
        let schema = builder::any();
        assert_eq!(
            schema.parse("not json at all").unwrap().as_str(),
            Some("not json at all")
        );
        assert_eq!(schema.parse("[1,2]").unwrap().as_array().map(<[Value]>::len), Some(2));
    }
}
