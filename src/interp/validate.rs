//! Interpreted validation: a pure type-guard over `serde_json::Value`.
//!
//! Accepts exactly the inputs strict decoding accepts, so
//! `validate(i) == parse_value(i).is_ok()` holds for every input. Never
//! allocates errors and never fails loudly; unresolved refs and exceeded
//! depth simply validate to `false`.

use chrono::DateTime;
use serde_json::Value as Json;

use crate::bounds;
use crate::interp::decode::int_from_text;
use crate::options::Options;
use crate::schema::{registry, Form, PropertiesForm, ScalarType, Schema};

/// Check `input` against `schema`.
#[must_use]
pub fn validate(schema: &Schema, input: &Json, options: &Options) -> bool {
    valid_node(schema, input, 0, options)
}

fn valid_node(schema: &Schema, input: &Json, depth: usize, options: &Options) -> bool {
    if depth > options.max_depth {
        return false;
    }
    if input.is_null() && schema.is_nullable() {
        return true;
    }
    match schema.form() {
        Form::Empty => true,
        Form::Type(ty) => valid_scalar(*ty, input),
        Form::Enum(values) => input
            .as_str()
            .is_some_and(|s| values.iter().any(|v| v == s)),
        Form::Elements(inner) => input.as_array().is_some_and(|items| {
            items
                .iter()
                .all(|item| valid_node(inner, item, depth + 1, options))
        }),
        Form::Properties(form) => valid_properties(form, input, None, depth, options),
        Form::Values(inner) => input.as_object().is_some_and(|entries| {
            entries
                .values()
                .all(|value| valid_node(inner, value, depth + 1, options))
        }),
        Form::Discriminator(form) => {
            let Some(obj) = input.as_object() else {
                return false;
            };
            let Some(tag) = obj.get(&form.discriminator).and_then(Json::as_str) else {
                return false;
            };
            let Some(mapped) = form.mapping.get(tag) else {
                return false;
            };
            mapped.as_properties().is_some_and(|mapped_form| {
                valid_properties(
                    mapped_form,
                    input,
                    Some(form.discriminator.as_str()),
                    depth,
                    options,
                )
            })
        }
        Form::Ref(name) => registry::resolve(name)
            .is_some_and(|target| valid_node(&target, input, depth + 1, options)),
    }
}

fn valid_properties(
    form: &PropertiesForm,
    input: &Json,
    discriminator: Option<&str>,
    depth: usize,
    options: &Options,
) -> bool {
    let Some(obj) = input.as_object() else {
        return false;
    };
    if form.strict {
        let all_known = obj
            .keys()
            .all(|key| form.declares(key) || discriminator == Some(key.as_str()));
        if !all_known {
            return false;
        }
    }
    let required_ok = form.properties.iter().all(|(key, sub)| {
        obj.get(key)
            .is_some_and(|value| valid_node(sub, value, depth + 1, options))
    });
    if !required_ok {
        return false;
    }
    form.optional_properties.iter().all(|(key, sub)| match obj.get(key) {
        Some(value) => valid_node(sub, value, depth + 1, options),
        None => true,
    })
}

pub(crate) fn valid_scalar(ty: ScalarType, input: &Json) -> bool {
    match ty {
        ScalarType::Boolean => input.is_boolean(),
        ScalarType::String => input.is_string(),
        ScalarType::Timestamp => input
            .as_str()
            .is_some_and(|s| DateTime::parse_from_rfc3339(s).is_ok()),
        ScalarType::Float32 | ScalarType::Float64 => input.is_number(),
        ScalarType::Int64 | ScalarType::Uint64 => {
            let widened = match input {
                Json::Number(n) => super::decode::json_number_as_i128(n),
                Json::String(s) => int_from_text(s),
                _ => None,
            };
            in_range(ty, widened)
        }
        _ => {
            let widened = match input {
                Json::Number(n) => super::decode::json_number_as_i128(n),
                _ => None,
            };
            in_range(ty, widened)
        }
    }
}

fn in_range(ty: ScalarType, widened: Option<i128>) -> bool {
    widened.is_some_and(|n| bounds::int_range(ty).is_some_and(|range| range.contains(n)))
}
