//! Interpreted serialization: typed [`Value`] -> JSON text.
//!
//! Serialization assumes the value already satisfies the schema and does no
//! validation; what it does guarantee is that shape mismatches (a `null`
//! where a non-nullable object was promised, a string where a number was)
//! surface as an error result instead of a panic or invalid JSON.
//!
//! At the root, string, timestamp, and enum schemas emit the bare text form
//! without quotes, so `serialize` can produce either a raw scalar or a JSON
//! document depending on nesting depth.

use chrono::SecondsFormat;

use crate::error::{TraversalContext, ValidationFailure};
use crate::options::Options;
use crate::schema::{registry, DiscriminatorForm, Form, PropertiesForm, Schema, ScalarType};
use crate::value::{Map, Value};

/// Serialize `value` against `schema`.
pub fn serialize(
    schema: &Schema,
    value: &Value,
    options: &Options,
) -> Result<String, ValidationFailure> {
    let mut encoder = Encoder {
        out: String::new(),
        ctx: TraversalContext::new(options),
    };
    match encoder.write_node(schema, value) {
        Ok(()) => Ok(encoder.out),
        Err(Halt) => Err(ValidationFailure::from_errors(encoder.ctx.errors)),
    }
}

/// Marker for an abandoned encode; the error is already in the context.
struct Halt;

type EncodeResult = Result<(), Halt>;

struct Encoder {
    out: String,
    ctx: TraversalContext,
}

impl Encoder {
    fn fail(&mut self, message: String) -> Halt {
        self.ctx.push_error(message);
        Halt
    }

    fn mismatch(&mut self, expected: &str, value: &Value) -> Halt {
        let found = match value {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Timestamp(_) => "timestamp",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        };
        self.fail(format!("cannot serialize {found} as {expected}"))
    }

    fn write_node(&mut self, schema: &Schema, value: &Value) -> EncodeResult {
        if value.is_null() {
            if schema.is_nullable() || matches!(schema.form(), Form::Empty) {
                self.out.push_str("null");
                return Ok(());
            }
            return Err(self.mismatch("non-nullable value", value));
        }
        match schema.form() {
            Form::Empty => self.write_any(value),
            Form::Type(ty) => self.write_scalar(*ty, value),
            Form::Enum(_) => match value {
                Value::String(s) => {
                    self.write_string(s);
                    Ok(())
                }
                other => Err(self.mismatch("enum value", other)),
            },
            Form::Elements(inner) => match value {
                Value::Array(items) => self.write_elements(inner, items),
                other => Err(self.mismatch("array", other)),
            },
            Form::Properties(form) => match value {
                Value::Object(map) => {
                    self.out.push('{');
                    let mut first = true;
                    self.write_property_fields(form, map, None, &mut first)?;
                    self.out.push('}');
                    Ok(())
                }
                other => Err(self.mismatch("object", other)),
            },
            Form::Values(inner) => match value {
                Value::Object(map) => self.write_values(inner, map),
                other => Err(self.mismatch("object", other)),
            },
            Form::Discriminator(form) => match value {
                Value::Object(map) => self.write_discriminator(form, map),
                other => Err(self.mismatch("object", other)),
            },
            Form::Ref(name) => {
                if !self.ctx.descend() {
                    return Err(Halt);
                }
                let target = registry::resolve(name)
                    .ok_or_else(|| self.fail(format!("unresolved schema reference {name:?}")))?;
                let result = self.write_node(&target, value);
                self.ctx.ascend();
                result
            }
        }
    }

    fn write_any(&mut self, value: &Value) -> EncodeResult {
        match serde_json::to_string(value) {
            Ok(text) => {
                self.out.push_str(&text);
                Ok(())
            }
            Err(e) => Err(self.fail(format!("serialization failed: {e}"))),
        }
    }

    fn write_scalar(&mut self, ty: ScalarType, value: &Value) -> EncodeResult {
        match ty {
            ScalarType::Boolean => match value {
                Value::Bool(b) => {
                    self.out.push_str(if *b { "true" } else { "false" });
                    Ok(())
                }
                other => Err(self.mismatch("boolean", other)),
            },
            ScalarType::String => match value {
                Value::String(s) => {
                    self.write_string(s);
                    Ok(())
                }
                other => Err(self.mismatch("string", other)),
            },
            ScalarType::Timestamp => match value {
                Value::Timestamp(ts) => {
                    let text = ts.to_rfc3339_opts(SecondsFormat::Millis, true);
                    self.write_string(&text);
                    Ok(())
                }
                // Already-textual timestamps pass through unchanged.
                Value::String(s) => {
                    self.write_string(s);
                    Ok(())
                }
                other => Err(self.mismatch("timestamp", other)),
            },
            ScalarType::Float32 | ScalarType::Float64 => match value {
                Value::Number(n) => {
                    let f = n.as_f64();
                    if !f.is_finite() {
                        return Err(self.fail(format!("{ty} value is not finite")));
                    }
                    self.out.push_str(&n.to_string());
                    Ok(())
                }
                other => Err(self.mismatch(ty.name(), other)),
            },
            _ => match value {
                Value::Number(n) if n.is_integer() => {
                    self.out.push_str(&n.to_string());
                    Ok(())
                }
                other => Err(self.mismatch(ty.name(), other)),
            },
        }
    }

    /// Strings at the root serialize to their raw text; nested strings are
    /// JSON-quoted. Same rule carries timestamps and enum values.
    fn write_string(&mut self, s: &str) {
        if self.out.is_empty() && self.ctx.at_root() {
            self.out.push_str(s);
        } else {
            self.push_quoted(s);
        }
    }

    fn push_quoted(&mut self, s: &str) {
        // serde_json string escaping; infallible for &str.
        if let Ok(quoted) = serde_json::to_string(s) {
            self.out.push_str(&quoted);
        }
    }

    fn write_elements(&mut self, inner: &Schema, items: &[Value]) -> EncodeResult {
        if !self.ctx.descend() {
            return Err(Halt);
        }
        self.out.push('[');
        for (index, item) in items.iter().enumerate() {
            if index > 0 {
                self.out.push(',');
            }
            let segment = index.to_string();
            let saved = self.ctx.enter(&segment, "elements");
            let result = self.write_node(inner, item);
            self.ctx.leave(saved);
            result?;
        }
        self.out.push(']');
        self.ctx.ascend();
        Ok(())
    }

    fn write_values(&mut self, inner: &Schema, map: &Map) -> EncodeResult {
        if !self.ctx.descend() {
            return Err(Halt);
        }
        self.out.push('{');
        for (index, (key, value)) in map.iter().enumerate() {
            if index > 0 {
                self.out.push(',');
            }
            self.push_quoted(key);
            self.out.push(':');
            let saved = self.ctx.enter(key, "values");
            let result = self.write_node(inner, value);
            self.ctx.leave(saved);
            result?;
        }
        self.out.push('}');
        self.ctx.ascend();
        Ok(())
    }

    /// Emit the declared fields of a properties form into an already-open
    /// object. Only declared keys are written; extras in the value map are
    /// dropped. `skip` carries the discriminator key already emitted by the
    /// caller.
    fn write_property_fields(
        &mut self,
        form: &PropertiesForm,
        map: &Map,
        skip: Option<&str>,
        first: &mut bool,
    ) -> EncodeResult {
        if !self.ctx.descend() {
            return Err(Halt);
        }
        for (key, sub) in &form.properties {
            if skip == Some(key.as_str()) {
                continue;
            }
            let Some(value) = map.get(key) else {
                return Err(self.fail(format!("missing required property {key:?}")));
            };
            if !*first {
                self.out.push(',');
            }
            *first = false;
            self.push_quoted(key);
            self.out.push(':');
            let saved = self.ctx.enter(key, "properties");
            let result = self.write_node(sub, value);
            self.ctx.leave(saved);
            result?;
        }
        for (key, sub) in &form.optional_properties {
            let Some(value) = map.get(key) else {
                continue;
            };
            if !*first {
                self.out.push(',');
            }
            *first = false;
            self.push_quoted(key);
            self.out.push(':');
            let saved = self.ctx.enter(key, "optionalProperties");
            let result = self.write_node(sub, value);
            self.ctx.leave(saved);
            result?;
        }
        self.ctx.ascend();
        Ok(())
    }

    /// The discriminant field is emitted first, then the mapped object's
    /// declared fields.
    fn write_discriminator(&mut self, form: &DiscriminatorForm, map: &Map) -> EncodeResult {
        let key = form.discriminator.as_str();
        let Some(Value::String(tag)) = map.get(key) else {
            return Err(self.fail(format!("missing discriminator property {key:?}")));
        };
        let Some(mapped) = form.mapping.get(tag) else {
            return Err(self.fail(format!("{tag:?} is not a valid discriminator value")));
        };
        let tag = tag.clone();
        let Some(mapped_form) = mapped.as_properties() else {
            return Err(self.fail(format!("mapping for {tag:?} is not an object schema")));
        };
        self.out.push('{');
        self.push_quoted(key);
        self.out.push(':');
        self.push_quoted(&tag);
        let mut first = false;
        self.write_property_fields(mapped_form, map, Some(key), &mut first)?;
        self.out.push('}');
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::builder;
    use crate::value::{Map, Value};

    #[test]
    fn root_string_is_bare() {
        let schema = builder::string();
        assert_eq!(schema.serialize(&Value::from("hello")).unwrap(), "hello");
    }

    #[test]
    fn nested_string_is_quoted() {
        let schema = builder::object([("name", builder::string())]);
        let value = Value::Object(Map::from_iter([(
            "name".to_string(),
            Value::from("hello"),
        )]));
        assert_eq!(schema.serialize(&value).unwrap(), r#"{"name":"hello"}"#);
    }

    #[test]
    fn null_for_non_nullable_is_an_error_not_a_panic() {
        let schema = builder::object([("name", builder::string())]);
        let failure = schema.serialize(&Value::Null).unwrap_err();
        assert!(!failure.errors().is_empty());
    }

    #[test]
    fn extras_in_value_map_are_dropped() {
        let schema = builder::object([("a", builder::string())]);
        let value = Value::Object(Map::from_iter([
            ("a".to_string(), Value::from("x")),
            ("zzz".to_string(), Value::from("dropped")),
        ]));
        assert_eq!(schema.serialize(&value).unwrap(), r#"{"a":"x"}"#);
    }
}
