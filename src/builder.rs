//! Schema builder factories.
//!
//! Thin constructors over the schema data model. Nothing here carries
//! behavior of its own; every function assembles a [`Schema`] node and the
//! operations come from the core.

use indexmap::IndexMap;

use crate::schema::{DiscriminatorForm, Form, PropertiesForm, ScalarType, Schema};

pub use crate::schema::registry::recursive;

/// Accepts any value.
#[must_use]
pub fn any() -> Schema {
    Schema::new(Form::Empty)
}

macro_rules! scalar_factory {
    ($(#[$doc:meta])* $name:ident => $ty:ident) => {
        $(#[$doc])*
        #[must_use]
        pub fn $name() -> Schema {
            Schema::new(Form::Type(ScalarType::$ty))
        }
    };
}

scalar_factory! { /** Boolean scalar. */ boolean => Boolean }
scalar_factory! { /** String scalar. */ string => String }
scalar_factory! { /** RFC 3339 timestamp scalar. */ timestamp => Timestamp }
scalar_factory! { /** 32-bit float scalar. */ float32 => Float32 }
scalar_factory! { /** 64-bit float scalar. */ float64 => Float64 }
scalar_factory! { /** Signed 8-bit integer scalar. */ int8 => Int8 }
scalar_factory! { /** Unsigned 8-bit integer scalar. */ uint8 => Uint8 }
scalar_factory! { /** Signed 16-bit integer scalar. */ int16 => Int16 }
scalar_factory! { /** Unsigned 16-bit integer scalar. */ uint16 => Uint16 }
scalar_factory! { /** Signed 32-bit integer scalar. */ int32 => Int32 }
scalar_factory! { /** Unsigned 32-bit integer scalar. */ uint32 => Uint32 }
scalar_factory! { /** Signed 64-bit integer scalar. */ int64 => Int64 }
scalar_factory! { /** Unsigned 64-bit integer scalar. */ uint64 => Uint64 }

/// Fixed set of string literals.
#[must_use]
pub fn enumeration<I, S>(values: I) -> Schema
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Schema::new(Form::Enum(values.into_iter().map(Into::into).collect()))
}

/// Array whose elements all match `inner`.
#[must_use]
pub fn elements(inner: Schema) -> Schema {
    Schema::new(Form::Elements(Box::new(inner)))
}

/// Object with the given required properties; unknown input keys allowed.
#[must_use]
pub fn object<I, S>(properties: I) -> Schema
where
    I: IntoIterator<Item = (S, Schema)>,
    S: Into<String>,
{
    ObjectBuilder::new().required_all(properties).build()
}

/// Object with the given required properties; unknown input keys rejected.
#[must_use]
pub fn strict_object<I, S>(properties: I) -> Schema
where
    I: IntoIterator<Item = (S, Schema)>,
    S: Into<String>,
{
    ObjectBuilder::new().required_all(properties).strict().build()
}

/// Incremental object construction for mixing required and optional
/// properties.
///
/// # Example
///
/// ```
/// use jsondef::builder::{string, uint16, ObjectBuilder};
///
/// let schema = ObjectBuilder::new()
///     .required("host", string())
///     .optional("port", uint16())
///     .strict()
///     .build();
/// assert!(schema.validate(&serde_json::json!({"host": "localhost"})));
/// ```
#[derive(Debug, Default)]
pub struct ObjectBuilder {
    form: PropertiesForm,
}

impl ObjectBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required property.
    #[must_use]
    pub fn required(mut self, key: impl Into<String>, schema: Schema) -> Self {
        self.form.properties.insert(key.into(), schema);
        self
    }

    /// Add an optional property: the key may be absent from the input.
    #[must_use]
    pub fn optional(mut self, key: impl Into<String>, schema: Schema) -> Self {
        self.form.optional_properties.insert(key.into(), schema);
        self
    }

    /// Add several required properties at once.
    #[must_use]
    pub fn required_all<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = (S, Schema)>,
        S: Into<String>,
    {
        for (key, schema) in properties {
            self.form.properties.insert(key.into(), schema);
        }
        self
    }

    /// Reject input keys outside the declared sets.
    #[must_use]
    pub fn strict(mut self) -> Self {
        self.form.strict = true;
        self
    }

    #[must_use]
    pub fn build(self) -> Schema {
        Schema::new(Form::Properties(self.form))
    }
}

/// Record: arbitrary string keys, every value matching `inner`.
#[must_use]
pub fn record(inner: Schema) -> Schema {
    Schema::new(Form::Values(Box::new(inner)))
}

/// Discriminated union. Every mapping value must be an object schema built
/// with [`object`]/[`strict_object`]/[`ObjectBuilder`]; the discriminant
/// field itself is injected during decode and encode, not declared inside
/// the mapped objects.
#[must_use]
pub fn discriminator<I, S>(key: impl Into<String>, mapping: I) -> Schema
where
    I: IntoIterator<Item = (S, Schema)>,
    S: Into<String>,
{
    let mapping: IndexMap<String, Schema> = mapping
        .into_iter()
        .map(|(tag, schema)| (tag.into(), schema))
        .collect();
    Schema::new(Form::Discriminator(DiscriminatorForm {
        discriminator: key.into(),
        mapping,
    }))
}

/// Named reference, resolved through the registry at call time. Pair with
/// [`recursive`] for self-referencing schemas.
#[must_use]
pub fn reference(name: impl Into<String>) -> Schema {
    Schema::new(Form::Ref(name.into()))
}

/// Shorthand for marking any schema nullable.
#[must_use]
pub fn nullable(schema: Schema) -> Schema {
    schema.nullable()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_builder_separates_key_sets() {
        let schema = ObjectBuilder::new()
            .required("id", string())
            .optional("note", string())
            .build();
        let form = schema.as_properties().unwrap();
        assert!(form.properties.contains_key("id"));
        assert!(form.optional_properties.contains_key("note"));
        assert!(!form.strict);
    }

    #[test]
    fn strict_object_sets_flag() {
        let schema = strict_object([("id", string())]);
        assert!(schema.as_properties().unwrap().strict);
    }

    #[test]
    fn discriminator_builder() {
        let schema = discriminator("kind", [("A", object([("x", string())]))]);
        match schema.form() {
            Form::Discriminator(form) => {
                assert_eq!(form.discriminator, "kind");
                assert!(form.mapping.contains_key("A"));
            }
            other => panic!("unexpected form {other:?}"),
        }
    }
}
