//! Schema node types.

use core::fmt;

use indexmap::IndexMap;

/// A schema node: one form, a nullability flag, and metadata.
///
/// Nullability and optionality are orthogonal: `nullable` admits `null` as a
/// *value*; whether a property may be *absent* is decided by which map of a
/// [`PropertiesForm`] it sits in.
#[derive(Clone, Debug, PartialEq)]
pub struct Schema {
    form: Form,
    nullable: bool,
    metadata: Metadata,
}

/// The eight mutually exclusive schema forms.
///
/// Matching on this enum is how every operation dispatches; keeping it a
/// closed sum type makes the compiler enforce that each walk handles every
/// form.
#[derive(Clone, Debug, PartialEq)]
pub enum Form {
    /// Accepts anything.
    Empty,
    /// A scalar of the given type.
    Type(ScalarType),
    /// A fixed, ordered set of string literals.
    Enum(Vec<String>),
    /// An array whose elements all match one inner schema.
    Elements(Box<Schema>),
    /// An object with declared required/optional properties.
    Properties(PropertiesForm),
    /// A record: arbitrary string keys, one shared value schema.
    Values(Box<Schema>),
    /// A tagged union of properties-form schemas.
    Discriminator(DiscriminatorForm),
    /// A named reference resolved through the registry at call time.
    Ref(String),
}

/// Scalar types for the `Type` form.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Boolean,
    String,
    Timestamp,
    Float32,
    Float64,
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Int64,
    Uint64,
}

impl ScalarType {
    /// The JTD keyword for this scalar.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::String => "string",
            Self::Timestamp => "timestamp",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Int8 => "int8",
            Self::Uint8 => "uint8",
            Self::Int16 => "int16",
            Self::Uint16 => "uint16",
            Self::Int32 => "int32",
            Self::Uint32 => "uint32",
            Self::Int64 => "int64",
            Self::Uint64 => "uint64",
        }
    }

    /// Parse a JTD scalar keyword.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let ty = match name {
            "boolean" => Self::Boolean,
            "string" => Self::String,
            "timestamp" => Self::Timestamp,
            "float32" => Self::Float32,
            "float64" => Self::Float64,
            "int8" => Self::Int8,
            "uint8" => Self::Uint8,
            "int16" => Self::Int16,
            "uint16" => Self::Uint16,
            "int32" => Self::Int32,
            "uint32" => Self::Uint32,
            "int64" => Self::Int64,
            "uint64" => Self::Uint64,
            _ => return None,
        };
        Some(ty)
    }

    /// Whether this is one of the eight fixed-width integer types.
    #[must_use]
    pub fn is_integer(self) -> bool {
        !matches!(
            self,
            Self::Boolean | Self::String | Self::Timestamp | Self::Float32 | Self::Float64
        )
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Object form: required properties, optional properties, strictness.
///
/// The two key sets must be disjoint (builder discipline, not re-checked at
/// runtime). Declaration order is preserved and decides decode order and
/// therefore error order.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct PropertiesForm {
    pub properties: IndexMap<String, Schema>,
    pub optional_properties: IndexMap<String, Schema>,
    /// Reject input keys outside the declared sets (plus the active
    /// discriminator key when this form is a discriminator mapping value).
    pub strict: bool,
}

impl PropertiesForm {
    /// All declared keys: required first, then optional, in declaration
    /// order.
    pub fn declared_keys(&self) -> impl Iterator<Item = &str> {
        self.properties
            .keys()
            .chain(self.optional_properties.keys())
            .map(String::as_str)
    }

    /// Whether `key` is declared in either key set.
    #[must_use]
    pub fn declares(&self, key: &str) -> bool {
        self.properties.contains_key(key) || self.optional_properties.contains_key(key)
    }
}

/// Discriminated-union form.
///
/// The mapping values must themselves be `Properties`-form schemas; the
/// discriminant field is injected during decode/encode rather than declared
/// inside each mapped object.
#[derive(Clone, Debug, PartialEq)]
pub struct DiscriminatorForm {
    pub discriminator: String,
    pub mapping: IndexMap<String, Schema>,
}

/// Optional metadata carried by every node.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Metadata {
    /// Stable identifier; also the sub-function key used by the compiler
    /// and the registry key for recursive schemas.
    pub id: Option<String>,
    pub description: Option<String>,
    pub is_deprecated: bool,
}

impl Metadata {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.description.is_none() && !self.is_deprecated
    }
}

impl Schema {
    /// Create a schema with the given form, non-nullable, no metadata.
    #[must_use]
    pub fn new(form: Form) -> Self {
        debug_assert!(
            !matches!(
                &form,
                Form::Discriminator(d) if d.mapping.values().any(|s| !matches!(s.form(), Form::Properties(_)))
            ),
            "discriminator mapping values must be properties-form schemas"
        );
        Self {
            form,
            nullable: false,
            metadata: Metadata::default(),
        }
    }

    /// Mark the schema nullable: `null` becomes an accepted value.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.metadata.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.metadata.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn deprecated(mut self) -> Self {
        self.metadata.is_deprecated = true;
        self
    }

    #[must_use]
    pub fn form(&self) -> &Form {
        &self.form
    }

    #[must_use]
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    #[must_use]
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// The node id, when set.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.metadata.id.as_deref()
    }

    /// The scalar type for `Type`-form schemas.
    #[must_use]
    pub fn scalar_type(&self) -> Option<ScalarType> {
        match &self.form {
            Form::Type(ty) => Some(*ty),
            _ => None,
        }
    }

    /// The properties form, when this node is one.
    #[must_use]
    pub fn as_properties(&self) -> Option<&PropertiesForm> {
        match &self.form {
            Form::Properties(p) => Some(p),
            _ => None,
        }
    }

    /// The element schema for `Elements`-form schemas.
    #[must_use]
    pub fn element_schema(&self) -> Option<&Schema> {
        match &self.form {
            Form::Elements(inner) => Some(inner),
            _ => None,
        }
    }
}

impl fmt::Display for Schema {
    /// Renders the compact JTD JSON document for this schema.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let doc = crate::schema::json::to_document(self);
        let text = serde_json::to_string(&doc).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_compose() {
        let schema = Schema::new(Form::Type(ScalarType::String))
            .nullable()
            .with_id("Name")
            .with_description("a name")
            .deprecated();
        assert!(schema.is_nullable());
        assert_eq!(schema.id(), Some("Name"));
        assert!(schema.metadata().is_deprecated);
        assert_eq!(schema.scalar_type(), Some(ScalarType::String));
    }

    #[test]
    fn scalar_names_round_trip() {
        for ty in [
            ScalarType::Boolean,
            ScalarType::String,
            ScalarType::Timestamp,
            ScalarType::Float32,
            ScalarType::Float64,
            ScalarType::Int8,
            ScalarType::Uint8,
            ScalarType::Int16,
            ScalarType::Uint16,
            ScalarType::Int32,
            ScalarType::Uint32,
            ScalarType::Int64,
            ScalarType::Uint64,
        ] {
            assert_eq!(ScalarType::from_name(ty.name()), Some(ty));
        }
        assert_eq!(ScalarType::from_name("int128"), None);
    }

    #[test]
    fn declared_keys_order_required_then_optional() {
        let mut form = PropertiesForm::default();
        form.properties
            .insert("b".into(), Schema::new(Form::Type(ScalarType::String)));
        form.properties
            .insert("a".into(), Schema::new(Form::Type(ScalarType::String)));
        form.optional_properties
            .insert("c".into(), Schema::new(Form::Type(ScalarType::String)));
        let keys: Vec<&str> = form.declared_keys().collect();
        assert_eq!(keys, ["b", "a", "c"]);
        assert!(form.declares("c"));
        assert!(!form.declares("d"));
    }
}
