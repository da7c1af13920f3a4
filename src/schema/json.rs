//! JTD JSON document representation.
//!
//! Every schema round-trips through [`SchemaDocument`], the JTD-shaped wire
//! form: `{type | enum | elements | properties+optionalProperties | values |
//! discriminator+mapping | ref, nullable?, strict?, metadata?}`. Only schema
//! structure appears here; nothing about the validator machinery leaks into
//! the document.
//!
//! `strict` is emitted as a bare `"strict": true` member. Plain JTD spells
//! looseness as `"additionalProperties": true`, which is accepted as an
//! input alias (`strict` wins when both are present).

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SchemaParseError;
use crate::schema::types::{
    DiscriminatorForm, Form, Metadata, PropertiesForm, ScalarType, Schema,
};

/// Serde mirror of a schema node.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDocument {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub scalar: Option<String>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enumeration: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elements: Option<Box<SchemaDocument>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, SchemaDocument>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optional_properties: Option<IndexMap<String, SchemaDocument>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Box<SchemaDocument>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapping: Option<IndexMap<String, SchemaDocument>>,
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MetadataDocument>,
}

/// Serde mirror of node metadata.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_deprecated: Option<bool>,
}

/// Lower a schema to its document form.
#[must_use]
pub fn to_document(schema: &Schema) -> SchemaDocument {
    let mut doc = SchemaDocument::default();
    match schema.form() {
        Form::Empty => {}
        Form::Type(ty) => doc.scalar = Some(ty.name().to_string()),
        Form::Enum(values) => doc.enumeration = Some(values.clone()),
        Form::Elements(inner) => doc.elements = Some(Box::new(to_document(inner))),
        Form::Properties(form) => {
            doc.properties = Some(
                form.properties
                    .iter()
                    .map(|(k, v)| (k.clone(), to_document(v)))
                    .collect(),
            );
            if !form.optional_properties.is_empty() {
                doc.optional_properties = Some(
                    form.optional_properties
                        .iter()
                        .map(|(k, v)| (k.clone(), to_document(v)))
                        .collect(),
                );
            }
            if form.strict {
                doc.strict = Some(true);
            }
        }
        Form::Values(inner) => doc.values = Some(Box::new(to_document(inner))),
        Form::Discriminator(form) => {
            doc.discriminator = Some(form.discriminator.clone());
            doc.mapping = Some(
                form.mapping
                    .iter()
                    .map(|(k, v)| (k.clone(), to_document(v)))
                    .collect(),
            );
        }
        Form::Ref(name) => doc.reference = Some(name.clone()),
    }
    if schema.is_nullable() {
        doc.nullable = Some(true);
    }
    let metadata = schema.metadata();
    if !metadata.is_empty() {
        doc.metadata = Some(MetadataDocument {
            id: metadata.id.clone(),
            description: metadata.description.clone(),
            is_deprecated: metadata.is_deprecated.then_some(true),
        });
    }
    doc
}

/// Raise a document back into a schema, rejecting mixed or malformed forms.
pub fn from_document(doc: &SchemaDocument) -> Result<Schema, SchemaParseError> {
    from_document_at(doc, &mut String::new())
}

/// Parse a schema from JTD JSON text.
pub fn from_json_str(text: &str) -> Result<Schema, SchemaParseError> {
    let doc: SchemaDocument = serde_json::from_str(text)?;
    from_document(&doc)
}

fn form_keywords(doc: &SchemaDocument) -> Vec<&'static str> {
    let mut found = Vec::new();
    if doc.scalar.is_some() {
        found.push("type");
    }
    if doc.enumeration.is_some() {
        found.push("enum");
    }
    if doc.elements.is_some() {
        found.push("elements");
    }
    if doc.properties.is_some() || doc.optional_properties.is_some() {
        found.push("properties");
    }
    if doc.values.is_some() {
        found.push("values");
    }
    if doc.discriminator.is_some() || doc.mapping.is_some() {
        found.push("discriminator");
    }
    if doc.reference.is_some() {
        found.push("ref");
    }
    found
}

fn from_document_at(doc: &SchemaDocument, path: &mut String) -> Result<Schema, SchemaParseError> {
    let keywords = form_keywords(doc);
    if keywords.len() > 1 {
        return Err(SchemaParseError::MixedForms {
            path: path.clone(),
            found: keywords.join("+"),
        });
    }

    let form = match keywords.first() {
        None => Form::Empty,
        Some(&"type") => {
            let name = doc.scalar.as_deref().unwrap_or_default();
            let ty = ScalarType::from_name(name).ok_or_else(|| SchemaParseError::UnknownType {
                name: name.to_string(),
            })?;
            Form::Type(ty)
        }
        Some(&"enum") => {
            let values = doc.enumeration.clone().unwrap_or_default();
            if values.is_empty() {
                return Err(SchemaParseError::BadEnum);
            }
            Form::Enum(values)
        }
        Some(&"elements") => {
            let inner = doc.elements.as_deref().unwrap_or(&EMPTY_DOC);
            Form::Elements(Box::new(nested(inner, path, "/elements")?))
        }
        Some(&"properties") => Form::Properties(properties_from(doc, path)?),
        Some(&"values") => {
            let inner = doc.values.as_deref().unwrap_or(&EMPTY_DOC);
            Form::Values(Box::new(nested(inner, path, "/values")?))
        }
        Some(&"discriminator") => {
            let mut mapping = IndexMap::new();
            for (tag, sub) in doc.mapping.iter().flatten() {
                let sub_schema = nested(sub, path, &format!("/mapping/{tag}"))?;
                if !matches!(sub_schema.form(), Form::Properties(_)) {
                    return Err(SchemaParseError::BadMapping { tag: tag.clone() });
                }
                mapping.insert(tag.clone(), sub_schema);
            }
            Form::Discriminator(DiscriminatorForm {
                discriminator: doc.discriminator.clone().unwrap_or_default(),
                mapping,
            })
        }
        Some(&"ref") => Form::Ref(doc.reference.clone().unwrap_or_default()),
        Some(other) => {
            // form_keywords only emits the names matched above
            return Err(SchemaParseError::MixedForms {
                path: path.clone(),
                found: (*other).to_string(),
            });
        }
    };

    let mut schema = Schema::new(form);
    if doc.nullable == Some(true) {
        schema = schema.nullable();
    }
    if let Some(meta) = &doc.metadata {
        schema = schema.with_metadata(Metadata {
            id: meta.id.clone(),
            description: meta.description.clone(),
            is_deprecated: meta.is_deprecated == Some(true),
        });
    }
    Ok(schema)
}

static EMPTY_DOC: SchemaDocument = SchemaDocument {
    scalar: None,
    enumeration: None,
    elements: None,
    properties: None,
    optional_properties: None,
    values: None,
    discriminator: None,
    mapping: None,
    reference: None,
    nullable: None,
    strict: None,
    additional_properties: None,
    metadata: None,
};

fn nested(
    doc: &SchemaDocument,
    path: &mut String,
    segment: &str,
) -> Result<Schema, SchemaParseError> {
    let saved = path.len();
    path.push_str(segment);
    let result = from_document_at(doc, path);
    path.truncate(saved);
    result
}

fn properties_from(
    doc: &SchemaDocument,
    path: &mut String,
) -> Result<PropertiesForm, SchemaParseError> {
    let mut form = PropertiesForm::default();
    for (key, sub) in doc.properties.iter().flatten() {
        let sub_schema = nested(sub, path, &format!("/properties/{key}"))?;
        form.properties.insert(key.clone(), sub_schema);
    }
    for (key, sub) in doc.optional_properties.iter().flatten() {
        let sub_schema = nested(sub, path, &format!("/optionalProperties/{key}"))?;
        form.optional_properties.insert(key.clone(), sub_schema);
    }
    form.strict = match (doc.strict, doc.additional_properties) {
        (Some(strict), _) => strict,
        (None, Some(additional)) => !additional,
        (None, None) => false,
    };
    Ok(form)
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        to_document(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let doc = SchemaDocument::deserialize(deserializer)?;
        from_document(&doc).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder;

    #[test]
    fn scalar_document_round_trip() {
        let schema = builder::int8().nullable();
        let text = serde_json::to_string(&schema).unwrap();
        assert_eq!(text, r#"{"type":"int8","nullable":true}"#);
        let parsed: Schema = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, schema);
    }

    #[test]
    fn strict_flag_round_trips() {
        let schema = builder::strict_object([("id", builder::string())]);
        let text = serde_json::to_string(&schema).unwrap();
        assert!(text.contains(r#""strict":true"#));
        let parsed: Schema = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, schema);
    }

    #[test]
    fn additional_properties_alias_accepted() {
        let parsed: Schema =
            serde_json::from_str(r#"{"properties":{},"additionalProperties":false}"#).unwrap();
        assert!(parsed.as_properties().unwrap().strict);
        let loose: Schema =
            serde_json::from_str(r#"{"properties":{},"additionalProperties":true}"#).unwrap();
        assert!(!loose.as_properties().unwrap().strict);
    }

    #[test]
    fn mixed_forms_rejected() {
        let err = from_json_str(r#"{"type":"string","elements":{}}"#).unwrap_err();
        assert!(matches!(err, SchemaParseError::MixedForms { .. }));
    }

    #[test]
    fn mapping_must_be_properties_form() {
        let err = from_json_str(
            r#"{"discriminator":"kind","mapping":{"A":{"type":"string"}}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, SchemaParseError::BadMapping { tag } if tag == "A"));
    }

    #[test]
    fn metadata_round_trips() {
        let schema = builder::string().with_id("Name").with_description("a name");
        let text = serde_json::to_string(&schema).unwrap();
        let parsed: Schema = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.id(), Some("Name"));
        assert_eq!(parsed.metadata().description.as_deref(), Some("a name"));
    }
}
