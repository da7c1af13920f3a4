//! Compiled-validator facade.
//!
//! [`CompiledValidator::compile`] runs the template compiler once over a
//! schema and bundles the four generated sources behind the same four
//! operations the schema itself exposes. Execution routes through the
//! interpreted walks, with hand-written fast paths for scalar leaf schemas
//! keyed off the concrete scalar type; the generated text is the
//! inspectable, ahead-of-time artifact.
//!
//! The generated source is part of the public contract: [`Self::compiled_code`]
//! hands it out for diagnostics, golden tests, and build-step codegen.

use crate::codegen;
use crate::error::{TraversalContext, ValidationFailure};
use crate::interp::{decode, validate as interp_validate, Mode};
use crate::options::Options;
use crate::schema::{Form, ScalarType, Schema};
use crate::value::Value;

/// The source text of the four generated functions.
#[derive(Clone, Debug)]
pub struct CompiledCode {
    pub validate: String,
    pub parse: String,
    pub coerce: String,
    pub serialize: String,
}

/// A schema paired with its compiled artifacts.
#[derive(Debug)]
pub struct CompiledValidator {
    schema: Schema,
    options: Options,
    code: CompiledCode,
    fast_path: Option<ScalarType>,
}

impl CompiledValidator {
    /// Run all three generation passes over `schema`.
    #[must_use]
    pub fn compile(schema: &Schema) -> Self {
        Self::compile_with(schema, Options::default())
    }

    /// [`Self::compile`] with explicit options for the interpreted paths.
    #[must_use]
    pub fn compile_with(schema: &Schema, options: Options) -> Self {
        let code = CompiledCode {
            validate: codegen::validate::compile_validate(schema),
            parse: codegen::parse::compile_parse(schema),
            coerce: codegen::parse::compile_coerce(schema),
            serialize: codegen::serialize::compile_serialize(schema),
        };
        // Scalar leaves skip the generic walk entirely.
        let fast_path = match schema.form() {
            Form::Type(ty) => Some(*ty),
            _ => None,
        };
        tracing::debug!(
            schema = %schema,
            fast_path = fast_path.is_some(),
            "compiled schema"
        );
        Self {
            schema: schema.clone(),
            options,
            code,
            fast_path,
        }
    }

    /// The schema this validator was compiled from.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Generated source text for all four operations.
    #[must_use]
    pub fn compiled_code(&self) -> &CompiledCode {
        &self.code
    }

    /// Type-guard check.
    #[must_use]
    pub fn validate(&self, input: &serde_json::Value) -> bool {
        if let Some(ty) = self.fast_path {
            if input.is_null() {
                return self.schema.is_nullable();
            }
            return interp_validate::valid_scalar(ty, input);
        }
        interp_validate::validate(&self.schema, input, &self.options)
    }

    /// Decode raw text into a typed [`Value`].
    pub fn parse(&self, text: &str) -> Result<Value, ValidationFailure> {
        decode::decode_text(&self.schema, text, Mode::Strict, &self.options)
    }

    /// Decode an already-parsed JSON value.
    pub fn parse_value(&self, input: &serde_json::Value) -> Result<Value, ValidationFailure> {
        if self.fast_path.is_some() {
            return self.scalar_decode(input, Mode::Strict);
        }
        decode::decode_value(&self.schema, input, Mode::Strict, &self.options)
    }

    /// Coerce raw text into a typed [`Value`].
    pub fn coerce(&self, text: &str) -> Result<Value, ValidationFailure> {
        decode::decode_text(&self.schema, text, Mode::Coerce, &self.options)
    }

    /// Coerce an already-parsed JSON value.
    pub fn coerce_value(&self, input: &serde_json::Value) -> Result<Value, ValidationFailure> {
        if self.fast_path.is_some() {
            return self.scalar_decode(input, Mode::Coerce);
        }
        decode::decode_value(&self.schema, input, Mode::Coerce, &self.options)
    }

    /// Serialize a typed [`Value`] to JSON text. Interior failures (shape
    /// mismatches, `null` for non-nullable fields) come back as the failure
    /// result rather than a panic.
    pub fn serialize(&self, value: &Value) -> Result<String, ValidationFailure> {
        self.schema.serialize_with(value, &self.options)
    }

    /// Direct scalar decoding, bypassing the form dispatch of the walk.
    fn scalar_decode(&self, input: &serde_json::Value, mode: Mode) -> Result<Value, ValidationFailure> {
        let Some(ty) = self.fast_path else {
            return decode::decode_value(&self.schema, input, mode, &self.options);
        };
        if input.is_null() && self.schema.is_nullable() {
            return Ok(Value::Null);
        }
        let mut ctx = TraversalContext::new(&self.options);
        let result = decode::decode_scalar(ty, input, mode, &mut ctx);
        match result {
            Some(value) if ctx.errors.is_empty() => Ok(value),
            _ => Err(ValidationFailure::from_errors(ctx.errors)),
        }
    }
}
