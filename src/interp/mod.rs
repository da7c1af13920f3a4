//! Generic (interpreted) operations.
//!
//! These tree walks implement all four operations directly against the
//! schema, with no compilation step. [`crate::compiled::CompiledValidator`]
//! adds scalar fast paths and the generated-source artifact on top; the
//! semantics are defined here.
//!
//! Input duality: the `*_value` entry points take an already-parsed
//! `serde_json::Value` and apply strict JSON semantics at every level. The
//! text entry points ([`Schema::parse`], [`Schema::coerce`]) additionally
//! apply the root-level text rules: containers parse the text as a JSON
//! document, scalars read the bare text form (`parse("123")` on an int32
//! schema yields 123, and `"null"` is accepted for nullable schemas).

pub mod decode;
pub mod encode;
pub mod validate;

pub use decode::Mode;

use crate::error::ValidationFailure;
use crate::options::Options;
use crate::schema::Schema;
use crate::value::Value;

impl Schema {
    /// Pure type-guard check. Never errors, never mutates.
    ///
    /// Agreement law: `schema.validate(v)` is true exactly when
    /// `schema.parse_value(v)` succeeds.
    #[must_use]
    pub fn validate(&self, input: &serde_json::Value) -> bool {
        validate::validate(self, input, &Options::default())
    }

    /// [`Self::validate`] with explicit options.
    #[must_use]
    pub fn validate_with(&self, input: &serde_json::Value, options: &Options) -> bool {
        validate::validate(self, input, options)
    }

    /// Decode raw JSON text (or bare scalar text) into a typed [`Value`].
    pub fn parse(&self, text: &str) -> Result<Value, ValidationFailure> {
        decode::decode_text(self, text, Mode::Strict, &Options::default())
    }

    /// [`Self::parse`] with explicit options.
    pub fn parse_with(&self, text: &str, options: &Options) -> Result<Value, ValidationFailure> {
        decode::decode_text(self, text, Mode::Strict, options)
    }

    /// Decode an already-parsed JSON value into a typed [`Value`].
    pub fn parse_value(&self, input: &serde_json::Value) -> Result<Value, ValidationFailure> {
        decode::decode_value(self, input, Mode::Strict, &Options::default())
    }

    /// [`Self::parse_value`] with explicit options.
    pub fn parse_value_with(
        &self,
        input: &serde_json::Value,
        options: &Options,
    ) -> Result<Value, ValidationFailure> {
        decode::decode_value(self, input, Mode::Strict, options)
    }

    /// Like [`Self::parse`], but convert types first: numeric strings become
    /// numbers, `"TRUE"`/`1` become booleans, numeric epochs become
    /// timestamps. Conversion applies at every depth.
    pub fn coerce(&self, text: &str) -> Result<Value, ValidationFailure> {
        decode::decode_text(self, text, Mode::Coerce, &Options::default())
    }

    /// [`Self::coerce`] with explicit options.
    pub fn coerce_with(&self, text: &str, options: &Options) -> Result<Value, ValidationFailure> {
        decode::decode_text(self, text, Mode::Coerce, options)
    }

    /// Coerce an already-parsed JSON value.
    pub fn coerce_value(&self, input: &serde_json::Value) -> Result<Value, ValidationFailure> {
        decode::decode_value(self, input, Mode::Coerce, &Options::default())
    }

    /// [`Self::coerce_value`] with explicit options.
    pub fn coerce_value_with(
        &self,
        input: &serde_json::Value,
        options: &Options,
    ) -> Result<Value, ValidationFailure> {
        decode::decode_value(self, input, Mode::Coerce, options)
    }

    /// Serialize a typed [`Value`] to JSON text.
    ///
    /// Assumes the value matches the schema; shape mismatches surface as a
    /// failure rather than garbage output or a panic. At the root, string,
    /// timestamp, and enum schemas emit the bare text form without quotes.
    pub fn serialize(&self, value: &Value) -> Result<String, ValidationFailure> {
        encode::serialize(self, value, &Options::default())
    }

    /// [`Self::serialize`] with explicit options.
    pub fn serialize_with(
        &self,
        value: &Value,
        options: &Options,
    ) -> Result<String, ValidationFailure> {
        encode::serialize(self, value, options)
    }
}
