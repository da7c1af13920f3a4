//! Error model for schema operations.
//!
//! Decode and coerce walks never throw: they append [`ValueError`]s to a
//! [`TraversalContext`] in encounter order and return `None`. Callers decide
//! success by checking the error list, not the returned value, because a
//! legitimately decoded optional property can be absent. The facade converts
//! a non-empty list into one [`ValidationFailure`].

use serde::Serialize;
use thiserror::Error;

use crate::options::Options;

/// A single validation or decoding failure.
///
/// `instance_path` points into the input value and `schema_path` into the
/// schema, both as JSON-pointer-like strings built from `/`-prefixed
/// segments. `schema_path` is diagnostic only and never drives control flow.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ValueError {
    pub message: String,
    pub instance_path: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub schema_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ValueError {
    /// Create an error at the given paths.
    #[must_use]
    pub fn new(
        message: impl Into<String>,
        instance_path: impl Into<String>,
        schema_path: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            instance_path: instance_path.into(),
            schema_path: schema_path.into(),
            data: None,
        }
    }

    /// Attach the offending input value for diagnostics.
    #[must_use]
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Mutable state threaded through a decode or coerce walk.
///
/// The paths grow and shrink as the walk descends; [`TraversalContext::enter`]
/// returns the lengths to restore on the way back out so no per-level clones
/// are needed.
#[derive(Debug)]
pub struct TraversalContext {
    pub instance_path: String,
    pub schema_path: String,
    pub errors: Vec<ValueError>,
    pub depth: usize,
    pub max_depth: usize,
}

impl TraversalContext {
    /// Fresh context using the given options.
    #[must_use]
    pub fn new(options: &Options) -> Self {
        Self {
            instance_path: String::new(),
            schema_path: String::new(),
            errors: Vec::new(),
            depth: 0,
            max_depth: options.max_depth,
        }
    }

    /// Whether the walk is at the root of the input.
    #[must_use]
    pub fn at_root(&self) -> bool {
        self.instance_path.is_empty()
    }

    /// Descend one level. Returns the saved path lengths for [`Self::leave`].
    pub fn enter(&mut self, instance_segment: &str, schema_segment: &str) -> (usize, usize) {
        let saved = (self.instance_path.len(), self.schema_path.len());
        if !instance_segment.is_empty() {
            self.instance_path.push('/');
            self.instance_path.push_str(instance_segment);
        }
        if !schema_segment.is_empty() {
            self.schema_path.push('/');
            self.schema_path.push_str(schema_segment);
        }
        saved
    }

    /// Restore the paths saved by [`Self::enter`].
    pub fn leave(&mut self, saved: (usize, usize)) {
        self.instance_path.truncate(saved.0);
        self.schema_path.truncate(saved.1);
    }

    /// Append an error at the current paths.
    pub fn push_error(&mut self, message: impl Into<String>) {
        self.errors.push(ValueError::new(
            message,
            self.instance_path.clone(),
            self.schema_path.clone(),
        ));
    }

    /// Append an error at the current paths, keeping the offending value.
    pub fn push_error_with_data(&mut self, message: impl Into<String>, data: serde_json::Value) {
        let error = ValueError::new(
            message,
            self.instance_path.clone(),
            self.schema_path.clone(),
        )
        .with_data(data);
        self.errors.push(error);
    }

    /// Bump the recursion depth, erroring out once the limit is exceeded.
    ///
    /// Returns `false` (after pushing a depth error) when the walk must stop.
    pub fn descend(&mut self) -> bool {
        self.depth += 1;
        if self.depth > self.max_depth {
            self.push_error(format!(
                "maximum depth of {} exceeded; schema may be infinitely recursive",
                self.max_depth
            ));
            return false;
        }
        true
    }

    /// Undo one [`Self::descend`].
    pub fn ascend(&mut self) {
        self.depth -= 1;
    }
}

/// Aggregate failure returned by the public parse/coerce/serialize surface.
///
/// Carries every [`ValueError`] the walk produced, in encounter order, plus
/// a summary message: the lone error's message when there is exactly one,
/// otherwise a list of the affected instance paths.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("{message}")]
pub struct ValidationFailure {
    message: String,
    errors: Vec<ValueError>,
}

impl ValidationFailure {
    /// Build the failure from an accumulated error list.
    #[must_use]
    pub fn from_errors(errors: Vec<ValueError>) -> Self {
        let message = match errors.as_slice() {
            [] => String::from("Input failed validation."),
            [only] => only.message.clone(),
            many => {
                let paths: Vec<&str> = many
                    .iter()
                    .map(|e| {
                        if e.instance_path.is_empty() {
                            "/"
                        } else {
                            e.instance_path.as_str()
                        }
                    })
                    .collect();
                format!("Invalid input. Affected properties [{}].", paths.join(", "))
            }
        };
        Self { message, errors }
    }

    /// Summary message per the aggregation rule.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// All accumulated errors in encounter order. Never empty for failures
    /// surfaced by the public API.
    #[must_use]
    pub fn errors(&self) -> &[ValueError] {
        &self.errors
    }

    /// Consume the failure, yielding the error list.
    #[must_use]
    pub fn into_errors(self) -> Vec<ValueError> {
        self.errors
    }
}

/// Errors produced while reading a schema from its JSON document form.
#[derive(Debug, Error)]
pub enum SchemaParseError {
    /// The document is not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// More than one form keyword is present on a single node.
    #[error("schema node at {path:?} mixes forms: {found}")]
    MixedForms { path: String, found: String },
    /// A `type` keyword names an unknown scalar.
    #[error("unknown scalar type {name:?}")]
    UnknownType { name: String },
    /// A discriminator mapping value is not a properties-form schema.
    #[error("discriminator mapping {tag:?} must be a properties form")]
    BadMapping { tag: String },
    /// An enum form with no values, or values that are not strings.
    #[error("enum form requires a non-empty list of strings")]
    BadEnum,
}
