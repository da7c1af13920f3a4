//! jsondef - JSON Type Definition schemas with four operations per schema.
//!
//! This crate provides a JTD-shaped schema model and, for every schema:
//! - **validate**: a pure type-guard check against a JSON value
//! - **parse**: convert a JSON value (or raw JSON text) into a typed [`Value`]
//!   with a detailed error list
//! - **coerce**: best-effort type conversion first (`"123"` -> int32,
//!   `"true"` -> bool), then the same checks as parse
//! - **serialize**: typed [`Value`] -> JSON text
//!
//! All four are available directly on [`Schema`] through the generic
//! tree-walking interpreter, and through [`CompiledValidator`], which also
//! carries the specialized source text emitted by the template compiler.
//!
//! # Example
//!
//! ```
//! use jsondef::builder::{object, string, int8};
//!
//! let schema = object([("id", string()), ("age", int8())]);
//!
//! let value = schema.parse(r#"{"id":"abc","age":12}"#).unwrap();
//! assert_eq!(value["age"].as_i64(), Some(12));
//!
//! let errors = schema.parse(r#"{"id":"abc","age":1200}"#).unwrap_err();
//! assert_eq!(errors.errors()[0].instance_path, "/age");
//! ```
//!
//! # Recursive schemas
//!
//! Self-referencing schemas are built in two phases through a process-wide
//! registry: the builder closure receives a ref node usable inside the body,
//! and the finished schema is registered when the closure returns.
//!
//! ```
//! use jsondef::builder::{elements, object, recursive, string};
//!
//! let node = recursive("BinaryTree", |tree| {
//!     object([("value", string()), ("children", elements(tree))])
//! });
//! assert!(node.validate(&serde_json::json!({"value": "a", "children": []})));
//! ```

#![deny(clippy::correctness)]
#![deny(clippy::suspicious)]
#![deny(clippy::complexity)]
#![deny(clippy::perf)]
#![deny(clippy::style)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]
#![warn(clippy::todo)]
#![deny(clippy::unimplemented)]
#![deny(unsafe_code)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod adapter;
pub mod bounds;
pub mod builder;
pub mod codegen;
pub mod compiled;
pub mod error;
pub mod interp;
pub mod options;
pub mod schema;
pub mod value;

pub use crate::{
    adapter::{Issue, Validated},
    compiled::{CompiledCode, CompiledValidator},
    error::{SchemaParseError, TraversalContext, ValidationFailure, ValueError},
    options::Options,
    schema::{
        DiscriminatorForm, Form, Metadata, PropertiesForm, ScalarType, Schema, SchemaDocument,
    },
    value::{Map, Number, Value},
};
