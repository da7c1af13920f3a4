//! Template compiler: schema tree -> specialized Rust source text.
//!
//! Three independent passes walk the same schema tree and each emit the
//! source of one top-level function: `validate`, `parse` (or its coercing
//! variant), and `serialize`. Diagnostic paths are baked into the emitted
//! error constructors as string literals wherever the path is statically
//! known; only array/record indices and sub-function re-entry build paths at
//! runtime.
//!
//! Sub-function extraction keeps the output linear in the schema size: the
//! first time a `Properties`/`Discriminator` node carrying an id (or a ref
//! target) is encountered, its body is lowered into a standalone named
//! function and every later encounter emits a call. Refs *require* this --
//! a recursive schema's call target must exist by name -- and the registry
//! declares names before generating bodies so self-calls resolve.
//!
//! The emitted text depends only on `serde_json`, `chrono`, and the public
//! `jsondef` value/error types, with every sub-function definition included,
//! so it compiles as-is in any crate that carries those dependencies.

pub mod analysis;
pub mod parse;
pub mod serialize;
pub mod validate;

pub use analysis::input_requires_transformation;

use indexmap::IndexMap;

use crate::schema::Schema;

/// Default recursion limit baked into generated sub-functions.
pub(crate) const GENERATED_MAX_DEPTH: usize = 500;

/// Names and bodies of extracted sub-functions for one generation pass.
pub struct SubFunctionRegistry {
    prefix: &'static str,
    names: IndexMap<String, String>,
    bodies: IndexMap<String, Option<String>>,
    counter: usize,
}

impl SubFunctionRegistry {
    pub(crate) fn new(prefix: &'static str) -> Self {
        Self {
            prefix,
            names: IndexMap::new(),
            bodies: IndexMap::new(),
            counter: 0,
        }
    }

    /// Function name for `key` (a schema id or ref name), declaring it on
    /// first use. Returns `(name, needs_body)`; the caller must
    /// [`Self::define`] the body exactly once when `needs_body` is true.
    /// Declaration happens before body generation so recursive schemas can
    /// call themselves.
    pub(crate) fn get_or_declare(&mut self, key: &str) -> (String, bool) {
        if let Some(name) = self.names.get(key) {
            return (name.clone(), false);
        }
        let mut name = format!("{}_{}", self.prefix, sanitize_ident(key));
        if self.bodies.contains_key(&name) {
            self.counter += 1;
            name = format!("{name}_{}", self.counter);
        }
        tracing::debug!(key, name = %name, "lowering schema into sub-function");
        self.names.insert(key.to_owned(), name.clone());
        self.bodies.insert(name.clone(), None);
        (name, true)
    }

    pub(crate) fn define(&mut self, name: &str, body: String) {
        self.bodies.insert(name.to_owned(), Some(body));
    }

    /// All sub-function definitions, in declaration order.
    pub(crate) fn render(&self) -> String {
        let mut out = String::new();
        for body in self.bodies.values().flatten() {
            out.push_str(body);
            out.push('\n');
        }
        out
    }
}

/// Derive a Rust identifier fragment from a schema id.
pub(crate) fn sanitize_ident(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    let mut prev_lower = false;
    for ch in id.chars() {
        if ch.is_ascii_alphanumeric() {
            if ch.is_ascii_uppercase() {
                if prev_lower {
                    out.push('_');
                }
                out.push(ch.to_ascii_lowercase());
                prev_lower = false;
            } else {
                out.push(ch);
                prev_lower = ch.is_ascii_lowercase() || ch.is_ascii_digit();
            }
        } else if !out.ends_with('_') {
            out.push('_');
            prev_lower = false;
        }
    }
    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        String::from("anonymous")
    } else if trimmed.starts_with(|c: char| c.is_ascii_digit()) {
        format!("t_{trimmed}")
    } else {
        trimmed.to_owned()
    }
}

/// Escape a string for embedding as a Rust string literal.
pub(crate) fn lit(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{{{:x}}}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// The key a sub-function is registered under: the node's id for id-carrying
/// nodes, the ref name for refs.
pub(crate) fn sub_function_key(schema: &Schema) -> Option<&str> {
    match schema.form() {
        crate::schema::Form::Ref(name) => Some(name),
        crate::schema::Form::Properties(_) | crate::schema::Form::Discriminator(_) => schema.id(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_handles_camel_case_and_symbols() {
        assert_eq!(sanitize_ident("BinaryTree"), "binary_tree");
        assert_eq!(sanitize_ident("user.v2"), "user_v2");
        assert_eq!(sanitize_ident("9lives"), "t_9lives");
        assert_eq!(sanitize_ident("___"), "anonymous");
    }

    #[test]
    fn string_literal_escaping() {
        assert_eq!(lit(r#"a"b\c"#), r#""a\"b\\c""#);
        assert_eq!(lit("line\nbreak"), r#""line\nbreak""#);
    }

    #[test]
    fn registry_declares_before_define() {
        let mut subs = SubFunctionRegistry::new("parse");
        let (name, needs) = subs.get_or_declare("User");
        assert_eq!(name, "parse_user");
        assert!(needs);
        let (again, needs_again) = subs.get_or_declare("User");
        assert_eq!(again, name);
        assert!(!needs_again);
        subs.define(&name, "fn parse_user() {}\n".to_string());
        assert!(subs.render().contains("fn parse_user"));
    }
}
