//! Process-wide registry for named (recursive) schemas.
//!
//! `Ref` nodes hold only a name and resolve here at call time, never a
//! direct edge to the referenced schema, so recursive schemas cannot form
//! ownership cycles. Registration is write-once-per-name in intent;
//! re-registering a name is last-writer-wins.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::schema::types::{Form, Schema};

static REGISTRY: Lazy<RwLock<HashMap<String, Arc<Schema>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Register a schema under `name`, returning the shared handle.
pub fn register(name: impl Into<String>, schema: Schema) -> Arc<Schema> {
    let name = name.into();
    let handle = Arc::new(schema);
    tracing::debug!(name = %name, "registering schema");
    REGISTRY.write().insert(name, Arc::clone(&handle));
    handle
}

/// Look up a registered schema.
#[must_use]
pub fn resolve(name: &str) -> Option<Arc<Schema>> {
    REGISTRY.read().get(name).cloned()
}

/// Two-phase construction for a self-referencing schema.
///
/// The closure receives a `Ref` node usable anywhere inside the body being
/// built; the finished schema is registered under `id` once the closure
/// returns, which is when those refs become resolvable.
///
/// # Example
///
/// ```
/// use jsondef::builder::{elements, object, recursive, string};
///
/// let tree = recursive("Category", |node| {
///     object([("name", string()), ("children", elements(node))])
/// });
/// assert_eq!(tree.id(), Some("Category"));
/// ```
pub fn recursive(id: impl Into<String>, build: impl FnOnce(Schema) -> Schema) -> Schema {
    let id = id.into();
    let placeholder = Schema::new(Form::Ref(id.clone()));
    let mut schema = build(placeholder);
    if schema.id().is_none() {
        schema = schema.with_id(id.clone());
    }
    register(id, schema.clone());
    schema
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::ScalarType;

    #[test]
    fn register_then_resolve() {
        register("registry_test_string", Schema::new(Form::Type(ScalarType::String)));
        let found = resolve("registry_test_string").unwrap();
        assert_eq!(found.scalar_type(), Some(ScalarType::String));
        assert!(resolve("registry_test_missing").is_none());
    }

    #[test]
    fn last_writer_wins() {
        register("registry_test_clash", Schema::new(Form::Type(ScalarType::String)));
        register("registry_test_clash", Schema::new(Form::Type(ScalarType::Boolean)));
        let found = resolve("registry_test_clash").unwrap();
        assert_eq!(found.scalar_type(), Some(ScalarType::Boolean));
    }

    #[test]
    fn recursive_registers_under_id() {
        let schema = recursive("registry_test_rec", |node| {
            Schema::new(Form::Elements(Box::new(node)))
        });
        assert_eq!(schema.id(), Some("registry_test_rec"));
        assert!(resolve("registry_test_rec").is_some());
    }
}
