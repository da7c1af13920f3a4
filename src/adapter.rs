//! Generic validator adapter.
//!
//! A minimal interop surface for frameworks that want one
//! `validate(input) -> value-or-issues` entry point per schema without
//! knowing anything about this crate's schema model. Internal
//! [`crate::ValueError`]s map to [`Issue`]s whose `path` is the instance
//! path split into segments, empty segments filtered out.

use serde::Serialize;

use crate::schema::Schema;
use crate::value::Value;

/// One reported problem.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Issue {
    pub message: String,
    pub path: Vec<String>,
}

/// Outcome of an adapter validation.
#[derive(Clone, Debug, PartialEq)]
pub enum Validated {
    Valid { value: Value },
    Invalid { issues: Vec<Issue> },
}

impl Validated {
    /// The decoded value, when validation succeeded.
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Valid { value } => Some(value),
            Self::Invalid { .. } => None,
        }
    }

    /// The issues, when validation failed. Never empty in that case.
    #[must_use]
    pub fn issues(&self) -> Option<&[Issue]> {
        match self {
            Self::Valid { .. } => None,
            Self::Invalid { issues } => Some(issues),
        }
    }
}

impl Schema {
    /// Adapter entry point: decode `input` and report either the typed
    /// value or the mapped issue list.
    #[must_use]
    pub fn check(&self, input: &serde_json::Value) -> Validated {
        match self.parse_value(input) {
            Ok(value) => Validated::Valid { value },
            Err(failure) => Validated::Invalid {
                issues: failure
                    .into_errors()
                    .into_iter()
                    .map(|error| Issue {
                        message: error.message,
                        path: error
                            .instance_path
                            .split('/')
                            .filter(|segment| !segment.is_empty())
                            .map(str::to_owned)
                            .collect(),
                    })
                    .collect(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder;
    use serde_json::json;

    #[test]
    fn valid_input_yields_value() {
        let schema = builder::object([("id", builder::string())]);
        let outcome = schema.check(&json!({"id": "a"}));
        assert!(outcome.value().is_some());
        assert!(outcome.issues().is_none());
    }

    #[test]
    fn issue_paths_drop_empty_segments() {
        let schema = builder::object([("user", builder::object([("name", builder::string())]))]);
        let outcome = schema.check(&json!({"user": {"name": 1}}));
        let issues = outcome.issues().unwrap();
        assert_eq!(issues[0].path, vec!["user".to_string(), "name".to_string()]);
    }

    #[test]
    fn root_error_has_empty_path() {
        let schema = builder::string();
        let outcome = schema.check(&json!(42));
        let issues = outcome.issues().unwrap();
        assert!(issues[0].path.is_empty());
    }
}
