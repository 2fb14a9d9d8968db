use std::rc::Rc;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::schema::{Issue, Schema};

/// A whole-form issue reduced to the top-level field it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

impl From<Issue> for FieldIssue {
    fn from(issue: Issue) -> Self {
        let field = issue
            .path
            .first()
            .map(|p| p.to_string())
            .unwrap_or_default();
        Self {
            field,
            message: issue.message,
        }
    }
}

/// Runs a `Schema` against one field or against the whole form.
#[derive(Clone)]
pub struct Validator {
    schema: Rc<dyn Schema>,
}

impl Validator {
    pub fn new(schema: impl Schema + 'static) -> Self {
        Self {
            schema: Rc::new(schema),
        }
    }

    /// Checks `{ name: raw }` against the schema restricted to `name`.
    ///
    /// Sibling fields are invisible here; rules spanning several fields
    /// belong to the consumer.
    pub fn validate_field(&self, name: &str, raw: &str) -> Option<String> {
        let picked = self.schema.pick(name);
        let mut obj = Map::new();
        obj.insert(name.to_string(), Value::String(raw.to_string()));
        match picked.validate(&Value::Object(obj)) {
            Ok(()) => None,
            Err(issues) => issues.into_iter().next().map(|i| i.message),
        }
    }

    pub fn validate_form(&self, values: &Value) -> Result<(), Vec<FieldIssue>> {
        self.schema
            .validate(values)
            .map_err(|issues| issues.into_iter().map(FieldIssue::from).collect())
    }
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator").finish_non_exhaustive()
    }
}
