//! Validation rules as JSON Schema.
//!
//! The form only needs two things from its rules: check one named field on
//! its own, and check the whole value store. `JsonSchema` provides both on
//! top of the `jsonschema` crate; anything else implementing `Schema` works
//! too.
//!
//! ```rust
//! use repose_form::schema::*;
//! use serde_json::json;
//!
//! let schema = JsonSchema::new(json!({
//!     "type": "object",
//!     "properties": { "fname": { "type": "string", "minLength": 4, "maxLength": 20 } },
//!     "required": ["fname"]
//! }))
//! .unwrap();
//!
//! let issues = schema.validate(&json!({ "fname": "Jo" })).unwrap_err();
//! assert_eq!(issues[0].message, "String must contain at least 4 character(s)");
//! ```

use std::fmt;
use std::rc::Rc;

use jsonschema::error::ValidationErrorKind;
use serde::Serialize;
use serde_json::{Map, Value, json};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("invalid schema: {0}")]
    Invalid(String),
    #[error("form schema must be an object schema with `properties`")]
    NotAnObject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PathItem {
    Key(String),
    Index(usize),
}

impl PathItem {
    /// One JSON Pointer token (`~1` is `/`, `~0` is `~`).
    fn from_pointer_token(token: &str) -> Self {
        if !token.is_empty()
            && token.bytes().all(|b| b.is_ascii_digit())
            && let Ok(i) = token.parse()
        {
            return PathItem::Index(i);
        }
        PathItem::Key(token.replace("~1", "/").replace("~0", "~"))
    }
}

impl fmt::Display for PathItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathItem::Key(k) => f.write_str(k),
            PathItem::Index(i) => write!(f, "{i}"),
        }
    }
}

/// One failed rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub path: Vec<PathItem>,
    pub message: String,
}

/// What a form needs from its validation rules.
pub trait Schema {
    /// A schema that checks only `name` and ignores every other key.
    fn pick(&self, name: &str) -> Rc<dyn Schema>;

    /// Every issue, in the order the validator reports them.
    fn validate(&self, value: &Value) -> Result<(), Vec<Issue>>;
}

/// Accepts everything. Picking a name the schema does not declare yields this.
struct Unconstrained;

impl Schema for Unconstrained {
    fn pick(&self, _name: &str) -> Rc<dyn Schema> {
        Rc::new(Unconstrained)
    }

    fn validate(&self, _value: &Value) -> Result<(), Vec<Issue>> {
        Ok(())
    }
}

/// An object schema compiled once with `jsonschema`.
pub struct JsonSchema {
    source: Value,
    validator: jsonschema::Validator,
}

impl JsonSchema {
    pub fn new(source: Value) -> Result<Self, SchemaError> {
        if !source.get("properties").is_some_and(Value::is_object) {
            return Err(SchemaError::NotAnObject);
        }
        let validator =
            jsonschema::validator_for(&source).map_err(|e| SchemaError::Invalid(e.to_string()))?;
        Ok(Self { source, validator })
    }

    pub fn source(&self) -> &Value {
        &self.source
    }

    fn is_required(&self, name: &str) -> bool {
        self.source
            .get("required")
            .and_then(Value::as_array)
            .is_some_and(|req| req.iter().any(|r| r.as_str() == Some(name)))
    }

    /// `{ properties: { name: .. }, required: [name]? }` plus any shared
    /// definitions the property may reference.
    fn sub_schema(&self, name: &str) -> Option<Value> {
        let property = self.source.get("properties")?.get(name)?.clone();

        let mut sub = Map::new();
        if let Some(draft) = self.source.get("$schema") {
            sub.insert("$schema".into(), draft.clone());
        }
        for defs in ["$defs", "definitions"] {
            if let Some(d) = self.source.get(defs) {
                sub.insert(defs.into(), d.clone());
            }
        }
        sub.insert("type".into(), json!("object"));
        let mut properties = Map::new();
        properties.insert(name.to_string(), property);
        sub.insert("properties".into(), Value::Object(properties));
        if self.is_required(name) {
            sub.insert("required".into(), json!([name]));
        }
        Some(Value::Object(sub))
    }
}

impl fmt::Debug for JsonSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonSchema")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

fn issue_from(error: &jsonschema::ValidationError<'_>) -> Issue {
    let mut path: Vec<PathItem> = error
        .instance_path
        .to_string()
        .split('/')
        .skip(1)
        .map(PathItem::from_pointer_token)
        .collect();

    let message = match &error.kind {
        ValidationErrorKind::Required { property } => {
            if let Some(p) = property.as_str() {
                path.push(PathItem::Key(p.to_string()));
            }
            "Required".to_string()
        }
        ValidationErrorKind::MinLength { limit } => {
            format!("String must contain at least {limit} character(s)")
        }
        ValidationErrorKind::MaxLength { limit } => {
            format!("String must contain at most {limit} character(s)")
        }
        _ => error.to_string(),
    };
    Issue { path, message }
}

impl Schema for JsonSchema {
    fn pick(&self, name: &str) -> Rc<dyn Schema> {
        let Some(sub) = self.sub_schema(name) else {
            return Rc::new(Unconstrained);
        };
        match JsonSchema::new(sub) {
            Ok(schema) => Rc::new(schema),
            Err(e) => {
                log::warn!("cannot restrict schema to `{name}`: {e}");
                Rc::new(Unconstrained)
            }
        }
    }

    fn validate(&self, value: &Value) -> Result<(), Vec<Issue>> {
        let issues: Vec<Issue> = self
            .validator
            .iter_errors(value)
            .map(|e| issue_from(&e))
            .collect();
        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }
}
