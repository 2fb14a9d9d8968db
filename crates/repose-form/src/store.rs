use std::collections::BTreeMap;

use repose_core::Signal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::path;

/// The single nested value holding every field, keyed by dotted name.
///
/// Writes mutate in place and always notify: a mutated container compares
/// equal to itself, so equality could never detect the change.
#[derive(Clone, Debug)]
pub struct FormStore {
    values: Signal<Value>,
}

impl FormStore {
    pub fn new() -> Self {
        Self {
            values: Signal::new(Value::Object(Map::new())),
        }
    }

    /// Tracked read of one field.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.values.with(|root| path::get(root, name).cloned())
    }

    pub fn set(&self, name: &str, value: Value) {
        self.values.update(|root| path::set(root, name, value));
    }

    /// Tracked clone of the whole store.
    pub fn values(&self) -> Value {
        self.values.get()
    }

    /// Untracked clone, used as the submission payload.
    pub fn snapshot(&self) -> Value {
        self.values.get_untracked()
    }
}

impl Default for FormStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Field name → current validation message.
///
/// A missing key and a `None` entry both mean the field is valid.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorMap(BTreeMap<String, Option<String>>);

impl ErrorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(|m| m.as_deref())
    }

    pub fn is_valid(&self, name: &str) -> bool {
        self.message(name).is_none()
    }

    pub fn has_errors(&self) -> bool {
        self.0.values().any(Option::is_some)
    }

    pub fn set(&mut self, name: impl Into<String>, message: Option<String>) {
        self.0.insert(name.into(), message);
    }

    /// Marks each of `names` valid.
    pub fn clear_fields<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) {
        for name in names {
            if self.0.contains_key(name) {
                self.0.insert(name.to_string(), None);
            }
        }
    }

    /// Names that currently carry a message, in key order.
    pub fn invalid_fields(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .filter(|(_, m)| m.is_some())
            .map(|(name, _)| name.as_str())
    }
}

impl<K: Into<String>> FromIterator<(K, Option<String>)> for ErrorMap {
    fn from_iter<I: IntoIterator<Item = (K, Option<String>)>>(iter: I) -> Self {
        let mut map = ErrorMap::new();
        for (k, v) in iter {
            map.set(k, v);
        }
        map
    }
}

/// Reactive holder of the current `ErrorMap`.
///
/// Every write builds a new map from the current one and commits it only if
/// it differs, so observers wake only when a message actually changed.
#[derive(Clone, Debug)]
pub struct ErrorStore {
    errors: Signal<ErrorMap>,
}

impl ErrorStore {
    pub fn new() -> Self {
        Self {
            errors: Signal::new(ErrorMap::new()),
        }
    }

    /// Tracked read.
    pub fn get(&self) -> ErrorMap {
        self.errors.get()
    }

    /// Tracked read of one field's message.
    pub fn message(&self, name: &str) -> Option<String> {
        self.errors.with(|e| e.message(name).map(str::to_string))
    }

    pub fn merge(&self, name: &str, message: Option<String>) -> bool {
        self.update(|errors| {
            let mut next = errors.clone();
            next.set(name, message);
            next
        })
    }

    pub fn replace(&self, errors: ErrorMap) -> bool {
        self.errors.set_if_changed(errors)
    }

    /// Read-modify-write against the current value.
    pub fn update(&self, updater: impl FnOnce(&ErrorMap) -> ErrorMap) -> bool {
        let next = self.errors.with_untracked(updater);
        self.errors.set_if_changed(next)
    }
}

impl Default for ErrorStore {
    fn default() -> Self {
        Self::new()
    }
}
