use std::collections::BTreeMap;
use std::rc::Rc;

use repose_core::{Dispose, Signal};
use serde_json::Value;

use crate::input::FieldInput;

/// A live binding of one field name to its value cell and input.
pub struct FieldRegistration {
    /// Written by `FormController::set_value`; starts as `null`.
    pub(crate) cell: Signal<Value>,
    pub(crate) input: Rc<dyn FieldInput>,
    pub(crate) generation: u64,
    pub(crate) dispose: Dispose,
}

#[derive(Default)]
pub struct FieldRegistry {
    fields: BTreeMap<String, FieldRegistration>,
    next_generation: u64,
}

impl FieldRegistry {
    pub fn next_generation(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    pub fn insert(&mut self, name: String, registration: FieldRegistration) {
        self.fields.insert(name, registration);
    }

    pub fn take(&mut self, name: &str) -> Option<FieldRegistration> {
        self.fields.remove(name)
    }

    /// Removes `name` only if it still belongs to `generation`.
    pub fn release(&mut self, name: &str, generation: u64) -> bool {
        if self.fields.get(name).is_some_and(|r| r.generation == generation) {
            self.fields.remove(name);
            true
        } else {
            false
        }
    }

    pub fn cell(&self, name: &str) -> Option<Signal<Value>> {
        self.fields.get(name).map(|r| r.cell.clone())
    }

    pub fn input(&self, name: &str) -> Option<Rc<dyn FieldInput>> {
        self.fields.get(name).map(|r| r.input.clone())
    }

    pub fn is_focused(&self, name: &str) -> bool {
        self.fields.get(name).is_some_and(|r| r.input.is_focused())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub(crate) fn drain(&mut self) -> Vec<FieldRegistration> {
        std::mem::take(&mut self.fields).into_values().collect()
    }
}
