use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use repose_core::{Dispose, Scope, Signal, batch, create_effect};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::field::{FieldRegistration, FieldRegistry};
use crate::input::{FieldInput, InputHandler};
use crate::path::is_falsy;
use crate::schema::Schema;
use crate::store::{ErrorMap, ErrorStore, FormStore};
use crate::validation::Validator;

/// Flat field name → default text.
pub type DefaultValues = BTreeMap<String, String>;

/// What a successful submit does to messages left in the error map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuccessErrors {
    /// Leave every message in place.
    #[default]
    Preserve,
    ClearAll,
    /// Clear messages of registered fields only; keys owned by cross-field
    /// rules for unregistered names survive.
    ClearRegistered,
}

#[derive(Clone, Debug, Default)]
pub struct FormConfig {
    pub default_values: Option<Signal<DefaultValues>>,
    pub on_success: SuccessErrors,
}

impl FormConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_values(mut self, defaults: Signal<DefaultValues>) -> Self {
        self.default_values = Some(defaults);
        self
    }

    pub fn on_success(mut self, policy: SuccessErrors) -> Self {
        self.on_success = policy;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormPhase {
    Idle,
    /// Last field the user edited.
    Editing(String),
    Submitting,
}

/// Passed to the submit handler; stands in for the native submit event.
#[derive(Debug, Default)]
pub struct SubmitEvent {
    default_prevented: Cell<bool>,
}

impl SubmitEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SubmitOutcome {
    /// Validation passed; carries the payload handed to the callback.
    Accepted(Value),
    Rejected {
        errors: ErrorMap,
        /// The field whose input received focus, if it is registered.
        focused: Option<String>,
    },
}

impl SubmitOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmitOutcome::Accepted(_))
    }
}

/// One form instance: values, errors, registered fields, and submission.
///
/// Cloning shares the same form.
#[derive(Clone)]
pub struct FormController {
    inner: Rc<FormInner>,
}

struct FormInner {
    validator: Validator,
    values: FormStore,
    errors: ErrorStore,
    registry: RefCell<FieldRegistry>,
    config: FormConfig,
    phase: RefCell<FormPhase>,
}

impl Drop for FormInner {
    fn drop(&mut self) {
        for registration in self.registry.get_mut().drain() {
            registration.dispose.run();
        }
    }
}

fn display_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl FormController {
    pub fn new(schema: impl Schema + 'static, config: FormConfig) -> Self {
        Self::with_validator(Validator::new(schema), config)
    }

    pub fn with_validator(validator: Validator, config: FormConfig) -> Self {
        Self {
            inner: Rc::new(FormInner {
                validator,
                values: FormStore::new(),
                errors: ErrorStore::new(),
                registry: RefCell::new(FieldRegistry::default()),
                config,
                phase: RefCell::new(FormPhase::Idle),
            }),
        }
    }

    fn from_weak(weak: &Weak<FormInner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    /// Returns the binder for `name`. Binding an input wires it to the form
    /// and yields a guard that tears the binding down.
    ///
    /// Binding the same name again disposes the previous binding first.
    pub fn register(
        &self,
        name: impl Into<String>,
    ) -> impl FnOnce(Rc<dyn FieldInput>) -> Dispose {
        let form = self.clone();
        let name = name.into();
        move |input| form.bind(name, input)
    }

    fn bind(&self, name: String, input: Rc<dyn FieldInput>) -> Dispose {
        let previous = self.inner.registry.borrow_mut().take(&name);
        if let Some(previous) = previous {
            log::debug!("re-registering field `{name}`; disposing previous binding");
            previous.dispose.run();
        }

        let generation = self.inner.registry.borrow_mut().next_generation();
        let cell = Signal::new(Value::Null);
        let weak = Rc::downgrade(&self.inner);
        let scope = Scope::new();

        let dispose = Dispose::new({
            let scope = scope.clone();
            let input = input.clone();
            let weak = weak.clone();
            let name = name.clone();
            move || {
                scope.dispose();
                input.set_input_handler(None);
                if let Some(inner) = weak.upgrade()
                    && let Ok(mut registry) = inner.registry.try_borrow_mut()
                {
                    registry.release(&name, generation);
                }
            }
        });
        self.inner.registry.borrow_mut().insert(
            name.clone(),
            FieldRegistration {
                cell: cell.clone(),
                input: input.clone(),
                generation,
                dispose: dispose.clone(),
            },
        );
        log::debug!("registered field `{name}` (generation {generation})");

        let handler: InputHandler = Rc::new({
            let weak = weak.clone();
            let name = name.clone();
            move |raw: String| {
                if let Some(form) = FormController::from_weak(&weak) {
                    form.handle_input(&name, raw);
                }
            }
        });
        input.set_input_handler(Some(handler));

        scope.run(|| {
            // Apply the default for this name and mirror what the input shows.
            create_effect({
                let defaults = self.inner.config.default_values.clone();
                let weak = weak.clone();
                let name = name.clone();
                let input = input.clone();
                move || {
                    let default = defaults
                        .as_ref()
                        .and_then(|d| d.with(|m| m.get(&name).cloned()))
                        .unwrap_or_default();
                    input.set_default_value(&default);
                    if let Some(inner) = weak.upgrade() {
                        inner.values.set(&name, Value::String(input.value()));
                    }
                }
            });

            // Push programmatic values into the input. Falsy values are
            // skipped so the initial `null` never clobbers real input.
            create_effect({
                let weak = weak.clone();
                move || {
                    let value = cell.get();
                    if is_falsy(&value) {
                        return;
                    }
                    input.set_value(&display_text(&value));
                    if let Some(inner) = weak.upgrade() {
                        inner.values.set(&name, value);
                    }
                }
            });
        });

        dispose
    }

    /// One user edit: store write, then field validation, then error merge.
    /// Store write, field validation, then merge. Effects that read the
    /// stores run once the merge is done.
    fn handle_input(&self, name: &str, raw: String) {
        *self.inner.phase.borrow_mut() = FormPhase::Editing(name.to_string());
        batch(|| {
            self.inner.values.set(name, Value::String(raw.clone()));
            let message = self.inner.validator.validate_field(name, &raw);
            log::trace!("field `{name}` validated: {message:?}");
            self.inner.errors.merge(name, message);
        });
    }

    /// Tracked read of the value at `name`.
    pub fn get_value(&self, name: &str) -> Option<Value> {
        self.inner.values.get(name)
    }

    /// Writes through the field's own cell. Unregistered names are ignored.
    pub fn set_value(&self, name: &str, value: impl Into<Value>) {
        let cell = self.inner.registry.borrow().cell(name);
        match cell {
            Some(cell) => cell.set(value.into()),
            None => log::debug!("set_value on unregistered field `{name}` ignored"),
        }
    }

    /// Tracked clone of every value.
    pub fn values(&self) -> Value {
        self.inner.values.values()
    }

    /// Tracked read of the error map.
    pub fn errors(&self) -> ErrorMap {
        self.inner.errors.get()
    }

    /// Tracked read of one field's message.
    pub fn error(&self, name: &str) -> Option<String> {
        self.inner.errors.message(name)
    }

    /// Replaces the error map with `updater(current)`.
    pub fn set_errors(&self, updater: impl FnOnce(&ErrorMap) -> ErrorMap) {
        self.inner.errors.update(updater);
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.inner.registry.borrow().contains(name)
    }

    pub fn registered_fields(&self) -> Vec<String> {
        self.inner
            .registry
            .borrow()
            .names()
            .map(str::to_string)
            .collect()
    }

    pub fn phase(&self) -> FormPhase {
        self.inner.phase.borrow().clone()
    }

    /// Builds the submit handler. The handler always prevents the native
    /// submission, then validates the whole form.
    pub fn handle_submit(
        &self,
        on_success: impl Fn(Value) + 'static,
    ) -> impl Fn(&SubmitEvent) -> SubmitOutcome {
        let form = self.clone();
        move |event: &SubmitEvent| {
            event.prevent_default();
            form.submit(&on_success)
        }
    }

    fn submit(&self, on_success: &dyn Fn(Value)) -> SubmitOutcome {
        *self.inner.phase.borrow_mut() = FormPhase::Submitting;
        let snapshot = self.inner.values.snapshot();

        let outcome = match self.inner.validator.validate_form(&snapshot) {
            Ok(()) => {
                self.apply_success_policy();
                log::debug!("submit accepted");
                on_success(snapshot.clone());
                SubmitOutcome::Accepted(snapshot)
            }
            Err(issues) => {
                let mut errors = ErrorMap::new();
                let mut target: Option<String> = None;
                for (idx, issue) in issues.iter().enumerate() {
                    errors.set(issue.field.clone(), Some(issue.message.clone()));
                    // First issue, unless the user is already on an invalid field.
                    if idx == 0 || self.inner.registry.borrow().is_focused(&issue.field) {
                        target = Some(issue.field.clone());
                    }
                }
                log::debug!(
                    "submit rejected with {} issue(s); focus target {target:?}",
                    issues.len()
                );

                self.inner.errors.replace(errors.clone());

                let input = target
                    .as_deref()
                    .and_then(|name| self.inner.registry.borrow().input(name));
                let focused = match input {
                    Some(input) => {
                        input.focus();
                        target
                    }
                    None => None,
                };
                SubmitOutcome::Rejected { errors, focused }
            }
        };

        *self.inner.phase.borrow_mut() = FormPhase::Idle;
        outcome
    }

    fn apply_success_policy(&self) {
        match self.inner.config.on_success {
            SuccessErrors::Preserve => {}
            SuccessErrors::ClearAll => {
                self.inner.errors.replace(ErrorMap::new());
            }
            SuccessErrors::ClearRegistered => {
                let names = self.registered_fields();
                self.inner.errors.update(|errors| {
                    let mut next = errors.clone();
                    next.clear_fields(names.iter().map(String::as_str));
                    next
                });
            }
        }
    }
}

impl std::fmt::Debug for FormController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormController")
            .field("values", &self.inner.values.snapshot())
            .field("phase", &*self.inner.phase.borrow())
            .field("fields", &self.registered_fields())
            .finish()
    }
}
