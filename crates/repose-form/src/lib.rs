//! # Forms
//!
//! Reactive form state on top of `repose-core` signals.
//!
//! A `FormController` owns one nested value store (fields addressed by dotted
//! names such as `cousine.0.name`), one error map, and the registry of bound
//! inputs. Each bound input validates its own field on every edit; submitting
//! validates everything and focuses the field the user should fix.
//!
//! ```rust
//! use repose_form::*;
//! use std::rc::Rc;
//!
//! let schema = JsonSchema::new(serde_json::json!({
//!     "type": "object",
//!     "properties": { "fname": { "type": "string", "minLength": 4, "maxLength": 20 } },
//!     "required": ["fname"]
//! }))
//! .unwrap();
//! let form = FormController::new(schema, FormConfig::default());
//!
//! let host = InputHost::new();
//! let fname = host.text_input();
//! let _binding = form.register("fname")(fname.clone());
//!
//! fname.type_text("Jo");
//! assert!(form.error("fname").is_some());
//!
//! let submit = form.handle_submit(|data| println!("{data}"));
//! let outcome = submit(&SubmitEvent::new());
//! assert!(!outcome.is_accepted());
//! assert!(fname.is_focused());
//!
//! fname.type_text("John");
//! assert_eq!(form.error("fname"), None);
//! assert!(submit(&SubmitEvent::new()).is_accepted());
//! ```
//!
//! Rules that span several fields are not the validator's business: write an
//! effect that reads `get_value` and calls `set_errors`.

pub mod context;
pub mod controller;
pub mod field;
pub mod input;
pub mod path;
pub mod schema;
pub mod store;
pub mod validation;
mod tests;

pub use context::{provide_form, use_form};
pub use controller::{
    DefaultValues, FormConfig, FormController, FormPhase, SubmitEvent, SubmitOutcome,
    SuccessErrors,
};
pub use field::{FieldRegistration, FieldRegistry};
pub use input::{FieldInput, InputHandler, InputHost, TextInput, TextInputState};
pub use schema::{Issue, JsonSchema, PathItem, Schema, SchemaError};
pub use store::{ErrorMap, ErrorStore, FormStore};
pub use validation::{FieldIssue, Validator};
