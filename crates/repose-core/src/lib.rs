//! # Signals, Effects, and Scopes
//!
//! Repose uses a small reactive core. There are four pieces:
//!
//! - `Signal<T>`: observable, reactive value.
//! - `create_effect`: a side effect that re-runs when signals it read change.
//! - `Scope`: groups disposers so a whole subtree of effects can be torn down.
//! - `provide_context` / `use_context`: explicit, stack-scoped injection.
//!
//! ## Signals
//!
//! `Signal<T>` is a cloneable handle to a piece of state:
//!
//! ```rust
//! use repose_core::*;
//!
//! let count = signal(0);
//! count.set(1);
//! count.update(|v| *v += 1);
//! assert_eq!(count.get(), 2);
//! ```
//!
//! Reads participate in a dependency graph: when you call `get()` or `with()`
//! inside an effect, future writes to that signal re-run the effect.
//! `set` and `update` always notify; `set_if_changed` skips notification when
//! the new value equals the old one.
//!
//! ## Effects and cleanup
//!
//! ```rust
//! use repose_core::*;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let name = signal("Jane".to_string());
//! let runs = Rc::new(Cell::new(0));
//!
//! let scope = Scope::new();
//! scope.run(|| {
//!     let name = name.clone();
//!     let runs = runs.clone();
//!     create_effect(move || {
//!         let _ = name.get();
//!         runs.set(runs.get() + 1);
//!     });
//! });
//!
//! name.set("John".into());
//! assert_eq!(runs.get(), 2);
//!
//! scope.dispose();
//! name.set("Jim".into());
//! assert_eq!(runs.get(), 2);
//! ```
//!
//! - `create_effect` runs immediately and returns a `Dispose` guard.
//! - Effects created inside `Scope::run` are disposed with the scope.
//!
//! ## Batching
//!
//! `batch(|| ..)` defers every effect notified inside the closure until it
//! returns; each deferred effect then runs once.

pub mod context;
pub mod effects;
pub mod prelude;
pub mod reactive;
pub mod scope;
pub mod signal;

pub use context::*;
pub use effects::*;
pub use prelude::*;
pub use reactive::{ObserverId, SignalId, batch, untrack};
pub use scope::*;
pub use signal::*;
