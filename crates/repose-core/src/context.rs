//! # Context
//!
//! A typed stack of values visible to everything composed inside
//! `provide_context`. It replaces ambient globals: a value is only reachable
//! while its frame is on the stack.
//!
//! ```rust
//! use repose_core::*;
//!
//! #[derive(Clone, PartialEq, Debug)]
//! struct Locale(&'static str);
//!
//! assert_eq!(use_context::<Locale>(), None);
//! provide_context(Locale("de"), || {
//!     assert_eq!(use_context::<Locale>(), Some(Locale("de")));
//! });
//! ```

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;

thread_local! {
    static CONTEXT_STACK: RefCell<Vec<HashMap<TypeId, Box<dyn Any>>>> = RefCell::new(Vec::new());
}

/// Makes `value` visible to `use_context::<T>()` for the duration of `f`.
pub fn provide_context<T: Clone + 'static, R>(value: T, f: impl FnOnce() -> R) -> R {
    // Non-panicking frame guard (ensures pop on unwind)
    struct Guard;
    impl Drop for Guard {
        fn drop(&mut self) {
            CONTEXT_STACK.with(|st| {
                st.borrow_mut().pop();
            });
        }
    }

    CONTEXT_STACK.with(|st| {
        let mut frame: HashMap<TypeId, Box<dyn Any>> = HashMap::new();
        frame.insert(TypeId::of::<T>(), Box::new(value));
        st.borrow_mut().push(frame);
    });
    let _guard = Guard;
    f()
}

/// Innermost provided value of type `T`.
pub fn use_context<T: Clone + 'static>() -> Option<T> {
    CONTEXT_STACK.with(|st| {
        for frame in st.borrow().iter().rev() {
            if let Some(v) = frame.get(&TypeId::of::<T>())
                && let Some(v) = v.downcast_ref::<T>()
            {
                return Some(v.clone());
            }
        }
        None
    })
}
