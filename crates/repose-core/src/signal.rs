use std::cell::RefCell;
use std::rc::Rc;

use crate::reactive::{self, SignalId};

/// Observable value. Cloning the handle shares the value.
pub struct Signal<T>(Rc<Inner<T>>);

struct Inner<T> {
    id: SignalId,
    value: RefCell<T>,
}

impl<T> Drop for Inner<T> {
    fn drop(&mut self) {
        reactive::drop_signal(self.id);
    }
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Signal<T> {
    pub fn new(value: T) -> Self {
        Self(Rc::new(Inner {
            id: reactive::new_signal(),
            value: RefCell::new(value),
        }))
    }

    /// Tracked read.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        reactive::register_signal_read(self.0.id);
        self.0.value.borrow().clone()
    }

    pub fn get_untracked(&self) -> T
    where
        T: Clone,
    {
        self.0.value.borrow().clone()
    }

    /// Tracked borrow of the current value.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        reactive::register_signal_read(self.0.id);
        f(&self.0.value.borrow())
    }

    pub fn with_untracked<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.0.value.borrow())
    }

    /// Replaces the value and notifies unconditionally.
    pub fn set(&self, v: T) {
        *self.0.value.borrow_mut() = v;
        reactive::signal_changed(self.0.id);
    }

    /// Mutates in place and notifies unconditionally.
    pub fn update<F: FnOnce(&mut T)>(&self, f: F) {
        f(&mut self.0.value.borrow_mut());
        reactive::signal_changed(self.0.id);
    }

    /// Replaces the value, notifying only when it differs from the old one.
    /// Returns whether observers were notified.
    pub fn set_if_changed(&self, v: T) -> bool
    where
        T: PartialEq,
    {
        {
            let mut cur = self.0.value.borrow_mut();
            if *cur == v {
                return false;
            }
            *cur = v;
        }
        reactive::signal_changed(self.0.id);
        true
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Signal").field(&*self.0.value.borrow()).finish()
    }
}

pub fn signal<T>(t: T) -> Signal<T> {
    Signal::new(t)
}
