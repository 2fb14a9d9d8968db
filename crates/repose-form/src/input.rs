use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Called with the raw text after every user edit.
pub type InputHandler = Rc<dyn Fn(String)>;

/// The concrete control a field drives.
pub trait FieldInput {
    fn value(&self) -> String;
    /// Programmatic write. Does not fire the input handler.
    fn set_value(&self, value: &str);
    fn set_default_value(&self, value: &str);
    fn focus(&self);
    fn is_focused(&self) -> bool;
    /// Replaces the edit handler; `None` detaches it.
    fn set_input_handler(&self, handler: Option<InputHandler>);
}

/// Mints headless inputs and tracks which one has focus.
#[derive(Clone, Default)]
pub struct InputHost {
    inner: Rc<HostInner>,
}

#[derive(Default)]
struct HostInner {
    next_id: Cell<u64>,
    focused: Cell<Option<u64>>,
}

impl InputHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text_input(&self) -> Rc<TextInput> {
        let id = self.inner.next_id.get() + 1;
        self.inner.next_id.set(id);
        Rc::new(TextInput {
            id,
            host: self.inner.clone(),
            state: RefCell::new(TextInputState::default()),
            handler: RefCell::new(None),
        })
    }

    pub fn focused(&self) -> Option<u64> {
        self.inner.focused.get()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextInputState {
    pub value: String,
    pub default_value: String,
    /// Set once the value was typed or written programmatically; from then on
    /// the default no longer shows through.
    pub dirty: bool,
}

/// Headless text input with HTML-like default value semantics.
pub struct TextInput {
    id: u64,
    host: Rc<HostInner>,
    state: RefCell<TextInputState>,
    handler: RefCell<Option<InputHandler>>,
}

impl TextInput {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn state(&self) -> TextInputState {
        self.state.borrow().clone()
    }

    pub fn has_handler(&self) -> bool {
        self.handler.borrow().is_some()
    }

    /// Simulates the user replacing the text, then fires the edit handler.
    pub fn type_text(&self, text: &str) {
        {
            let mut st = self.state.borrow_mut();
            st.value = text.to_string();
            st.dirty = true;
        }
        let handler = self.handler.borrow().clone();
        if let Some(handler) = handler {
            handler(text.to_string());
        }
    }
}

impl FieldInput for TextInput {
    fn value(&self) -> String {
        self.state.borrow().value.clone()
    }

    fn set_value(&self, value: &str) {
        let mut st = self.state.borrow_mut();
        st.value = value.to_string();
        st.dirty = true;
    }

    fn set_default_value(&self, value: &str) {
        let mut st = self.state.borrow_mut();
        st.default_value = value.to_string();
        if !st.dirty {
            st.value = value.to_string();
        }
    }

    fn focus(&self) {
        self.host.focused.set(Some(self.id));
    }

    fn is_focused(&self) -> bool {
        self.host.focused.get() == Some(self.id)
    }

    fn set_input_handler(&self, handler: Option<InputHandler>) {
        *self.handler.borrow_mut() = handler;
    }
}

impl fmt::Debug for TextInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextInput")
            .field("id", &self.id)
            .field("state", &*self.state.borrow())
            .field("focused", &self.is_focused())
            .finish()
    }
}
