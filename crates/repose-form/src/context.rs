use repose_core::{provide_context, use_context};

use crate::controller::FormController;

/// Makes `form` reachable through `use_form` for everything run inside `f`.
pub fn provide_form<R>(form: FormController, f: impl FnOnce() -> R) -> R {
    provide_context(form, f)
}

/// The innermost provided form, if any.
pub fn use_form() -> Option<FormController> {
    use_context::<FormController>()
}
