pub use crate::context::{provide_context, use_context};
pub use crate::effects::{Dispose, create_effect, effect};
pub use crate::reactive::{batch, untrack};
pub use crate::scope::{Scope, current_scope};
pub use crate::signal::{Signal, signal};
