/*!
 * Context Module
 * Submission contexts and the per-connection registry that owns them
 */

mod guard;
mod registry;
pub mod types;

pub use guard::ContextGuard;
pub use registry::ContextRegistry;
pub use types::{Context, ContextSnapshot, SchedEntity};
