/*!
 * Priority Module
 * External priority levels, scheduler priorities, and the mapping between them
 */

mod translate;
pub mod types;

pub use translate::translate;
pub use types::{PriorityLevel, SchedPriority};
