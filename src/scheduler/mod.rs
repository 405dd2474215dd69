/*!
 * Scheduler Module
 * Priority override requests: validation, dispatch and application
 */

mod dispatch;
mod engine;
mod stats;
pub mod traits;
pub mod types;

// Re-export public API
pub use dispatch::Dispatcher;
pub use engine::OverrideEngine;
pub use stats::{OverrideStats, StatsSnapshot};
pub use traits::PriorityOverride;
pub use types::{SchedOp, SchedRequest};
