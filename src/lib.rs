/*!
 * GPU Scheduler Priority Override
 * Privileged priority control for GPU submission contexts, exposed as a library
 */

pub mod context;
pub mod core;
pub mod driver;
pub mod handle;
pub mod monitoring;
pub mod priority;
pub mod scheduler;

// Re-exports
pub use crate::core::errors::*;
pub use crate::core::{Caller, OverrideConfig};
pub use context::{Context, ContextGuard, ContextRegistry};
pub use driver::{ConnectionState, Driver, HandleResolver, ResolveHandle, ResolvedConnection};
pub use handle::{HandleTable, OpenFile, ProcessTables};
pub use monitoring::init_tracing;
pub use priority::{translate, PriorityLevel, SchedPriority};
pub use scheduler::{Dispatcher, OverrideEngine, PriorityOverride, SchedOp, SchedRequest};
