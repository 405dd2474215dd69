/*!
 * Scheduler Traits
 * Interface definitions for priority override application
 */

use crate::core::errors::SchedResult;
use crate::core::types::ContextId;
use crate::driver::ConnectionState;
use crate::priority::SchedPriority;

/// Applies an already-translated priority to a resolved connection
pub trait PriorityOverride: Send + Sync {
    /// Override every context registered on `state`; returns how many were
    /// updated
    fn process_override(&self, state: &ConnectionState, priority: SchedPriority) -> usize;

    /// Override one context of `state`; returns its new effective priority
    fn context_override(
        &self,
        state: &ConnectionState,
        ctx_id: ContextId,
        priority: SchedPriority,
    ) -> SchedResult<SchedPriority>;
}
