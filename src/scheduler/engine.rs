/*!
 * Override Engine
 * Applies translated priorities to contexts of a resolved connection
 */

use super::stats::OverrideStats;
use super::traits::PriorityOverride;
use crate::core::errors::{SchedError, SchedResult};
use crate::core::types::ContextId;
use crate::driver::ConnectionState;
use crate::priority::SchedPriority;
use std::sync::Arc;
use tracing::info;

/// Override engine
///
/// Never fails once it starts mutating: the only failure, a missing context
/// id, is detected before any priority is written.
#[derive(Clone)]
pub struct OverrideEngine {
    stats: Arc<OverrideStats>,
}

impl OverrideEngine {
    pub fn new(stats: Arc<OverrideStats>) -> Self {
        Self { stats }
    }
}

impl Default for OverrideEngine {
    fn default() -> Self {
        Self::new(Arc::new(OverrideStats::new()))
    }
}

impl PriorityOverride for OverrideEngine {
    fn process_override(&self, state: &ConnectionState, priority: SchedPriority) -> usize {
        // Registry lock is held across the walk: no context can be freed
        // mid-update, and none registered after we return is covered
        let updated = state.contexts().for_each(|_, ctx| {
            ctx.set_priority(priority);
        });

        self.stats.record_process_override(updated);
        info!(
            connection = state.id(),
            pid = state.pid(),
            priority = %priority,
            contexts = updated,
            "process priority override applied"
        );
        updated
    }

    fn context_override(
        &self,
        state: &ConnectionState,
        ctx_id: ContextId,
        priority: SchedPriority,
    ) -> SchedResult<SchedPriority> {
        let ctx = state
            .contexts()
            .get(ctx_id)
            .ok_or(SchedError::ContextNotFound(ctx_id))?;

        let effective = ctx.set_priority(priority);
        ctx.put();

        self.stats.record_context_override();
        info!(
            connection = state.id(),
            pid = state.pid(),
            ctx = ctx_id,
            priority = %priority,
            effective = %effective,
            "context priority override applied"
        );
        Ok(effective)
    }
}
