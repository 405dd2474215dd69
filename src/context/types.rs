/*!
 * Context Types
 * The mutable scheduling unit and its per-ring scheduler entities
 */

use crate::core::types::{ConnectionId, ContextId, HwIp};
use crate::priority::SchedPriority;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Scheduler entity a context owns on one hardware ring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedEntity {
    pub ring: HwIp,
    pub priority: SchedPriority,
    /// Compute entities move to a high priority pipe for `HighHW`
    pub high_priority_pipe: bool,
}

impl SchedEntity {
    fn new(ring: HwIp, priority: SchedPriority) -> Self {
        let mut entity = Self {
            ring,
            priority,
            high_priority_pipe: false,
        };
        entity.apply(priority);
        entity
    }

    fn apply(&mut self, priority: SchedPriority) {
        self.priority = priority;
        self.high_priority_pipe = self.ring == HwIp::Compute && priority.needs_hw_queue();
    }
}

#[derive(Debug)]
struct PriorityState {
    override_priority: SchedPriority,
    entities: Vec<SchedEntity>,
}

/// Submission context
///
/// Run queues read the entity priorities concurrently with overrides; all
/// priority state sits behind one lock so an override lands on every entity
/// or on none.
#[derive(Debug)]
pub struct Context {
    id: ContextId,
    owner: ConnectionId,
    init_priority: SchedPriority,
    state: Mutex<PriorityState>,
}

impl Context {
    /// Create a context; an `Unset` init priority is treated as `Normal`
    pub fn new(id: ContextId, owner: ConnectionId, init_priority: SchedPriority) -> Self {
        let init_priority = if init_priority.is_set() {
            init_priority
        } else {
            SchedPriority::Normal
        };

        let entities = HwIp::ALL
            .iter()
            .map(|&ring| SchedEntity::new(ring, init_priority))
            .collect();

        Self {
            id,
            owner,
            init_priority,
            state: Mutex::new(PriorityState {
                override_priority: SchedPriority::Unset,
                entities,
            }),
        }
    }

    #[inline]
    pub fn id(&self) -> ContextId {
        self.id
    }

    /// Connection whose registry created this context
    #[inline]
    pub fn owner(&self) -> ConnectionId {
        self.owner
    }

    #[inline]
    pub fn init_priority(&self) -> SchedPriority {
        self.init_priority
    }

    /// Override currently in force, `Unset` if none
    pub fn override_priority(&self) -> SchedPriority {
        self.state.lock().override_priority
    }

    /// Priority the run queues schedule this context at
    pub fn priority(&self) -> SchedPriority {
        self.effective(self.state.lock().override_priority)
    }

    /// Install `priority` as the override and push the resulting effective
    /// priority to every entity; returns the effective priority
    pub fn set_priority(&self, priority: SchedPriority) -> SchedPriority {
        let effective = self.effective(priority);
        let mut state = self.state.lock();
        state.override_priority = priority;
        for entity in state.entities.iter_mut() {
            entity.apply(effective);
        }
        drop(state);

        debug!(
            ctx = self.id,
            owner = self.owner,
            override_priority = %priority,
            effective = %effective,
            "context priority set"
        );
        effective
    }

    /// Copy of the per-ring entities
    pub fn entities(&self) -> Vec<SchedEntity> {
        self.state.lock().entities.clone()
    }

    /// Consistent snapshot of the priority state
    pub fn snapshot(&self) -> ContextSnapshot {
        let state = self.state.lock();
        ContextSnapshot {
            id: self.id,
            owner: self.owner,
            init_priority: self.init_priority,
            override_priority: state.override_priority,
            priority: self.effective(state.override_priority),
            entities: state.entities.clone(),
        }
    }

    #[inline]
    fn effective(&self, override_priority: SchedPriority) -> SchedPriority {
        if override_priority.is_set() {
            override_priority
        } else {
            self.init_priority
        }
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        debug!(ctx = self.id, owner = self.owner, "context destroyed");
    }
}

/// Serializable view of a context's priority state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextSnapshot {
    pub id: ContextId,
    pub owner: ConnectionId,
    pub init_priority: SchedPriority,
    pub override_priority: SchedPriority,
    pub priority: SchedPriority,
    pub entities: Vec<SchedEntity>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unset_init_is_normal() {
        let ctx = Context::new(1, 1, SchedPriority::Unset);
        assert_eq!(ctx.init_priority(), SchedPriority::Normal);
        assert_eq!(ctx.priority(), SchedPriority::Normal);
    }

    #[test]
    fn test_override_and_restore() {
        let ctx = Context::new(1, 1, SchedPriority::Low);
        assert_eq!(ctx.set_priority(SchedPriority::HighSW), SchedPriority::HighSW);
        assert_eq!(ctx.priority(), SchedPriority::HighSW);
        assert_eq!(ctx.override_priority(), SchedPriority::HighSW);

        // Clearing the override falls back to the init priority
        assert_eq!(ctx.set_priority(SchedPriority::Unset), SchedPriority::Low);
        assert_eq!(ctx.priority(), SchedPriority::Low);
        assert_eq!(ctx.override_priority(), SchedPriority::Unset);
    }

    #[test]
    fn test_entities_follow_override() {
        let ctx = Context::new(2, 1, SchedPriority::Normal);
        ctx.set_priority(SchedPriority::HighHW);

        let entities = ctx.entities();
        assert_eq!(entities.len(), HwIp::ALL.len());
        assert!(entities.iter().all(|e| e.priority == SchedPriority::HighHW));

        let pipes: Vec<HwIp> = entities
            .iter()
            .filter(|e| e.high_priority_pipe)
            .map(|e| e.ring)
            .collect();
        assert_eq!(pipes, vec![HwIp::Compute]);

        ctx.set_priority(SchedPriority::HighSW);
        assert!(ctx.entities().iter().all(|e| !e.high_priority_pipe));
    }

    #[test]
    fn test_snapshot() {
        let ctx = Context::new(7, 3, SchedPriority::Normal);
        ctx.set_priority(SchedPriority::Low);
        let snapshot = ctx.snapshot();
        assert_eq!(snapshot.id, 7);
        assert_eq!(snapshot.owner, 3);
        assert_eq!(snapshot.priority, SchedPriority::Low);
        assert_eq!(snapshot.init_priority, SchedPriority::Normal);

        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: ContextSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, snapshot);
    }
}
