/*!
 * Context Registry
 * Per-connection table of live contexts behind a single mutex
 */

use super::guard::ContextGuard;
use super::types::Context;
use crate::core::errors::{SchedError, SchedResult};
use crate::core::limits::FIRST_CONTEXT_ID;
use crate::core::types::{ConnectionId, ContextId};
use crate::priority::SchedPriority;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Context id → context map of one connection
///
/// The map never leaves the lock: callers get either a counted reference
/// (`get`) or a closure run with the lock held (`for_each`).
pub struct ContextRegistry {
    owner: ConnectionId,
    max_contexts: u32,
    contexts: Mutex<BTreeMap<ContextId, Arc<Context>>>,
}

impl ContextRegistry {
    pub fn new(owner: ConnectionId, max_contexts: u32) -> Self {
        Self {
            owner,
            max_contexts,
            contexts: Mutex::new(BTreeMap::new()),
        }
    }

    /// Register a new context at the lowest free id
    pub fn create(&self, init_priority: SchedPriority) -> SchedResult<ContextId> {
        let mut contexts = self.contexts.lock();

        let mut id = FIRST_CONTEXT_ID;
        for &used in contexts.keys() {
            if used != id {
                break;
            }
            id += 1;
        }
        if id > self.max_contexts {
            return Err(SchedError::ContextLimit(self.max_contexts));
        }

        contexts.insert(id, Arc::new(Context::new(id, self.owner, init_priority)));
        debug!(owner = self.owner, ctx = id, init = %init_priority, "context created");
        Ok(id)
    }

    /// Look up `id` and take a reference that outlives the lock
    pub fn get(&self, id: ContextId) -> Option<ContextGuard> {
        let contexts = self.contexts.lock();
        contexts.get(&id).map(|ctx| ContextGuard::new(Arc::clone(ctx)))
    }

    /// Unregister `id`; the context is destroyed once outstanding
    /// references drop
    pub fn remove(&self, id: ContextId) -> Option<Arc<Context>> {
        let removed = self.contexts.lock().remove(&id);
        if removed.is_some() {
            debug!(owner = self.owner, ctx = id, "context unregistered");
        }
        removed
    }

    /// Visit every registered context with the registry lock held for the
    /// whole walk; returns the number visited
    ///
    /// Registration and removal on this registry block until `f` has seen
    /// every entry, so `f` must not call back into the registry.
    pub fn for_each<F>(&self, mut f: F) -> usize
    where
        F: FnMut(ContextId, &Context),
    {
        let contexts = self.contexts.lock();
        for (&id, ctx) in contexts.iter() {
            f(id, ctx);
        }
        contexts.len()
    }

    /// Registered ids, ascending
    pub fn ids(&self) -> Vec<ContextId> {
        self.contexts.lock().keys().copied().collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.contexts.lock().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn owner(&self) -> ConnectionId {
        self.owner
    }
}

impl Drop for ContextRegistry {
    fn drop(&mut self) {
        let remaining = self.contexts.get_mut().len();
        if remaining > 0 {
            debug!(owner = self.owner, remaining, "registry torn down with live contexts");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ids_start_at_one_and_reuse_gaps() {
        let registry = ContextRegistry::new(1, 16);
        assert_eq!(registry.create(SchedPriority::Normal).unwrap(), 1);
        assert_eq!(registry.create(SchedPriority::Normal).unwrap(), 2);
        assert_eq!(registry.create(SchedPriority::Normal).unwrap(), 3);

        assert!(registry.remove(2).is_some());
        assert_eq!(registry.create(SchedPriority::Low).unwrap(), 2);
        assert_eq!(registry.ids(), vec![1, 2, 3]);
    }

    #[test]
    fn test_context_limit() {
        let registry = ContextRegistry::new(1, 2);
        registry.create(SchedPriority::Normal).unwrap();
        registry.create(SchedPriority::Normal).unwrap();
        assert_eq!(
            registry.create(SchedPriority::Normal),
            Err(SchedError::ContextLimit(2))
        );
    }

    #[test]
    fn test_get_takes_reference() {
        let registry = ContextRegistry::new(1, 16);
        let id = registry.create(SchedPriority::Normal).unwrap();

        let guard = registry.get(id).unwrap();
        assert_eq!(guard.id(), id);
        assert_eq!(guard.ref_count(), 2);

        let second = guard.clone();
        assert_eq!(second.ref_count(), 3);
        drop(second);
        assert_eq!(guard.ref_count(), 2);

        assert!(registry.get(id + 1).is_none());
    }

    #[test]
    fn test_reference_survives_removal() {
        let registry = ContextRegistry::new(1, 16);
        let id = registry.create(SchedPriority::Low).unwrap();

        let guard = registry.get(id).unwrap();
        drop(registry.remove(id));

        assert!(guard.is_last_ref());
        guard.set_priority(SchedPriority::HighSW);
        assert_eq!(guard.priority(), SchedPriority::HighSW);
        assert!(registry.get(id).is_none());
    }

    #[test]
    fn test_for_each_visits_all() {
        let registry = ContextRegistry::new(9, 16);
        for _ in 0..4 {
            registry.create(SchedPriority::Normal).unwrap();
        }

        let mut seen = Vec::new();
        let visited = registry.for_each(|id, ctx| {
            assert_eq!(ctx.owner(), 9);
            seen.push(id);
        });

        assert_eq!(visited, 4);
        assert_eq!(seen, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_for_each_empty() {
        let registry = ContextRegistry::new(1, 16);
        assert_eq!(registry.for_each(|_, _| panic!("no contexts")), 0);
        assert!(registry.is_empty());
    }
}
