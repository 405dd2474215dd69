/*!
 * Context References
 * Counted references on registered contexts
 */

use super::types::Context;
use crate::core::types::ContextId;
use std::ops::Deref;
use std::sync::Arc;
use tracing::debug;

/// Strong reference on a context, taken under the registry lock
///
/// The context stays alive while the guard exists even if it is removed
/// from its registry meanwhile; dropping the last reference destroys it.
pub struct ContextGuard {
    ctx: Arc<Context>,
}

impl ContextGuard {
    pub(super) fn new(ctx: Arc<Context>) -> Self {
        debug!(ctx = ctx.id(), refs = Arc::strong_count(&ctx), "context reference taken");
        Self { ctx }
    }

    #[inline]
    pub fn id(&self) -> ContextId {
        self.ctx.id()
    }

    /// Current number of strong references, this guard included
    #[inline]
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.ctx)
    }

    /// Whether this guard holds the only reference left
    #[inline]
    pub fn is_last_ref(&self) -> bool {
        self.ref_count() == 1
    }

    /// Release the reference before the end of scope
    pub fn put(self) {
        drop(self);
    }
}

impl Deref for ContextGuard {
    type Target = Context;

    #[inline(always)]
    fn deref(&self) -> &Context {
        &self.ctx
    }
}

impl Clone for ContextGuard {
    fn clone(&self) -> Self {
        Self::new(Arc::clone(&self.ctx))
    }
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        debug!(
            ctx = self.ctx.id(),
            refs = Arc::strong_count(&self.ctx) - 1,
            "context reference released"
        );
    }
}
