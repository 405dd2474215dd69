/*!
 * Sched Dispatch
 * Entry point for priority override requests
 */

use super::engine::OverrideEngine;
use super::stats::{OverrideStats, StatsSnapshot};
use super::traits::PriorityOverride;
use super::types::{SchedOp, SchedRequest};
use crate::core::config::OverrideConfig;
use crate::core::errors::{SchedError, SchedResult};
use crate::core::types::Caller;
use crate::driver::{Driver, HandleResolver, ResolveHandle};
use crate::handle::ProcessTables;
use crate::monitoring::OverrideSpan;
use crate::priority::translate;
use std::sync::Arc;
use tracing::{error, warn};

/// Validates sched requests and routes them to the override engine
pub struct Dispatcher<R: ResolveHandle = HandleResolver> {
    resolver: R,
    engine: OverrideEngine,
    config: OverrideConfig,
    stats: Arc<OverrideStats>,
}

impl Dispatcher<HandleResolver> {
    /// Dispatcher for `driver`, resolving descriptors in `tables`
    pub fn for_driver(driver: &Driver, tables: Arc<ProcessTables>) -> Self {
        Self::new(driver.resolver(tables), *driver.config())
    }
}

impl<R: ResolveHandle> Dispatcher<R> {
    pub fn new(resolver: R, config: OverrideConfig) -> Self {
        let stats = Arc::new(OverrideStats::new());
        Self {
            resolver,
            engine: OverrideEngine::new(Arc::clone(&stats)),
            config,
            stats,
        }
    }

    #[inline]
    pub fn config(&self) -> &OverrideConfig {
        &self.config
    }

    #[inline]
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Snapshot of request counters
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Handle one request on behalf of `caller`
    ///
    /// Privilege, priority and op are all checked before the handle is
    /// resolved, so a rejected request never touches any registry.
    pub fn dispatch(&self, caller: Caller, request: &SchedRequest) -> SchedResult<()> {
        let op_name = request.op().map_or("unknown", |op| op.as_str());
        let span = OverrideSpan::new(op_name, caller.pid);
        let _entered = span.enter();

        let result = self.dispatch_inner(caller, request);
        match &result {
            Ok(contexts) => {
                span.record_contexts(*contexts);
                span.record_result(true);
            }
            Err(e) => {
                self.stats.record_rejection(e.code());
                span.record_error(e.code().as_str());
            }
        }
        result.map(|_| ())
    }

    /// `dispatch` folded into an ioctl return value: 0 or negative errno
    pub fn ioctl(&self, caller: Caller, request: &SchedRequest) -> i32 {
        match self.dispatch(caller, request) {
            Ok(()) => 0,
            Err(e) => e.to_errno(),
        }
    }

    fn dispatch_inner(&self, caller: Caller, request: &SchedRequest) -> SchedResult<usize> {
        if self.config.require_master && !caller.master {
            warn!(pid = caller.pid, "priority override refused: caller is not master");
            return Err(SchedError::permission_denied(format!(
                "process {} does not hold master",
                caller.pid
            )));
        }

        let priority = translate(request.priority)?;

        match request.op() {
            Some(SchedOp::ProcessOverride) => {
                let connection = self.resolver.resolve(caller.pid, request.fd)?;
                Ok(self.engine.process_override(&connection, priority))
            }
            Some(SchedOp::ContextOverride) => {
                let connection = self.resolver.resolve(caller.pid, request.fd)?;
                self.engine
                    .context_override(&connection, request.ctx_id, priority)?;
                Ok(1)
            }
            None => {
                error!(op = request.op, "Invalid sched op specified");
                Err(SchedError::InvalidOperation(request.op))
            }
        }
    }
}
