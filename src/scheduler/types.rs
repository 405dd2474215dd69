/*!
 * Scheduler Request Types
 * Domain types for sched override requests
 */

use crate::core::limits::{SCHED_OP_CONTEXT_PRIORITY_OVERRIDE, SCHED_OP_PROCESS_PRIORITY_OVERRIDE};
use crate::core::types::{ContextId, Fd};
use crate::priority::PriorityLevel;
use serde::{Deserialize, Serialize};

/// Override operation
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedOp {
    /// Every context of the process behind the handle
    ProcessOverride = SCHED_OP_PROCESS_PRIORITY_OVERRIDE,
    /// One context of the process behind the handle
    ContextOverride = SCHED_OP_CONTEXT_PRIORITY_OVERRIDE,
}

impl SchedOp {
    /// Decode a wire op code
    #[inline]
    pub const fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            SCHED_OP_PROCESS_PRIORITY_OVERRIDE => Some(Self::ProcessOverride),
            SCHED_OP_CONTEXT_PRIORITY_OVERRIDE => Some(Self::ContextOverride),
            _ => None,
        }
    }

    #[inline(always)]
    pub const fn raw(self) -> u32 {
        self as u32
    }

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ProcessOverride => "process_override",
            Self::ContextOverride => "context_override",
        }
    }
}

/// Sched request as decoded from the wire
///
/// Fields stay raw: op and priority are validated by the dispatcher, the
/// handle by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedRequest {
    pub op: u32,
    pub fd: Fd,
    pub priority: i32,
    /// Only meaningful for context overrides
    #[serde(default)]
    pub ctx_id: ContextId,
}

impl SchedRequest {
    /// Raw request, exactly as received
    pub const fn raw(op: u32, fd: Fd, priority: i32, ctx_id: ContextId) -> Self {
        Self {
            op,
            fd,
            priority,
            ctx_id,
        }
    }

    /// Override every context of the connection behind `fd`
    pub const fn process_override(fd: Fd, level: PriorityLevel) -> Self {
        Self::raw(SchedOp::ProcessOverride.raw(), fd, level.raw(), 0)
    }

    /// Override context `ctx_id` of the connection behind `fd`
    pub const fn context_override(fd: Fd, ctx_id: ContextId, level: PriorityLevel) -> Self {
        Self::raw(SchedOp::ContextOverride.raw(), fd, level.raw(), ctx_id)
    }

    /// Decoded op, `None` for unknown codes
    #[inline]
    pub const fn op(&self) -> Option<SchedOp> {
        SchedOp::from_raw(self.op)
    }
}
