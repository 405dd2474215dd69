/*!
 * Driver Traits
 * Interface between the dispatch entry point and handle resolution
 */

use super::resolver::ResolvedConnection;
use crate::core::errors::SchedResult;
use crate::core::types::{Fd, Pid};

/// Resolve a caller's descriptor to this driver's connection state
pub trait ResolveHandle: Send + Sync {
    /// Look up `fd` in `pid`'s handle table and verify it is one of this
    /// driver's connections
    fn resolve(&self, pid: Pid, fd: Fd) -> SchedResult<ResolvedConnection>;
}
