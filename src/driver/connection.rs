/*!
 * Connection State
 * Per-open private driver state
 */

use crate::context::ContextRegistry;
use crate::core::types::{ConnectionId, Pid};
use crate::handle::DriverId;
use std::time::Instant;
use tracing::debug;

/// Private state of one open connection to the driver
///
/// Lives exactly as long as the open file that carries it.
pub struct ConnectionState {
    id: ConnectionId,
    driver: DriverId,
    pid: Pid,
    contexts: ContextRegistry,
    opened_at: Instant,
}

impl ConnectionState {
    pub(crate) fn new(id: ConnectionId, driver: DriverId, pid: Pid, max_contexts: u32) -> Self {
        Self {
            id,
            driver,
            pid,
            contexts: ContextRegistry::new(id, max_contexts),
            opened_at: Instant::now(),
        }
    }

    #[inline]
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Driver that created this connection
    #[inline]
    pub fn driver(&self) -> DriverId {
        self.driver
    }

    /// Process that opened the connection
    #[inline]
    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// Contexts created on this connection
    #[inline]
    pub fn contexts(&self) -> &ContextRegistry {
        &self.contexts
    }

    #[inline]
    pub fn age_micros(&self) -> u64 {
        self.opened_at.elapsed().as_micros() as u64
    }
}

impl Drop for ConnectionState {
    fn drop(&mut self) {
        debug!(
            connection = self.id,
            pid = self.pid,
            contexts = self.contexts.len(),
            age_micros = self.age_micros(),
            "connection state freed"
        );
    }
}
