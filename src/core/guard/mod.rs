/*!
 * RAII Resource Guards
 *
 * Scoped acquisition of borrowed kernel objects with guaranteed release.
 *
 * ## Guard Types
 *
 * - **HandleGuard**: a reference on an open file taken from a process handle
 *   table, dropped on every exit path of a request
 *
 * ## Example
 *
 * ```ignore
 * let handle = table.get(fd).ok_or(SchedError::BadHandle { pid, fd })?;
 * // Use handle.file()
 * // Reference released on drop, even on early return
 * ```
 */

mod handle;
mod traits;

pub use handle::HandleGuard;
pub use traits::{Guard, GuardDrop};

/// Result type for guard operations
pub type GuardResult<T> = Result<T, GuardError>;

/// Errors that can occur during guard operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuardError {
    #[error("Resource already released")]
    AlreadyReleased,
}

/// Guard metadata for observability
#[derive(Debug, Clone)]
pub struct GuardMetadata {
    pub resource_type: &'static str,
    pub creation_time: std::time::Instant,
    pub pid: Option<crate::core::types::Pid>,
}

impl GuardMetadata {
    #[inline]
    pub fn new(resource_type: &'static str) -> Self {
        Self {
            resource_type,
            creation_time: std::time::Instant::now(),
            pid: None,
        }
    }

    #[inline]
    pub fn with_pid(mut self, pid: crate::core::types::Pid) -> Self {
        self.pid = Some(pid);
        self
    }

    #[inline]
    pub fn lifetime_micros(&self) -> u64 {
        self.creation_time.elapsed().as_micros() as u64
    }
}
