/*!
 * Handle Guards
 *
 * Scoped references on open files looked up through a handle table
 */

use super::traits::{Guard, GuardDrop};
use super::{GuardError, GuardMetadata, GuardResult};
use crate::core::types::{Fd, Pid};
use crate::handle::OpenFile;
use std::sync::Arc;
use tracing::{debug, error};

/// Handle guard with automatic release
///
/// Holds a strong reference on the open file so a concurrent `close` of the
/// descriptor cannot tear the file down while a request is using it.
///
/// # Example
///
/// ```ignore
/// let guard = table.get(fd).ok_or(SchedError::BadHandle { pid, fd })?;
/// let file = guard.file()?;
/// // Use file
/// // Automatically released on drop
/// ```
pub struct HandleGuard {
    fd: Fd,
    pid: Pid,
    file: Option<Arc<OpenFile>>,
    metadata: GuardMetadata,
}

impl HandleGuard {
    /// Take a reference on `file`, installed at `fd` in `pid`'s table
    pub(crate) fn new(pid: Pid, fd: Fd, file: Arc<OpenFile>) -> Self {
        debug!(pid, fd, owner = file.ops().name, "handle acquired");
        Self {
            fd,
            pid,
            file: Some(file),
            metadata: GuardMetadata::new("handle").with_pid(pid),
        }
    }

    /// Get the descriptor
    #[inline]
    pub fn fd(&self) -> Fd {
        self.fd
    }

    /// Get the process whose table the descriptor lives in
    #[inline]
    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// Borrow the open file
    #[inline]
    pub fn file(&self) -> GuardResult<&Arc<OpenFile>> {
        self.file.as_ref().ok_or(GuardError::AlreadyReleased)
    }

    /// Release the reference before the end of scope
    pub fn put(mut self) -> GuardResult<()> {
        self.release()
    }
}

impl Guard for HandleGuard {
    fn resource_type(&self) -> &'static str {
        "handle"
    }

    fn metadata(&self) -> &GuardMetadata {
        &self.metadata
    }

    fn is_active(&self) -> bool {
        self.file.is_some()
    }

    fn release(&mut self) -> GuardResult<()> {
        let file = self.file.take().ok_or(GuardError::AlreadyReleased)?;
        debug!(
            pid = self.pid,
            fd = self.fd,
            lifetime_micros = self.metadata.lifetime_micros(),
            "handle released"
        );
        drop(file);
        Ok(())
    }
}

impl GuardDrop for HandleGuard {
    fn on_drop(&mut self) {
        if self.is_active() {
            if let Err(e) = self.release() {
                error!(pid = self.pid, fd = self.fd, error = %e, "handle guard drop failed");
            }
        }
    }
}

impl Drop for HandleGuard {
    fn drop(&mut self) {
        self.on_drop();
    }
}
