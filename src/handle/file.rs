/*!
 * Open Files
 * Driver identity and typed private data behind a descriptor
 */

use crate::driver::ConnectionState;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_DRIVER_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a driver's file operations
///
/// Two open files belong to the same driver iff their `FileOps` carry the
/// same `DriverId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct DriverId(u64);

impl DriverId {
    /// Allocate a fresh, process-wide unique identity
    pub fn next() -> Self {
        Self(NEXT_DRIVER_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[inline(always)]
    pub const fn raw(&self) -> u64 {
        self.0
    }
}

/// Operations table an open file was created through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileOps {
    pub owner: DriverId,
    pub name: &'static str,
}

impl FileOps {
    #[inline]
    pub const fn new(owner: DriverId, name: &'static str) -> Self {
        Self { owner, name }
    }
}

/// Typed private data attached to an open file
pub enum FilePrivate {
    /// A client connection to a GPU driver
    Connection(Arc<ConnectionState>),
    /// Anything this crate does not interpret
    None,
}

/// An open file referenced from one or more handle tables
pub struct OpenFile {
    ops: FileOps,
    private: FilePrivate,
    on_release: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl OpenFile {
    pub fn new(ops: FileOps, private: FilePrivate) -> Self {
        Self {
            ops,
            private,
            on_release: None,
        }
    }

    /// Open file without driver private data (plain files, other devices)
    pub fn foreign(ops: FileOps) -> Self {
        Self::new(ops, FilePrivate::None)
    }

    /// Run `f` when the last reference to this file goes away
    pub(crate) fn with_release<F>(mut self, f: F) -> Self
    where
        F: FnOnce() + Send + Sync + 'static,
    {
        self.on_release = Some(Box::new(f));
        self
    }

    #[inline]
    pub fn ops(&self) -> FileOps {
        self.ops
    }

    #[inline]
    pub fn private(&self) -> &FilePrivate {
        &self.private
    }
}

impl fmt::Debug for OpenFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let private = match &self.private {
            FilePrivate::Connection(conn) => format!("connection({})", conn.id()),
            FilePrivate::None => "none".to_string(),
        };
        f.debug_struct("OpenFile")
            .field("ops", &self.ops)
            .field("private", &private)
            .finish()
    }
}

impl Drop for OpenFile {
    fn drop(&mut self) {
        if let Some(release) = self.on_release.take() {
            release();
        }
    }
}
