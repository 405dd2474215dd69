/*!
 * Handle Table
 * Descriptor allocation and lookup per process
 */

use crate::core::errors::{SchedError, SchedResult};
use crate::core::guard::HandleGuard;
use crate::core::limits::FIRST_USER_FD;
use crate::core::types::{Fd, Pid};
use super::file::OpenFile;
use ahash::RandomState;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Descriptor table of one process
pub struct HandleTable {
    pid: Pid,
    capacity: usize,
    entries: RwLock<BTreeMap<Fd, Arc<OpenFile>>>,
}

impl HandleTable {
    pub fn new(pid: Pid, capacity: usize) -> Self {
        Self {
            pid,
            capacity,
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    #[inline]
    pub fn pid(&self) -> Pid {
        self.pid
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Install `file` at the lowest free descriptor
    pub fn install(&self, file: Arc<OpenFile>) -> SchedResult<Fd> {
        let mut entries = self.entries.write();
        if entries.len() >= self.capacity {
            return Err(SchedError::HandleLimit(self.capacity));
        }

        let mut fd = FIRST_USER_FD;
        for &used in entries.range(FIRST_USER_FD..).map(|(k, _)| k) {
            if used != fd {
                break;
            }
            fd += 1;
        }

        debug!(pid = self.pid, fd, owner = file.ops().name, "descriptor installed");
        entries.insert(fd, file);
        Ok(fd)
    }

    /// Take a scoped reference on the file behind `fd`
    pub fn get(&self, fd: Fd) -> Option<HandleGuard> {
        let file = self.entries.read().get(&fd).cloned()?;
        Some(HandleGuard::new(self.pid, fd, file))
    }

    /// Close `fd`; the file itself lives on while guards reference it
    pub fn close(&self, fd: Fd) -> bool {
        let removed = self.entries.write().remove(&fd);
        match removed {
            Some(file) => {
                debug!(pid = self.pid, fd, owner = file.ops().name, "descriptor closed");
                true
            }
            None => false,
        }
    }

    /// Open descriptors, ascending
    pub fn fds(&self) -> Vec<Fd> {
        self.entries.read().keys().copied().collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handle tables of every process, keyed by pid
pub struct ProcessTables {
    tables: DashMap<Pid, Arc<HandleTable>, RandomState>,
    capacity: usize,
}

impl ProcessTables {
    /// Create an empty set of tables, each bounded by `capacity` descriptors
    pub fn new(capacity: usize) -> Self {
        Self {
            tables: DashMap::with_hasher(RandomState::new()),
            capacity,
        }
    }

    /// Table of `pid`, if the process has one
    pub fn table(&self, pid: Pid) -> Option<Arc<HandleTable>> {
        self.tables.get(&pid).map(|t| Arc::clone(t.value()))
    }

    /// Table of `pid`, created empty on first use
    pub fn table_for(&self, pid: Pid) -> Arc<HandleTable> {
        let entry = self
            .tables
            .entry(pid)
            .or_insert_with(|| Arc::new(HandleTable::new(pid, self.capacity)));
        Arc::clone(entry.value())
    }

    /// Drop a process's table (process exit); open files close as their
    /// last descriptor goes away
    pub fn remove(&self, pid: Pid) -> Option<Arc<HandleTable>> {
        self.tables.remove(&pid).map(|(_, table)| table)
    }

    /// Share `from`'s descriptor `fd` into `to`'s table
    ///
    /// Both descriptors reference the same open file afterwards.
    pub fn install_dup(&self, from: Pid, fd: Fd, to: Pid) -> SchedResult<Fd> {
        let source = self
            .table(from)
            .ok_or(SchedError::BadHandle { pid: from, fd })?;
        let guard = source
            .get(fd)
            .ok_or(SchedError::BadHandle { pid: from, fd })?;
        let file = guard
            .file()
            .map_err(|_| SchedError::BadHandle { pid: from, fd })?
            .clone();
        self.table_for(to).install(file)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
