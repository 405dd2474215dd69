/*!
 * Handle Resolver
 * Turns a caller-supplied descriptor into a borrowed connection
 */

use super::connection::ConnectionState;
use super::traits::ResolveHandle;
use crate::core::errors::{SchedError, SchedResult};
use crate::core::guard::HandleGuard;
use crate::core::types::{Fd, Pid};
use crate::handle::{DriverId, FilePrivate, ProcessTables};
use std::ops::Deref;
use std::sync::Arc;
use tracing::warn;

/// Connection reached through a descriptor, valid for one request
///
/// Holds the descriptor's file reference until dropped.
pub struct ResolvedConnection {
    connection: Arc<ConnectionState>,
    handle: HandleGuard,
}

impl ResolvedConnection {
    /// Descriptor the connection was resolved from
    #[inline]
    pub fn fd(&self) -> Fd {
        self.handle.fd()
    }
}

impl Deref for ResolvedConnection {
    type Target = ConnectionState;

    #[inline(always)]
    fn deref(&self) -> &ConnectionState {
        &self.connection
    }
}

/// Resolver bound to one driver identity
pub struct HandleResolver {
    driver: DriverId,
    tables: Arc<ProcessTables>,
}

impl HandleResolver {
    pub fn new(driver: DriverId, tables: Arc<ProcessTables>) -> Self {
        Self { driver, tables }
    }

    #[inline]
    pub fn driver(&self) -> DriverId {
        self.driver
    }
}

impl ResolveHandle for HandleResolver {
    fn resolve(&self, pid: Pid, fd: Fd) -> SchedResult<ResolvedConnection> {
        let table = self
            .tables
            .table(pid)
            .ok_or(SchedError::BadHandle { pid, fd })?;
        let handle = table.get(fd).ok_or(SchedError::BadHandle { pid, fd })?;
        let file = handle
            .file()
            .map_err(|_| SchedError::BadHandle { pid, fd })?;

        // Ownership check happens before any private data is touched
        let ops = file.ops();
        if ops.owner != self.driver {
            warn!(pid, fd, owner = ops.name, "rejecting descriptor of another driver");
            return Err(SchedError::ForeignHandle {
                fd,
                owner: ops.name.to_string(),
            });
        }

        let connection = match file.private() {
            FilePrivate::Connection(conn) if conn.driver() == self.driver => Arc::clone(conn),
            _ => {
                warn!(pid, fd, owner = ops.name, "descriptor carries no connection");
                return Err(SchedError::ForeignHandle {
                    fd,
                    owner: ops.name.to_string(),
                });
            }
        };

        Ok(ResolvedConnection { connection, handle })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::OverrideConfig;
    use crate::driver::Driver;
    use crate::handle::{FileOps, OpenFile};

    fn setup() -> (Driver, Arc<ProcessTables>, HandleResolver) {
        let driver = Driver::new("amdgpu", OverrideConfig::new());
        let tables = Arc::new(ProcessTables::new(64));
        let resolver = driver.resolver(tables.clone());
        (driver, tables, resolver)
    }

    #[test]
    fn test_resolves_own_connection() {
        let (driver, tables, resolver) = setup();
        let (fd, conn) = driver.open(&tables.table_for(10)).unwrap();

        let resolved = resolver.resolve(10, fd).unwrap();
        assert_eq!(resolved.id(), conn.id());
        assert_eq!(resolved.fd(), fd);
    }

    #[test]
    fn test_unknown_process() {
        let (_driver, _tables, resolver) = setup();
        assert!(matches!(
            resolver.resolve(77, 3),
            Err(SchedError::BadHandle { pid: 77, fd: 3 })
        ));
    }

    #[test]
    fn test_closed_descriptor() {
        let (driver, tables, resolver) = setup();
        let table = tables.table_for(10);
        let (fd, _conn) = driver.open(&table).unwrap();
        table.close(fd);

        assert!(matches!(
            resolver.resolve(10, fd),
            Err(SchedError::BadHandle { pid: 10, .. })
        ));
    }

    #[test]
    fn test_descriptor_is_per_process() {
        let (driver, tables, resolver) = setup();
        let (fd, _conn) = driver.open(&tables.table_for(10)).unwrap();
        tables.table_for(11);

        // Same number, different table
        assert!(resolver.resolve(11, fd).is_err());
    }

    #[test]
    fn test_rejects_foreign_file() {
        let (_driver, tables, resolver) = setup();
        let other = DriverId::next();
        let fd = tables
            .table_for(10)
            .install(Arc::new(OpenFile::foreign(FileOps::new(other, "memfd"))))
            .unwrap();

        let err = resolver.resolve(10, fd).err().unwrap();
        assert_eq!(
            err,
            SchedError::ForeignHandle {
                fd,
                owner: "memfd".into()
            }
        );
    }

    #[test]
    fn test_rejects_other_driver_connection() {
        let (_driver, tables, resolver) = setup();
        let other = Driver::new("other-gpu", OverrideConfig::new());
        let (fd, _conn) = other.open(&tables.table_for(10)).unwrap();

        assert!(matches!(
            resolver.resolve(10, fd),
            Err(SchedError::ForeignHandle { .. })
        ));
    }

    #[test]
    fn test_rejects_own_ops_without_connection() {
        let (driver, tables, resolver) = setup();
        let fd = tables
            .table_for(10)
            .install(Arc::new(OpenFile::foreign(driver.file_ops())))
            .unwrap();

        assert!(matches!(
            resolver.resolve(10, fd),
            Err(SchedError::ForeignHandle { .. })
        ));
    }

    #[test]
    fn test_resolution_holds_file_after_close() {
        let (driver, tables, resolver) = setup();
        let table = tables.table_for(10);
        let (fd, conn) = driver.open(&table).unwrap();
        drop(conn);

        let resolved = resolver.resolve(10, fd).unwrap();
        table.close(fd);
        assert_eq!(driver.connection_count(), 1);

        drop(resolved);
        assert_eq!(driver.connection_count(), 0);
    }
}
