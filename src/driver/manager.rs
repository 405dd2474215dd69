/*!
 * Driver
 * Owns the live connections and creates the open files that carry them
 */

use super::connection::ConnectionState;
use super::resolver::HandleResolver;
use crate::core::config::OverrideConfig;
use crate::core::errors::SchedResult;
use crate::core::types::{ConnectionId, Fd};
use crate::handle::{DriverId, FileOps, FilePrivate, HandleTable, OpenFile, ProcessTables};
use ahash::RandomState;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

type ConnectionMap = DashMap<ConnectionId, Arc<ConnectionState>, RandomState>;

/// GPU driver instance
///
/// Connections are only reachable from outside through the open files this
/// driver installs; the map here exists for accounting and teardown.
pub struct Driver {
    id: DriverId,
    name: &'static str,
    config: OverrideConfig,
    connections: Arc<ConnectionMap>,
    next_connection: AtomicU64,
}

impl Driver {
    pub fn new(name: &'static str, config: OverrideConfig) -> Self {
        let id = DriverId::next();
        info!(driver = name, id = id.raw(), "driver registered");
        Self {
            id,
            name,
            config,
            connections: Arc::new(DashMap::with_hasher(RandomState::new())),
            next_connection: AtomicU64::new(1),
        }
    }

    #[inline]
    pub fn id(&self) -> DriverId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn config(&self) -> &OverrideConfig {
        &self.config
    }

    /// Operations table stamped on every file this driver opens
    #[inline]
    pub fn file_ops(&self) -> FileOps {
        FileOps::new(self.id, self.name)
    }

    /// Open a new connection on behalf of `table`'s process
    ///
    /// Returns the installed descriptor and the opener's view of the state.
    /// The connection is freed once every descriptor referencing it is
    /// closed and no request holds it.
    pub fn open(&self, table: &HandleTable) -> SchedResult<(Fd, Arc<ConnectionState>)> {
        let id = self.next_connection.fetch_add(1, Ordering::Relaxed);
        let connection = Arc::new(ConnectionState::new(
            id,
            self.id,
            table.pid(),
            self.config.max_contexts,
        ));
        self.connections.insert(id, Arc::clone(&connection));

        let connections = Arc::downgrade(&self.connections);
        let driver = self.name;
        let file = OpenFile::new(self.file_ops(), FilePrivate::Connection(Arc::clone(&connection)))
            .with_release(move || {
                if let Some(map) = connections.upgrade() {
                    map.remove(&id);
                }
                debug!(driver, connection = id, "connection released");
            });

        let fd = table.install(Arc::new(file))?;
        info!(driver = self.name, pid = table.pid(), fd, connection = id, "connection opened");
        Ok((fd, connection))
    }

    /// Live connection count
    #[inline]
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Resolver that accepts only this driver's connections
    pub fn resolver(&self, tables: Arc<ProcessTables>) -> HandleResolver {
        HandleResolver::new(self.id, tables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::SchedError;
    use crate::priority::SchedPriority;

    #[test]
    fn test_open_installs_connection() {
        let driver = Driver::new("amdgpu", OverrideConfig::new());
        let table = HandleTable::new(100, 16);

        let (fd, conn) = driver.open(&table).unwrap();
        assert_eq!(fd, 3);
        assert_eq!(conn.pid(), 100);
        assert_eq!(conn.driver(), driver.id());
        assert_eq!(driver.connection_count(), 1);

        let guard = table.get(fd).unwrap();
        assert_eq!(guard.file().unwrap().ops(), driver.file_ops());
    }

    #[test]
    fn test_close_releases_connection() {
        let driver = Driver::new("amdgpu", OverrideConfig::new());
        let table = HandleTable::new(100, 16);

        let (fd, conn) = driver.open(&table).unwrap();
        drop(conn);
        assert!(table.close(fd));
        assert_eq!(driver.connection_count(), 0);
    }

    #[test]
    fn test_open_respects_context_limit() {
        let config = OverrideConfig {
            max_contexts: 1,
            ..OverrideConfig::new()
        };
        let driver = Driver::new("amdgpu", config);
        let table = HandleTable::new(1, 16);
        let (_, conn) = driver.open(&table).unwrap();

        conn.contexts().create(SchedPriority::Normal).unwrap();
        assert_eq!(
            conn.contexts().create(SchedPriority::Normal),
            Err(SchedError::ContextLimit(1))
        );
    }

    #[test]
    fn test_open_fails_on_full_table() {
        let driver = Driver::new("amdgpu", OverrideConfig::new());
        let table = HandleTable::new(1, 0);
        assert!(matches!(driver.open(&table), Err(SchedError::HandleLimit(0))));
        // Failed install drops the file, which releases the connection
        assert_eq!(driver.connection_count(), 0);
    }
}
