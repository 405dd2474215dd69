/*!
 * Override Concurrency Tests
 * Overrides racing with context creation, removal and descriptor close
 */

use gpu_sched::core::limits::EINVAL;
use gpu_sched::{
    Caller, Dispatcher, Driver, OverrideConfig, PriorityLevel, ProcessTables, SchedError,
    SchedPriority, SchedRequest,
};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

const ITERATIONS: usize = 2000;
const CLIENT: u32 = 1000;

#[test]
fn test_process_override_during_churn() {
    let driver = Driver::new("amdgpu", OverrideConfig::new());
    let tables = Arc::new(ProcessTables::new(64));
    let dispatcher = Arc::new(Dispatcher::for_driver(&driver, tables.clone()));
    let (fd, conn) = driver.open(&tables.table_for(CLIENT)).unwrap();

    for _ in 0..32 {
        conn.contexts().create(SchedPriority::Low).unwrap();
    }

    let stop = Arc::new(AtomicBool::new(false));
    let churner = {
        let conn = conn.clone();
        let stop = stop.clone();
        thread::spawn(move || {
            while !stop.load(Ordering::Relaxed) {
                if let Ok(id) = conn.contexts().create(SchedPriority::Normal) {
                    conn.contexts().remove(id);
                }
            }
        })
    };

    let mut overriders = vec![];
    for level in [PriorityLevel::VeryHigh, PriorityLevel::High] {
        let dispatcher = dispatcher.clone();
        overriders.push(thread::spawn(move || {
            let req = SchedRequest::process_override(fd, level);
            for _ in 0..ITERATIONS / 10 {
                assert_eq!(dispatcher.ioctl(Caller::master(CLIENT), &req), 0);
            }
        }));
    }

    for handle in overriders {
        handle.join().unwrap();
    }
    stop.store(true, Ordering::Relaxed);
    churner.join().unwrap();

    // Each context agrees with itself across all of its entities
    for id in conn.contexts().ids() {
        let snapshot = conn.contexts().get(id).unwrap().snapshot();
        assert!(snapshot.entities.iter().all(|e| e.priority == snapshot.priority));
    }

    // Quiescent override covers everything still registered
    let req = SchedRequest::process_override(fd, PriorityLevel::VeryLow);
    assert_eq!(dispatcher.ioctl(Caller::master(CLIENT), &req), 0);
    for id in conn.contexts().ids() {
        assert_eq!(conn.contexts().get(id).unwrap().priority(), SchedPriority::Low);
    }
}

#[test]
fn test_context_override_racing_removal() {
    let driver = Driver::new("amdgpu", OverrideConfig::new());
    let tables = Arc::new(ProcessTables::new(64));
    let dispatcher = Arc::new(Dispatcher::for_driver(&driver, tables.clone()));
    let (fd, conn) = driver.open(&tables.table_for(CLIENT)).unwrap();

    let applied = Arc::new(AtomicU64::new(0));
    let missing = Arc::new(AtomicU64::new(0));

    let remover = {
        let conn = conn.clone();
        thread::spawn(move || {
            for _ in 0..ITERATIONS {
                let id = conn.contexts().create(SchedPriority::Normal).unwrap();
                conn.contexts().remove(id);
            }
        })
    };

    let overrider = {
        let dispatcher = dispatcher.clone();
        let applied = applied.clone();
        let missing = missing.clone();
        thread::spawn(move || {
            let req = SchedRequest::context_override(fd, 1, PriorityLevel::High);
            for _ in 0..ITERATIONS {
                match dispatcher.dispatch(Caller::master(CLIENT), &req) {
                    Ok(()) => applied.fetch_add(1, Ordering::Relaxed),
                    Err(SchedError::ContextNotFound(1)) => missing.fetch_add(1, Ordering::Relaxed),
                    Err(e) => panic!("unexpected error: {e}"),
                };
            }
        })
    };

    remover.join().unwrap();
    overrider.join().unwrap();

    let total = applied.load(Ordering::Relaxed) + missing.load(Ordering::Relaxed);
    assert_eq!(total, ITERATIONS as u64);
    assert!(conn.contexts().is_empty());
}

#[test]
fn test_override_racing_close() {
    let driver = Driver::new("amdgpu", OverrideConfig::new());
    let tables = Arc::new(ProcessTables::new(64));
    let dispatcher = Arc::new(Dispatcher::for_driver(&driver, tables.clone()));
    let table = tables.table_for(CLIENT);

    for _ in 0..200 {
        let (fd, conn) = driver.open(&table).unwrap();
        conn.contexts().create(SchedPriority::Normal).unwrap();
        drop(conn);

        let closer = {
            let table = table.clone();
            thread::spawn(move || table.close(fd))
        };
        let req = SchedRequest::process_override(fd, PriorityLevel::VeryHigh);
        let rc = dispatcher.ioctl(Caller::master(CLIENT), &req);
        assert!(rc == 0 || rc == -EINVAL);
        assert!(closer.join().unwrap());
    }

    // Every connection went away with its last descriptor
    assert_eq!(driver.connection_count(), 0);
    assert!(table.is_empty());
}
