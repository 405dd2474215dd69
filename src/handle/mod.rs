/*!
 * Handle Tables
 * Per-process descriptor tables and the open files they reference
 *
 * This is the host side of the handle model: processes hold descriptors,
 * descriptors reference open files, and an open file knows which driver's
 * operations created it. The override path only ever borrows from here.
 */

mod file;
mod table;

pub use file::{DriverId, FileOps, FilePrivate, OpenFile};
pub use table::{HandleTable, ProcessTables};
