/*!
 * Limits and Constants
 *
 * Centralized location for the override path's limits and wire values.
 * Linux-compatible values are marked with [LINUX-COMPAT]
 */

// =============================================================================
// CONTEXT LIMITS
// =============================================================================

/// Maximum contexts per driver connection
/// [LINUX-COMPAT] Matches the per-file context id ceiling of the amdgpu driver
pub const MAX_CONTEXTS_PER_CONNECTION: u32 = 4096;

/// First context id handed out by a registry (0 is never a valid id)
pub const FIRST_CONTEXT_ID: u32 = 1;

// =============================================================================
// HANDLE TABLE LIMITS
// =============================================================================

/// Default handle table capacity per process
/// [LINUX-COMPAT] Default RLIMIT_NOFILE soft limit
pub const DEFAULT_HANDLE_TABLE_CAPACITY: usize = 1024;

/// First descriptor handed out by a handle table (0, 1, 2 are stdio)
pub const FIRST_USER_FD: u32 = 3;

// =============================================================================
// WIRE VALUES
// =============================================================================

/// Override every context of the process behind a handle
pub const SCHED_OP_PROCESS_PRIORITY_OVERRIDE: u32 = 1;

/// Override one context of the process behind a handle
pub const SCHED_OP_CONTEXT_PRIORITY_OVERRIDE: u32 = 2;

/// External priority levels as carried on the wire
pub const CTX_PRIORITY_UNSET: i32 = -2048;
pub const CTX_PRIORITY_VERY_LOW: i32 = -1023;
pub const CTX_PRIORITY_LOW: i32 = -512;
pub const CTX_PRIORITY_NORMAL: i32 = 0;
pub const CTX_PRIORITY_HIGH: i32 = 512;
pub const CTX_PRIORITY_VERY_HIGH: i32 = 1023;

// =============================================================================
// ERRNO VALUES
// =============================================================================

/// [LINUX-COMPAT] Permission denied
pub const EACCES: i32 = 13;

/// [LINUX-COMPAT] Out of memory / table full
pub const ENOMEM: i32 = 12;

/// [LINUX-COMPAT] Invalid argument
pub const EINVAL: i32 = 22;
