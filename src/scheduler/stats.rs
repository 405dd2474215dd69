/*!
 * Override Statistics
 * Atomic counters for the override path
 */

use crate::core::errors::ErrorCode;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic override statistics for lock-free updates
///
/// # Performance
/// - Cache-line aligned to prevent false sharing
/// - All operations use relaxed ordering
#[repr(C, align(64))]
#[derive(Debug, Default)]
pub struct OverrideStats {
    process_overrides: AtomicU64,
    context_overrides: AtomicU64,
    contexts_updated: AtomicU64,
    invalid_argument: AtomicU64,
    invalid_handle: AtomicU64,
    context_not_found: AtomicU64,
    permission_denied: AtomicU64,
    out_of_resources: AtomicU64,
}

impl OverrideStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a completed process override that touched `contexts` contexts
    #[inline]
    pub fn record_process_override(&self, contexts: usize) {
        self.process_overrides.fetch_add(1, Ordering::Relaxed);
        self.contexts_updated
            .fetch_add(contexts as u64, Ordering::Relaxed);
    }

    /// Count a completed single-context override
    #[inline]
    pub fn record_context_override(&self) {
        self.context_overrides.fetch_add(1, Ordering::Relaxed);
        self.contexts_updated.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a rejected request
    #[inline]
    pub fn record_rejection(&self, code: ErrorCode) {
        let counter = match code {
            ErrorCode::InvalidArgument => &self.invalid_argument,
            ErrorCode::InvalidHandle => &self.invalid_handle,
            ErrorCode::ContextNotFound => &self.context_not_found,
            ErrorCode::PermissionDenied => &self.permission_denied,
            ErrorCode::OutOfResources => &self.out_of_resources,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of all counters
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            process_overrides: self.process_overrides.load(Ordering::Relaxed),
            context_overrides: self.context_overrides.load(Ordering::Relaxed),
            contexts_updated: self.contexts_updated.load(Ordering::Relaxed),
            invalid_argument: self.invalid_argument.load(Ordering::Relaxed),
            invalid_handle: self.invalid_handle.load(Ordering::Relaxed),
            context_not_found: self.context_not_found.load(Ordering::Relaxed),
            permission_denied: self.permission_denied.load(Ordering::Relaxed),
            out_of_resources: self.out_of_resources.load(Ordering::Relaxed),
        }
    }
}

/// Serializable copy of [`OverrideStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub process_overrides: u64,
    pub context_overrides: u64,
    pub contexts_updated: u64,
    pub invalid_argument: u64,
    pub invalid_handle: u64,
    pub context_not_found: u64,
    pub permission_denied: u64,
    pub out_of_resources: u64,
}

impl StatsSnapshot {
    /// Requests rejected for any reason
    pub fn rejected(&self) -> u64 {
        self.invalid_argument
            + self.invalid_handle
            + self.context_not_found
            + self.permission_denied
            + self.out_of_resources
    }
}
