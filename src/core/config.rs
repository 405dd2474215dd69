/*!
 * Override Configuration
 *
 * Runtime configuration for the override path and its collaborators
 */

use super::limits::{DEFAULT_HANDLE_TABLE_CAPACITY, MAX_CONTEXTS_PER_CONNECTION};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Environment variable toggling the master requirement
pub const ENV_REQUIRE_MASTER: &str = "GPU_SCHED_REQUIRE_MASTER";

/// Environment variable for the per-process handle table capacity
pub const ENV_MAX_HANDLES: &str = "GPU_SCHED_MAX_HANDLES";

/// Environment variable for the per-connection context ceiling
pub const ENV_MAX_CONTEXTS: &str = "GPU_SCHED_MAX_CONTEXTS";

/// Override configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverrideConfig {
    /// Reject callers that do not hold master (default: true)
    pub require_master: bool,
    /// Descriptors per process handle table (default: 1024)
    pub handle_table_capacity: usize,
    /// Contexts per driver connection (default: 4096)
    pub max_contexts: u32,
}

impl OverrideConfig {
    /// Create default configuration
    pub const fn new() -> Self {
        Self {
            require_master: true,
            handle_table_capacity: DEFAULT_HANDLE_TABLE_CAPACITY,
            max_contexts: MAX_CONTEXTS_PER_CONNECTION,
        }
    }

    /// Configuration with the privilege check disabled (testing only)
    pub const fn permissive() -> Self {
        Self {
            require_master: false,
            ..Self::new()
        }
    }

    /// Load configuration from the process environment
    ///
    /// Environment variables:
    /// - GPU_SCHED_REQUIRE_MASTER: "0"/"false" disables the master check
    /// - GPU_SCHED_MAX_HANDLES: handle table capacity
    /// - GPU_SCHED_MAX_CONTEXTS: contexts per connection
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    ///
    /// Unparseable values fall back to the default and are logged.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new();

        if let Some(value) = lookup(ENV_REQUIRE_MASTER) {
            match value.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" => config.require_master = true,
                "0" | "false" | "no" => config.require_master = false,
                other => warn!(key = ENV_REQUIRE_MASTER, value = other, "Ignoring invalid value"),
            }
        }

        if let Some(value) = lookup(ENV_MAX_HANDLES) {
            match value.trim().parse::<usize>() {
                Ok(n) if n > 0 => config.handle_table_capacity = n,
                _ => warn!(key = ENV_MAX_HANDLES, value = %value, "Ignoring invalid value"),
            }
        }

        if let Some(value) = lookup(ENV_MAX_CONTEXTS) {
            match value.trim().parse::<u32>() {
                Ok(n) if n > 0 => config.max_contexts = n,
                _ => warn!(key = ENV_MAX_CONTEXTS, value = %value, "Ignoring invalid value"),
            }
        }

        config
    }
}

impl Default for OverrideConfig {
    fn default() -> Self {
        Self::new()
    }
}
