/*!
 * Core Types
 * Common types used across the scheduler override path
 */

use serde::{Deserialize, Serialize};

/// Process ID type
pub type Pid = u32;

/// Handle (file descriptor) type, always relative to one process's handle table
pub type Fd = u32;

/// Context ID type, unique only within one driver connection
pub type ContextId = u32;

/// Connection ID type, unique within one driver
pub type ConnectionId = u64;

/// Identity of the process issuing an override request
///
/// `master` mirrors DRM master status: the only callers allowed to override
/// priorities of other processes' contexts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Caller {
    pub pid: Pid,
    pub master: bool,
}

impl Caller {
    /// Privileged caller (holds master)
    #[inline]
    pub const fn master(pid: Pid) -> Self {
        Self { pid, master: true }
    }

    /// Regular unprivileged caller
    #[inline]
    pub const fn unprivileged(pid: Pid) -> Self {
        Self { pid, master: false }
    }
}

/// Hardware ring kinds a context owns a scheduler entity on
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HwIp {
    Gfx,
    Compute,
    Dma,
    Uvd,
    Vce,
    Vcn,
}

impl HwIp {
    /// Every ring kind, in entity creation order
    pub const ALL: [HwIp; 6] = [
        HwIp::Gfx,
        HwIp::Compute,
        HwIp::Dma,
        HwIp::Uvd,
        HwIp::Vce,
        HwIp::Vcn,
    ];

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Gfx => "gfx",
            Self::Compute => "compute",
            Self::Dma => "dma",
            Self::Uvd => "uvd",
            Self::Vce => "vce",
            Self::Vcn => "vcn",
        }
    }
}
