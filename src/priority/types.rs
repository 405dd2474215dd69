/*!
 * Priority Types
 * Domain types on both sides of the priority translation
 */

use crate::core::errors::SchedError;
use crate::core::limits::{
    CTX_PRIORITY_HIGH, CTX_PRIORITY_LOW, CTX_PRIORITY_NORMAL, CTX_PRIORITY_UNSET,
    CTX_PRIORITY_VERY_HIGH, CTX_PRIORITY_VERY_LOW,
};
use serde::{Deserialize, Serialize};

/// Driver-facing priority level, as supplied by callers
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityLevel {
    Unset = CTX_PRIORITY_UNSET,
    VeryLow = CTX_PRIORITY_VERY_LOW,
    Low = CTX_PRIORITY_LOW,
    Normal = CTX_PRIORITY_NORMAL,
    High = CTX_PRIORITY_HIGH,
    VeryHigh = CTX_PRIORITY_VERY_HIGH,
}

impl PriorityLevel {
    /// Every valid level
    pub const ALL: [PriorityLevel; 6] = [
        PriorityLevel::Unset,
        PriorityLevel::VeryLow,
        PriorityLevel::Low,
        PriorityLevel::Normal,
        PriorityLevel::High,
        PriorityLevel::VeryHigh,
    ];

    /// Decode a wire value; `None` for anything outside the enumerated set
    #[inline]
    pub const fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            CTX_PRIORITY_UNSET => Some(Self::Unset),
            CTX_PRIORITY_VERY_LOW => Some(Self::VeryLow),
            CTX_PRIORITY_LOW => Some(Self::Low),
            CTX_PRIORITY_NORMAL => Some(Self::Normal),
            CTX_PRIORITY_HIGH => Some(Self::High),
            CTX_PRIORITY_VERY_HIGH => Some(Self::VeryHigh),
            _ => None,
        }
    }

    /// Wire value
    #[inline(always)]
    pub const fn raw(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for PriorityLevel {
    type Error = SchedError;

    fn try_from(raw: i32) -> Result<Self, Self::Error> {
        Self::from_raw(raw).ok_or(SchedError::InvalidPriority(raw))
    }
}

/// Scheduler-internal priority consumed by the run queues
///
/// `Low < Normal < HighSW < HighHW`. `Unset` carries no rank: stored as an
/// override it means "fall back to the context's init priority".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchedPriority {
    #[serde(rename = "low")]
    Low,
    #[serde(rename = "normal")]
    Normal,
    #[serde(rename = "high_sw")]
    HighSW,
    #[serde(rename = "high_hw")]
    HighHW,
    #[serde(rename = "unset")]
    Unset,
}

impl SchedPriority {
    /// Run-queue rank, higher is scheduled first; `None` for `Unset`
    #[inline]
    pub const fn rank(&self) -> Option<u8> {
        match self {
            Self::Low => Some(0),
            Self::Normal => Some(1),
            Self::HighSW => Some(2),
            Self::HighHW => Some(3),
            Self::Unset => None,
        }
    }

    #[inline]
    pub const fn is_set(&self) -> bool {
        !matches!(self, Self::Unset)
    }

    /// Whether this priority requires a dedicated high-priority hardware queue
    #[inline]
    pub const fn needs_hw_queue(&self) -> bool {
        matches!(self, Self::HighHW)
    }

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::HighSW => "high_sw",
            Self::HighHW => "high_hw",
            Self::Unset => "unset",
        }
    }
}

impl std::fmt::Display for SchedPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
