/*!
 * Priority Translation
 * Maps driver priority levels onto scheduler priorities
 */

use super::types::{PriorityLevel, SchedPriority};
use crate::core::errors::{SchedError, SchedResult};
use tracing::warn;

impl From<PriorityLevel> for SchedPriority {
    fn from(level: PriorityLevel) -> Self {
        match level {
            PriorityLevel::VeryHigh => SchedPriority::HighHW,
            PriorityLevel::High => SchedPriority::HighSW,
            PriorityLevel::Normal => SchedPriority::Normal,
            PriorityLevel::Low | PriorityLevel::VeryLow => SchedPriority::Low,
            PriorityLevel::Unset => SchedPriority::Unset,
        }
    }
}

/// Translate an untrusted wire priority into a scheduler priority
///
/// Values outside the enumerated levels are rejected, never defaulted.
pub fn translate(raw: i32) -> SchedResult<SchedPriority> {
    match PriorityLevel::from_raw(raw) {
        Some(level) => Ok(level.into()),
        None => {
            #[cold]
            #[inline(never)]
            fn reject(raw: i32) -> SchedError {
                warn!(priority = raw, "Invalid context priority");
                SchedError::InvalidPriority(raw)
            }
            Err(reject(raw))
        }
    }
}
