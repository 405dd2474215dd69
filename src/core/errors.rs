/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use super::limits::{EACCES, EINVAL, ENOMEM};
use super::types::{ContextId, Fd, Pid};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Uniform status reported back to the caller of a sched request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidArgument,
    InvalidHandle,
    ContextNotFound,
    PermissionDenied,
    OutOfResources,
}

impl ErrorCode {
    /// Positive errno value for this status
    #[inline]
    pub const fn errno(&self) -> i32 {
        match self {
            // The ioctl contract folds all three lookup failures into EINVAL
            Self::InvalidArgument | Self::InvalidHandle | Self::ContextNotFound => EINVAL,
            Self::PermissionDenied => EACCES,
            Self::OutOfResources => ENOMEM,
        }
    }

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid_argument",
            Self::InvalidHandle => "invalid_handle",
            Self::ContextNotFound => "context_not_found",
            Self::PermissionDenied => "permission_denied",
            Self::OutOfResources => "out_of_resources",
        }
    }
}

/// Scheduler override errors with serialization support
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum SchedError {
    #[error("Invalid context priority {0}")]
    #[diagnostic(
        code(sched::invalid_priority),
        help("Use one of the CTX_PRIORITY_* levels: -2048, -1023, -512, 0, 512, 1023.")
    )]
    InvalidPriority(i32),

    #[error("Invalid sched op specified: {0}")]
    #[diagnostic(
        code(sched::invalid_operation),
        help("Op must be 1 (process override) or 2 (context override).")
    )]
    InvalidOperation(u32),

    #[error("Handle {fd} is not open in process {pid}")]
    #[diagnostic(
        code(sched::bad_handle),
        help("The handle may have been closed. Pass a descriptor open in the calling process.")
    )]
    BadHandle { pid: Pid, fd: Fd },

    #[error("Handle {fd} belongs to '{owner}', not this driver")]
    #[diagnostic(
        code(sched::foreign_handle),
        help("Only descriptors obtained by opening this GPU driver can be overridden.")
    )]
    ForeignHandle { fd: Fd, owner: String },

    #[error("Context {0} not found")]
    #[diagnostic(
        code(sched::context_not_found),
        help("The context may have been freed or was created on another connection.")
    )]
    ContextNotFound(ContextId),

    #[error("Permission denied: {0}")]
    #[diagnostic(
        code(sched::permission_denied),
        help("Priority overrides require the caller to hold master.")
    )]
    PermissionDenied(String),

    #[error("Context limit reached: {0}")]
    #[diagnostic(
        code(sched::context_limit),
        help("Free unused contexts on this connection before creating new ones.")
    )]
    ContextLimit(u32),

    #[error("Handle table full: {0} descriptors")]
    #[diagnostic(
        code(sched::handle_limit),
        help("Close unused descriptors or raise the handle table capacity.")
    )]
    HandleLimit(usize),
}

impl SchedError {
    /// Status code this error is reported as
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidPriority(_) | Self::InvalidOperation(_) => ErrorCode::InvalidArgument,
            Self::BadHandle { .. } | Self::ForeignHandle { .. } => ErrorCode::InvalidHandle,
            Self::ContextNotFound(_) => ErrorCode::ContextNotFound,
            Self::PermissionDenied(_) => ErrorCode::PermissionDenied,
            Self::ContextLimit(_) | Self::HandleLimit(_) => ErrorCode::OutOfResources,
        }
    }

    /// Negative errno, as returned across the ioctl boundary
    #[inline]
    pub const fn to_errno(&self) -> i32 {
        -self.code().errno()
    }

    #[inline]
    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }
}

/// Result type for override operations
pub type SchedResult<T> = std::result::Result<T, SchedError>;
