//! Typed errors raised by the computation core.
//!
//! Services return `anyhow::Result`, so these bubble up through the usual
//! `?` chain while staying downcastable for callers that need to branch on
//! the specific failure.

use shared::{Role, ShiftStatus};
use thiserror::Error;

/// A time string failed to parse as "H:mm"/"HH:mm".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeError {
    #[error("invalid time format: '{0}' (expected HH:mm)")]
    InvalidFormat(String),
}

/// A requested lifecycle transition is not allowed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    /// The transition is not listed for the record's current status,
    /// e.g. completing a draft or approving a deleted shift.
    #[error("invalid transition: cannot {trigger} a {from} shift")]
    InvalidTransition {
        from: ShiftStatus,
        trigger: &'static str,
    },

    /// The transition exists but the acting role may not trigger it.
    #[error("role {role:?} is not permitted to {trigger}")]
    NotPermitted {
        role: Role,
        trigger: &'static str,
    },
}
