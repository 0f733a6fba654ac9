//! Shift lifecycle transition rules.
//!
//! Pure functions over a shift snapshot: each one either mutates the given
//! record according to the transition table or returns a
//! [`LifecycleError`]. Persistence, logging and timestamps live in
//! `shift_service`; nothing here touches storage.
//!
//! States: draft, pending, approved, completed, deleted. Deleted is
//! terminal. A manager-initiated create or edit is always immediately
//! approved; approval only exists for staff-initiated proposals.

use crate::domain::errors::LifecycleError;
use shared::{RequestedChanges, Role, Shift, ShiftStatus};

/// Status a freshly created shift starts in: staff-created shifts are
/// drafts, manager-created shifts are pre-approved.
pub fn initial_status(role: Role) -> ShiftStatus {
    match role {
        Role::Master => ShiftStatus::Approved,
        Role::User => ShiftStatus::Draft,
    }
}

/// Scheduling fields a proposal or manager edit may change.
#[derive(Debug, Clone, Default)]
pub struct ShiftEdit {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub date: Option<String>,
}

impl ShiftEdit {
    fn apply_to(&self, shift: &mut Shift) {
        if let Some(start_time) = &self.start_time {
            shift.start_time = start_time.clone();
        }
        if let Some(end_time) = &self.end_time {
            shift.end_time = end_time.clone();
        }
        if let Some(date) = &self.date {
            shift.date = date.clone();
        }
    }
}

/// A staff member proposes an edit. The proposal is stored on the record;
/// the shift's own fields stay untouched until a manager approves.
pub fn request_edit(
    shift: &mut Shift,
    role: Role,
    edit: ShiftEdit,
    requested_at: String,
) -> Result<(), LifecycleError> {
    const TRIGGER: &str = "propose an edit to";

    if role != Role::User {
        return Err(LifecycleError::NotPermitted {
            role,
            trigger: TRIGGER,
        });
    }
    match shift.status {
        ShiftStatus::Draft | ShiftStatus::Approved | ShiftStatus::Completed => {
            shift.requested_changes = Some(RequestedChanges {
                start_time: edit.start_time,
                end_time: edit.end_time,
                date: edit.date,
                requested_at,
            });
            shift.status = ShiftStatus::Pending;
            Ok(())
        }
        from => Err(LifecycleError::InvalidTransition {
            from,
            trigger: TRIGGER,
        }),
    }
}

/// A manager approves a pending proposal: the requested fields are copied
/// onto the shift and the proposal is cleared.
pub fn approve_changes(shift: &mut Shift, role: Role) -> Result<(), LifecycleError> {
    const TRIGGER: &str = "approve";

    if role != Role::Master {
        return Err(LifecycleError::NotPermitted {
            role,
            trigger: TRIGGER,
        });
    }
    if shift.status != ShiftStatus::Pending {
        return Err(LifecycleError::InvalidTransition {
            from: shift.status,
            trigger: TRIGGER,
        });
    }

    if let Some(changes) = shift.requested_changes.take() {
        ShiftEdit {
            start_time: changes.start_time,
            end_time: changes.end_time,
            date: changes.date,
        }
        .apply_to(shift);
    }
    shift.status = ShiftStatus::Approved;
    Ok(())
}

/// A manager edits a pending shift directly, bypassing the proposal: the
/// manager-supplied fields are applied and the pending proposal discarded.
pub fn apply_manager_edit(
    shift: &mut Shift,
    role: Role,
    edit: ShiftEdit,
) -> Result<(), LifecycleError> {
    const TRIGGER: &str = "edit";

    if role != Role::Master {
        return Err(LifecycleError::NotPermitted {
            role,
            trigger: TRIGGER,
        });
    }
    if shift.status != ShiftStatus::Pending {
        return Err(LifecycleError::InvalidTransition {
            from: shift.status,
            trigger: TRIGGER,
        });
    }

    edit.apply_to(shift);
    shift.requested_changes = None;
    shift.status = ShiftStatus::Approved;
    Ok(())
}

/// A manager marks a shift complete. Drafts must pass through approval
/// first; only an approved shift can be completed.
pub fn mark_completed(shift: &mut Shift, role: Role) -> Result<(), LifecycleError> {
    const TRIGGER: &str = "complete";

    if role != Role::Master {
        return Err(LifecycleError::NotPermitted {
            role,
            trigger: TRIGGER,
        });
    }
    if shift.status != ShiftStatus::Approved {
        return Err(LifecycleError::InvalidTransition {
            from: shift.status,
            trigger: TRIGGER,
        });
    }

    shift.status = ShiftStatus::Completed;
    Ok(())
}

/// Soft-delete: any non-terminal shift may be deleted by either role. The
/// record is retained and excluded from all future aggregation.
pub fn soft_delete(shift: &mut Shift, _role: Role) -> Result<(), LifecycleError> {
    if shift.status.is_terminal() {
        return Err(LifecycleError::InvalidTransition {
            from: shift.status,
            trigger: "delete",
        });
    }
    shift.status = ShiftStatus::Deleted;
    shift.requested_changes = None;
    Ok(())
}
