//! Shift workflow service.
//!
//! Orchestrates the lifecycle rules over storage: validates incoming
//! fields, applies transitions from `lifecycle`, keeps the cached
//! `duration` in sync with the staff interval, and persists the result.
//! Records are soft-deleted only; nothing is ever removed from storage.

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use log::{info, warn};

use crate::domain::commands::shifts::{
    CountedShiftsQuery, CreateShiftCommand, ManagerEditCommand, RequestEditCommand, ShiftResult,
};
use crate::domain::lifecycle::{self, ShiftEdit};
use crate::domain::time;
use crate::storage::traits::{Connection, ShiftStorage};
use shared::{Role, Shift};

#[derive(Clone)]
pub struct ShiftService<C: Connection> {
    shift_repository: C::ShiftRepository,
}

impl<C: Connection> ShiftService<C> {
    pub fn new(connection: &C) -> Self {
        Self {
            shift_repository: connection.create_shift_repository(),
        }
    }

    /// Create a new shift. Manager-created shifts are immediately
    /// approved; staff-created shifts start as drafts.
    pub fn create_shift(&self, command: CreateShiftCommand) -> Result<ShiftResult> {
        info!(
            "Creating shift: user={}, date={}, {}-{}",
            command.user_id, command.date, command.start_time, command.end_time
        );

        validate_date(&command.date)?;
        let duration = time::duration_hours(&command.start_time, &command.end_time)?;
        for class in &command.classes {
            time::to_minutes(&class.start)?;
            time::to_minutes(&class.end)?;
        }

        let now = Utc::now();
        let shift = Shift {
            id: Shift::generate_id(now.timestamp_millis() as u64),
            store_id: command.store_id,
            user_id: command.user_id,
            nickname: command.nickname,
            date: command.date,
            start_time: command.start_time,
            end_time: command.end_time,
            classes: command.classes,
            status: lifecycle::initial_status(command.acting_role),
            requested_changes: None,
            duration,
        };

        self.shift_repository.store_shift(&shift)?;
        info!("Created shift {} with status {}", shift.id, shift.status);

        Ok(ShiftResult { shift })
    }

    /// A staff member proposes an edit; the shift moves to pending with
    /// the proposal attached and its own fields untouched.
    pub fn request_edit(&self, role: Role, command: RequestEditCommand) -> Result<ShiftResult> {
        info!("Edit proposal for shift {}", command.shift_id);

        let mut shift = self.load_shift(&command.shift_id)?;
        validate_edit_fields(
            command.start_time.as_deref(),
            command.end_time.as_deref(),
            command.date.as_deref(),
        )?;

        let edit = ShiftEdit {
            start_time: command.start_time,
            end_time: command.end_time,
            date: command.date,
        };
        lifecycle::request_edit(&mut shift, role, edit, Utc::now().to_rfc3339())?;

        self.shift_repository.update_shift(&shift)?;
        info!("Shift {} now pending approval", shift.id);

        Ok(ShiftResult { shift })
    }

    /// A manager approves a pending proposal; the requested fields are
    /// copied onto the shift and the proposal cleared.
    pub fn approve_changes(&self, role: Role, shift_id: &str) -> Result<ShiftResult> {
        info!("Approving shift {}", shift_id);

        let mut shift = self.load_shift(shift_id)?;
        lifecycle::approve_changes(&mut shift, role)?;
        self.refresh_duration(&mut shift)?;

        self.shift_repository.update_shift(&shift)?;
        info!(
            "Approved shift {}: {}-{} on {}",
            shift.id, shift.start_time, shift.end_time, shift.date
        );

        Ok(ShiftResult { shift })
    }

    /// A manager edits a pending shift directly, discarding the staff
    /// proposal.
    pub fn manager_edit(&self, role: Role, command: ManagerEditCommand) -> Result<ShiftResult> {
        info!("Manager edit for shift {}", command.shift_id);

        let mut shift = self.load_shift(&command.shift_id)?;
        validate_edit_fields(
            command.start_time.as_deref(),
            command.end_time.as_deref(),
            command.date.as_deref(),
        )?;

        let edit = ShiftEdit {
            start_time: command.start_time,
            end_time: command.end_time,
            date: command.date,
        };
        lifecycle::apply_manager_edit(&mut shift, role, edit)?;
        self.refresh_duration(&mut shift)?;

        self.shift_repository.update_shift(&shift)?;
        Ok(ShiftResult { shift })
    }

    /// A manager marks an approved shift complete.
    pub fn mark_completed(&self, role: Role, shift_id: &str) -> Result<ShiftResult> {
        info!("Completing shift {}", shift_id);

        let mut shift = self.load_shift(shift_id)?;
        lifecycle::mark_completed(&mut shift, role)?;

        self.shift_repository.update_shift(&shift)?;
        Ok(ShiftResult { shift })
    }

    /// Soft-delete a shift. The record stays in storage with a terminal
    /// status and drops out of all wage and analytics aggregation.
    pub fn delete_shift(&self, role: Role, shift_id: &str) -> Result<ShiftResult> {
        info!("Deleting shift {}", shift_id);

        let mut shift = self.load_shift(shift_id)?;
        lifecycle::soft_delete(&mut shift, role)?;

        self.shift_repository.update_shift(&shift)?;
        warn!("Shift {} soft-deleted, excluded from aggregation", shift.id);

        Ok(ShiftResult { shift })
    }

    /// Get a shift by ID.
    pub fn get_shift(&self, shift_id: &str) -> Result<Option<Shift>> {
        self.shift_repository.get_shift(shift_id)
    }

    /// Shifts eligible for wage and analytics computation: approved or
    /// completed records for the user within the inclusive date range.
    /// Draft, pending and deleted shifts are excluded.
    pub fn list_counted_shifts(&self, query: CountedShiftsQuery) -> Result<Vec<Shift>> {
        validate_date(&query.start_date)?;
        validate_date(&query.end_date)?;

        let shifts = self.shift_repository.list_shifts_for_user(
            &query.user_id,
            Some(&query.start_date),
            Some(&query.end_date),
        )?;
        let counted: Vec<Shift> = shifts
            .into_iter()
            .filter(|s| s.status.is_counted())
            .collect();

        info!(
            "Found {} counted shifts for {} between {} and {}",
            counted.len(),
            query.user_id,
            query.start_date,
            query.end_date
        );
        Ok(counted)
    }

    fn load_shift(&self, shift_id: &str) -> Result<Shift> {
        self.shift_repository
            .get_shift(shift_id)?
            .ok_or_else(|| anyhow::anyhow!("Shift not found: {}", shift_id))
    }

    /// Recompute the cached duration after start/end may have changed.
    fn refresh_duration(&self, shift: &mut Shift) -> Result<()> {
        shift.duration = time::duration_hours(&shift.start_time, &shift.end_time)?;
        Ok(())
    }
}

fn validate_date(date: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .with_context(|| format!("Invalid date: {}", date))
}

fn validate_edit_fields(
    start_time: Option<&str>,
    end_time: Option<&str>,
    date: Option<&str>,
) -> Result<()> {
    if let Some(start) = start_time {
        time::to_minutes(start)?;
    }
    if let Some(end) = end_time {
        time::to_minutes(end)?;
    }
    if let Some(date) = date {
        validate_date(date)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::LifecycleError;
    use crate::storage::memory::MemoryConnection;
    use shared::{ShiftStatus, TimeInterval};

    fn create_test_service() -> ShiftService<MemoryConnection> {
        ShiftService::new(&MemoryConnection::new())
    }

    fn create_command(acting_role: Role) -> CreateShiftCommand {
        CreateShiftCommand {
            store_id: "store::1".to_string(),
            user_id: "user::1".to_string(),
            nickname: "Mika".to_string(),
            date: "2025-06-13".to_string(),
            start_time: "09:00".to_string(),
            end_time: "18:00".to_string(),
            classes: vec![TimeInterval::new("13:00", "14:00")],
            acting_role,
        }
    }

    #[test]
    fn test_staff_created_shift_is_draft() {
        let service = create_test_service();
        let result = service.create_shift(create_command(Role::User)).unwrap();

        assert_eq!(result.shift.status, ShiftStatus::Draft);
        assert_eq!(result.shift.duration, 9.0);
        assert!(result.shift.requested_changes.is_none());
    }

    #[test]
    fn test_manager_created_shift_is_approved() {
        let service = create_test_service();
        let result = service.create_shift(create_command(Role::Master)).unwrap();
        assert_eq!(result.shift.status, ShiftStatus::Approved);
    }

    #[test]
    fn test_create_rejects_bad_time() {
        let service = create_test_service();
        let mut command = create_command(Role::User);
        command.end_time = "25:00".to_string();
        assert!(service.create_shift(command).is_err());
    }

    #[test]
    fn test_create_rejects_bad_date() {
        let service = create_test_service();
        let mut command = create_command(Role::User);
        command.date = "June 13".to_string();
        assert!(service.create_shift(command).is_err());
    }

    #[test]
    fn test_proposal_then_approval_copies_fields() {
        let service = create_test_service();
        let created = service.create_shift(create_command(Role::Master)).unwrap();

        service
            .request_edit(
                Role::User,
                RequestEditCommand {
                    shift_id: created.shift.id.clone(),
                    start_time: Some("10:00".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        // Stored record keeps its original fields while pending
        let pending = service.get_shift(&created.shift.id).unwrap().unwrap();
        assert_eq!(pending.status, ShiftStatus::Pending);
        assert_eq!(pending.start_time, "09:00");

        let approved = service
            .approve_changes(Role::Master, &created.shift.id)
            .unwrap();
        assert_eq!(approved.shift.status, ShiftStatus::Approved);
        assert_eq!(approved.shift.start_time, "10:00");
        assert!(approved.shift.requested_changes.is_none());
        // Duration recomputed from the new start time
        assert_eq!(approved.shift.duration, 8.0);
    }

    #[test]
    fn test_staff_cannot_approve() {
        let service = create_test_service();
        let created = service.create_shift(create_command(Role::Master)).unwrap();
        service
            .request_edit(
                Role::User,
                RequestEditCommand {
                    shift_id: created.shift.id.clone(),
                    date: Some("2025-06-14".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        let err = service
            .approve_changes(Role::User, &created.shift.id)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LifecycleError>(),
            Some(LifecycleError::NotPermitted { .. })
        ));
    }

    #[test]
    fn test_manager_edit_discards_proposal() {
        let service = create_test_service();
        let created = service.create_shift(create_command(Role::Master)).unwrap();
        service
            .request_edit(
                Role::User,
                RequestEditCommand {
                    shift_id: created.shift.id.clone(),
                    start_time: Some("10:00".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        let edited = service
            .manager_edit(
                Role::Master,
                ManagerEditCommand {
                    shift_id: created.shift.id.clone(),
                    start_time: Some("08:00".to_string()),
                    end_time: Some("16:00".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(edited.shift.status, ShiftStatus::Approved);
        assert_eq!(edited.shift.start_time, "08:00");
        assert!(edited.shift.requested_changes.is_none());
        assert_eq!(edited.shift.duration, 8.0);
    }

    #[test]
    fn test_draft_cannot_be_completed() {
        let service = create_test_service();
        let created = service.create_shift(create_command(Role::User)).unwrap();

        let err = service
            .mark_completed(Role::Master, &created.shift.id)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LifecycleError>(),
            Some(LifecycleError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_delete_is_soft_and_terminal() {
        let service = create_test_service();
        let created = service.create_shift(create_command(Role::Master)).unwrap();

        service.delete_shift(Role::User, &created.shift.id).unwrap();

        // Record is retained with a terminal status
        let stored = service.get_shift(&created.shift.id).unwrap().unwrap();
        assert_eq!(stored.status, ShiftStatus::Deleted);

        // No further transitions accepted
        assert!(service
            .delete_shift(Role::Master, &created.shift.id)
            .is_err());
        assert!(service
            .mark_completed(Role::Master, &created.shift.id)
            .is_err());
    }

    #[test]
    fn test_counted_shifts_filters_status_and_range() {
        let service = create_test_service();

        // Approved, counted
        let approved = service.create_shift(create_command(Role::Master)).unwrap();
        // Completed, counted
        let completed = service.create_shift(create_command(Role::Master)).unwrap();
        service
            .mark_completed(Role::Master, &completed.shift.id)
            .unwrap();
        // Draft, not counted
        service.create_shift(create_command(Role::User)).unwrap();
        // Deleted, not counted
        let deleted = service.create_shift(create_command(Role::Master)).unwrap();
        service.delete_shift(Role::Master, &deleted.shift.id).unwrap();
        // Outside the queried range
        let mut out_of_range = create_command(Role::Master);
        out_of_range.date = "2025-07-01".to_string();
        service.create_shift(out_of_range).unwrap();

        let counted = service
            .list_counted_shifts(CountedShiftsQuery {
                user_id: "user::1".to_string(),
                start_date: "2025-06-01".to_string(),
                end_date: "2025-06-30".to_string(),
            })
            .unwrap();

        let ids: Vec<&str> = counted.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(counted.len(), 2);
        assert!(ids.contains(&approved.shift.id.as_str()));
        assert!(ids.contains(&completed.shift.id.as_str()));
    }
}
