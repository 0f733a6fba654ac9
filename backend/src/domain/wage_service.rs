//! Wage computation for staff shifts.
//!
//! Billable staff time is the staff interval minus embedded class time.
//! Each class interval that overlaps the staff interval is subtracted
//! independently; overlapping classes therefore double-count their shared
//! minutes, and the resulting work minutes can go negative. That negative
//! value is a data-quality signal for double-booked class time and is
//! surfaced to callers, never clamped.

use anyhow::Result;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::domain::commands::shifts::CountedShiftsQuery;
use crate::domain::commands::wages::{PayrollQuery, PayrollResult};
use crate::domain::shift_service::ShiftService;
use crate::domain::time;
use crate::storage::traits::Connection;
use shared::{SegmentKind, Shift, TimeInterval, WageBreakdown, WageSegment};

/// Wage configuration, passed in explicitly at construction time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WageConfig {
    /// Standard hourly rate applied when a query gives none.
    pub default_hourly_rate: f64,
}

impl Default for WageConfig {
    fn default() -> Self {
        Self {
            default_hourly_rate: 1100.0,
        }
    }
}

/// Compute the wage breakdown for one staff interval and its classes.
///
/// Pay is `hourly_rate * work_minutes / 60`, unrounded. Every class that
/// overlaps the staff interval contributes a zero-pay segment for display.
pub fn compute_breakdown(
    staff: &TimeInterval,
    classes: &[TimeInterval],
    hourly_rate: f64,
) -> Result<WageBreakdown> {
    let total_minutes = time::duration_minutes(&staff.start, &staff.end)?;

    let mut excluded_minutes = 0;
    let mut class_segments = Vec::new();
    for class in classes {
        if !time::overlaps(staff, class)? {
            continue;
        }
        let minutes = time::overlap_minutes(staff, class)?;
        excluded_minutes += minutes;
        class_segments.push(WageSegment {
            kind: SegmentKind::Class,
            minutes,
            pay: 0.0,
        });
    }

    let work_minutes = total_minutes - excluded_minutes;
    let pay = hourly_rate * (work_minutes as f64 / 60.0);

    let mut segments = vec![WageSegment {
        kind: SegmentKind::Work,
        minutes: work_minutes,
        pay,
    }];
    segments.extend(class_segments);

    Ok(WageBreakdown {
        work_minutes,
        pay,
        segments,
    })
}

/// Service computing pay over stored shifts.
#[derive(Clone)]
pub struct WageService<C: Connection> {
    shift_service: ShiftService<C>,
    config: WageConfig,
}

impl<C: Connection> WageService<C> {
    pub fn new(connection: &C, config: WageConfig) -> Self {
        Self {
            shift_service: ShiftService::new(connection),
            config,
        }
    }

    /// Wage breakdown for a single shift at the given (or default) rate.
    pub fn shift_wage(&self, shift: &Shift, hourly_rate: Option<f64>) -> Result<WageBreakdown> {
        let rate = hourly_rate.unwrap_or(self.config.default_hourly_rate);
        compute_breakdown(&shift.staff_interval(), &shift.classes, rate)
    }

    /// Aggregate pay for a staff member over a period. Only approved and
    /// completed shifts count; draft, pending and deleted shifts are
    /// ignored entirely.
    pub fn payroll(&self, query: PayrollQuery) -> Result<PayrollResult> {
        info!(
            "Computing payroll for {} between {} and {}",
            query.user_id, query.start_date, query.end_date
        );

        let rate = query.hourly_rate.unwrap_or(self.config.default_hourly_rate);
        let shifts = self.shift_service.list_counted_shifts(CountedShiftsQuery {
            user_id: query.user_id.clone(),
            start_date: query.start_date,
            end_date: query.end_date,
        })?;

        let mut total_work_minutes = 0;
        let mut total_pay = 0.0;
        let mut breakdowns = Vec::with_capacity(shifts.len());
        let mut anomalies = Vec::new();

        for shift in &shifts {
            let breakdown = compute_breakdown(&shift.staff_interval(), &shift.classes, rate)?;
            if breakdown.work_minutes < 0 {
                warn!(
                    "Shift {} has {} work minutes; class intervals double-book its staff time",
                    shift.id, breakdown.work_minutes
                );
                anomalies.push(shift.id.clone());
            }
            total_work_minutes += breakdown.work_minutes;
            total_pay += breakdown.pay;
            breakdowns.push((shift.id.clone(), breakdown));
        }

        info!(
            "Payroll for {}: {} shifts, {} work minutes, pay {:.2}",
            query.user_id,
            shifts.len(),
            total_work_minutes,
            total_pay
        );

        Ok(PayrollResult {
            shift_count: shifts.len(),
            total_work_minutes,
            total_pay,
            breakdowns,
            anomalies,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::shifts::CreateShiftCommand;
    use crate::storage::memory::MemoryConnection;
    use shared::Role;

    fn interval(start: &str, end: &str) -> TimeInterval {
        TimeInterval::new(start, end)
    }

    #[test]
    fn test_wage_example_from_contract() {
        // 09:00-18:00 staff interval with one 13:00-14:00 class at 1100/h
        let breakdown = compute_breakdown(
            &interval("09:00", "18:00"),
            &[interval("13:00", "14:00")],
            1100.0,
        )
        .unwrap();

        assert_eq!(breakdown.work_minutes, 480);
        assert_eq!(breakdown.pay, 8800.0);
        assert_eq!(breakdown.segments.len(), 2);
        assert_eq!(breakdown.segments[0].kind, SegmentKind::Work);
        assert_eq!(breakdown.segments[1].kind, SegmentKind::Class);
        assert_eq!(breakdown.segments[1].minutes, 60);
        assert_eq!(breakdown.segments[1].pay, 0.0);
    }

    #[test]
    fn test_no_classes_degenerates_to_full_interval() {
        let breakdown = compute_breakdown(&interval("09:00", "18:00"), &[], 1000.0).unwrap();
        assert_eq!(breakdown.work_minutes, 540);
        assert_eq!(breakdown.pay, 9000.0);
        assert_eq!(breakdown.segments.len(), 1);
    }

    #[test]
    fn test_idempotent_for_identical_inputs() {
        let staff = interval("09:00", "18:00");
        let classes = [interval("13:00", "14:00"), interval("15:00", "16:30")];
        let first = compute_breakdown(&staff, &classes, 1200.0).unwrap();
        let second = compute_breakdown(&staff, &classes, 1200.0).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_class_outside_staff_interval_is_ignored() {
        let breakdown = compute_breakdown(
            &interval("09:00", "12:00"),
            &[interval("13:00", "14:00")],
            1000.0,
        )
        .unwrap();
        assert_eq!(breakdown.work_minutes, 180);
        // No class segment for the disjoint interval
        assert_eq!(breakdown.segments.len(), 1);
    }

    #[test]
    fn test_partially_overlapping_class_counts_overlap_only() {
        let breakdown = compute_breakdown(
            &interval("09:00", "12:00"),
            &[interval("11:00", "13:00")],
            1000.0,
        )
        .unwrap();
        assert_eq!(breakdown.work_minutes, 120);
        assert_eq!(breakdown.segments[1].minutes, 60);
    }

    #[test]
    fn test_overlapping_classes_double_subtract() {
        // Two classes covering the same hour both subtract it. This is the
        // documented double-count, not a union.
        let breakdown = compute_breakdown(
            &interval("09:00", "12:00"),
            &[interval("10:00", "11:00"), interval("10:00", "11:00")],
            1000.0,
        )
        .unwrap();
        assert_eq!(breakdown.work_minutes, 60);
    }

    #[test]
    fn test_double_counting_can_go_negative() {
        // Classes exceed the staff interval via double-counting; negative
        // work minutes pass through as a data-quality signal.
        let breakdown = compute_breakdown(
            &interval("09:00", "10:00"),
            &[interval("09:00", "10:00"), interval("09:00", "10:00")],
            1200.0,
        )
        .unwrap();
        assert_eq!(breakdown.work_minutes, -60);
        assert_eq!(breakdown.pay, -1200.0);
    }

    #[test]
    fn test_invalid_time_propagates() {
        let result = compute_breakdown(
            &interval("9am", "18:00"),
            &[],
            1000.0,
        );
        assert!(result.is_err());
    }

    fn create_test_service() -> (ShiftService<MemoryConnection>, WageService<MemoryConnection>) {
        let conn = MemoryConnection::new();
        (
            ShiftService::new(&conn),
            WageService::new(&conn, WageConfig::default()),
        )
    }

    fn shift_command(date: &str, classes: Vec<TimeInterval>) -> CreateShiftCommand {
        CreateShiftCommand {
            store_id: "store::1".to_string(),
            user_id: "user::1".to_string(),
            nickname: "Mika".to_string(),
            date: date.to_string(),
            start_time: "09:00".to_string(),
            end_time: "18:00".to_string(),
            classes,
            acting_role: Role::Master,
        }
    }

    #[test]
    fn test_shift_wage_for_single_shift() {
        let (shifts, wages) = create_test_service();
        let created = shifts
            .create_shift(shift_command(
                "2025-06-10",
                vec![interval("13:00", "14:00")],
            ))
            .unwrap();

        // Default rate from the config (1100/h)
        let at_default = wages.shift_wage(&created.shift, None).unwrap();
        assert_eq!(at_default.work_minutes, 480);
        assert_eq!(at_default.pay, 8800.0);

        // Explicit rate overrides the default
        let at_explicit = wages.shift_wage(&created.shift, Some(2000.0)).unwrap();
        assert_eq!(at_explicit.work_minutes, 480);
        assert_eq!(at_explicit.pay, 16000.0);
    }

    #[test]
    fn test_payroll_counts_only_approved_and_completed() {
        let (shifts, wages) = create_test_service();

        // Counted: one approved shift with a one-hour class
        shifts
            .create_shift(shift_command(
                "2025-06-10",
                vec![interval("13:00", "14:00")],
            ))
            .unwrap();
        // Not counted: staff draft
        let mut draft = shift_command("2025-06-11", Vec::new());
        draft.acting_role = Role::User;
        shifts.create_shift(draft).unwrap();
        // Not counted: deleted shift, regardless of its time fields
        let deleted = shifts
            .create_shift(shift_command("2025-06-12", Vec::new()))
            .unwrap();
        shifts.delete_shift(Role::Master, &deleted.shift.id).unwrap();

        let result = wages
            .payroll(PayrollQuery {
                user_id: "user::1".to_string(),
                start_date: "2025-06-01".to_string(),
                end_date: "2025-06-30".to_string(),
                hourly_rate: Some(1100.0),
            })
            .unwrap();

        assert_eq!(result.shift_count, 1);
        assert_eq!(result.total_work_minutes, 480);
        assert_eq!(result.total_pay, 8800.0);
        assert!(result.anomalies.is_empty());
    }

    #[test]
    fn test_payroll_uses_default_rate_when_omitted() {
        let (shifts, wages) = create_test_service();
        shifts
            .create_shift(shift_command("2025-06-10", Vec::new()))
            .unwrap();

        let result = wages
            .payroll(PayrollQuery {
                user_id: "user::1".to_string(),
                start_date: "2025-06-01".to_string(),
                end_date: "2025-06-30".to_string(),
                hourly_rate: None,
            })
            .unwrap();

        // 9 hours at the default 1100/h
        assert_eq!(result.total_pay, 9900.0);
    }

    #[test]
    fn test_payroll_reports_negative_shifts_as_anomalies() {
        let (shifts, wages) = create_test_service();
        let mut command = shift_command("2025-06-10", Vec::new());
        command.start_time = "09:00".to_string();
        command.end_time = "10:00".to_string();
        command.classes = vec![interval("09:00", "10:00"), interval("09:00", "10:00")];
        let created = shifts.create_shift(command).unwrap();

        let result = wages
            .payroll(PayrollQuery {
                user_id: "user::1".to_string(),
                start_date: "2025-06-01".to_string(),
                end_date: "2025-06-30".to_string(),
                hourly_rate: Some(1000.0),
            })
            .unwrap();

        assert_eq!(result.total_work_minutes, -60);
        assert_eq!(result.anomalies, vec![created.shift.id]);
    }
}
