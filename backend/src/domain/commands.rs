//! Domain-level command and query types.
//!
//! These structs are used by services inside the domain layer. The caller
//! (REST, Tauri, or any other presentation layer) is responsible for
//! mapping its public DTOs onto these internal types.

pub mod shifts {
    use shared::{Role, Shift, TimeInterval};

    /// Input for creating a new shift. Status is decided by the acting
    /// role: staff-created shifts start as drafts, manager-created shifts
    /// are pre-approved.
    #[derive(Debug, Clone)]
    pub struct CreateShiftCommand {
        pub store_id: String,
        pub user_id: String,
        /// Display name of the owning user, snapshotted onto the record.
        pub nickname: String,
        /// Calendar date (YYYY-MM-DD).
        pub date: String,
        pub start_time: String,
        pub end_time: String,
        pub classes: Vec<TimeInterval>,
        pub acting_role: Role,
    }

    /// Input for a staff-proposed edit. `None` fields are unchanged.
    #[derive(Debug, Clone, Default)]
    pub struct RequestEditCommand {
        pub shift_id: String,
        pub start_time: Option<String>,
        pub end_time: Option<String>,
        pub date: Option<String>,
    }

    /// Input for a direct manager edit of a pending shift.
    #[derive(Debug, Clone, Default)]
    pub struct ManagerEditCommand {
        pub shift_id: String,
        pub start_time: Option<String>,
        pub end_time: Option<String>,
        pub date: Option<String>,
    }

    /// Query for the shifts counted by wage and analytics aggregation.
    #[derive(Debug, Clone)]
    pub struct CountedShiftsQuery {
        pub user_id: String,
        /// Inclusive period start (YYYY-MM-DD).
        pub start_date: String,
        /// Inclusive period end (YYYY-MM-DD).
        pub end_date: String,
    }

    /// Result wrapper returned by all single-shift operations.
    #[derive(Debug, Clone)]
    pub struct ShiftResult {
        pub shift: Shift,
    }
}

pub mod wages {
    use shared::WageBreakdown;

    /// Query for a staff member's pay over a period.
    #[derive(Debug, Clone)]
    pub struct PayrollQuery {
        pub user_id: String,
        /// Inclusive period start (YYYY-MM-DD).
        pub start_date: String,
        /// Inclusive period end (YYYY-MM-DD).
        pub end_date: String,
        /// Hourly wage; the configured default rate when omitted.
        pub hourly_rate: Option<f64>,
    }

    /// Aggregated pay for a period. Shifts whose class exclusions drove
    /// their work minutes negative are listed in `anomalies` so callers
    /// can surface the double-booked class time.
    #[derive(Debug, Clone)]
    pub struct PayrollResult {
        pub shift_count: usize,
        pub total_work_minutes: i64,
        pub total_pay: f64,
        pub breakdowns: Vec<(String, WageBreakdown)>,
        pub anomalies: Vec<String>,
    }
}

pub mod performance {
    use shared::{PerformanceTier, TaskPerformance};

    /// Query for a staff member's task performance over a period.
    #[derive(Debug, Clone)]
    pub struct PerformancePeriodQuery {
        pub user_id: String,
        /// Inclusive period start (YYYY-MM-DD).
        pub start_date: String,
        /// Inclusive period end (YYYY-MM-DD).
        pub end_date: String,
    }

    /// Per-task performance with its combined score and tier.
    #[derive(Debug, Clone)]
    pub struct ScoredTaskPerformance {
        pub performance: TaskPerformance,
        pub overall_score: f64,
        pub tier: PerformanceTier,
    }

    /// Result of evaluating one staff member over a period.
    #[derive(Debug, Clone)]
    pub struct PerformancePeriodResult {
        pub tasks: Vec<ScoredTaskPerformance>,
    }

    /// Query for ranked task recommendations for a staff member.
    #[derive(Debug, Clone)]
    pub struct RecommendTasksQuery {
        pub user_id: String,
        /// Current wall-clock time ("HH:mm").
        pub current_time: String,
        /// Minutes left in the staff member's shift.
        pub shift_minutes_remaining: i64,
        /// Performance lookback period start (YYYY-MM-DD, inclusive).
        pub start_date: String,
        /// Performance lookback period end (YYYY-MM-DD, inclusive).
        pub end_date: String,
    }
}
