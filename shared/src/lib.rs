use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of the acting user, as supplied by the identity layer.
///
/// The lifecycle rules are expressed purely in terms of this role; there is
/// no richer permission model in the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Store manager: creates pre-approved shifts, approves staff proposals.
    Master,
    /// Regular staff member: edits route through the approval workflow.
    User,
}

/// Workflow status of a shift record.
///
/// `Deleted` is terminal. Only `Approved` and `Completed` shifts are counted
/// by wage and analytics aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShiftStatus {
    Draft,
    Pending,
    Approved,
    Completed,
    Deleted,
}

impl ShiftStatus {
    /// Whether this shift participates in wage and analytics aggregation.
    pub fn is_counted(&self) -> bool {
        matches!(self, ShiftStatus::Approved | ShiftStatus::Completed)
    }

    /// Terminal statuses accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ShiftStatus::Deleted)
    }
}

impl fmt::Display for ShiftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ShiftStatus::Draft => "draft",
            ShiftStatus::Pending => "pending",
            ShiftStatus::Approved => "approved",
            ShiftStatus::Completed => "completed",
            ShiftStatus::Deleted => "deleted",
        };
        write!(f, "{}", s)
    }
}

/// A wall-clock time range. Times are "HH:mm" strings (24-hour), carrying no
/// date or timezone. A range whose end is lexically before its start is
/// interpreted as crossing midnight; the stored strings are never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: String,
    pub end: String,
}

impl TimeInterval {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

/// A staff-proposed edit to a shift, awaiting manager approval.
///
/// Fields left as `None` are unchanged by the proposal. The shift's own
/// scheduling fields stay untouched until a manager approves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestedChanges {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    /// Proposed calendar date (YYYY-MM-DD).
    pub date: Option<String>,
    /// RFC 3339 timestamp of when the proposal was submitted.
    pub requested_at: String,
}

/// One scheduled work period for one staff member on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    pub id: String,
    pub store_id: String,
    pub user_id: String,
    /// Display name snapshot of the owning user at creation time.
    /// Intentionally not live-joined against the identity layer.
    pub nickname: String,
    /// Calendar date (YYYY-MM-DD).
    pub date: String,
    /// Start of the staff interval ("HH:mm").
    pub start_time: String,
    /// End of the staff interval ("HH:mm").
    pub end_time: String,
    /// Embedded lesson intervals, excluded from billable staff time.
    #[serde(default)]
    pub classes: Vec<TimeInterval>,
    pub status: ShiftStatus,
    /// Pending staff proposal, if any. Cleared on approval.
    #[serde(default)]
    pub requested_changes: Option<RequestedChanges>,
    /// Cached staff-interval length in hours, one decimal place. Recomputed
    /// whenever start/end change.
    pub duration: f64,
}

impl Shift {
    /// Generate a unique shift ID from a timestamp.
    /// Format: shift::<epoch_millis>::<random_suffix>
    pub fn generate_id(epoch_millis: u64) -> String {
        format!("shift::{}::{}", epoch_millis, generate_random_suffix(4))
    }

    /// Parse a shift ID to extract the timestamp.
    pub fn parse_id(id: &str) -> Result<u64, RecordIdError> {
        let parts: Vec<&str> = id.split("::").collect();
        if parts.len() != 3 || parts[0] != "shift" {
            return Err(RecordIdError::InvalidFormat);
        }
        parts[1]
            .parse::<u64>()
            .map_err(|_| RecordIdError::InvalidTimestamp)
    }

    /// The overall start/end span of the shift, before class exclusion.
    pub fn staff_interval(&self) -> TimeInterval {
        TimeInterval::new(self.start_time.clone(), self.end_time.clone())
    }

    /// Parse the shift's calendar date.
    pub fn parse_date(&self) -> Option<chrono::NaiveDate> {
        chrono::NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }
}

/// Priority of a task definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskPriority {
    High,
    Medium,
    Low,
}

impl TaskPriority {
    /// Weight used by task recommendation scoring.
    pub fn weight(&self) -> f64 {
        match self {
            TaskPriority::High => 3.0,
            TaskPriority::Medium => 2.0,
            TaskPriority::Low => 1.0,
        }
    }
}

/// A task definition with its expected baselines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtendedTask {
    pub id: String,
    pub name: String,
    pub priority: TaskPriority,
    /// Expected duration of one execution, in minutes.
    pub base_time_minutes: f64,
    /// Expected repetitions per shift.
    pub base_count_per_shift: f64,
    /// When set, the task may only be recommended while the current time
    /// falls inside this window (a time-specific task).
    #[serde(default)]
    pub restricted_window: Option<TimeInterval>,
}

impl ExtendedTask {
    /// Generate a task ID from a timestamp.
    pub fn generate_id(epoch_millis: u64) -> String {
        format!("task::{}", epoch_millis)
    }

    pub fn is_time_specific(&self) -> bool {
        self.restricted_window.is_some()
    }
}

/// One observed occurrence of a task within a shift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskExecution {
    pub id: String,
    pub task_id: String,
    /// Staff member who performed the task.
    pub user_id: String,
    /// Shift the execution occurred within.
    pub shift_id: String,
    /// Execution start ("HH:mm").
    pub start_time: String,
    /// Execution end ("HH:mm").
    pub end_time: String,
}

impl TaskExecution {
    /// Generate an execution ID from a timestamp.
    pub fn generate_id(epoch_millis: u64) -> String {
        format!("execution::{}", epoch_millis)
    }
}

/// Performance aggregate for one (user, task) pair over a period.
///
/// All five rates are normalized ratios, bounded below by 0 and individually
/// capped above (efficiency 2.0, proactivity 3.0, consistency 1.0,
/// completion 1.0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskPerformance {
    pub user_id: String,
    pub task_id: String,
    /// Period start date (YYYY-MM-DD, inclusive).
    pub period_start: String,
    /// Period end date (YYYY-MM-DD, inclusive).
    pub period_end: String,
    pub efficiency_rate: f64,
    pub proactivity_rate: f64,
    pub consistency_rate: f64,
    pub frequency_rate: f64,
    pub completion_rate: f64,
}

/// Performance tier a combined score classifies into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerformanceTier {
    Excellent,
    Good,
    Average,
    NeedsImprovement,
}

impl fmt::Display for PerformanceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PerformanceTier::Excellent => "excellent",
            PerformanceTier::Good => "good",
            PerformanceTier::Average => "average",
            PerformanceTier::NeedsImprovement => "needs_improvement",
        };
        write!(f, "{}", s)
    }
}

/// Kind of a wage breakdown segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentKind {
    /// Billable staff-only time.
    Work,
    /// Excluded class time (zero pay, shown for display purposes).
    Class,
}

/// One segment of a shift's wage breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WageSegment {
    pub kind: SegmentKind,
    pub minutes: i64,
    pub pay: f64,
}

/// Result of computing wages for one shift.
///
/// `work_minutes` may be negative when overlapping class intervals
/// double-count shared time; callers must surface that as a data-quality
/// anomaly rather than clamp it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WageBreakdown {
    pub work_minutes: i64,
    pub pay: f64,
    pub segments: Vec<WageSegment>,
}

/// One recommended task with its recommendation score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecommendation {
    pub task: ExtendedTask,
    pub score: f64,
}

/// Where a user's metric value stands within a peer roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerRanking {
    /// 1-based rank; ties favor the user.
    pub rank: usize,
    pub percentile: f64,
}

/// Generate a random hex suffix for record IDs.
fn generate_random_suffix(len: usize) -> String {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("Time went backwards")
        .as_nanos();
    format!("{:x}", now % (16_u128.pow(len as u32)))
        .chars()
        .take(len)
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecordIdError {
    InvalidFormat,
    InvalidTimestamp,
}

impl fmt::Display for RecordIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordIdError::InvalidFormat => write!(f, "Invalid record ID format"),
            RecordIdError::InvalidTimestamp => write!(f, "Invalid timestamp in record ID"),
        }
    }
}

impl std::error::Error for RecordIdError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_shift_id() {
        let id = Shift::generate_id(1702516122000);
        assert!(id.starts_with("shift::1702516122000::"));
        assert_eq!(Shift::parse_id(&id).unwrap(), 1702516122000);
    }

    #[test]
    fn test_parse_shift_id() {
        let timestamp = Shift::parse_id("shift::1702516122000::af3c").unwrap();
        assert_eq!(timestamp, 1702516122000);

        assert!(Shift::parse_id("shift").is_err());
        assert!(Shift::parse_id("shift::1702516122000").is_err());
        assert!(Shift::parse_id("task::123::af3c").is_err());
        assert!(Shift::parse_id("shift::not_a_number::af3c").is_err());
    }

    #[test]
    fn test_status_is_counted() {
        assert!(ShiftStatus::Approved.is_counted());
        assert!(ShiftStatus::Completed.is_counted());
        assert!(!ShiftStatus::Draft.is_counted());
        assert!(!ShiftStatus::Pending.is_counted());
        assert!(!ShiftStatus::Deleted.is_counted());
    }

    #[test]
    fn test_status_is_terminal() {
        assert!(ShiftStatus::Deleted.is_terminal());
        assert!(!ShiftStatus::Completed.is_terminal());
    }

    #[test]
    fn test_priority_weights() {
        assert_eq!(TaskPriority::High.weight(), 3.0);
        assert_eq!(TaskPriority::Medium.weight(), 2.0);
        assert_eq!(TaskPriority::Low.weight(), 1.0);
    }

    #[test]
    fn test_missing_classes_deserializes_as_empty() {
        let json = r#"{
            "id": "shift::1",
            "store_id": "store::1",
            "user_id": "user::1",
            "nickname": "Mika",
            "date": "2025-06-13",
            "start_time": "09:00",
            "end_time": "18:00",
            "status": "Approved",
            "duration": 9.0
        }"#;
        let shift: Shift = serde_json::from_str(json).unwrap();
        assert!(shift.classes.is_empty());
        assert!(shift.requested_changes.is_none());
    }

    #[test]
    fn test_parse_date() {
        let json = r#"{
            "id": "shift::1",
            "store_id": "store::1",
            "user_id": "user::1",
            "nickname": "Mika",
            "date": "2025-06-13",
            "start_time": "09:00",
            "end_time": "18:00",
            "status": "Approved",
            "duration": 9.0
        }"#;
        let mut shift: Shift = serde_json::from_str(json).unwrap();
        let date = shift.parse_date().unwrap();
        assert_eq!(date, chrono::NaiveDate::from_ymd_opt(2025, 6, 13).unwrap());

        shift.date = "June 13".to_string();
        assert!(shift.parse_date().is_none());
    }

    #[test]
    fn test_tier_display() {
        assert_eq!(PerformanceTier::Excellent.to_string(), "excellent");
        assert_eq!(
            PerformanceTier::NeedsImprovement.to_string(),
            "needs_improvement"
        );
    }
}
