//! # Storage Traits
//!
//! Contracts the computation core requires from its storage collaborators.
//! The core never persists anything itself; these traits are the narrow
//! surface described by the external-interface contract: equality-by-store,
//! equality-by-user and range-by-date are the only access patterns needed.

use anyhow::Result;
use shared::{ExtendedTask, Shift, TaskExecution};

/// Interface for shift record storage.
///
/// Deletion is a status value, never record removal, so there is no delete
/// method here: soft-delete goes through `update_shift` like any other
/// lifecycle transition. Filtering by status is the domain layer's job.
pub trait ShiftStorage: Send + Sync {
    /// Store a new shift record.
    fn store_shift(&self, shift: &Shift) -> Result<()>;

    /// Retrieve a specific shift by ID.
    fn get_shift(&self, shift_id: &str) -> Result<Option<Shift>>;

    /// Replace an existing shift record.
    fn update_shift(&self, shift: &Shift) -> Result<()>;

    /// List shifts for a store, optionally bounded by an inclusive date
    /// range (YYYY-MM-DD). Ordered by date ascending.
    fn list_shifts_for_store(
        &self,
        store_id: &str,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<Vec<Shift>>;

    /// List shifts for a staff member, optionally bounded by an inclusive
    /// date range (YYYY-MM-DD). Ordered by date ascending.
    fn list_shifts_for_user(
        &self,
        user_id: &str,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<Vec<Shift>>;
}

/// Interface for task definitions and observed task executions.
pub trait TaskStorage: Send + Sync {
    /// Store a new task definition.
    fn store_task(&self, task: &ExtendedTask) -> Result<()>;

    /// Retrieve a specific task definition by ID.
    fn get_task(&self, task_id: &str) -> Result<Option<ExtendedTask>>;

    /// List all task definitions.
    fn list_tasks(&self) -> Result<Vec<ExtendedTask>>;

    /// Record one observed task execution.
    fn store_execution(&self, execution: &TaskExecution) -> Result<()>;

    /// List all executions recorded for a staff member.
    fn list_executions_for_user(&self, user_id: &str) -> Result<Vec<TaskExecution>>;
}

/// Factory for repositories over one storage backend.
///
/// Abstracts the concrete connection type so the domain layer works with
/// any backend without knowing its implementation details.
pub trait Connection: Send + Sync + Clone {
    type ShiftRepository: ShiftStorage + Clone;
    type TaskRepository: TaskStorage + Clone;

    fn create_shift_repository(&self) -> Self::ShiftRepository;
    fn create_task_repository(&self) -> Self::TaskRepository;
}
