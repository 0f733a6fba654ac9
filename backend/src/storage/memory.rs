//! In-memory storage backend.
//!
//! Reference implementation of the storage traits, used by tests and by
//! `Backend::new`. Updates are whole-record and last-write-wins; callers
//! that need optimistic concurrency add it at their own storage layer.

use anyhow::Result;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::storage::traits::{Connection, ShiftStorage, TaskStorage};
use shared::{ExtendedTask, Shift, TaskExecution};

/// Shared in-memory tables behind one connection.
#[derive(Clone, Default)]
pub struct MemoryConnection {
    shifts: Arc<RwLock<HashMap<String, Shift>>>,
    tasks: Arc<RwLock<HashMap<String, ExtendedTask>>>,
    executions: Arc<RwLock<Vec<TaskExecution>>>,
}

impl MemoryConnection {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Connection for MemoryConnection {
    type ShiftRepository = MemoryShiftRepository;
    type TaskRepository = MemoryTaskRepository;

    fn create_shift_repository(&self) -> MemoryShiftRepository {
        MemoryShiftRepository {
            shifts: self.shifts.clone(),
        }
    }

    fn create_task_repository(&self) -> MemoryTaskRepository {
        MemoryTaskRepository {
            tasks: self.tasks.clone(),
            executions: self.executions.clone(),
        }
    }
}

#[derive(Clone)]
pub struct MemoryShiftRepository {
    shifts: Arc<RwLock<HashMap<String, Shift>>>,
}

/// Inclusive date-range check over YYYY-MM-DD strings, which sort
/// lexicographically in chronological order.
fn within_range(date: &str, start_date: Option<&str>, end_date: Option<&str>) -> bool {
    if let Some(start) = start_date {
        if date < start {
            return false;
        }
    }
    if let Some(end) = end_date {
        if date > end {
            return false;
        }
    }
    true
}

impl ShiftStorage for MemoryShiftRepository {
    fn store_shift(&self, shift: &Shift) -> Result<()> {
        self.shifts
            .write()
            .expect("shift table lock poisoned")
            .insert(shift.id.clone(), shift.clone());
        Ok(())
    }

    fn get_shift(&self, shift_id: &str) -> Result<Option<Shift>> {
        Ok(self
            .shifts
            .read()
            .expect("shift table lock poisoned")
            .get(shift_id)
            .cloned())
    }

    fn update_shift(&self, shift: &Shift) -> Result<()> {
        let mut shifts = self.shifts.write().expect("shift table lock poisoned");
        if !shifts.contains_key(&shift.id) {
            anyhow::bail!("Shift not found: {}", shift.id);
        }
        shifts.insert(shift.id.clone(), shift.clone());
        Ok(())
    }

    fn list_shifts_for_store(
        &self,
        store_id: &str,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<Vec<Shift>> {
        let shifts = self.shifts.read().expect("shift table lock poisoned");
        let mut matching: Vec<Shift> = shifts
            .values()
            .filter(|s| s.store_id == store_id && within_range(&s.date, start_date, end_date))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        Ok(matching)
    }

    fn list_shifts_for_user(
        &self,
        user_id: &str,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<Vec<Shift>> {
        let shifts = self.shifts.read().expect("shift table lock poisoned");
        let mut matching: Vec<Shift> = shifts
            .values()
            .filter(|s| s.user_id == user_id && within_range(&s.date, start_date, end_date))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        Ok(matching)
    }
}

#[derive(Clone)]
pub struct MemoryTaskRepository {
    tasks: Arc<RwLock<HashMap<String, ExtendedTask>>>,
    executions: Arc<RwLock<Vec<TaskExecution>>>,
}

impl TaskStorage for MemoryTaskRepository {
    fn store_task(&self, task: &ExtendedTask) -> Result<()> {
        self.tasks
            .write()
            .expect("task table lock poisoned")
            .insert(task.id.clone(), task.clone());
        Ok(())
    }

    fn get_task(&self, task_id: &str) -> Result<Option<ExtendedTask>> {
        Ok(self
            .tasks
            .read()
            .expect("task table lock poisoned")
            .get(task_id)
            .cloned())
    }

    fn list_tasks(&self) -> Result<Vec<ExtendedTask>> {
        let tasks = self.tasks.read().expect("task table lock poisoned");
        let mut all: Vec<ExtendedTask> = tasks.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }

    fn store_execution(&self, execution: &TaskExecution) -> Result<()> {
        self.executions
            .write()
            .expect("execution table lock poisoned")
            .push(execution.clone());
        Ok(())
    }

    fn list_executions_for_user(&self, user_id: &str) -> Result<Vec<TaskExecution>> {
        Ok(self
            .executions
            .read()
            .expect("execution table lock poisoned")
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect())
    }
}
