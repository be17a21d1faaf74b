//! Task store boundary.
//!
//! The workflow reads one snapshot of a project's tasks and hands back a
//! [`MutationBatch`]. Whatever stores the tasks must commit that batch
//! atomically: every write lands or none do.
//!
//! # Concurrency
//!
//! Each batch entry carries the task version seen in the snapshot. A store
//! rejects the whole batch if any task moved on since, so two approvals
//! whose cascades overlap cannot interleave: the second one fails with
//! [`CommitError::Conflict`] and can be retried against a fresh snapshot.

use std::collections::HashMap;

use crate::error::CommitError;
use crate::models::{MutationBatch, Task};

/// Reads project snapshots and commits batches all-or-nothing.
pub trait UpdateApplier {
    /// All tasks of a project, as one consistent snapshot.
    fn load_tasks(&self, project_id: &str) -> Result<Vec<Task>, CommitError>;

    /// Commits every entry of `batch` or none of them.
    fn apply_batch(&mut self, batch: &MutationBatch) -> Result<(), CommitError>;
}

/// In-process task store with optimistic version checks.
///
/// Useful for tests, demos and offline mode.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskStore {
    projects: HashMap<String, Vec<Task>>,
    unavailable: Option<String>,
    commits: usize,
}

impl InMemoryTaskStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `tasks`, grouped by project.
    pub fn with_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let mut store = Self::new();
        for task in tasks {
            store.insert(task);
        }
        store
    }

    /// Adds or replaces a task.
    pub fn insert(&mut self, task: Task) {
        let tasks = self.projects.entry(task.project_id.clone()).or_default();
        match tasks.iter_mut().find(|t| t.id == task.id) {
            Some(existing) => *existing = task,
            None => tasks.push(task),
        }
    }

    /// Looks up a task.
    pub fn task(&self, project_id: &str, task_id: &str) -> Option<&Task> {
        self.projects
            .get(project_id)
            .and_then(|tasks| tasks.iter().find(|t| t.id == task_id))
    }

    /// Makes every call fail with [`CommitError::Unavailable`] until cleared.
    pub fn set_unavailable(&mut self, reason: Option<String>) {
        self.unavailable = reason;
    }

    /// Number of batches committed so far.
    pub fn commit_count(&self) -> usize {
        self.commits
    }

    fn check_available(&self) -> Result<(), CommitError> {
        match &self.unavailable {
            Some(reason) => Err(CommitError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }
}

impl UpdateApplier for InMemoryTaskStore {
    fn load_tasks(&self, project_id: &str) -> Result<Vec<Task>, CommitError> {
        self.check_available()?;
        Ok(self.projects.get(project_id).cloned().unwrap_or_default())
    }

    fn apply_batch(&mut self, batch: &MutationBatch) -> Result<(), CommitError> {
        self.check_available()?;
        let tasks = self
            .projects
            .get(&batch.project_id)
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        // Stage every write first; nothing is stored unless all pass.
        let mut staged: Vec<(usize, Task)> = Vec::with_capacity(batch.len());
        for (task_id, mutation) in &batch.entries {
            let (index, current) = tasks
                .iter()
                .enumerate()
                .find(|(_, t)| t.id == *task_id)
                .ok_or_else(|| CommitError::UnknownTask(task_id.clone()))?;

            if current.version != mutation.expected_version {
                return Err(CommitError::Conflict {
                    task_id: task_id.clone(),
                    expected: mutation.expected_version,
                    found: current.version,
                });
            }

            let mut next = current.patched(&mutation.patch);
            if !next.is_consistent() {
                return Err(CommitError::InvariantViolation {
                    task_id: task_id.clone(),
                    reason: format!(
                        "{} to {}, '{}' at {}%",
                        next.start_date, next.end_date, next.status, next.progress
                    ),
                });
            }
            next.version += 1;
            staged.push((index, next));
        }

        if let Some(tasks) = self.projects.get_mut(&batch.project_id) {
            for (index, task) in staged {
                tasks[index] = task;
            }
        }
        self.commits += 1;
        Ok(())
    }
}
