//! Mutation batch model.
//!
//! A batch is the complete set of task writes produced by one operation
//! (a direct update or an approved cascade). Stores commit a batch as a
//! unit: every entry lands or none do.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::TaskPatch;

/// One task write within a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskMutation {
    /// Version of the task in the snapshot the batch was computed from.
    pub expected_version: u64,
    /// Fields to overwrite.
    pub patch: TaskPatch,
}

/// An all-or-nothing set of task writes for one project.
///
/// Entries are keyed by task id and iterate in id order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MutationBatch {
    /// Project every entry belongs to.
    pub project_id: String,
    /// Task id → write.
    pub entries: BTreeMap<String, TaskMutation>,
}

impl MutationBatch {
    /// Creates an empty batch for a project.
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Adds (or merges into) the write for `task_id`.
    ///
    /// When the task already has an entry, fields of `patch` overlay the
    /// existing ones and the earlier expected version is kept.
    pub fn push(&mut self, task_id: impl Into<String>, expected_version: u64, patch: TaskPatch) {
        let task_id = task_id.into();
        match self.entries.remove(&task_id) {
            Some(existing) => {
                self.entries.insert(
                    task_id,
                    TaskMutation {
                        expected_version: existing.expected_version,
                        patch: existing.patch.merge(patch),
                    },
                );
            }
            None => {
                self.entries.insert(
                    task_id,
                    TaskMutation {
                        expected_version,
                        patch,
                    },
                );
            }
        }
    }

    /// Builder form of [`push`](Self::push).
    pub fn with(mut self, task_id: impl Into<String>, expected_version: u64, patch: TaskPatch) -> Self {
        self.push(task_id, expected_version, patch);
        self
    }

    /// Write for a task, if present.
    pub fn get(&self, task_id: &str) -> Option<&TaskMutation> {
        self.entries.get(task_id)
    }

    /// Task ids touched by the batch, in order.
    pub fn task_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of writes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the batch writes nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
