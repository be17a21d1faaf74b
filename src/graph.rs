//! Task dependency graph.
//!
//! Tasks are held in a flat map keyed by id; dependency edges are id
//! references. A child index (`id → tasks depending on it`) is built once
//! per snapshot and never patched in place: when the task list changes,
//! build a new graph.
//!
//! Each task has at most one parent, so a well-formed graph is a forest.
//! Input comes from an external store and is not trusted to be one.

use std::collections::{HashMap, HashSet};

use crate::error::{Result, ScheduleError};
use crate::models::Task;

/// Index over one project's task snapshot.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use site_schedule::graph::TaskGraph;
/// use site_schedule::models::Task;
///
/// let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let tasks = vec![
///     Task::new("A", "P1", "trade-1", d),
///     Task::new("B", "P1", "trade-2", d).with_dependency("A"),
/// ];
/// let graph = TaskGraph::build(tasks).unwrap();
/// assert_eq!(graph.children_of("A"), ["B".to_string()]);
/// assert_eq!(graph.parent_of("B").map(|t| t.id.as_str()), Some("A"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TaskGraph {
    tasks: HashMap<String, Task>,
    /// Ids in input order, for deterministic iteration.
    order: Vec<String>,
    children: HashMap<String, Vec<String>>,
    dangling: Vec<ScheduleError>,
}

impl TaskGraph {
    /// Builds the graph in O(n).
    ///
    /// Dangling references (a `dependency` naming a task not in the list)
    /// are tolerated: the task is treated as having no parent, and the
    /// problem is recorded in [`dangling`](Self::dangling).
    ///
    /// # Errors
    /// [`ScheduleError::DuplicateTaskId`] if two tasks share an id.
    pub fn build(tasks: impl IntoIterator<Item = Task>) -> Result<Self> {
        let mut graph = Self::default();

        for task in tasks {
            if graph.tasks.contains_key(&task.id) {
                return Err(ScheduleError::DuplicateTaskId(task.id));
            }
            graph.order.push(task.id.clone());
            graph.tasks.insert(task.id.clone(), task);
        }

        for id in &graph.order {
            let task = &graph.tasks[id];
            let Some(parent) = task.dependency.as_deref() else {
                continue;
            };
            if graph.tasks.contains_key(parent) {
                graph
                    .children
                    .entry(parent.to_string())
                    .or_default()
                    .push(id.clone());
            } else {
                tracing::warn!(
                    task_id = %id,
                    missing = %parent,
                    "task depends on a task outside the snapshot; treating it as unparented"
                );
                graph.dangling.push(ScheduleError::DanglingDependency {
                    task_id: id.clone(),
                    missing: parent.to_string(),
                });
            }
        }

        Ok(graph)
    }

    /// Tasks whose `dependency` is `task_id`, in input order.
    ///
    /// Empty for leaves and unknown ids.
    pub fn children_of(&self, task_id: &str) -> &[String] {
        self.children
            .get(task_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The task `task_id` depends on, if it resolves.
    pub fn parent_of(&self, task_id: &str) -> Option<&Task> {
        self.tasks
            .get(task_id)
            .and_then(|t| t.dependency.as_deref())
            .and_then(|p| self.tasks.get(p))
    }

    /// Looks up a task.
    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.get(task_id)
    }

    /// Tasks in input order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.order.iter().map(|id| &self.tasks[id])
    }

    /// Tasks with no resolvable parent (true roots and dangling references).
    pub fn roots(&self) -> Vec<&Task> {
        self.tasks()
            .filter(|t| self.parent_of(&t.id).is_none())
            .collect()
    }

    /// Data inconsistencies found while building.
    ///
    /// Every entry is a [`ScheduleError::DanglingDependency`].
    pub fn dangling(&self) -> &[ScheduleError] {
        &self.dangling
    }

    /// Whether any dependency failed to resolve.
    pub fn has_dangling(&self) -> bool {
        !self.dangling.is_empty()
    }

    /// Number of tasks.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the graph holds no tasks.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Chain of predecessors from the immediate parent upward.
    ///
    /// Stops at the first task without a resolvable parent. A chain longer
    /// than the task count can only be a cycle.
    ///
    /// # Errors
    /// - [`ScheduleError::TaskNotFound`] for an unknown id.
    /// - [`ScheduleError::CyclicDependency`] if the walk revisits a task.
    pub fn ancestors(&self, task_id: &str) -> Result<Vec<&Task>> {
        let mut current = self
            .tasks
            .get(task_id)
            .ok_or_else(|| ScheduleError::TaskNotFound(task_id.to_string()))?;
        let mut seen: HashSet<&str> = HashSet::from([current.id.as_str()]);
        let mut chain = Vec::new();

        while let Some(parent) = self.parent_of(&current.id) {
            if !seen.insert(parent.id.as_str()) || chain.len() >= self.len() {
                return Err(ScheduleError::CyclicDependency {
                    task_id: current.id.clone(),
                    revisited: parent.id.clone(),
                });
            }
            chain.push(parent);
            current = parent;
        }

        Ok(chain)
    }
}
