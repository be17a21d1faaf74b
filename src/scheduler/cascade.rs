//! Cascading delay propagation.
//!
//! # Algorithm
//!
//! 1. Reject delays of zero or fewer days, and any task in the cascade
//!    that ends before it starts.
//! 2. Shift the root's start and end by the delay.
//! 3. Walk the root's descendants breadth-first. A visited set, seeded with
//!    the root, stops the walk on cyclic input.
//! 4. Each descendant starts the day after its parent's (new) end and keeps
//!    its original length in days.
//!
//! BFS reaches every parent before its children, so a child always sees its
//! parent's rescheduled end. Siblings never influence each other.
//!
//! # Complexity
//! O(k) where k = number of tasks in the cascade.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet, VecDeque};

use crate::error::{Result, ScheduleError};
use crate::graph::TaskGraph;
use crate::models::{MutationBatch, Task, TaskPatch};

/// Old and new dates of one rescheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateShift {
    pub original_start: NaiveDate,
    pub original_end: NaiveDate,
    pub new_start: NaiveDate,
    pub new_end: NaiveDate,
}

impl DateShift {
    /// Length in days before the shift.
    pub fn original_duration_days(&self) -> i64 {
        (self.original_end - self.original_start).num_days()
    }

    /// Length in days after the shift.
    pub fn new_duration_days(&self) -> i64 {
        (self.new_end - self.new_start).num_days()
    }

    /// How far the start moved, in days.
    pub fn offset_days(&self) -> i64 {
        (self.new_start - self.original_start).num_days()
    }
}

/// Result of a cascade: new dates for the root and all its descendants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CascadePlan {
    /// Task the delay was applied to.
    pub root_id: String,
    /// Delay applied to the root, in days.
    pub delay_days: i64,
    /// Task id → date change. Contains the root and nothing unreachable from it.
    pub shifts: BTreeMap<String, DateShift>,
    /// Task ids in the order they were rescheduled (root first).
    pub order: Vec<String>,
    /// Dangling references found in the snapshot the plan was computed from.
    #[serde(skip)]
    pub dangling: Vec<ScheduleError>,
}

impl CascadePlan {
    /// Date change for a task, if it is in the cascade.
    pub fn shift(&self, task_id: &str) -> Option<&DateShift> {
        self.shifts.get(task_id)
    }

    /// Whether the task is part of the cascade.
    pub fn contains(&self, task_id: &str) -> bool {
        self.shifts.contains_key(task_id)
    }

    /// Number of rescheduled tasks, root included.
    pub fn len(&self) -> usize {
        self.shifts.len()
    }

    /// Always false for a computed plan; the root is always present.
    pub fn is_empty(&self) -> bool {
        self.shifts.is_empty()
    }

    /// Converts the plan to a store batch.
    ///
    /// Every entry carries the version seen in `graph`. `root_patch` holds
    /// the root's own field updates (status, notes) and is merged into the
    /// root's date change.
    ///
    /// # Errors
    /// [`ScheduleError::TaskNotFound`] if the plan was computed from another snapshot.
    pub fn to_batch(&self, graph: &TaskGraph, root_patch: TaskPatch) -> Result<MutationBatch> {
        let root = graph
            .task(&self.root_id)
            .ok_or_else(|| ScheduleError::TaskNotFound(self.root_id.clone()))?;
        let mut batch = MutationBatch::new(root.project_id.clone());

        for (id, shift) in &self.shifts {
            let task = graph
                .task(id)
                .ok_or_else(|| ScheduleError::TaskNotFound(id.clone()))?;
            let mut patch = TaskPatch::dates(shift.new_start, shift.new_end);
            if *id == self.root_id {
                patch = patch.merge(root_patch.clone());
            }
            batch.push(id.clone(), task.version, patch);
        }

        Ok(batch)
    }
}

/// Computes cascading reschedules over a [`TaskGraph`].
///
/// Never mutates the graph; the output is a delta for a store to commit.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use site_schedule::graph::TaskGraph;
/// use site_schedule::models::Task;
/// use site_schedule::scheduler::CascadeScheduler;
///
/// let d = |m, day| NaiveDate::from_ymd_opt(2024, m, day).unwrap();
/// let graph = TaskGraph::build(vec![
///     Task::new("A", "P1", "trade-1", d(1, 1)).with_dates(d(1, 1), d(1, 5)),
///     Task::new("B", "P1", "trade-2", d(1, 6))
///         .with_dates(d(1, 6), d(1, 8))
///         .with_dependency("A"),
/// ])
/// .unwrap();
///
/// let plan = CascadeScheduler::new().compute(&graph, "A", 3).unwrap();
/// assert_eq!(plan.shift("A").unwrap().new_start, d(1, 4));
/// assert_eq!(plan.shift("B").unwrap().new_start, d(1, 9));
/// assert_eq!(plan.shift("B").unwrap().new_end, d(1, 11));
/// ```
#[derive(Debug, Clone)]
pub struct CascadeScheduler {
    /// Days between a parent's end and its child's start.
    gap_days: u64,
}

impl CascadeScheduler {
    /// Creates a scheduler that starts each child the day after its parent ends.
    pub fn new() -> Self {
        Self { gap_days: 1 }
    }

    /// Computes new dates for `root_id` and everything downstream of it.
    ///
    /// # Errors
    /// - [`ScheduleError::InvalidDelay`] if `delay_days <= 0`.
    /// - [`ScheduleError::TaskNotFound`] if the root is not in the graph.
    /// - [`ScheduleError::CyclicDependency`] if the walk returns to a visited task.
    /// - [`ScheduleError::InvertedDates`] if a task in the cascade ends before it starts.
    /// - [`ScheduleError::DateOutOfRange`] if a shifted date overflows.
    pub fn compute(&self, graph: &TaskGraph, root_id: &str, delay_days: i64) -> Result<CascadePlan> {
        if delay_days <= 0 {
            return Err(ScheduleError::InvalidDelay { days: delay_days });
        }
        let root = graph
            .task(root_id)
            .ok_or_else(|| ScheduleError::TaskNotFound(root_id.to_string()))?;

        let mut plan = CascadePlan {
            root_id: root_id.to_string(),
            delay_days,
            shifts: BTreeMap::new(),
            order: Vec::new(),
            dangling: graph.dangling().to_vec(),
        };
        ensure_ordered_dates(root)?;

        let delay = Days::new(delay_days.unsigned_abs());
        let root_shift = DateShift {
            original_start: root.start_date,
            original_end: root.end_date,
            new_start: add_days(root.start_date, delay, root_id)?,
            new_end: add_days(root.end_date, delay, root_id)?,
        };
        plan.shifts.insert(root.id.clone(), root_shift);
        plan.order.push(root.id.clone());

        let mut visited: HashSet<&str> = HashSet::from([root.id.as_str()]);
        let mut queue: VecDeque<(&Task, &Task)> = VecDeque::new();
        self.enqueue_children(graph, root, &mut visited, &mut queue)?;

        while let Some((task, parent)) = queue.pop_front() {
            let shift = self.reschedule_child(task, parent, &plan)?;

            tracing::debug!(
                task_id = %task.id,
                from = %task.start_date,
                to = %shift.new_start,
                "cascading reschedule"
            );

            plan.shifts.insert(task.id.clone(), shift);
            plan.order.push(task.id.clone());
            self.enqueue_children(graph, task, &mut visited, &mut queue)?;
        }

        Ok(plan)
    }

    fn enqueue_children<'g>(
        &self,
        graph: &'g TaskGraph,
        parent: &'g Task,
        visited: &mut HashSet<&'g str>,
        queue: &mut VecDeque<(&'g Task, &'g Task)>,
    ) -> Result<()> {
        for child_id in graph.children_of(&parent.id) {
            if !visited.insert(child_id.as_str()) {
                return Err(ScheduleError::CyclicDependency {
                    task_id: parent.id.clone(),
                    revisited: child_id.clone(),
                });
            }
            let child = graph
                .task(child_id)
                .ok_or_else(|| ScheduleError::TaskNotFound(child_id.clone()))?;
            queue.push_back((child, parent));
        }
        Ok(())
    }

    /// New dates for a non-root task: the day after its parent's end,
    /// keeping its own length.
    ///
    /// Uses the parent's rescheduled end when the parent moved in this
    /// cascade, its stored end otherwise.
    fn reschedule_child(&self, task: &Task, parent: &Task, plan: &CascadePlan) -> Result<DateShift> {
        let parent_end = plan
            .shift(&parent.id)
            .map_or(parent.end_date, |s| s.new_end);

        ensure_ordered_dates(task)?;
        let new_start = add_days(parent_end, Days::new(self.gap_days), &task.id)?;
        let length = Days::new(task.duration_days().unsigned_abs());
        let new_end = add_days(new_start, length, &task.id)?;

        Ok(DateShift {
            original_start: task.start_date,
            original_end: task.end_date,
            new_start,
            new_end,
        })
    }
}

impl Default for CascadeScheduler {
    fn default() -> Self {
        Self::new()
    }
}

fn ensure_ordered_dates(task: &Task) -> Result<()> {
    if task.start_date > task.end_date {
        return Err(ScheduleError::InvertedDates {
            task_id: task.id.clone(),
            start: task.start_date,
            end: task.end_date,
        });
    }
    Ok(())
}

fn add_days(date: NaiveDate, days: Days, task_id: &str) -> Result<NaiveDate> {
    date.checked_add_days(days)
        .ok_or_else(|| ScheduleError::DateOutOfRange(task_id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskStatus;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    fn task(id: &str, dep: Option<&str>, start: NaiveDate, end: NaiveDate) -> Task {
        let t = Task::new(id, "P1", "trade", start).with_dates(start, end);
        match dep {
            Some(p) => t.with_dependency(p),
            None => t,
        }
    }

    fn chain_graph() -> TaskGraph {
        // A → B → C, A → D, plus unrelated E → F
        TaskGraph::build(vec![
            task("A", None, d(1, 1), d(1, 5)),
            task("B", Some("A"), d(1, 6), d(1, 8)),
            task("C", Some("B"), d(1, 9), d(1, 9)),
            task("D", Some("A"), d(1, 10), d(1, 20)),
            task("E", None, d(1, 1), d(1, 3)),
            task("F", Some("E"), d(1, 4), d(1, 7)),
        ])
        .unwrap()
    }

    #[test]
    fn test_two_task_scenario() {
        let graph = TaskGraph::build(vec![
            task("A", None, d(1, 1), d(1, 5)),
            task("B", Some("A"), d(1, 6), d(1, 8)),
        ])
        .unwrap();

        let plan = CascadeScheduler::new().compute(&graph, "A", 3).unwrap();
        let a = plan.shift("A").unwrap();
        let b = plan.shift("B").unwrap();
        assert_eq!((a.new_start, a.new_end), (d(1, 4), d(1, 8)));
        assert_eq!((b.new_start, b.new_end), (d(1, 9), d(1, 11)));
        assert_eq!(plan.len(), 2);
    }

    #[test]
    fn test_root_shift() {
        let plan = CascadeScheduler::new()
            .compute(&chain_graph(), "A", 4)
            .unwrap();
        let a = plan.shift("A").unwrap();
        assert_eq!(a.new_start, d(1, 5));
        assert_eq!(a.new_end, d(1, 9));
        assert_eq!(a.offset_days(), 4);
    }

    #[test]
    fn test_duration_preserved_for_every_task() {
        let plan = CascadeScheduler::new()
            .compute(&chain_graph(), "A", 7)
            .unwrap();
        for shift in plan.shifts.values() {
            assert_eq!(shift.new_duration_days(), shift.original_duration_days());
        }
    }

    #[test]
    fn test_child_starts_day_after_parent_new_end() {
        let graph = chain_graph();
        let plan = CascadeScheduler::new().compute(&graph, "A", 2).unwrap();
        for id in plan.order.iter().skip(1) {
            let parent = graph.parent_of(id).unwrap();
            let parent_end = plan.shift(&parent.id).unwrap().new_end;
            let shift = plan.shift(id).unwrap();
            assert_eq!(shift.new_start, parent_end + Days::new(1));
        }
    }

    #[test]
    fn test_same_day_task_stays_single_day() {
        let plan = CascadeScheduler::new()
            .compute(&chain_graph(), "A", 1)
            .unwrap();
        let c = plan.shift("C").unwrap();
        assert_eq!(c.new_start, c.new_end);
    }

    #[test]
    fn test_disconnected_tasks_untouched() {
        let plan = CascadeScheduler::new()
            .compute(&chain_graph(), "B", 2)
            .unwrap();
        assert!(plan.contains("B"));
        assert!(plan.contains("C"));
        assert!(!plan.contains("A"));
        assert!(!plan.contains("D"));
        assert!(!plan.contains("E"));
        assert!(!plan.contains("F"));
    }

    #[test]
    fn test_bfs_order_parents_first() {
        let plan = CascadeScheduler::new()
            .compute(&chain_graph(), "A", 1)
            .unwrap();
        assert_eq!(plan.order, vec!["A", "B", "D", "C"]);
    }

    #[test]
    fn test_child_pulled_in_when_gap_exists() {
        // D starts well after A ends; the cascade still packs it against A.
        let plan = CascadeScheduler::new()
            .compute(&chain_graph(), "A", 1)
            .unwrap();
        let dshift = plan.shift("D").unwrap();
        assert_eq!(dshift.new_start, d(1, 7));
        assert_eq!(dshift.new_end, d(1, 17));
    }

    #[test]
    fn test_invalid_delay_rejected() {
        let graph = chain_graph();
        let scheduler = CascadeScheduler::new();
        assert_eq!(
            scheduler.compute(&graph, "A", 0).unwrap_err(),
            ScheduleError::InvalidDelay { days: 0 }
        );
        assert_eq!(
            scheduler.compute(&graph, "A", -3).unwrap_err(),
            ScheduleError::InvalidDelay { days: -3 }
        );
    }

    #[test]
    fn test_unknown_root() {
        let err = CascadeScheduler::new()
            .compute(&chain_graph(), "ZZ", 1)
            .unwrap_err();
        assert_eq!(err, ScheduleError::TaskNotFound("ZZ".into()));
    }

    #[test]
    fn test_mutual_dependency_fails_fast() {
        let graph = TaskGraph::build(vec![
            task("A", Some("B"), d(1, 1), d(1, 2)),
            task("B", Some("A"), d(1, 3), d(1, 4)),
        ])
        .unwrap();

        let err = CascadeScheduler::new().compute(&graph, "A", 1).unwrap_err();
        assert_eq!(
            err,
            ScheduleError::CyclicDependency {
                task_id: "B".into(),
                revisited: "A".into(),
            }
        );
    }

    #[test]
    fn test_dangling_task_can_still_be_root() {
        let graph = TaskGraph::build(vec![
            task("A", Some("GHOST"), d(1, 1), d(1, 2)),
            task("B", Some("A"), d(1, 3), d(1, 4)),
        ])
        .unwrap();
        assert!(graph.has_dangling());

        let plan = CascadeScheduler::new().compute(&graph, "A", 2).unwrap();
        assert_eq!(plan.shift("A").unwrap().new_start, d(1, 3));
        assert_eq!(plan.shift("B").unwrap().new_start, d(1, 5));
    }

    #[test]
    fn test_dangling_references_carried_on_plan() {
        let graph = TaskGraph::build(vec![
            task("A", Some("GHOST"), d(1, 1), d(1, 2)),
            task("B", None, d(1, 3), d(1, 4)),
        ])
        .unwrap();
        let plan = CascadeScheduler::new().compute(&graph, "B", 1).unwrap();
        assert_eq!(
            plan.dangling,
            vec![ScheduleError::DanglingDependency {
                task_id: "A".into(),
                missing: "GHOST".into(),
            }]
        );
        assert!(CascadeScheduler::new()
            .compute(&chain_graph(), "A", 1)
            .unwrap()
            .dangling
            .is_empty());
    }

    #[test]
    fn test_inverted_child_dates_rejected() {
        let graph = TaskGraph::build(vec![
            task("A", None, d(1, 1), d(1, 5)),
            task("B", Some("A"), d(1, 9), d(1, 6)),
        ])
        .unwrap();
        let err = CascadeScheduler::new().compute(&graph, "A", 1).unwrap_err();
        assert_eq!(
            err,
            ScheduleError::InvertedDates {
                task_id: "B".into(),
                start: d(1, 9),
                end: d(1, 6),
            }
        );
    }

    #[test]
    fn test_inverted_root_dates_rejected() {
        let graph = TaskGraph::build(vec![task("A", None, d(1, 5), d(1, 1))]).unwrap();
        let err = CascadeScheduler::new().compute(&graph, "A", 2).unwrap_err();
        assert!(matches!(err, ScheduleError::InvertedDates { ref task_id, .. } if task_id == "A"));
    }

    #[test]
    fn test_result_independent_of_input_order() {
        let tasks = vec![
            task("A", None, d(1, 1), d(1, 5)),
            task("B", Some("A"), d(1, 6), d(1, 8)),
            task("C", Some("B"), d(1, 9), d(1, 9)),
            task("D", Some("A"), d(1, 10), d(1, 20)),
            task("G", Some("D"), d(1, 21), d(1, 25)),
            task("H", Some("B"), d(1, 12), d(1, 14)),
        ];
        let mut reversed = tasks.clone();
        reversed.reverse();

        let scheduler = CascadeScheduler::new();
        let forward = scheduler
            .compute(&TaskGraph::build(tasks).unwrap(), "A", 4)
            .unwrap();
        let backward = scheduler
            .compute(&TaskGraph::build(reversed).unwrap(), "A", 4)
            .unwrap();

        assert_ne!(forward.order, backward.order);
        assert_eq!(forward.shifts, backward.shifts);
    }

    #[test]
    fn test_to_batch_merges_root_patch() {
        let graph = TaskGraph::build(vec![
            task("A", None, d(1, 1), d(1, 5)).with_version(4),
            task("B", Some("A"), d(1, 6), d(1, 8)).with_version(2),
        ])
        .unwrap();
        let plan = CascadeScheduler::new().compute(&graph, "A", 3).unwrap();
        let batch = plan
            .to_batch(
                &graph,
                TaskPatch::new()
                    .with_status(TaskStatus::Delayed)
                    .with_notes("approved"),
            )
            .unwrap();

        assert_eq!(batch.project_id, "P1");
        assert_eq!(batch.len(), 2);
        let root = batch.get("A").unwrap();
        assert_eq!(root.expected_version, 4);
        assert_eq!(root.patch.status, Some(TaskStatus::Delayed));
        assert_eq!(root.patch.start_date, Some(d(1, 4)));
        let child = batch.get("B").unwrap();
        assert_eq!(child.expected_version, 2);
        assert_eq!(child.patch.status, None);
        assert_eq!(child.patch.end_date, Some(d(1, 11)));
    }
}
