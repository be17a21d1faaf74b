//! Milestone (phase) evaluation.
//!
//! Derives one status per build phase from the current task list. This is
//! a pure function of its inputs: recompute it whenever the task list
//! changes instead of updating it incrementally.
//!
//! # Rules
//!
//! 1. A phase with no matching tasks is `Incomplete`.
//! 2. All matching tasks `Completed` → `Completed`.
//! 3. Otherwise, any matching task `InProgress` or `Delayed` → `InProgress`.
//! 4. If no phase anywhere is `InProgress`, the first `Incomplete` phase
//!    becomes `Next`.
//! 5. A final phase with no trades of its own follows the phases before it:
//!    once they are all `Completed` it becomes `Completed` (or `Next` while
//!    some phase is still `InProgress`).
//!
//! An empty task list or an empty trade directory yields all-`Incomplete`:
//! nothing can be matched to a phase, so nothing is next.

use std::collections::HashMap;

use crate::models::{Milestone, MilestoneStatus, PhaseDefinition, Task, TaskStatus};

/// Evaluates phase statuses.
///
/// `trade_names` maps trade id → trade name; tasks whose trade does not
/// resolve belong to no phase.
///
/// # Example
/// ```
/// use std::collections::HashMap;
/// use chrono::NaiveDate;
/// use site_schedule::milestones::evaluate_milestones;
/// use site_schedule::models::{MilestoneStatus, PhaseDefinition, Task, TaskStatus};
///
/// let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let tasks = vec![Task::new("T1", "P1", "trade-1", d).with_status(TaskStatus::Completed)];
/// let trades = HashMap::from([("trade-1".to_string(), "Foundation".to_string())]);
///
/// let phases = evaluate_milestones(&tasks, &trades, &PhaseDefinition::construction_defaults());
/// assert_eq!(phases[0].status, MilestoneStatus::Completed);
/// assert_eq!(phases[1].status, MilestoneStatus::Next);
/// ```
pub fn evaluate_milestones(
    tasks: &[Task],
    trade_names: &HashMap<String, String>,
    phases: &[PhaseDefinition],
) -> Vec<Milestone> {
    if tasks.is_empty() || trade_names.is_empty() {
        return phases
            .iter()
            .map(|p| Milestone::new(p.name.clone(), MilestoneStatus::Incomplete))
            .collect();
    }

    let mut milestones: Vec<Milestone> = phases
        .iter()
        .map(|phase| Milestone::new(phase.name.clone(), phase_status(phase, tasks, trade_names)))
        .collect();

    let any_in_progress = milestones
        .iter()
        .any(|m| m.status == MilestoneStatus::InProgress);

    if let Some((last_phase, before)) = phases.split_last() {
        let last = milestones.len() - 1;
        let preceding_done = milestones[..before.len()]
            .iter()
            .all(|m| m.status == MilestoneStatus::Completed);
        if last_phase.trade_names.is_empty() && preceding_done {
            milestones[last].status = if any_in_progress {
                MilestoneStatus::Next
            } else {
                MilestoneStatus::Completed
            };
        }
    }

    if !any_in_progress {
        if let Some(first) = milestones
            .iter_mut()
            .find(|m| m.status == MilestoneStatus::Incomplete)
        {
            first.status = MilestoneStatus::Next;
        }
    }

    milestones
}

/// Status of a single phase from its own tasks.
fn phase_status(
    phase: &PhaseDefinition,
    tasks: &[Task],
    trade_names: &HashMap<String, String>,
) -> MilestoneStatus {
    let matching: Vec<&Task> = tasks
        .iter()
        .filter(|t| {
            trade_names
                .get(&t.trade_id)
                .is_some_and(|name| phase.includes(name))
        })
        .collect();

    if matching.is_empty() {
        MilestoneStatus::Incomplete
    } else if matching.iter().all(|t| t.status == TaskStatus::Completed) {
        MilestoneStatus::Completed
    } else if matching.iter().any(|t| t.status.is_active()) {
        MilestoneStatus::InProgress
    } else {
        MilestoneStatus::Incomplete
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use MilestoneStatus::{Completed, InProgress, Incomplete, Next};

    fn trades() -> HashMap<String, String> {
        [
            ("trade-1", "Foundation"),
            ("trade-2", "Framing"),
            ("trade-3", "Plumbing (Rough-in)"),
            ("trade-4", "Electrical (Rough-in)"),
            ("trade-5", "HVAC (Rough-in)"),
            ("trade-6", "Roofing"),
            ("trade-7", "Drywall"),
            ("trade-8", "Painting"),
            ("inspector-1", "Municipal Inspector"),
        ]
        .into_iter()
        .map(|(id, name)| (id.to_string(), name.to_string()))
        .collect()
    }

    fn task(id: &str, trade: &str, status: TaskStatus) -> Task {
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        Task::new(id, "P1", trade, d).with_status(status)
    }

    fn statuses(tasks: &[Task]) -> Vec<MilestoneStatus> {
        evaluate_milestones(tasks, &trades(), &PhaseDefinition::construction_defaults())
            .into_iter()
            .map(|m| m.status)
            .collect()
    }

    #[test]
    fn test_foundation_done_framing_next() {
        let s = statuses(&[task("T1", "trade-1", TaskStatus::Completed)]);
        assert_eq!(
            s,
            vec![Completed, Next, Incomplete, Incomplete, Incomplete, Incomplete, Incomplete]
        );
    }

    #[test]
    fn test_empty_project_all_incomplete() {
        let s = statuses(&[]);
        assert!(s.iter().all(|st| *st == Incomplete));
        assert_eq!(s.len(), 7);
    }

    #[test]
    fn test_empty_trade_directory_all_incomplete() {
        let tasks = vec![task("T1", "trade-1", TaskStatus::Completed)];
        let out = evaluate_milestones(
            &tasks,
            &HashMap::new(),
            &PhaseDefinition::construction_defaults(),
        );
        assert_eq!(out.len(), 7);
        assert!(out.iter().all(|m| m.status == Incomplete));
    }

    #[test]
    fn test_in_progress_suppresses_next() {
        let s = statuses(&[
            task("T1", "trade-1", TaskStatus::Completed),
            task("T2", "trade-6", TaskStatus::Delayed),
        ]);
        assert_eq!(s[0], Completed);
        assert_eq!(s[4], InProgress);
        assert!(!s.contains(&Next));
    }

    #[test]
    fn test_partially_done_phase_not_started_is_incomplete() {
        let s = statuses(&[
            task("T1", "trade-3", TaskStatus::Completed),
            task("T2", "trade-4", TaskStatus::NotStarted),
        ]);
        // Foundation has no tasks, so it is the first incomplete phase.
        assert_eq!(s[0], Next);
        assert_eq!(s[2], Incomplete);
    }

    #[test]
    fn test_all_phases_done_completes_final() {
        let tasks = vec![
            task("T1", "trade-1", TaskStatus::Completed),
            task("T2", "trade-2", TaskStatus::Completed),
            task("T3", "trade-3", TaskStatus::Completed),
            task("T4", "inspector-1", TaskStatus::Completed),
            task("T5", "trade-6", TaskStatus::Completed),
            task("T6", "trade-7", TaskStatus::Completed),
            task("T7", "trade-8", TaskStatus::Completed),
        ];
        let s = statuses(&tasks);
        assert!(s.iter().all(|st| *st == Completed));
    }

    #[test]
    fn test_unknown_trade_matches_nothing() {
        let s = statuses(&[task("T1", "trade-x", TaskStatus::InProgress)]);
        assert_eq!(s[0], Next);
        assert!(!s.contains(&InProgress));
    }

    #[test]
    fn test_custom_phase_table() {
        let phases = vec![
            PhaseDefinition::new("Demo", ["Demolition"]),
            PhaseDefinition::new("Build", ["Framing"]),
        ];
        let trades = HashMap::from([("d".to_string(), "Demolition".to_string())]);
        let tasks = vec![task("T1", "d", TaskStatus::InProgress)];
        let out = evaluate_milestones(&tasks, &trades, &phases);
        assert_eq!(out[0].status, InProgress);
        assert_eq!(out[1].status, Incomplete);
    }
}
