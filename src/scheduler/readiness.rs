//! Look-ahead report for the coming days.
//!
//! Answers "what can start soon, what is blocked on materials, who owes a
//! daily update, and where is an inspection missing" from one task snapshot.

use chrono::{Days, NaiveDate};
use std::collections::{HashMap, HashSet};

use crate::models::{Task, TaskStatus};

/// Trades whose work is normally followed by a municipal inspection.
pub const INSPECTED_TRADES: [&str; 4] = [
    "Foundation",
    "Framing",
    "Electrical (Rough-in)",
    "Plumbing (Rough-in)",
];

/// Tasks needing attention in the look-ahead window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadinessReport {
    /// Upcoming tasks with materials on site (or nothing to track), by start date.
    pub ready_to_start: Vec<String>,
    /// Upcoming tasks still waiting for tracked materials, by start date.
    pub waiting_on_materials: Vec<String>,
    /// Tasks in progress, which owe a daily report.
    pub needs_daily_update: Vec<String>,
    /// Inspected trades with no inspection task scheduled after them.
    pub inspection_suggestions: Vec<String>,
}

impl ReadinessReport {
    /// Builds the report.
    ///
    /// A task is upcoming when it has not started (`NotStarted` or
    /// `JobSiteReady`), its predecessor (if any) is completed, and it starts
    /// within `[today, today + window_days]`.
    ///
    /// `trade_names` maps trade id → trade name.
    pub fn build(
        tasks: &[Task],
        trade_names: &HashMap<String, String>,
        today: NaiveDate,
        window_days: u64,
    ) -> Self {
        let horizon = today.checked_add_days(Days::new(window_days)).unwrap_or(NaiveDate::MAX);
        let completed: HashSet<&str> = tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Completed)
            .map(|t| t.id.as_str())
            .collect();

        let mut upcoming: Vec<&Task> = tasks
            .iter()
            .filter(|t| matches!(t.status, TaskStatus::NotStarted | TaskStatus::JobSiteReady))
            .filter(|t| {
                t.dependency
                    .as_deref()
                    .map_or(true, |dep| completed.contains(dep))
            })
            .filter(|t| t.start_date >= today && t.start_date <= horizon)
            .collect();
        upcoming.sort_by_key(|t| t.start_date);

        let (ready, waiting): (Vec<&Task>, Vec<&Task>) = upcoming
            .into_iter()
            .partition(|t| t.materials_delivered || t.material_tracking_link.is_none());

        let needs_daily_update = tasks
            .iter()
            .filter(|t| t.status == TaskStatus::InProgress)
            .map(|t| t.id.clone())
            .collect();

        Self {
            ready_to_start: ready.into_iter().map(|t| t.id.clone()).collect(),
            waiting_on_materials: waiting.into_iter().map(|t| t.id.clone()).collect(),
            needs_daily_update,
            inspection_suggestions: inspection_suggestions(tasks, trade_names),
        }
    }

    /// Whether there is nothing to report.
    pub fn is_empty(&self) -> bool {
        self.ready_to_start.is_empty()
            && self.waiting_on_materials.is_empty()
            && self.needs_daily_update.is_empty()
            && self.inspection_suggestions.is_empty()
    }
}

/// Trade names of inspected-trade tasks that no inspection depends on.
///
/// Deduplicated, in task order.
fn inspection_suggestions(tasks: &[Task], trade_names: &HashMap<String, String>) -> Vec<String> {
    let inspected: HashSet<&str> = tasks
        .iter()
        .filter(|t| t.is_inspection)
        .filter_map(|t| t.dependency.as_deref())
        .collect();

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for task in tasks {
        let Some(name) = trade_names.get(&task.trade_id) else {
            continue;
        };
        if INSPECTED_TRADES.contains(&name.as_str())
            && !inspected.contains(task.id.as_str())
            && seen.insert(name.as_str())
        {
            out.push(name.clone());
        }
    }
    out
}

/// Ids of tasks whose dates differ between two snapshots.
///
/// Tasks present in only one snapshot are ignored.
pub fn rescheduled_task_ids(previous: &[Task], current: &[Task]) -> Vec<String> {
    let before: HashMap<&str, &Task> = previous.iter().map(|t| (t.id.as_str(), t)).collect();
    current
        .iter()
        .filter(|t| {
            before
                .get(t.id.as_str())
                .is_some_and(|p| p.start_date != t.start_date || p.end_date != t.end_date)
        })
        .map(|t| t.id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    fn trades() -> HashMap<String, String> {
        HashMap::from([
            ("trade-1".to_string(), "Foundation".to_string()),
            ("trade-2".to_string(), "Framing".to_string()),
            ("trade-6".to_string(), "Roofing".to_string()),
            ("insp".to_string(), "Municipal Inspector".to_string()),
        ])
    }

    #[test]
    fn test_upcoming_split_by_materials() {
        let today = d(3, 1);
        let tasks = vec![
            Task::new("F", "P1", "trade-1", d(2, 20)).with_status(TaskStatus::Completed),
            Task::new("R", "P1", "trade-6", d(3, 5))
                .with_dependency("F")
                .with_materials("https://track/r", false),
            Task::new("W", "P1", "trade-2", d(3, 3)).with_dependency("F"),
            Task::new("LATE", "P1", "trade-2", d(3, 20)),
            Task::new("BLOCKED", "P1", "trade-2", d(3, 2)).with_dependency("W"),
        ];
        let report = ReadinessReport::build(&tasks, &trades(), today, 7);

        assert_eq!(report.ready_to_start, vec!["W"]);
        assert_eq!(report.waiting_on_materials, vec!["R"]);
        assert!(report.needs_daily_update.is_empty());
    }

    #[test]
    fn test_delivered_materials_are_ready() {
        let tasks = vec![Task::new("R", "P1", "trade-6", d(3, 2))
            .with_status(TaskStatus::JobSiteReady)
            .with_materials("https://track/r", true)];
        let report = ReadinessReport::build(&tasks, &trades(), d(3, 1), 7);
        assert_eq!(report.ready_to_start, vec!["R"]);
    }

    #[test]
    fn test_daily_update_for_in_progress() {
        let tasks = vec![
            Task::new("A", "P1", "trade-6", d(3, 1)).with_status(TaskStatus::InProgress),
            Task::new("B", "P1", "trade-6", d(3, 1)).with_status(TaskStatus::Delayed),
        ];
        let report = ReadinessReport::build(&tasks, &trades(), d(3, 1), 7);
        assert_eq!(report.needs_daily_update, vec!["A"]);
    }

    #[test]
    fn test_inspection_suggestions() {
        let tasks = vec![
            Task::new("F", "P1", "trade-1", d(1, 1)),
            Task::new("F-INSP", "P1", "insp", d(1, 2))
                .with_dependency("F")
                .as_inspection(),
            Task::new("FR1", "P1", "trade-2", d(1, 3)),
            Task::new("FR2", "P1", "trade-2", d(1, 4)),
            Task::new("ROOF", "P1", "trade-6", d(1, 5)),
        ];
        let report = ReadinessReport::build(&tasks, &trades(), d(6, 1), 7);
        assert_eq!(report.inspection_suggestions, vec!["Framing"]);
    }

    #[test]
    fn test_rescheduled_detection() {
        let before = vec![
            Task::new("A", "P1", "t", d(1, 1)),
            Task::new("B", "P1", "t", d(1, 2)),
        ];
        let mut after = before.clone();
        after[1].end_date = d(1, 4);
        after.push(Task::new("C", "P1", "t", d(1, 9)));

        assert_eq!(rescheduled_task_ids(&before, &after), vec!["B"]);
        assert!(rescheduled_task_ids(&before, &before).is_empty());
    }
}
