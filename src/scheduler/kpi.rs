//! Project schedule indicators.
//!
//! Summarizes a project's task list for the dashboard header and timeline.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Start / End | Earliest start, latest end |
//! | Span | Days from start to end, inclusive |
//! | Completion Rate | Fraction of tasks `Completed` |
//! | Avg Progress | Mean of task progress (0-100) |
//! | Delayed | Tasks currently `Delayed` |

use chrono::NaiveDate;
use std::collections::HashMap;

use crate::models::{Task, TaskStatus};

/// Schedule summary for one project.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectKpi {
    /// Earliest task start. `None` for an empty project.
    pub start_date: Option<NaiveDate>,
    /// Latest task end. `None` for an empty project.
    pub end_date: Option<NaiveDate>,
    /// Calendar days covered, both ends included. 0 for an empty project.
    pub span_days: i64,
    /// Number of tasks.
    pub task_count: usize,
    /// Tasks per status.
    pub count_by_status: HashMap<TaskStatus, usize>,
    /// Fraction of tasks completed (0.0..1.0). 1.0 for an empty project.
    pub completion_rate: f64,
    /// Mean progress percentage. 0.0 for an empty project.
    pub avg_progress: f64,
}

impl ProjectKpi {
    /// Computes the summary from a task list.
    pub fn calculate(tasks: &[Task]) -> Self {
        let start_date = tasks.iter().map(|t| t.start_date).min();
        let end_date = tasks.iter().map(|t| t.end_date).max();
        let span_days = match (start_date, end_date) {
            (Some(s), Some(e)) => (e - s).num_days() + 1,
            _ => 0,
        };

        let mut count_by_status: HashMap<TaskStatus, usize> = HashMap::new();
        for task in tasks {
            *count_by_status.entry(task.status).or_default() += 1;
        }

        let completed = count_by_status
            .get(&TaskStatus::Completed)
            .copied()
            .unwrap_or(0);
        let completion_rate = if tasks.is_empty() {
            1.0
        } else {
            completed as f64 / tasks.len() as f64
        };

        let avg_progress = if tasks.is_empty() {
            0.0
        } else {
            let total: u32 = tasks.iter().map(|t| u32::from(t.progress)).sum();
            f64::from(total) / tasks.len() as f64
        };

        Self {
            start_date,
            end_date,
            span_days,
            task_count: tasks.len(),
            count_by_status,
            completion_rate,
            avg_progress,
        }
    }

    /// Number of tasks with the given status.
    pub fn count(&self, status: TaskStatus) -> usize {
        self.count_by_status.get(&status).copied().unwrap_or(0)
    }

    /// Number of delayed tasks.
    pub fn delayed_count(&self) -> usize {
        self.count(TaskStatus::Delayed)
    }

    /// Whether every task is completed.
    pub fn is_finished(&self) -> bool {
        self.task_count > 0 && self.count(TaskStatus::Completed) == self.task_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    #[test]
    fn test_kpi_basic() {
        let tasks = vec![
            Task::new("A", "P1", "t1", d(1, 1))
                .with_dates(d(1, 1), d(1, 5))
                .with_status(TaskStatus::Completed),
            Task::new("B", "P1", "t2", d(1, 6))
                .with_dates(d(1, 6), d(1, 10))
                .with_status(TaskStatus::Delayed)
                .with_progress(50),
        ];
        let kpi = ProjectKpi::calculate(&tasks);
        assert_eq!(kpi.start_date, Some(d(1, 1)));
        assert_eq!(kpi.end_date, Some(d(1, 10)));
        assert_eq!(kpi.span_days, 10);
        assert_eq!(kpi.delayed_count(), 1);
        assert!((kpi.completion_rate - 0.5).abs() < 1e-10);
        assert!((kpi.avg_progress - 75.0).abs() < 1e-10);
        assert!(!kpi.is_finished());
    }

    #[test]
    fn test_kpi_empty() {
        let kpi = ProjectKpi::calculate(&[]);
        assert_eq!(kpi.start_date, None);
        assert_eq!(kpi.span_days, 0);
        assert!((kpi.completion_rate - 1.0).abs() < 1e-10);
        assert!((kpi.avg_progress - 0.0).abs() < 1e-10);
        assert!(!kpi.is_finished());
    }

    #[test]
    fn test_kpi_finished() {
        let tasks = vec![Task::new("A", "P1", "t1", d(2, 1)).with_status(TaskStatus::Completed)];
        let kpi = ProjectKpi::calculate(&tasks);
        assert!(kpi.is_finished());
        assert_eq!(kpi.span_days, 1);
    }
}
