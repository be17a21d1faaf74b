//! Task model.
//!
//! A task is one trade's block of work on a project, placed on the calendar
//! by a start and end date. Tasks form a forest through their optional
//! `dependency` reference: each task waits on at most one predecessor.
//!
//! # Date Representation
//! Dates are calendar days ([`NaiveDate`]), inclusive at both ends. A task
//! with `start_date == end_date` occupies a single day and has a duration of
//! zero days.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::TaskPatch;

/// Status of a task on the job site.
///
/// Serialized with the labels shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    Delayed,
    Completed,
    #[serde(rename = "Job Site Ready")]
    JobSiteReady,
}

impl TaskStatus {
    /// Dashboard label.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "Not Started",
            Self::InProgress => "In Progress",
            Self::Delayed => "Delayed",
            Self::Completed => "Completed",
            Self::JobSiteReady => "Job Site Ready",
        }
    }

    /// Sort rank for task lists (lower = shown first).
    ///
    /// Active work leads, finished work trails.
    pub const fn display_rank(self) -> u8 {
        match self {
            Self::InProgress => 1,
            Self::Delayed => 2,
            Self::JobSiteReady => 3,
            Self::NotStarted => 4,
            Self::Completed => 5,
        }
    }

    /// Whether work is currently underway (including delayed work).
    pub const fn is_active(self) -> bool {
        matches!(self, Self::InProgress | Self::Delayed)
    }

    /// Progress value forced by this status, if any.
    pub const fn implied_progress(self) -> Option<u8> {
        match self {
            Self::Completed => Some(100),
            Self::NotStarted => Some(0),
            _ => None,
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A schedulable unit of work belonging to one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier.
    pub id: String,
    /// Owning project.
    pub project_id: String,
    /// Performing trade (subcontractor). Not owned by the task.
    pub trade_id: String,
    /// Current status.
    pub status: TaskStatus,
    /// The single predecessor gating this task's start. `None` = no predecessor.
    pub dependency: Option<String>,
    /// Free-form notes.
    pub notes: String,
    /// First working day (inclusive).
    pub start_date: NaiveDate,
    /// Last working day (inclusive). Never before `start_date`.
    pub end_date: NaiveDate,
    /// Completion percentage, 0-100.
    pub progress: u8,
    /// Whether this task is a municipal inspection.
    pub is_inspection: bool,
    /// Supplier tracking link for materials, if any.
    pub material_tracking_link: Option<String>,
    /// Whether materials have arrived on site.
    pub materials_delivered: bool,
    /// Store revision. Bumped on every committed mutation.
    #[serde(default)]
    pub version: u64,
}

impl Task {
    /// Creates a not-started, single-day task.
    pub fn new(
        id: impl Into<String>,
        project_id: impl Into<String>,
        trade_id: impl Into<String>,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            project_id: project_id.into(),
            trade_id: trade_id.into(),
            status: TaskStatus::NotStarted,
            dependency: None,
            notes: String::new(),
            start_date,
            end_date: start_date,
            progress: 0,
            is_inspection: false,
            material_tracking_link: None,
            materials_delivered: false,
            version: 0,
        }
    }

    /// Sets both dates.
    pub fn with_dates(mut self, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        self.start_date = start_date;
        self.end_date = end_date;
        self
    }

    /// Sets the predecessor task.
    pub fn with_dependency(mut self, task_id: impl Into<String>) -> Self {
        self.dependency = Some(task_id.into());
        self
    }

    /// Sets the status, normalizing progress for terminal states.
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        if let Some(progress) = status.implied_progress() {
            self.progress = progress;
        }
        self
    }

    /// Sets the progress percentage (clamped to 100).
    pub fn with_progress(mut self, progress: u8) -> Self {
        self.progress = progress.min(100);
        self
    }

    /// Sets the notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Marks this task as an inspection.
    pub fn as_inspection(mut self) -> Self {
        self.is_inspection = true;
        self
    }

    /// Sets material tracking state.
    pub fn with_materials(mut self, tracking_link: impl Into<String>, delivered: bool) -> Self {
        self.material_tracking_link = Some(tracking_link.into());
        self.materials_delivered = delivered;
        self
    }

    /// Sets the store revision.
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    /// Length in days (`end_date - start_date`). Zero for same-day tasks.
    #[inline]
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }

    /// Whether the task has no predecessor.
    pub fn is_root(&self) -> bool {
        self.dependency.is_none()
    }

    /// Whether `start_date <= end_date` and progress agrees with the status.
    pub fn is_consistent(&self) -> bool {
        self.start_date <= self.end_date
            && self.progress <= 100
            && self
                .status
                .implied_progress()
                .map_or(true, |p| p == self.progress)
    }

    /// Returns a copy with `patch` applied. Does not bump the version.
    pub fn patched(&self, patch: &TaskPatch) -> Self {
        let mut next = self.clone();
        if let Some(status) = patch.status {
            next.status = status;
        }
        if let Some(ref notes) = patch.notes {
            next.notes = notes.clone();
        }
        if let Some(progress) = patch.progress {
            next.progress = progress;
        }
        if let Some(start) = patch.start_date {
            next.start_date = start;
        }
        if let Some(end) = patch.end_date {
            next.end_date = end;
        }
        next
    }
}
