//! Inbound updates and partial task mutations.
//!
//! [`TaskUpdate`] is what a producer (the task form, or a message parser)
//! reports about a task. [`TaskPatch`] is the subset of task fields a
//! committed write actually changes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::TaskStatus;

/// A structured status report about one task.
///
/// Already validated by its producer; the engine never parses free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskUpdate {
    /// Trade that sent the report, if known.
    pub trade_id: Option<String>,
    /// Reported status.
    pub status: TaskStatus,
    /// Reported notes.
    pub notes: Option<String>,
    /// Days of delay being reported. Only meaningful with `Delayed`.
    pub delay_duration_in_days: Option<i64>,
    /// Why the work slipped.
    pub delay_reason: Option<String>,
    /// Reported completion percentage.
    pub progress: Option<u8>,
}

impl TaskUpdate {
    /// Creates an update carrying only a status.
    pub fn new(status: TaskStatus) -> Self {
        Self {
            trade_id: None,
            status,
            notes: None,
            delay_duration_in_days: None,
            delay_reason: None,
            progress: None,
        }
    }

    /// Creates a delay report.
    pub fn delay(days: i64, reason: impl Into<String>) -> Self {
        Self::new(TaskStatus::Delayed)
            .with_delay_days(days)
            .with_delay_reason(reason)
    }

    /// Sets the reporting trade.
    pub fn with_trade(mut self, trade_id: impl Into<String>) -> Self {
        self.trade_id = Some(trade_id.into());
        self
    }

    /// Sets the notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Sets the delay length in days.
    pub fn with_delay_days(mut self, days: i64) -> Self {
        self.delay_duration_in_days = Some(days);
        self
    }

    /// Sets the delay reason.
    pub fn with_delay_reason(mut self, reason: impl Into<String>) -> Self {
        self.delay_reason = Some(reason.into());
        self
    }

    /// Sets the progress percentage.
    pub fn with_progress(mut self, progress: u8) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Whether this update must go through change-request approval.
    ///
    /// True only for a `Delayed` status carrying a positive delay.
    pub fn is_change_request(&self) -> bool {
        self.status == TaskStatus::Delayed
            && self.delay_duration_in_days.is_some_and(|d| d > 0)
    }

    /// Converts to a direct write, forcing progress for terminal statuses.
    ///
    /// `Completed` implies 100, `NotStarted` implies 0. Delay fields are
    /// dropped; they only matter to change requests.
    pub fn to_patch(&self) -> TaskPatch {
        let progress = self
            .status
            .implied_progress()
            .or_else(|| self.progress.map(|p| p.min(100)));
        TaskPatch {
            status: Some(self.status),
            notes: self.notes.clone(),
            progress,
            start_date: None,
            end_date: None,
        }
    }
}

/// A partial set of task fields to overwrite.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPatch {
    pub status: Option<TaskStatus>,
    pub notes: Option<String>,
    pub progress: Option<u8>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl TaskPatch {
    /// Creates an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Patch moving a task to new dates.
    pub fn dates(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date: Some(start_date),
            end_date: Some(end_date),
            ..Self::default()
        }
    }

    /// Sets the status.
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Overlays `other` onto `self`; fields set in `other` win.
    pub fn merge(mut self, other: TaskPatch) -> Self {
        if other.status.is_some() {
            self.status = other.status;
        }
        if other.notes.is_some() {
            self.notes = other.notes;
        }
        if other.progress.is_some() {
            self.progress = other.progress;
        }
        if other.start_date.is_some() {
            self.start_date = other.start_date;
        }
        if other.end_date.is_some() {
            self.end_date = other.end_date;
        }
        self
    }

    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.notes.is_none()
            && self.progress.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
    }
}
