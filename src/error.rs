//! Error types for scheduling and change-request handling.
//!
//! Computation errors ([`ScheduleError`]) are local and recoverable: no
//! state is touched when one is returned. Store errors ([`CommitError`])
//! mean the whole batch was discarded.

use thiserror::Error;

/// Failures raised by the graph, the cascade scheduler and the workflow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// A cascade was requested with a delay of zero or fewer days.
    #[error("invalid delay: {days} days (must be a positive number of days)")]
    InvalidDelay { days: i64 },

    /// Following dependencies led back to an already visited task.
    ///
    /// `task_id` is the task whose dependency edge closed the cycle.
    #[error("cyclic dependency: task '{task_id}' leads back to '{revisited}'")]
    CyclicDependency { task_id: String, revisited: String },

    /// A task depends on a task that is not in the project.
    #[error("task '{task_id}' depends on missing task '{missing}'")]
    DanglingDependency { task_id: String, missing: String },

    /// A task ends before it starts, so it has no length to keep.
    #[error("task '{task_id}' ends ({end}) before it starts ({start})")]
    InvertedDates {
        task_id: String,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    /// Two tasks in one snapshot share an id.
    #[error("duplicate task id: {0}")]
    DuplicateTaskId(String),

    /// The referenced task is not in the snapshot.
    #[error("task not found: {0}")]
    TaskNotFound(String),

    /// No pending change request with this id exists for the project.
    #[error("change request '{request_id}' is not pending in project '{project_id}'")]
    RequestNotFound {
        project_id: String,
        request_id: String,
    },

    /// A request for the task is already pending and duplicates are rejected.
    #[error("task '{task_id}' already has pending change request '{existing}'")]
    DuplicateRequest { task_id: String, existing: String },

    /// `propose` was called with an update that is not a delay.
    #[error("not a change request: status '{status}' does not carry a delay")]
    NotAChangeRequest { status: String },

    /// Shifting a date left the representable calendar.
    #[error("date out of range while rescheduling task '{0}'")]
    DateOutOfRange(String),

    /// The store refused the batch.
    #[error(transparent)]
    Commit(#[from] CommitError),
}

/// Failures raised by an [`UpdateApplier`](crate::workflow::UpdateApplier).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitError {
    /// A task changed after the snapshot the batch was computed from.
    #[error("conflict on task '{task_id}': expected version {expected}, found {found}")]
    Conflict {
        task_id: String,
        expected: u64,
        found: u64,
    },

    /// The batch writes to a task the store does not hold.
    #[error("unknown task '{0}'")]
    UnknownTask(String),

    /// Applying the batch would break a task invariant.
    #[error("task '{task_id}' would become invalid: {reason}")]
    InvariantViolation { task_id: String, reason: String },

    /// The store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Result alias for scheduling operations.
pub type Result<T> = std::result::Result<T, ScheduleError>;
