//! Change request model.
//!
//! A change request is a reported delay that has not been applied yet.
//! It waits in the workflow until a project manager approves or denies it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::TaskStatus;

/// Reason stored when the reporter gave none.
pub const NO_REASON: &str = "No reason provided.";

/// Trade name stored when the task's trade cannot be resolved.
pub const UNKNOWN_TRADE: &str = "Unknown Trade";

/// The update a change request would apply to its root task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposedUpdate {
    /// Days to push the root task (always > 0).
    pub delay_duration_in_days: i64,
    /// Status to set on the root (always `Delayed` when created by the workflow).
    pub status: TaskStatus,
    /// Notes reported with the delay.
    pub notes: String,
    /// Why the work slipped.
    pub delay_reason: String,
}

/// A pending, unapplied proposal to delay a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRequest {
    /// Request identifier (`cr-<uuid>`).
    pub id: String,
    /// Owning project.
    pub project_id: String,
    /// Root of the cascade.
    pub task_id: String,
    /// Trade name, denormalized for display.
    pub trade_name: String,
    /// What approval would apply.
    pub proposed_update: ProposedUpdate,
    /// When the request was raised.
    pub created_at: DateTime<Utc>,
}

impl ChangeRequest {
    /// Creates a request with a fresh id and the current timestamp.
    pub fn new(
        project_id: impl Into<String>,
        task_id: impl Into<String>,
        trade_name: impl Into<String>,
        proposed_update: ProposedUpdate,
    ) -> Self {
        Self {
            id: format!("cr-{}", Uuid::new_v4()),
            project_id: project_id.into(),
            task_id: task_id.into(),
            trade_name: trade_name.into(),
            proposed_update,
            created_at: Utc::now(),
        }
    }

    /// Delay in days.
    #[inline]
    pub fn delay_days(&self) -> i64 {
        self.proposed_update.delay_duration_in_days
    }

    /// Notes written to the root task on approval.
    ///
    /// Keeps the reporter's note under the approved reason.
    pub fn approval_notes(&self) -> String {
        format!(
            "Delay Approved. Reason: {}\n---\nOriginal Note: {}",
            self.proposed_update.delay_reason, self.proposed_update.notes
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ChangeRequest {
        ChangeRequest::new(
            "P1",
            "T1",
            "Framing",
            ProposedUpdate {
                delay_duration_in_days: 2,
                status: TaskStatus::Delayed,
                notes: "Lumber late".into(),
                delay_reason: "Supplier backorder".into(),
            },
        )
    }

    #[test]
    fn test_ids_are_unique() {
        let a = sample();
        let b = sample();
        assert!(a.id.starts_with("cr-"));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_approval_notes() {
        let notes = sample().approval_notes();
        assert_eq!(
            notes,
            "Delay Approved. Reason: Supplier backorder\n---\nOriginal Note: Lumber late"
        );
    }

    #[test]
    fn test_serialization() {
        let req = sample();
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"delay_duration_in_days\":2"));
        assert!(json.contains("\"status\":\"Delayed\""));
        let back: ChangeRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, req);
    }
}
