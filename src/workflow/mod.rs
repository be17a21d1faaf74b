//! Change-request approval workflow.
//!
//! A reported delay does not touch the schedule. It becomes a pending
//! [`ChangeRequest`] that a project manager approves or denies:
//!
//! ```text
//! Pending → Applied   (cascade committed, request removed)
//!         → Denied    (request removed, nothing written)
//! ```
//!
//! Every other inbound update bypasses the workflow and is written
//! directly. Pending requests are owned by the workflow instance, so
//! independent instances (per tenant, per test) never share state.
//!
//! # Usage
//!
//! ```
//! use chrono::NaiveDate;
//! use site_schedule::models::{Task, TaskUpdate};
//! use site_schedule::workflow::{ChangeRequestWorkflow, InMemoryTaskStore, UpdateOutcome};
//!
//! let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
//! let mut store = InMemoryTaskStore::with_tasks(vec![
//!     Task::new("A", "P1", "trade-1", d(1)).with_dates(d(1), d(5)),
//!     Task::new("B", "P1", "trade-2", d(6)).with_dates(d(6), d(8)).with_dependency("A"),
//! ]);
//! let mut workflow = ChangeRequestWorkflow::new();
//!
//! let outcome = workflow
//!     .propose_or_apply("P1", "A", &TaskUpdate::delay(3, "Rain"), &mut store)
//!     .unwrap();
//! let UpdateOutcome::Proposed(request) = outcome else { panic!("expected a proposal") };
//!
//! workflow.approve(&request, &mut store).unwrap();
//! assert_eq!(store.task("P1", "B").unwrap().start_date, d(9));
//! assert!(workflow.pending("P1").is_empty());
//! ```

mod applier;

pub use applier::{InMemoryTaskStore, UpdateApplier};

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::config::{DuplicatePolicy, EngineConfig};
use crate::error::{Result, ScheduleError};
use crate::graph::TaskGraph;
use crate::milestones::evaluate_milestones;
use crate::models::{
    ChangeRequest, Milestone, MutationBatch, ProposedUpdate, Task, TaskPatch, TaskStatus,
    TaskUpdate, NO_REASON, UNKNOWN_TRADE,
};
use crate::scheduler::{CascadePlan, CascadeScheduler, ReadinessReport};

/// What [`ChangeRequestWorkflow::propose_or_apply`] did with an update.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// The update reported a delay; it is now awaiting approval.
    Proposed(ChangeRequest),
    /// The update was written directly.
    Applied(MutationBatch),
}

/// Holds pending change requests per project and applies approved ones.
#[derive(Debug, Clone, Default)]
pub struct ChangeRequestWorkflow {
    config: EngineConfig,
    scheduler: CascadeScheduler,
    /// Trade id → trade name, for denormalizing requests.
    trade_names: HashMap<String, String>,
    /// Project id → pending requests, oldest first.
    pending: HashMap<String, Vec<ChangeRequest>>,
}

impl ChangeRequestWorkflow {
    /// Creates a workflow with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the trade directory (trade id → name).
    pub fn with_trade_names(mut self, trade_names: HashMap<String, String>) -> Self {
        self.trade_names = trade_names;
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Routes an inbound update.
    ///
    /// A `Delayed` status with a positive delay becomes a pending change
    /// request. Anything else is normalized (`Completed` ⇒ 100%,
    /// `NotStarted` ⇒ 0%) and committed immediately as a one-task batch.
    ///
    /// # Errors
    /// - [`ScheduleError::TaskNotFound`] if the task is not in the project.
    /// - [`ScheduleError::DuplicateRequest`] under [`DuplicatePolicy::Reject`].
    /// - [`ScheduleError::Commit`] if a direct write fails.
    pub fn propose_or_apply<A: UpdateApplier>(
        &mut self,
        project_id: &str,
        task_id: &str,
        update: &TaskUpdate,
        applier: &mut A,
    ) -> Result<UpdateOutcome> {
        let tasks = applier.load_tasks(project_id)?;
        let task = tasks
            .iter()
            .find(|t| t.id == task_id)
            .ok_or_else(|| ScheduleError::TaskNotFound(task_id.to_string()))?;

        if update.is_change_request() {
            let trade_name = self
                .trade_names
                .get(&task.trade_id)
                .cloned()
                .unwrap_or_else(|| UNKNOWN_TRADE.to_string());
            let request = self.propose(
                project_id,
                task_id,
                trade_name,
                update.delay_duration_in_days.unwrap_or_default(),
                update.status,
                update.notes.clone().unwrap_or_default(),
                update.delay_reason.clone(),
            )?;
            return Ok(UpdateOutcome::Proposed(request));
        }

        let batch = MutationBatch::new(project_id).with(task_id, task.version, update.to_patch());
        applier.apply_batch(&batch).map_err(|err| {
            tracing::warn!(project_id, task_id, error = %err, "direct task update failed");
            err
        })?;
        tracing::info!(project_id, task_id, status = %update.status, "task updated");
        Ok(UpdateOutcome::Applied(batch))
    }

    /// Stores a delay proposal. Nothing is written to the schedule.
    ///
    /// # Errors
    /// - [`ScheduleError::NotAChangeRequest`] unless `status` is `Delayed`.
    /// - [`ScheduleError::InvalidDelay`] unless `delay_days > 0`.
    /// - [`ScheduleError::DuplicateRequest`] if the task already has a
    ///   pending request and the policy is [`DuplicatePolicy::Reject`].
    ///
    /// In every error case no request is stored; the caller should apply
    /// the update directly instead.
    ///
    /// The task is not looked up here. [`propose_or_apply`](Self::propose_or_apply)
    /// checks it against a snapshot first; a request whose task has since
    /// disappeared is discarded by [`approve`](Self::approve).
    #[allow(clippy::too_many_arguments)]
    pub fn propose(
        &mut self,
        project_id: &str,
        task_id: &str,
        trade_name: impl Into<String>,
        delay_days: i64,
        status: TaskStatus,
        notes: impl Into<String>,
        reason: Option<String>,
    ) -> Result<ChangeRequest> {
        if status != TaskStatus::Delayed {
            return Err(ScheduleError::NotAChangeRequest {
                status: status.to_string(),
            });
        }
        if delay_days <= 0 {
            return Err(ScheduleError::InvalidDelay { days: delay_days });
        }

        let pending = self.pending.entry(project_id.to_string()).or_default();
        if let Some(existing) = pending.iter().find(|r| r.task_id == task_id) {
            match self.config.duplicate_policy {
                DuplicatePolicy::Reject => {
                    tracing::warn!(
                        project_id,
                        task_id,
                        existing = %existing.id,
                        "rejected duplicate change request"
                    );
                    return Err(ScheduleError::DuplicateRequest {
                        task_id: task_id.to_string(),
                        existing: existing.id.clone(),
                    });
                }
                DuplicatePolicy::Replace => {
                    tracing::info!(
                        project_id,
                        task_id,
                        replaced = %existing.id,
                        "replacing pending change request"
                    );
                    pending.retain(|r| r.task_id != task_id);
                }
                DuplicatePolicy::Allow => {}
            }
        }

        let request = ChangeRequest::new(
            project_id,
            task_id,
            trade_name,
            ProposedUpdate {
                delay_duration_in_days: delay_days,
                status,
                notes: notes.into(),
                delay_reason: reason
                    .filter(|r| !r.trim().is_empty())
                    .unwrap_or_else(|| NO_REASON.to_string()),
            },
        );
        tracing::info!(
            project_id,
            task_id,
            request_id = %request.id,
            delay_days,
            "change request pending approval"
        );
        pending.push(request.clone());
        Ok(request)
    }

    /// Applies a pending request: cascades the delay and commits it.
    ///
    /// The request is removed only after the store accepts the batch. On
    /// any failure it stays pending so the approval can be retried, except
    /// when its task is no longer in the project: that request can never
    /// apply and is discarded.
    ///
    /// Dangling references in the snapshot do not block approval; they are
    /// returned in [`CascadePlan::dangling`].
    ///
    /// # Errors
    /// - [`ScheduleError::RequestNotFound`] if the request is not pending.
    /// - Graph and cascade errors ([`ScheduleError::CyclicDependency`], ...).
    /// - [`ScheduleError::Commit`] if the store rejects the batch.
    pub fn approve<A: UpdateApplier>(
        &mut self,
        request: &ChangeRequest,
        applier: &mut A,
    ) -> Result<CascadePlan> {
        let request = self
            .get(&request.project_id, &request.id)
            .cloned()
            .ok_or_else(|| ScheduleError::RequestNotFound {
                project_id: request.project_id.clone(),
                request_id: request.id.clone(),
            })?;

        let result = self.commit_cascade(&request, applier);
        match &result {
            Ok(plan) => {
                self.remove(&request.project_id, &request.id);
                for issue in &plan.dangling {
                    tracing::warn!(
                        project_id = %request.project_id,
                        request_id = %request.id,
                        issue = %issue,
                        "approved against a snapshot with a dangling reference"
                    );
                }
                tracing::info!(
                    project_id = %request.project_id,
                    request_id = %request.id,
                    tasks = plan.len(),
                    "change request approved"
                );
            }
            Err(ScheduleError::TaskNotFound(missing)) if *missing == request.task_id => {
                self.remove(&request.project_id, &request.id);
                tracing::warn!(
                    project_id = %request.project_id,
                    request_id = %request.id,
                    task_id = %missing,
                    "task no longer exists; change request discarded"
                );
            }
            Err(err) => {
                tracing::warn!(
                    project_id = %request.project_id,
                    request_id = %request.id,
                    error = %err,
                    "approval failed; request stays pending"
                );
            }
        }
        result
    }

    fn commit_cascade<A: UpdateApplier>(
        &self,
        request: &ChangeRequest,
        applier: &mut A,
    ) -> Result<CascadePlan> {
        let graph = TaskGraph::build(applier.load_tasks(&request.project_id)?)?;
        let plan = self
            .scheduler
            .compute(&graph, &request.task_id, request.delay_days())?;
        let root_patch = TaskPatch::new()
            .with_status(request.proposed_update.status)
            .with_notes(request.approval_notes());
        let batch = plan.to_batch(&graph, root_patch)?;
        applier.apply_batch(&batch)?;
        Ok(plan)
    }

    /// Discards a pending request. Nothing is written.
    ///
    /// Returns whether a request was removed; denying an absent (already
    /// denied or approved) request is a no-op.
    pub fn deny(&mut self, request_id: &str, project_id: &str) -> bool {
        let removed = self.remove(project_id, request_id);
        if removed {
            tracing::info!(project_id, request_id, "change request denied");
        } else {
            tracing::debug!(project_id, request_id, "deny ignored; request not pending");
        }
        removed
    }

    /// Pending requests for a project, oldest first.
    pub fn pending(&self, project_id: &str) -> &[ChangeRequest] {
        self.pending
            .get(project_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Looks up a pending request.
    pub fn get(&self, project_id: &str, request_id: &str) -> Option<&ChangeRequest> {
        self.pending(project_id).iter().find(|r| r.id == request_id)
    }

    /// Total pending requests across all projects.
    pub fn pending_count(&self) -> usize {
        self.pending.values().map(Vec::len).sum()
    }

    /// Phase statuses for `tasks`, using the configured phase table.
    pub fn milestones(&self, tasks: &[Task]) -> Vec<Milestone> {
        evaluate_milestones(tasks, &self.trade_names, &self.config.phases)
    }

    /// Readiness report for `tasks` over the configured look-ahead window.
    pub fn readiness(&self, tasks: &[Task], today: NaiveDate) -> ReadinessReport {
        ReadinessReport::build(
            tasks,
            &self.trade_names,
            today,
            self.config.readiness_window_days,
        )
    }

    fn remove(&mut self, project_id: &str, request_id: &str) -> bool {
        let Some(requests) = self.pending.get_mut(project_id) else {
            return false;
        };
        let before = requests.len();
        requests.retain(|r| r.id != request_id);
        let removed = requests.len() != before;
        if requests.is_empty() {
            self.pending.remove(project_id);
        }
        removed
    }
}
