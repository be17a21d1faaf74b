//! Task dependency scheduling for construction projects.
//!
//! Tasks form a forest: each task depends on at most one parent and must
//! start after it ends. When a trade reports a delay, the delay becomes a
//! change request; once approved, it shifts the task and cascades through
//! every transitive dependent in a single atomic batch.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Task`, `TaskUpdate`, `ChangeRequest`,
//!   `MutationBatch`, `PhaseDefinition`, `Milestone`
//! - **`graph`**: `TaskGraph`, a read-only parent/children index over a
//!   project snapshot
//! - **`scheduler`**: Cascade computation (`CascadeScheduler`) plus
//!   read-only views (`ProjectKpi`, `ReadinessReport`)
//! - **`workflow`**: `ChangeRequestWorkflow` and the `UpdateApplier` store
//!   boundary
//! - **`milestones`**: Phase status derivation
//! - **`validation`**: Snapshot integrity checks (duplicate IDs, dangling
//!   references, cycles, dates, progress)
//! - **`config`**: `EngineConfig`
//! - **`error`**: `ScheduleError`, `CommitError`
//!
//! # Dates
//!
//! All dates are calendar days (`chrono::NaiveDate`), inclusive at both
//! ends. Calendar-day arithmetic only: no working-day calendar.

pub mod config;
pub mod error;
pub mod graph;
pub mod milestones;
pub mod models;
pub mod scheduler;
pub mod validation;
pub mod workflow;

pub use config::{DuplicatePolicy, EngineConfig};
pub use error::{CommitError, Result, ScheduleError};
pub use graph::TaskGraph;
pub use milestones::evaluate_milestones;
pub use scheduler::{CascadePlan, CascadeScheduler};
pub use workflow::{ChangeRequestWorkflow, InMemoryTaskStore, UpdateApplier, UpdateOutcome};
