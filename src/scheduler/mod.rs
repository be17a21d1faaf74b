//! Rescheduling and schedule summaries.
//!
//! Provides the cascading delay scheduler and read-only views over a
//! project's task list.
//!
//! # Algorithm
//!
//! `CascadeScheduler` pushes a delayed task and every task downstream of
//! it, keeping each task's length and packing each child against its
//! parent's new end.
//!
//! # Views
//!
//! - `ProjectKpi`: span, completion rate, progress, delayed count.
//! - `ReadinessReport`: what can start in the next few days and what is blocked.

mod cascade;
mod kpi;
mod readiness;

pub use cascade::{CascadePlan, CascadeScheduler, DateShift};
pub use kpi::ProjectKpi;
pub use readiness::{rescheduled_task_ids, ReadinessReport, INSPECTED_TRADES};
