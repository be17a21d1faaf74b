//! Scheduling domain models.
//!
//! Provides the data types shared by the graph, the cascade scheduler,
//! the change-request workflow and the milestone evaluator.
//!
//! # Domain Mappings
//!
//! | site-schedule | Job site | Dashboard |
//! |---------------|----------|-----------|
//! | Task | Trade's block of work | Task card / timeline bar |
//! | ChangeRequest | Reported delay | Pending request panel |
//! | MutationBatch | Schedule revision | Batched write |
//! | Milestone | Build phase | Progress bar step |

mod batch;
mod change_request;
mod milestone;
mod task;
mod update;

pub use batch::{MutationBatch, TaskMutation};
pub use change_request::{ChangeRequest, ProposedUpdate, NO_REASON, UNKNOWN_TRADE};
pub use milestone::{Milestone, MilestoneStatus, PhaseDefinition};
pub use task::{Task, TaskStatus};
pub use update::{TaskPatch, TaskUpdate};
