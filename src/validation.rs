//! Input validation for project task snapshots.
//!
//! Checks structural integrity of a task list before it is scheduled.
//! Detects:
//! - Duplicate IDs
//! - Tasks from more than one project
//! - Dependencies on missing tasks, or on tasks of another project
//! - Circular dependencies
//! - End dates before start dates
//! - Progress that contradicts the status
//!
//! The cascade scheduler guards itself against all of these; validation
//! exists so callers can surface every problem at once instead of failing
//! on the first one a cascade happens to hit.

use std::collections::{HashMap, HashSet};

use crate::models::Task;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Task the problem was found on.
    pub task_id: String,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two tasks share the same ID.
    DuplicateId,
    /// The snapshot mixes tasks from several projects.
    MixedProjects,
    /// A dependency references a task that doesn't exist.
    DanglingDependency,
    /// A dependency references a task of another project.
    CrossProjectDependency,
    /// Following dependencies loops back on itself.
    CyclicDependency,
    /// `end_date` is before `start_date`.
    InvertedDates,
    /// Progress contradicts the status (or exceeds 100).
    InconsistentProgress,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, task_id: &str, message: impl Into<String>) -> Self {
        Self {
            kind,
            task_id: task_id.to_string(),
            message: message.into(),
        }
    }
}

/// Validates one project's task snapshot.
///
/// Checks:
/// 1. No duplicate task IDs
/// 2. All tasks share the first task's project
/// 3. All dependencies point to existing tasks of the same project
/// 4. No circular dependencies
/// 5. `start_date <= end_date`
/// 6. `Completed ⇒ progress = 100`, `NotStarted ⇒ progress = 0`, progress ≤ 100
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_tasks(tasks: &[Task]) -> ValidationResult {
    let mut errors = Vec::new();

    let mut by_id: HashMap<&str, &Task> = HashMap::new();
    for task in tasks {
        if by_id.insert(task.id.as_str(), task).is_some() {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                &task.id,
                format!("Duplicate task ID: {}", task.id),
            ));
        }
    }

    if let Some(first) = tasks.first() {
        for task in tasks.iter().filter(|t| t.project_id != first.project_id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::MixedProjects,
                &task.id,
                format!(
                    "Task '{}' belongs to project '{}', expected '{}'",
                    task.id, task.project_id, first.project_id
                ),
            ));
        }
    }

    for task in tasks {
        if let Some(dep) = task.dependency.as_deref() {
            match by_id.get(dep) {
                None => errors.push(ValidationError::new(
                    ValidationErrorKind::DanglingDependency,
                    &task.id,
                    format!("Task '{}' depends on unknown task '{}'", task.id, dep),
                )),
                Some(parent) if parent.project_id != task.project_id => {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::CrossProjectDependency,
                        &task.id,
                        format!(
                            "Task '{}' depends on '{}' from project '{}'",
                            task.id, dep, parent.project_id
                        ),
                    ))
                }
                Some(_) => {}
            }
        }

        if task.start_date > task.end_date {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvertedDates,
                &task.id,
                format!(
                    "Task '{}' ends ({}) before it starts ({})",
                    task.id, task.end_date, task.start_date
                ),
            ));
        }

        let implied = task.status.implied_progress();
        if task.progress > 100 || implied.is_some_and(|p| p != task.progress) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InconsistentProgress,
                &task.id,
                format!(
                    "Task '{}' is '{}' with progress {}",
                    task.id, task.status, task.progress
                ),
            ));
        }
    }

    errors.extend(detect_cycles(&by_id));

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Detects dependency cycles.
///
/// # Algorithm
/// Each task has at most one parent, so every walk up the `dependency`
/// chain is a simple path or ends in a loop. Walks share a `done` set, so
/// each task is visited once overall: O(n). One error is reported per
/// distinct cycle, on the first cycle member reached.
fn detect_cycles(by_id: &HashMap<&str, &Task>) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut done: HashSet<&str> = HashSet::new();

    let mut ids: Vec<&str> = by_id.keys().copied().collect();
    ids.sort_unstable();

    for start in ids {
        let mut path: Vec<&str> = Vec::new();
        let mut on_path: HashSet<&str> = HashSet::new();
        let mut current = Some(start);

        while let Some(id) = current {
            if done.contains(id) {
                break;
            }
            if !on_path.insert(id) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::CyclicDependency,
                    id,
                    format!("Circular dependency detected involving task '{id}'"),
                ));
                break;
            }
            path.push(id);
            current = by_id
                .get(id)
                .and_then(|t| t.dependency.as_deref())
                .filter(|dep| by_id.contains_key(dep));
        }

        done.extend(path);
    }

    errors
}
