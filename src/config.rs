//! Engine configuration.
//!
//! Built in code with `with_*` builders or read from JSON. Missing JSON
//! fields take their defaults.
//!
//! ```
//! use site_schedule::config::{DuplicatePolicy, EngineConfig};
//!
//! let config = EngineConfig::from_json_str(r#"{ "duplicate_policy": "reject" }"#).unwrap();
//! assert_eq!(config.duplicate_policy, DuplicatePolicy::Reject);
//! assert_eq!(config.readiness_window_days, 7);
//! ```

use serde::{Deserialize, Serialize};

use crate::models::PhaseDefinition;

/// What `propose` does when the task already has a pending request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Refuse the new proposal.
    Reject,
    /// Drop the pending request; the latest proposal wins.
    #[default]
    Replace,
    /// Keep both; each is approved or denied on its own.
    Allow,
}

/// Tunables for the workflow and the read-only views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Handling of a second proposal for the same task.
    pub duplicate_policy: DuplicatePolicy,
    /// Look-ahead window for the readiness report, in days.
    pub readiness_window_days: u64,
    /// Ordered phase table for milestone evaluation.
    pub phases: Vec<PhaseDefinition>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::default(),
            readiness_window_days: 7,
            phases: PhaseDefinition::construction_defaults(),
        }
    }
}

impl EngineConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Sets the duplicate-proposal policy.
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    /// Sets the readiness look-ahead window.
    pub fn with_readiness_window(mut self, days: u64) -> Self {
        self.readiness_window_days = days;
        self
    }

    /// Replaces the phase table.
    pub fn with_phases(mut self, phases: Vec<PhaseDefinition>) -> Self {
        self.phases = phases;
        self
    }
}
