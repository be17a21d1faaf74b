//! Project phase (milestone) definitions and statuses.

use serde::{Deserialize, Serialize};

/// Aggregate status of one project phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MilestoneStatus {
    Completed,
    #[serde(rename = "In Progress")]
    InProgress,
    Next,
    Incomplete,
}

/// A named phase and the trades whose tasks make it up.
///
/// A phase with no trades is derived entirely from the phases before it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseDefinition {
    /// Display name.
    pub name: String,
    /// Trade names (not ids) belonging to the phase.
    #[serde(default)]
    pub trade_names: Vec<String>,
}

impl PhaseDefinition {
    /// Creates a phase.
    pub fn new<I, S>(name: impl Into<String>, trade_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            trade_names: trade_names.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `trade_name` belongs to this phase.
    pub fn includes(&self, trade_name: &str) -> bool {
        self.trade_names.iter().any(|t| t == trade_name)
    }

    /// Residential build phases, in order.
    pub fn construction_defaults() -> Vec<Self> {
        vec![
            Self::new("Foundation", ["Foundation"]),
            Self::new("Framing", ["Framing"]),
            Self::new(
                "Rough-ins",
                [
                    "Plumbing (Rough-in)",
                    "Electrical (Rough-in)",
                    "HVAC (Rough-in)",
                ],
            ),
            Self::new("Inspections", ["Municipal Inspector"]),
            Self::new("Exterior", ["Roofing"]),
            Self::new("Interior", ["Drywall", "Painting"]),
            Self::new("Final", Vec::<String>::new()),
        ]
    }
}

/// Evaluated status of one phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub name: String,
    pub status: MilestoneStatus,
}

impl Milestone {
    pub fn new(name: impl Into<String>, status: MilestoneStatus) -> Self {
        Self {
            name: name.into(),
            status,
        }
    }
}
