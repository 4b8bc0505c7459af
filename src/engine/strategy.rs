// ==========================================
// Exam Timetabling Engine - Assignment Strategy
// ==========================================
// Selects which assigner runs. Both strategies consume the same pools,
// slots and seeded conflict index, and produce the same report shape,
// so the orchestrator can dispatch on this tag alone.
// ==========================================

use serde::{Deserialize, Serialize};

/// Assignment strategy of a generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStrategy {
    /// First-feasible greedy placement, persisting as it goes
    Greedy,
    /// Exact boolean assignment model under a time budget
    ConstraintModel,
}

impl AssignmentStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStrategy::Greedy => "greedy",
            AssignmentStrategy::ConstraintModel => "constraint_model",
        }
    }
}

impl Default for AssignmentStrategy {
    fn default() -> Self {
        AssignmentStrategy::Greedy
    }
}

impl std::fmt::Display for AssignmentStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AssignmentStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "greedy" => Ok(AssignmentStrategy::Greedy),
            "constraint_model" | "constraint-model" | "model" => {
                Ok(AssignmentStrategy::ConstraintModel)
            }
            other => Err(format!("unknown assignment strategy: {}", other)),
        }
    }
}
