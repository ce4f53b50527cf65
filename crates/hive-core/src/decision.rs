//! Decisions returned by the reasoning service.

use crate::types::GridPos;
use serde::{Deserialize, Serialize};

/// A concrete action an agent can take this tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Walk toward a target cell.
    Move { target: GridPos },
    /// Harvest one unit from a resource node at the agent's cell.
    Gather,
    /// Consume one food item from the inventory.
    Eat,
    /// Recover a little energy while staying awake.
    Rest,
    /// Fall asleep for the tick.
    Sleep,
    /// Do nothing.
    Idle,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Move { .. } => "move",
            Action::Gather => "gather",
            Action::Eat => "eat",
            Action::Rest => "rest",
            Action::Sleep => "sleep",
            Action::Idle => "idle",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Move { target } => write!(f, "move({},{})", target.x, target.y),
            other => write!(f, "{}", other.name()),
        }
    }
}

/// The reasoning service's answer for one observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub action: Action,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

impl Decision {
    pub fn new(action: Action) -> Self {
        Self {
            action,
            reasoning: None,
        }
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = Some(reasoning.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_serializes_with_tagged_action() {
        let decision = Decision::new(Action::Move {
            target: GridPos::new(3, 4),
        });
        let json = serde_json::to_string(&decision).unwrap();
        assert!(json.contains("\"type\":\"move\""));
        assert!(!json.contains("reasoning"));

        let back: Decision = serde_json::from_str(&json).unwrap();
        assert_eq!(back, decision);
    }
}
