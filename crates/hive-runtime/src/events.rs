//! Events and per-tick reports emitted by the orchestrator.

use crate::effects::ActionOutcome;
use hive_core::decision::Action;
use hive_core::needs::{DeathCause, NeedsEvent};
use hive_core::types::{AgentId, Tick};
use serde::Serialize;

/// Where a decision came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    Cache,
    Reasoned,
    /// The reasoning call failed and the heuristic policy stood in.
    Fallback,
}

/// Something that happened during a tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorldEvent {
    /// Needs decay reported an update or a threshold warning.
    Needs { event: NeedsEvent },
    DecisionMade {
        agent_id: AgentId,
        tick: Tick,
        action: Action,
        source: DecisionSource,
    },
    DecisionFailed {
        agent_id: AgentId,
        tick: Tick,
        error: String,
    },
    ActionApplied {
        agent_id: AgentId,
        tick: Tick,
        outcome: ActionOutcome,
    },
    Died {
        agent_id: AgentId,
        tick: Tick,
        cause: DeathCause,
    },
    /// A persistence call failed; the agent's tick was abandoned there.
    StoreFailed {
        agent_id: AgentId,
        tick: Tick,
        error: String,
    },
    TickComplete {
        tick: Tick,
        processed: usize,
        died: usize,
        elapsed_ms: u64,
    },
}

impl WorldEvent {
    /// The agent this event concerns, if any.
    pub fn agent_id(&self) -> Option<AgentId> {
        match self {
            WorldEvent::Needs { event } => Some(match event {
                NeedsEvent::NeedsUpdated { agent_id, .. } => *agent_id,
                NeedsEvent::NeedsWarning { agent_id, .. } => *agent_id,
            }),
            WorldEvent::DecisionMade { agent_id, .. }
            | WorldEvent::DecisionFailed { agent_id, .. }
            | WorldEvent::ActionApplied { agent_id, .. }
            | WorldEvent::Died { agent_id, .. }
            | WorldEvent::StoreFailed { agent_id, .. } => Some(*agent_id),
            WorldEvent::TickComplete { .. } => None,
        }
    }

    /// One-line text for an agent's recent-event memory.
    pub fn describe(&self) -> Option<String> {
        match self {
            WorldEvent::ActionApplied { tick, outcome, .. } => Some(match &outcome.note {
                Some(note) => format!("tick {}: {} ({})", tick, outcome.action, note),
                None => format!("tick {}: {}", tick, outcome.action),
            }),
            WorldEvent::DecisionFailed { tick, .. } => {
                Some(format!("tick {}: could not think clearly", tick))
            }
            WorldEvent::Needs {
                event: NeedsEvent::NeedsWarning { tick, warning, .. },
            } => Some(format!(
                "tick {}: {:?} {:?} at {:.1}",
                tick, warning.level, warning.need, warning.value
            )),
            _ => None,
        }
    }
}

/// Summary of one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TickReport {
    pub tick: Tick,
    /// Cells in the shard grid.
    pub shard_count: u32,
    /// Cells that held at least one living agent.
    pub shards_processed: usize,
    pub processed: usize,
    pub died: usize,
    pub cache_hits: usize,
    pub reasoned: usize,
    /// Reasoning calls that failed and fell back to the heuristic policy.
    pub decision_failures: usize,
    pub store_failures: usize,
    pub elapsed_ms: u64,
    pub events: Vec<WorldEvent>,
}

impl TickReport {
    pub fn new(tick: Tick, shard_count: u32) -> Self {
        Self {
            tick,
            shard_count,
            ..Self::default()
        }
    }

    pub fn events_for(&self, agent_id: AgentId) -> impl Iterator<Item = &WorldEvent> {
        self.events
            .iter()
            .filter(move |e| e.agent_id() == Some(agent_id))
    }

    pub fn deaths(&self) -> impl Iterator<Item = (AgentId, DeathCause)> + '_ {
        self.events.iter().filter_map(|e| match e {
            WorldEvent::Died {
                agent_id, cause, ..
            } => Some((*agent_id, *cause)),
            _ => None,
        })
    }
}
