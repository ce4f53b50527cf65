//! What an agent perceives when it is asked to decide.
//!
//! An [`Observation`] is the full, uncompressed view handed to the reasoning
//! service. The decision cache reduces it to a canonical fingerprint; that
//! reduction lives in `hive-runtime` so this type stays a plain data carrier.

use crate::types::{AgentId, GridPos, InventoryItem, LifecycleState, Tick, Vitals};
use serde::{Deserialize, Serialize};

/// Another agent within observation range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyAgent {
    pub id: AgentId,
    pub name: String,
    pub position: GridPos,
    pub state: LifecycleState,
    pub vitals: Vitals,
}

/// A harvestable resource node within range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSummary {
    pub position: GridPos,
    /// Resource category, e.g. `food` or `wood`.
    pub category: String,
    /// Units left before the node is exhausted.
    pub amount: u32,
}

impl ResourceSummary {
    pub fn is_available(&self) -> bool {
        self.amount > 0
    }
}

/// A shelter within range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShelterSummary {
    pub position: GridPos,
    pub kind: String,
    pub occupants: u32,
    pub capacity: u32,
}

impl ShelterSummary {
    pub fn has_room(&self) -> bool {
        self.occupants < self.capacity
    }
}

/// Everything the reasoning service is told about one agent on one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub agent_id: AgentId,
    pub tick: Tick,
    /// Wall-clock milliseconds since the unix epoch.
    pub timestamp_ms: u64,
    pub vitals: Vitals,
    pub position: GridPos,
    pub state: LifecycleState,
    pub balance: i64,
    pub inventory: Vec<InventoryItem>,
    pub nearby_agents: Vec<NearbyAgent>,
    pub nearby_resources: Vec<ResourceSummary>,
    pub nearby_shelters: Vec<ShelterSummary>,
    pub recent_events: Vec<String>,
}

impl Observation {
    /// An observation with nothing nearby.
    pub fn solitary(agent_id: AgentId, tick: Tick, vitals: Vitals, position: GridPos) -> Self {
        Self {
            agent_id,
            tick,
            timestamp_ms: 0,
            vitals,
            position,
            state: LifecycleState::Active,
            balance: 0,
            inventory: Vec::new(),
            nearby_agents: Vec::new(),
            nearby_resources: Vec::new(),
            nearby_shelters: Vec::new(),
            recent_events: Vec::new(),
        }
    }
}
