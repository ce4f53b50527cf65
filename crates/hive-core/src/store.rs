//! Persistence seam between the simulation core and whatever stores agents.
//!
//! The needs engine writes through [`AgentStore::update_vitals`] and
//! [`AgentStore::kill`]; the orchestrator additionally reads world snapshots
//! and applies action effects. Failures are returned, never swallowed.

use crate::error::StoreResult;
use crate::needs::DeathCause;
use crate::observation::{ResourceSummary, ShelterSummary};
use crate::types::{AgentId, AgentState, GridPos, LifecycleState, Vitals};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A partial update to an agent's persisted vitals.
///
/// `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VitalsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hunger: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<LifecycleState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<GridPos>,
}

impl VitalsPatch {
    /// Patch that overwrites all three vitals.
    pub fn from_vitals(vitals: Vitals) -> Self {
        Self {
            hunger: Some(vitals.hunger),
            energy: Some(vitals.energy),
            health: Some(vitals.health),
            ..Self::default()
        }
    }

    pub fn with_state(mut self, state: LifecycleState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn with_position(mut self, position: GridPos) -> Self {
        self.position = Some(position);
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Apply this patch to an in-memory agent, clamping vitals.
    pub fn apply_to(&self, agent: &mut AgentState) {
        if let Some(h) = self.hunger {
            agent.vitals.hunger = h;
        }
        if let Some(e) = self.energy {
            agent.vitals.energy = e;
        }
        if let Some(h) = self.health {
            agent.vitals.health = h;
        }
        agent.vitals = agent.vitals.clamped();
        if let Some(state) = self.state {
            agent.state = state;
        }
        if let Some(position) = self.position {
            agent.position = position;
        }
    }
}

/// Everything the orchestrator needs to know about the world for one tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub agents: Vec<AgentState>,
    pub resources: Vec<ResourceSummary>,
    pub shelters: Vec<ShelterSummary>,
}

impl WorldSnapshot {
    pub fn active_agents(&self) -> impl Iterator<Item = &AgentState> {
        self.agents.iter().filter(|a| a.is_alive())
    }
}

/// Agent persistence store.
#[async_trait]
pub trait AgentStore: Send + Sync {
    /// Read the current world state.
    async fn snapshot(&self) -> StoreResult<WorldSnapshot>;

    /// Ordinary per-tick vitals update.
    async fn update_vitals(&self, id: AgentId, patch: VitalsPatch) -> StoreResult<()>;

    /// Mark an agent dead.
    async fn kill(&self, id: AgentId, cause: DeathCause) -> StoreResult<()>;

    /// Add (positive) or remove (negative) items; returns the new quantity.
    async fn adjust_inventory(&self, id: AgentId, item_type: &str, delta: i64) -> StoreResult<u32>;

    /// Take one unit from the resource node at `position`, returning its category.
    async fn harvest(&self, position: GridPos) -> StoreResult<Option<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_applies_only_present_fields() {
        let mut agent = crate::types::AgentState::new(AgentId::from_seed(1), "a", GridPos::new(1, 1))
            .with_vitals(Vitals::new(50.0, 50.0, 50.0));
        let patch = VitalsPatch {
            energy: Some(120.0),
            ..VitalsPatch::default()
        }
        .with_state(LifecycleState::Sleeping);

        patch.apply_to(&mut agent);

        assert_eq!(agent.vitals.hunger, 50.0);
        assert_eq!(agent.vitals.energy, 100.0);
        assert_eq!(agent.state, LifecycleState::Sleeping);
        assert_eq!(agent.position, GridPos::new(1, 1));
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(VitalsPatch::default().is_empty());
        assert!(!VitalsPatch::from_vitals(Vitals::full()).is_empty());
    }
}
