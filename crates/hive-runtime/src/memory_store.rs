//! In-process [`AgentStore`] for tests, demos and the CLI.

use async_trait::async_trait;
use hive_core::error::{StoreError, StoreResult};
use hive_core::needs::DeathCause;
use hive_core::observation::{ResourceSummary, ShelterSummary};
use hive_core::store::{AgentStore, VitalsPatch, WorldSnapshot};
use hive_core::types::{AgentId, AgentState, GridPos, InventoryItem, LifecycleState};
use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct World {
    agents: BTreeMap<AgentId, AgentState>,
    resources: Vec<ResourceSummary>,
    shelters: Vec<ShelterSummary>,
    deaths: Vec<(AgentId, DeathCause)>,
}

/// Agents, resources and shelters held in memory.
///
/// Writes for agents registered with [`fail_writes_for`](Self::fail_writes_for)
/// return [`StoreError::Unavailable`].
#[derive(Debug, Default)]
pub struct MemoryAgentStore {
    world: RwLock<World>,
    failing: Mutex<HashSet<AgentId>>,
}

impl MemoryAgentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_agents(agents: impl IntoIterator<Item = AgentState>) -> Self {
        let world = World {
            agents: agents.into_iter().map(|a| (a.id, a)).collect(),
            ..World::default()
        };
        Self {
            world: RwLock::new(world),
            failing: Mutex::new(HashSet::new()),
        }
    }

    pub fn with_resources(mut self, resources: impl IntoIterator<Item = ResourceSummary>) -> Self {
        self.world.get_mut().resources.extend(resources);
        self
    }

    pub fn with_shelters(mut self, shelters: impl IntoIterator<Item = ShelterSummary>) -> Self {
        self.world.get_mut().shelters.extend(shelters);
        self
    }

    pub async fn insert_agent(&self, agent: AgentState) {
        self.world.write().await.agents.insert(agent.id, agent);
    }

    pub async fn add_resource(&self, resource: ResourceSummary) {
        self.world.write().await.resources.push(resource);
    }

    pub async fn add_shelter(&self, shelter: ShelterSummary) {
        self.world.write().await.shelters.push(shelter);
    }

    pub async fn agent(&self, id: AgentId) -> Option<AgentState> {
        self.world.read().await.agents.get(&id).cloned()
    }

    pub async fn agents(&self) -> Vec<AgentState> {
        self.world.read().await.agents.values().cloned().collect()
    }

    pub async fn alive_count(&self) -> usize {
        self.world
            .read()
            .await
            .agents
            .values()
            .filter(|a| a.is_alive())
            .count()
    }

    /// Every recorded death, in order.
    pub async fn deaths(&self) -> Vec<(AgentId, DeathCause)> {
        self.world.read().await.deaths.clone()
    }

    pub fn fail_writes_for(&self, id: AgentId) {
        self.failing_set().insert(id);
    }

    pub fn clear_failures(&self) {
        self.failing_set().clear();
    }

    fn failing_set(&self) -> std::sync::MutexGuard<'_, HashSet<AgentId>> {
        self.failing.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_writable(&self, id: AgentId) -> StoreResult<()> {
        if self.failing_set().contains(&id) {
            Err(StoreError::Unavailable(format!("writes for {} are failing", id)))
        } else {
            Ok(())
        }
    }
}

fn living_mut(world: &mut World, id: AgentId) -> StoreResult<&mut AgentState> {
    let agent = world
        .agents
        .get_mut(&id)
        .ok_or(StoreError::AgentNotFound(id))?;
    if agent.is_alive() {
        Ok(agent)
    } else {
        Err(StoreError::AgentDead(id))
    }
}

#[async_trait]
impl AgentStore for MemoryAgentStore {
    async fn snapshot(&self) -> StoreResult<WorldSnapshot> {
        let world = self.world.read().await;
        Ok(WorldSnapshot {
            agents: world.agents.values().cloned().collect(),
            resources: world.resources.clone(),
            shelters: world.shelters.clone(),
        })
    }

    async fn update_vitals(&self, id: AgentId, patch: VitalsPatch) -> StoreResult<()> {
        self.check_writable(id)?;
        let mut world = self.world.write().await;
        let agent = living_mut(&mut world, id)?;
        if patch.state == Some(LifecycleState::Dead) {
            return Err(StoreError::Rejected(
                "use kill to mark an agent dead".to_string(),
            ));
        }
        patch.apply_to(agent);
        Ok(())
    }

    async fn kill(&self, id: AgentId, cause: DeathCause) -> StoreResult<()> {
        self.check_writable(id)?;
        let mut world = self.world.write().await;
        let agent = living_mut(&mut world, id)?;
        agent.state = LifecycleState::Dead;
        agent.vitals.health = 0.0;
        world.deaths.push((id, cause));
        Ok(())
    }

    async fn adjust_inventory(&self, id: AgentId, item_type: &str, delta: i64) -> StoreResult<u32> {
        self.check_writable(id)?;
        let mut world = self.world.write().await;
        let agent = living_mut(&mut world, id)?;
        let held = agent.quantity_of(item_type) as i64;
        let updated = held + delta;
        if updated < 0 {
            return Err(StoreError::Rejected(format!(
                "{} holds {} {}, cannot remove {}",
                id, held, item_type, -delta
            )));
        }
        let updated = u32::try_from(updated)
            .map_err(|_| StoreError::Rejected(format!("{} quantity overflow", item_type)))?;

        match agent.inventory.iter_mut().find(|i| i.item_type == item_type) {
            Some(item) => item.quantity = updated,
            None => agent.inventory.push(InventoryItem::new(item_type, updated)),
        }
        agent.inventory.retain(|i| i.quantity > 0);
        Ok(updated)
    }

    async fn harvest(&self, position: GridPos) -> StoreResult<Option<String>> {
        let mut world = self.world.write().await;
        let node = world
            .resources
            .iter_mut()
            .filter(|r| r.position == position && r.is_available())
            .min_by(|a, b| a.category.cmp(&b.category));
        Ok(node.map(|r| {
            r.amount -= 1;
            r.category.clone()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hive_core::types::Vitals;

    fn agent(seed: u64) -> AgentState {
        AgentState::new(AgentId::from_seed(seed), format!("agent-{}", seed), GridPos::new(1, 1))
    }

    #[tokio::test]
    async fn snapshot_is_ordered_by_id() {
        let store = MemoryAgentStore::with_agents(vec![agent(3), agent(1), agent(2)]);
        let ids: Vec<AgentId> = store
            .snapshot()
            .await
            .unwrap()
            .agents
            .iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(
            ids,
            vec![AgentId::from_seed(1), AgentId::from_seed(2), AgentId::from_seed(3)]
        );
    }

    #[tokio::test]
    async fn kill_marks_dead_and_blocks_writes() {
        let a = agent(1);
        let store = MemoryAgentStore::with_agents(vec![a.clone()]);

        store.kill(a.id, DeathCause::Starvation).await.unwrap();
        let dead = store.agent(a.id).await.unwrap();
        assert_eq!(dead.state, LifecycleState::Dead);
        assert_eq!(dead.vitals.health, 0.0);
        assert_eq!(store.deaths().await, vec![(a.id, DeathCause::Starvation)]);

        let err = store
            .update_vitals(a.id, VitalsPatch::from_vitals(Vitals::full()))
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::AgentDead(a.id));
    }

    #[tokio::test]
    async fn unknown_agent_is_reported() {
        let store = MemoryAgentStore::new();
        let id = AgentId::from_seed(9);
        assert_eq!(
            store.kill(id, DeathCause::Exhaustion).await,
            Err(StoreError::AgentNotFound(id))
        );
    }

    #[tokio::test]
    async fn inventory_adjusts_and_refuses_negative() {
        let a = agent(1).with_item("food", 1);
        let store = MemoryAgentStore::with_agents(vec![a.clone()]);

        assert_eq!(store.adjust_inventory(a.id, "food", 2).await.unwrap(), 3);
        assert_eq!(store.adjust_inventory(a.id, "food", -3).await.unwrap(), 0);
        assert!(store.agent(a.id).await.unwrap().inventory.is_empty());
        assert!(matches!(
            store.adjust_inventory(a.id, "food", -1).await,
            Err(StoreError::Rejected(_))
        ));
    }

    #[tokio::test]
    async fn harvest_depletes_resource_nodes() {
        let store = MemoryAgentStore::new();
        store
            .add_resource(ResourceSummary {
                position: GridPos::new(2, 2),
                category: "food".into(),
                amount: 1,
            })
            .await;

        assert_eq!(store.harvest(GridPos::new(2, 2)).await.unwrap(), Some("food".into()));
        assert_eq!(store.harvest(GridPos::new(2, 2)).await.unwrap(), None);
        assert_eq!(store.harvest(GridPos::new(0, 0)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn injected_failures_only_hit_marked_agents() {
        let (a, b) = (agent(1), agent(2));
        let store = MemoryAgentStore::with_agents(vec![a.clone(), b.clone()]);
        store.fail_writes_for(a.id);

        let patch = VitalsPatch::from_vitals(Vitals::full());
        assert!(matches!(
            store.update_vitals(a.id, patch.clone()).await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(store.update_vitals(b.id, patch.clone()).await.is_ok());

        store.clear_failures();
        assert!(store.update_vitals(a.id, patch).await.is_ok());
    }
}
