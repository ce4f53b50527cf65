//! Building observations from a world snapshot.

use hive_core::observation::{NearbyAgent, Observation};
use hive_core::store::WorldSnapshot;
use hive_core::types::{AgentState, GridPos, Tick};
use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the unix epoch, or 0 if the clock is before it.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Everything within Chebyshev `radius` of `agent`, excluding the agent itself.
pub fn build_observation(
    agent: &AgentState,
    world: &WorldSnapshot,
    tick: Tick,
    radius: u32,
    recent_events: Vec<String>,
) -> Observation {
    let in_range = |pos: &GridPos| agent.position.chebyshev(pos) <= radius;

    Observation {
        agent_id: agent.id,
        tick,
        timestamp_ms: now_ms(),
        vitals: agent.vitals,
        position: agent.position,
        state: agent.state,
        balance: agent.balance,
        inventory: agent.inventory.clone(),
        nearby_agents: world
            .agents
            .iter()
            .filter(|other| other.id != agent.id && in_range(&other.position))
            .map(|other| NearbyAgent {
                id: other.id,
                name: other.name.clone(),
                position: other.position,
                state: other.state,
                vitals: other.vitals,
            })
            .collect(),
        nearby_resources: world
            .resources
            .iter()
            .filter(|r| in_range(&r.position))
            .cloned()
            .collect(),
        nearby_shelters: world
            .shelters
            .iter()
            .filter(|s| in_range(&s.position))
            .cloned()
            .collect(),
        recent_events,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hive_core::observation::{ResourceSummary, ShelterSummary};
    use hive_core::types::AgentId;

    #[test]
    fn includes_only_what_is_in_range() {
        let me = AgentState::new(AgentId::from_seed(1), "me", GridPos::new(10, 10)).with_item("food", 2);
        let near = AgentState::new(AgentId::from_seed(2), "near", GridPos::new(12, 8));
        let far = AgentState::new(AgentId::from_seed(3), "far", GridPos::new(20, 10));
        let world = WorldSnapshot {
            agents: vec![me.clone(), near, far],
            resources: vec![
                ResourceSummary {
                    position: GridPos::new(10, 12),
                    category: "food".into(),
                    amount: 4,
                },
                ResourceSummary {
                    position: GridPos::new(0, 0),
                    category: "wood".into(),
                    amount: 4,
                },
            ],
            shelters: vec![ShelterSummary {
                position: GridPos::new(13, 13),
                kind: "hut".into(),
                occupants: 0,
                capacity: 2,
            }],
        };

        let obs = build_observation(&me, &world, 7, 3, vec!["moved".into()]);

        assert_eq!(obs.tick, 7);
        assert_eq!(obs.agent_id, me.id);
        assert_eq!(obs.nearby_agents.len(), 1);
        assert_eq!(obs.nearby_agents[0].name, "near");
        assert_eq!(obs.nearby_resources.len(), 1);
        assert_eq!(obs.nearby_shelters.len(), 1);
        assert_eq!(obs.inventory.len(), 1);
        assert_eq!(obs.recent_events, vec!["moved".to_string()]);
        assert!(obs.timestamp_ms > 0);
    }
}
