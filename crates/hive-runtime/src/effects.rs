//! Action effects.
//!
//! Runs after needs decay, on top of the post-decay vitals. Every effect
//! clamps vitals to `[0, 100]` and is persisted with a single
//! [`AgentStore::update_vitals`] call plus any inventory adjustments.

use hive_core::config::EffectsConfig;
use hive_core::decision::Action;
use hive_core::error::StoreResult;
use hive_core::store::{AgentStore, VitalsPatch};
use hive_core::types::{AgentState, GridPos, LifecycleState, Vitals};
use serde::Serialize;

/// What an action actually did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionOutcome {
    pub action: Action,
    /// False when the action had nothing to act on (no food, no resource).
    pub succeeded: bool,
    pub vitals: Vitals,
    pub position: GridPos,
    pub state: LifecycleState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Grid bounds used to clamp movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridBounds {
    pub width: u32,
    pub height: u32,
}

/// Apply `action` to `agent`, whose vitals have already decayed to `vitals`.
///
/// `state` is the post-decay lifecycle state. Any action other than sleep
/// wakes a sleeping agent.
pub async fn apply_action(
    store: &dyn AgentStore,
    config: &EffectsConfig,
    bounds: GridBounds,
    agent: &AgentState,
    vitals: Vitals,
    action: &Action,
) -> StoreResult<ActionOutcome> {
    let mut vitals = vitals;
    let mut position = agent.position;
    let mut state = LifecycleState::Active;
    let mut succeeded = true;
    let mut note = None;

    match action {
        Action::Move { target } => {
            let target = target.clamped(bounds.width, bounds.height);
            position = agent
                .position
                .step_toward(&target, config.move_step)
                .clamped(bounds.width, bounds.height);
            vitals.energy -= config.move_energy_cost;
            if position == agent.position {
                succeeded = false;
                note = Some("already at target".to_string());
            }
        }
        Action::Gather => match store.harvest(agent.position).await? {
            Some(category) => {
                let held = store.adjust_inventory(agent.id, &category, 1).await?;
                note = Some(format!("gathered {} (now {})", category, held));
            }
            None => {
                succeeded = false;
                note = Some("nothing to gather".to_string());
            }
        },
        Action::Eat => {
            if agent.quantity_of(&config.food_item) > 0 {
                store.adjust_inventory(agent.id, &config.food_item, -1).await?;
                vitals.hunger += config.eat_hunger_restore;
                note = Some(format!("ate {}", config.food_item));
            } else {
                succeeded = false;
                note = Some(format!("no {} to eat", config.food_item));
            }
        }
        Action::Rest => {
            vitals.energy += config.rest_energy_restore;
        }
        Action::Sleep => {
            vitals.energy += config.sleep_energy_restore;
            state = LifecycleState::Sleeping;
        }
        Action::Idle => {}
    }

    let vitals = vitals.clamped();
    let mut patch = VitalsPatch::from_vitals(vitals).with_state(state);
    if position != agent.position {
        patch = patch.with_position(position);
    }
    store.update_vitals(agent.id, patch).await?;

    Ok(ActionOutcome {
        action: action.clone(),
        succeeded,
        vitals,
        position,
        state,
        note,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_store::MemoryAgentStore;
    use hive_core::observation::ResourceSummary;
    use hive_core::types::AgentId;

    const BOUNDS: GridBounds = GridBounds {
        width: 10,
        height: 10,
    };

    fn agent() -> AgentState {
        AgentState::new(AgentId::from_seed(1), "a", GridPos::new(5, 5))
            .with_vitals(Vitals::new(50.0, 50.0, 100.0))
    }

    async fn run(store: &MemoryAgentStore, agent: &AgentState, action: Action) -> ActionOutcome {
        apply_action(
            store,
            &EffectsConfig::default(),
            BOUNDS,
            agent,
            agent.vitals,
            &action,
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn move_steps_toward_target_and_costs_energy() {
        let a = agent();
        let store = MemoryAgentStore::with_agents(vec![a.clone()]);

        let out = run(&store, &a, Action::Move { target: GridPos::new(9, 2) }).await;
        assert_eq!(out.position, GridPos::new(6, 4));
        assert_eq!(out.vitals.energy, 49.5);
        assert_eq!(store.agent(a.id).await.unwrap().position, GridPos::new(6, 4));
    }

    #[tokio::test]
    async fn move_target_outside_grid_is_clamped() {
        let a = AgentState::new(AgentId::from_seed(1), "a", GridPos::new(9, 9));
        let store = MemoryAgentStore::with_agents(vec![a.clone()]);

        let out = run(&store, &a, Action::Move { target: GridPos::new(40, 40) }).await;
        assert_eq!(out.position, GridPos::new(9, 9));
        assert!(!out.succeeded);
    }

    #[tokio::test]
    async fn eat_consumes_food_and_clamps_hunger() {
        let a = agent().with_vitals(Vitals::new(90.0, 50.0, 100.0)).with_item("food", 1);
        let store = MemoryAgentStore::with_agents(vec![a.clone()]);

        let out = run(&store, &a, Action::Eat).await;
        assert!(out.succeeded);
        assert_eq!(out.vitals.hunger, 100.0);

        let stored = store.agent(a.id).await.unwrap();
        assert_eq!(stored.quantity_of("food"), 0);
        assert_eq!(stored.vitals.hunger, 100.0);
    }

    #[tokio::test]
    async fn eat_without_food_fails_softly() {
        let a = agent();
        let store = MemoryAgentStore::with_agents(vec![a.clone()]);

        let out = run(&store, &a, Action::Eat).await;
        assert!(!out.succeeded);
        assert_eq!(out.vitals.hunger, 50.0);
    }

    #[tokio::test]
    async fn gather_harvests_the_agents_cell() {
        let a = agent();
        let store = MemoryAgentStore::with_agents(vec![a.clone()]);
        store
            .add_resource(ResourceSummary {
                position: GridPos::new(5, 5),
                category: "food".into(),
                amount: 2,
            })
            .await;

        let out = run(&store, &a, Action::Gather).await;
        assert!(out.succeeded);
        assert_eq!(store.agent(a.id).await.unwrap().quantity_of("food"), 1);
    }

    #[tokio::test]
    async fn sleep_sets_sleeping_and_other_actions_wake() {
        let a = agent();
        let store = MemoryAgentStore::with_agents(vec![a.clone()]);

        let slept = run(&store, &a, Action::Sleep).await;
        assert_eq!(slept.state, LifecycleState::Sleeping);
        assert_eq!(slept.vitals.energy, 65.0);

        let sleeping = store.agent(a.id).await.unwrap();
        let rested = run(&store, &sleeping, Action::Rest).await;
        assert_eq!(rested.state, LifecycleState::Active);
        assert_eq!(rested.vitals.energy, 70.0);
    }
}
