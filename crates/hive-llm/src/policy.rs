//! Deterministic rule-of-thumb decisions.
//!
//! Used as the fallback when the reasoning service fails, and by
//! [`MockBackend`](crate::MockBackend) when no scripted answer is queued.

use hive_core::decision::{Action, Decision};
use hive_core::observation::Observation;

/// Thresholds for [`heuristic_decision`].
#[derive(Debug, Clone, PartialEq)]
pub struct HeuristicPolicy {
    pub food_item: String,
    pub sleep_below_energy: f64,
    pub eat_below_hunger: f64,
    pub forage_below_hunger: f64,
    pub rest_below_energy: f64,
}

impl Default for HeuristicPolicy {
    fn default() -> Self {
        Self {
            food_item: "food".to_string(),
            sleep_below_energy: 20.0,
            eat_below_hunger: 40.0,
            forage_below_hunger: 60.0,
            rest_below_energy: 40.0,
        }
    }
}

impl HeuristicPolicy {
    pub fn with_food_item(mut self, food_item: impl Into<String>) -> Self {
        self.food_item = food_item.into();
        self
    }

    pub fn decide(&self, obs: &Observation) -> Decision {
        let vitals = obs.vitals;
        let has_food = obs
            .inventory
            .iter()
            .any(|i| i.item_type == self.food_item && i.quantity > 0);

        if vitals.energy < self.sleep_below_energy {
            return Decision::new(Action::Sleep).with_reasoning("exhausted");
        }
        if vitals.hunger < self.eat_below_hunger && has_food {
            return Decision::new(Action::Eat).with_reasoning("hungry and carrying food");
        }
        if vitals.hunger < self.forage_below_hunger {
            let nearest = obs
                .nearby_resources
                .iter()
                .filter(|r| r.category == self.food_item && r.is_available())
                .min_by_key(|r| (r.position.chebyshev(&obs.position), r.position));
            if let Some(resource) = nearest {
                return if resource.position == obs.position {
                    Decision::new(Action::Gather).with_reasoning("food underfoot")
                } else {
                    Decision::new(Action::Move {
                        target: resource.position,
                    })
                    .with_reasoning("walking to food")
                };
            }
        }
        if vitals.energy < self.rest_below_energy {
            return Decision::new(Action::Rest).with_reasoning("tired");
        }
        Decision::new(Action::Idle)
    }
}

/// Decide with the default thresholds.
pub fn heuristic_decision(obs: &Observation) -> Decision {
    HeuristicPolicy::default().decide(obs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hive_core::observation::ResourceSummary;
    use hive_core::types::{AgentId, GridPos, InventoryItem, Vitals};

    fn obs(hunger: f64, energy: f64) -> Observation {
        Observation::solitary(
            AgentId::from_seed(1),
            1,
            Vitals::new(hunger, energy, 100.0),
            GridPos::new(5, 5),
        )
    }

    #[test]
    fn exhaustion_beats_hunger() {
        let mut o = obs(5.0, 10.0);
        o.inventory.push(InventoryItem::new("food", 1));
        assert_eq!(heuristic_decision(&o).action, Action::Sleep);
    }

    #[test]
    fn hungry_agent_eats_then_forages() {
        let mut o = obs(30.0, 80.0);
        o.inventory.push(InventoryItem::new("food", 1));
        assert_eq!(heuristic_decision(&o).action, Action::Eat);

        let mut o = obs(30.0, 80.0);
        o.nearby_resources.push(ResourceSummary {
            position: GridPos::new(7, 5),
            category: "food".into(),
            amount: 3,
        });
        assert_eq!(
            heuristic_decision(&o).action,
            Action::Move {
                target: GridPos::new(7, 5)
            }
        );

        o.nearby_resources[0].position = GridPos::new(5, 5);
        assert_eq!(heuristic_decision(&o).action, Action::Gather);
    }

    #[test]
    fn content_agent_idles() {
        assert_eq!(heuristic_decision(&obs(90.0, 90.0)).action, Action::Idle);
        assert_eq!(heuristic_decision(&obs(90.0, 30.0)).action, Action::Rest);
    }
}
