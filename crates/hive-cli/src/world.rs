//! Deterministic demo worlds.

use hive::core::config::WorldConfig;
use hive::core::observation::{ResourceSummary, ShelterSummary};
use hive::core::types::{AgentId, AgentState, GridPos, Vitals};
use hive::runtime::MemoryAgentStore;

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

/// A seeded stream of pseudo-random numbers.
struct Seeded(u64);

impl Seeded {
    fn next(&mut self) -> u64 {
        self.0 = splitmix64(self.0);
        self.0
    }

    fn below(&mut self, bound: u32) -> u32 {
        (self.next() % u64::from(bound.max(1))) as u32
    }

    fn between(&mut self, low: f64, high: f64) -> f64 {
        let unit = (self.next() >> 11) as f64 / (1u64 << 53) as f64;
        low + unit * (high - low)
    }

    fn position(&mut self, config: &WorldConfig) -> GridPos {
        GridPos::new(self.below(config.width) as i32, self.below(config.height) as i32)
    }
}

/// Agents with varied vitals, a food patch per ten agents and a few shelters.
pub fn seed_world(config: &WorldConfig, agents: usize, seed: u64) -> MemoryAgentStore {
    let mut rng = Seeded(seed);

    let mut population = Vec::with_capacity(agents);
    for i in 0..agents {
        let vitals = Vitals::new(
            rng.between(20.0, 100.0),
            rng.between(20.0, 100.0),
            rng.between(60.0, 100.0),
        );
        let mut agent = AgentState::new(
            AgentId::from_seed(seed.wrapping_add(i as u64)),
            format!("agent-{:03}", i),
            rng.position(config),
        )
        .with_vitals(vitals);
        if rng.below(3) == 0 {
            agent = agent.with_item("food", 1 + rng.below(3));
        }
        population.push(agent);
    }

    let patches = agents.div_ceil(10).max(1);
    let resources: Vec<ResourceSummary> = (0..patches)
        .map(|_| ResourceSummary {
            position: rng.position(config),
            category: "food".to_string(),
            amount: 5 + rng.below(10),
        })
        .collect();

    let shelters: Vec<ShelterSummary> = (0..(agents / 25).max(1))
        .map(|_| ShelterSummary {
            position: rng.position(config),
            kind: "hut".to_string(),
            occupants: 0,
            capacity: 4,
        })
        .collect();

    MemoryAgentStore::with_agents(population)
        .with_resources(resources)
        .with_shelters(shelters)
}
