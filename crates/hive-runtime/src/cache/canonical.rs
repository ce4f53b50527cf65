//! Observation canonicalization and fingerprinting.
//!
//! Two observations that should produce the same decision must produce the
//! same fingerprint. The canonical form therefore drops everything that
//! changes every tick (tick, timestamp, recent events) or identifies the
//! agent (id, balance), coarsens vitals to multiples of 5, and sorts every
//! collection so input order never matters.

use hive_core::observation::Observation;
use hive_core::types::{GridPos, LifecycleState};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Vitals are bucketed to this step before hashing.
pub const VITAL_BUCKET: f64 = 5.0;

/// Inventory quantities above this are treated as equal.
pub const INVENTORY_CAP: u32 = 10;

/// Hex characters kept from the SHA-256 digest.
pub const FINGERPRINT_LEN: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalVitals {
    pub hunger: i64,
    pub energy: i64,
    pub health: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalAgent {
    pub x: i32,
    pub y: i32,
    pub state: LifecycleState,
}

/// A resource or shelter reduced to position, category and one flag.
///
/// The flag is "has units left" for resources and "has room" for shelters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalSite {
    pub x: i32,
    pub y: i32,
    pub category: String,
    pub open: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalItem {
    pub item_type: String,
    pub quantity: u32,
}

/// The cache-relevant projection of an [`Observation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalObservation {
    pub vitals: CanonicalVitals,
    pub x: i32,
    pub y: i32,
    pub nearby_agents: Vec<CanonicalAgent>,
    pub nearby_resources: Vec<CanonicalSite>,
    pub nearby_shelters: Vec<CanonicalSite>,
    pub inventory: Vec<CanonicalItem>,
}

/// Round to the nearest multiple of [`VITAL_BUCKET`].
pub fn bucket_vital(value: f64) -> i64 {
    if value.is_nan() {
        return 0;
    }
    ((value / VITAL_BUCKET).round() * VITAL_BUCKET) as i64
}

fn position_key(x: i32, y: i32) -> String {
    GridPos::new(x, y).key()
}

pub fn canonicalize(obs: &Observation) -> CanonicalObservation {
    let mut nearby_agents: Vec<CanonicalAgent> = obs
        .nearby_agents
        .iter()
        .map(|a| CanonicalAgent {
            x: a.position.x,
            y: a.position.y,
            state: a.state,
        })
        .collect();
    nearby_agents.sort_by_cached_key(|a| (position_key(a.x, a.y), a.state.to_string()));

    let mut nearby_resources: Vec<CanonicalSite> = obs
        .nearby_resources
        .iter()
        .map(|r| CanonicalSite {
            x: r.position.x,
            y: r.position.y,
            category: r.category.clone(),
            open: r.is_available(),
        })
        .collect();
    sort_sites(&mut nearby_resources);

    let mut nearby_shelters: Vec<CanonicalSite> = obs
        .nearby_shelters
        .iter()
        .map(|s| CanonicalSite {
            x: s.position.x,
            y: s.position.y,
            category: s.kind.clone(),
            open: s.has_room(),
        })
        .collect();
    sort_sites(&mut nearby_shelters);

    let mut inventory: Vec<CanonicalItem> = obs
        .inventory
        .iter()
        .map(|i| CanonicalItem {
            item_type: i.item_type.clone(),
            quantity: i.quantity.min(INVENTORY_CAP),
        })
        .collect();
    inventory.sort_by(|a, b| {
        a.item_type
            .cmp(&b.item_type)
            .then(a.quantity.cmp(&b.quantity))
    });

    CanonicalObservation {
        vitals: CanonicalVitals {
            hunger: bucket_vital(obs.vitals.hunger),
            energy: bucket_vital(obs.vitals.energy),
            health: bucket_vital(obs.vitals.health),
        },
        x: obs.position.x,
        y: obs.position.y,
        nearby_agents,
        nearby_resources,
        nearby_shelters,
        inventory,
    }
}

fn sort_sites(sites: &mut [CanonicalSite]) {
    sites.sort_by_cached_key(|s| (position_key(s.x, s.y), s.category.clone(), s.open));
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Deterministic 16-hex-character fingerprint of an observation.
pub fn fingerprint(obs: &Observation) -> Result<String, serde_json::Error> {
    let bytes = serde_json::to_vec(&canonicalize(obs))?;
    let mut digest = sha256_hex(&bytes);
    digest.truncate(FINGERPRINT_LEN);
    Ok(digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hive_core::observation::{NearbyAgent, ResourceSummary, ShelterSummary};
    use hive_core::types::{AgentId, InventoryItem, Vitals};

    fn base() -> Observation {
        let mut obs = Observation::solitary(
            AgentId::from_seed(1),
            10,
            Vitals::new(52.0, 71.0, 90.0),
            GridPos::new(4, 4),
        );
        obs.nearby_agents = vec![
            NearbyAgent {
                id: AgentId::from_seed(2),
                name: "b".into(),
                position: GridPos::new(5, 4),
                state: LifecycleState::Active,
                vitals: Vitals::full(),
            },
            NearbyAgent {
                id: AgentId::from_seed(3),
                name: "c".into(),
                position: GridPos::new(3, 3),
                state: LifecycleState::Sleeping,
                vitals: Vitals::full(),
            },
        ];
        obs.nearby_resources = vec![
            ResourceSummary {
                position: GridPos::new(6, 6),
                category: "food".into(),
                amount: 3,
            },
            ResourceSummary {
                position: GridPos::new(2, 2),
                category: "wood".into(),
                amount: 0,
            },
        ];
        obs.nearby_shelters = vec![ShelterSummary {
            position: GridPos::new(4, 5),
            kind: "hut".into(),
            occupants: 1,
            capacity: 2,
        }];
        obs.inventory = vec![InventoryItem::new("wood", 2), InventoryItem::new("food", 14)];
        obs.recent_events = vec!["ate food".into()];
        obs
    }

    #[test]
    fn rounds_vitals_to_nearest_five() {
        assert_eq!(bucket_vital(52.0), 50);
        assert_eq!(bucket_vital(52.5), 55);
        assert_eq!(bucket_vital(71.0), 70);
        assert_eq!(bucket_vital(0.4), 0);
        assert_eq!(bucket_vital(100.0), 100);
    }

    #[test]
    fn volatile_fields_do_not_change_the_fingerprint() {
        let a = base();
        let mut b = base();
        b.tick = 999;
        b.timestamp_ms = 123_456;
        b.agent_id = AgentId::from_seed(42);
        b.balance = 1_000;
        b.recent_events.clear();

        assert_eq!(fingerprint(&a).unwrap(), fingerprint(&b).unwrap());
    }

    #[test]
    fn input_order_does_not_change_the_fingerprint() {
        let a = base();
        let mut b = base();
        b.nearby_agents.reverse();
        b.nearby_resources.reverse();
        b.inventory.reverse();

        assert_eq!(fingerprint(&a).unwrap(), fingerprint(&b).unwrap());
    }

    #[test]
    fn vitals_within_one_bucket_share_a_fingerprint() {
        let a = base();
        let mut b = base();
        b.vitals = Vitals::new(51.0, 69.0, 91.0);
        assert_eq!(fingerprint(&a).unwrap(), fingerprint(&b).unwrap());

        b.vitals = Vitals::new(40.0, 69.0, 91.0);
        assert_ne!(fingerprint(&a).unwrap(), fingerprint(&b).unwrap());
    }

    #[test]
    fn inventory_is_capped() {
        let a = base();
        let mut b = base();
        b.inventory[1].quantity = 500;
        assert_eq!(fingerprint(&a).unwrap(), fingerprint(&b).unwrap());

        b.inventory[1].quantity = 9;
        assert_ne!(fingerprint(&a).unwrap(), fingerprint(&b).unwrap());
    }

    #[test]
    fn position_and_neighbor_state_are_significant() {
        let a = base();

        let mut moved = base();
        moved.position = GridPos::new(4, 5);
        assert_ne!(fingerprint(&a).unwrap(), fingerprint(&moved).unwrap());

        let mut woke = base();
        woke.nearby_agents[1].state = LifecycleState::Active;
        assert_ne!(fingerprint(&a).unwrap(), fingerprint(&woke).unwrap());
    }

    #[test]
    fn resource_amount_only_matters_as_availability() {
        let a = base();
        let mut b = base();
        b.nearby_resources[0].amount = 40;
        assert_eq!(fingerprint(&a).unwrap(), fingerprint(&b).unwrap());

        b.nearby_resources[0].amount = 0;
        assert_ne!(fingerprint(&a).unwrap(), fingerprint(&b).unwrap());
    }

    #[test]
    fn fingerprint_is_sixteen_hex_chars() {
        let digest = fingerprint(&base()).unwrap();
        assert_eq!(digest.len(), FINGERPRINT_LEN);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn canonical_form_is_sorted_by_position_key() {
        let canonical = canonicalize(&base());
        assert_eq!((canonical.nearby_agents[0].x, canonical.nearby_agents[0].y), (3, 3));
        assert_eq!(canonical.nearby_resources[0].category, "wood");
        assert!(!canonical.nearby_resources[0].open);
        assert_eq!(canonical.inventory[0].item_type, "food");
        assert_eq!(canonical.inventory[0].quantity, INVENTORY_CAP);
    }
}
