//! Shared types used across all Hive crates.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Simulation tick counter.
pub type Tick = u64;

/// Unique identifier for an agent in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub Uuid);

impl AgentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Deterministic id, for tests and seeded worlds.
    pub fn from_seed(seed: u64) -> Self {
        Self(Uuid::from_u128(seed as u128))
    }
}

impl Default for AgentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A cell on the integer world grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chessboard distance: diagonal steps cost the same as straight ones.
    pub fn chebyshev(&self, other: &GridPos) -> u32 {
        (self.x - other.x).unsigned_abs().max((self.y - other.y).unsigned_abs())
    }

    /// Move at most `max_step` cells toward `target` on each axis.
    pub fn step_toward(&self, target: &GridPos, max_step: i32) -> GridPos {
        let step = |from: i32, to: i32| from + (to - from).clamp(-max_step, max_step);
        GridPos::new(step(self.x, target.x), step(self.y, target.y))
    }

    /// Clamp into a `width` x `height` grid.
    pub fn clamped(&self, width: u32, height: u32) -> GridPos {
        let max_x = width.saturating_sub(1).min(i32::MAX as u32) as i32;
        let max_y = height.saturating_sub(1).min(i32::MAX as u32) as i32;
        GridPos::new(self.x.clamp(0, max_x), self.y.clamp(0, max_y))
    }

    /// Stable `"x,y"` key used for canonical ordering.
    pub fn key(&self) -> String {
        format!("{},{}", self.x, self.y)
    }
}

/// Anything that occupies a cell on the grid.
pub trait Located {
    fn grid_position(&self) -> GridPos;
}

impl Located for GridPos {
    fn grid_position(&self) -> GridPos {
        *self
    }
}

/// Lifecycle of a simulated agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Active,
    Sleeping,
    Dead,
}

impl LifecycleState {
    pub fn is_alive(&self) -> bool {
        !matches!(self, LifecycleState::Dead)
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleState::Active => write!(f, "active"),
            LifecycleState::Sleeping => write!(f, "sleeping"),
            LifecycleState::Dead => write!(f, "dead"),
        }
    }
}

/// Lower bound of every vital.
pub const VITAL_MIN: f64 = 0.0;
/// Upper bound of every vital.
pub const VITAL_MAX: f64 = 100.0;

/// The three decaying needs of an agent, each in `[0, 100]`.
///
/// Higher is better: `hunger == 100` means fully fed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    pub hunger: f64,
    pub energy: f64,
    pub health: f64,
}

impl Vitals {
    pub fn new(hunger: f64, energy: f64, health: f64) -> Self {
        Self { hunger, energy, health }.clamped()
    }

    pub fn full() -> Self {
        Self::new(VITAL_MAX, VITAL_MAX, VITAL_MAX)
    }

    pub fn clamped(self) -> Self {
        Self {
            hunger: clamp_vital(self.hunger),
            energy: clamp_vital(self.energy),
            health: clamp_vital(self.health),
        }
    }
}

impl Default for Vitals {
    fn default() -> Self {
        Self::full()
    }
}

/// Clamp a single vital into `[0, 100]`; NaN collapses to 0.
pub fn clamp_vital(value: f64) -> f64 {
    if value.is_nan() {
        VITAL_MIN
    } else {
        value.clamp(VITAL_MIN, VITAL_MAX)
    }
}

/// A stack of items carried by an agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub item_type: String,
    pub quantity: u32,
}

impl InventoryItem {
    pub fn new(item_type: impl Into<String>, quantity: u32) -> Self {
        Self {
            item_type: item_type.into(),
            quantity,
        }
    }
}

/// Full persisted state of one agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentState {
    pub id: AgentId,
    pub name: String,
    pub vitals: Vitals,
    pub position: GridPos,
    pub state: LifecycleState,
    pub inventory: Vec<InventoryItem>,
    /// Currency held by the agent. Never influences priority or cache keys.
    pub balance: i64,
}

impl AgentState {
    pub fn new(id: AgentId, name: impl Into<String>, position: GridPos) -> Self {
        Self {
            id,
            name: name.into(),
            vitals: Vitals::full(),
            position,
            state: LifecycleState::Active,
            inventory: Vec::new(),
            balance: 0,
        }
    }

    pub fn with_vitals(mut self, vitals: Vitals) -> Self {
        self.vitals = vitals.clamped();
        self
    }

    pub fn with_item(mut self, item_type: impl Into<String>, quantity: u32) -> Self {
        let item_type = item_type.into();
        match self.inventory.iter_mut().find(|i| i.item_type == item_type) {
            Some(item) => item.quantity += quantity,
            None => self.inventory.push(InventoryItem::new(item_type, quantity)),
        }
        self
    }

    pub fn is_alive(&self) -> bool {
        self.state.is_alive()
    }

    /// Quantity of `item_type` currently held.
    pub fn quantity_of(&self, item_type: &str) -> u32 {
        self.inventory
            .iter()
            .filter(|i| i.item_type == item_type)
            .map(|i| i.quantity)
            .sum()
    }
}

impl Located for AgentState {
    fn grid_position(&self) -> GridPos {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vitals_are_clamped_on_construction() {
        let v = Vitals::new(120.0, -3.0, f64::NAN);
        assert_eq!(v.hunger, 100.0);
        assert_eq!(v.energy, 0.0);
        assert_eq!(v.health, 0.0);
    }

    #[test]
    fn step_toward_is_bounded() {
        let from = GridPos::new(0, 0);
        let to = GridPos::new(10, -1);
        assert_eq!(from.step_toward(&to, 2), GridPos::new(2, -1));
        assert_eq!(from.chebyshev(&to), 10);
    }

    #[test]
    fn clamping_into_huge_grids_keeps_coordinates() {
        let pos = GridPos::new(-4, 1_000);
        assert_eq!(pos.clamped(u32::MAX, u32::MAX), GridPos::new(0, 1_000));
        assert_eq!(GridPos::new(i32::MAX, 3).clamped(u32::MAX, 2), GridPos::new(i32::MAX, 1));
    }

    #[test]
    fn inventory_merges_same_item() {
        let agent = AgentState::new(AgentId::from_seed(1), "a", GridPos::new(0, 0))
            .with_item("food", 2)
            .with_item("food", 3)
            .with_item("wood", 1);
        assert_eq!(agent.quantity_of("food"), 5);
        assert_eq!(agent.inventory.len(), 2);
    }

    #[test]
    fn seeded_ids_are_stable() {
        assert_eq!(AgentId::from_seed(7), AgentId::from_seed(7));
        assert_ne!(AgentId::from_seed(7), AgentId::from_seed(8));
    }
}
