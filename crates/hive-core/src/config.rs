//! Runtime-tunable configuration for every Hive component.
//!
//! None of these values are validated: inconsistent thresholds (for example
//! a critical threshold above the low threshold) produce silently odd but
//! well-defined behavior. Validation belongs to whoever edits them.

use serde::{Deserialize, Serialize};

/// Top-level configuration, as loaded from `hive.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HiveConfig {
    #[serde(default)]
    pub needs: NeedsConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub backpressure: BackpressureConfig,
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub effects: EffectsConfig,
}

/// Needs-decay parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeedsConfig {
    #[serde(default = "default_hunger_decay")]
    pub hunger_decay_rate: f64,
    #[serde(default = "default_energy_decay")]
    pub energy_decay_rate: f64,
    #[serde(default = "default_low_threshold")]
    pub low_hunger_threshold: f64,
    #[serde(default = "default_critical_threshold")]
    pub critical_hunger_threshold: f64,
    #[serde(default = "default_low_threshold")]
    pub low_energy_threshold: f64,
    #[serde(default = "default_critical_threshold")]
    pub critical_energy_threshold: f64,
    /// Extra energy drain while hunger sits below the low threshold.
    #[serde(default = "default_low_hunger_penalty")]
    pub low_hunger_energy_penalty: f64,
    /// Consecutive critical-hunger ticks tolerated before health suffers.
    #[serde(default = "default_grace_ticks")]
    pub hunger_grace_period_ticks: u32,
    #[serde(default = "default_health_damage")]
    pub critical_hunger_health_damage: f64,
    #[serde(default = "default_health_damage")]
    pub critical_energy_health_damage: f64,
}

/// Decision cache parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

/// Admission control parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackpressureConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

/// How shards are scheduled within a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingMode {
    /// Fan out every shard at once and await them all.
    Concurrent,
    /// One shard at a time with a pause between shards.
    Throttled,
}

impl Default for ProcessingMode {
    fn default() -> Self {
        Self::Concurrent
    }
}

/// World geometry and tick scheduling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    #[serde(default = "default_grid_size")]
    pub width: u32,
    #[serde(default = "default_grid_size")]
    pub height: u32,
    /// Shards per axis; the grid holds `shard_count²` cells.
    #[serde(default = "default_shard_count")]
    pub shard_count: u32,
    /// Chebyshev radius of what an agent can observe.
    #[serde(default = "default_observation_radius")]
    pub observation_radius: u32,
    #[serde(default)]
    pub processing: ProcessingMode,
    /// Pause between shards in throttled mode.
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,
    /// Recent events kept per agent for observations.
    #[serde(default = "default_event_memory")]
    pub event_memory: usize,
}

/// Magnitudes of action effects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectsConfig {
    #[serde(default = "default_food_item")]
    pub food_item: String,
    #[serde(default = "default_eat_restore")]
    pub eat_hunger_restore: f64,
    #[serde(default = "default_rest_restore")]
    pub rest_energy_restore: f64,
    #[serde(default = "default_sleep_restore")]
    pub sleep_energy_restore: f64,
    #[serde(default = "default_move_cost")]
    pub move_energy_cost: f64,
    /// Maximum cells moved per axis per tick.
    #[serde(default = "default_move_step")]
    pub move_step: i32,
}

// Default value functions
fn default_true() -> bool { true }
fn default_hunger_decay() -> f64 { 0.6 }
fn default_energy_decay() -> f64 { 0.3 }
fn default_low_threshold() -> f64 { 30.0 }
fn default_critical_threshold() -> f64 { 10.0 }
fn default_low_hunger_penalty() -> f64 { 0.2 }
fn default_grace_ticks() -> u32 { 3 }
fn default_health_damage() -> f64 { 2.0 }
fn default_cache_ttl() -> u64 { 300 }
fn default_key_prefix() -> String { "hive:decision:".to_string() }
fn default_max_depth() -> usize { 16 }
fn default_poll_interval() -> u64 { 50 }
fn default_grid_size() -> u32 { 100 }
fn default_shard_count() -> u32 { 4 }
fn default_observation_radius() -> u32 { 5 }
fn default_throttle_ms() -> u64 { 100 }
fn default_event_memory() -> usize { 5 }
fn default_food_item() -> String { "food".to_string() }
fn default_eat_restore() -> f64 { 30.0 }
fn default_rest_restore() -> f64 { 5.0 }
fn default_sleep_restore() -> f64 { 15.0 }
fn default_move_cost() -> f64 { 0.5 }
fn default_move_step() -> i32 { 1 }

impl Default for NeedsConfig {
    fn default() -> Self {
        Self {
            hunger_decay_rate: default_hunger_decay(),
            energy_decay_rate: default_energy_decay(),
            low_hunger_threshold: default_low_threshold(),
            critical_hunger_threshold: default_critical_threshold(),
            low_energy_threshold: default_low_threshold(),
            critical_energy_threshold: default_critical_threshold(),
            low_hunger_energy_penalty: default_low_hunger_penalty(),
            hunger_grace_period_ticks: default_grace_ticks(),
            critical_hunger_health_damage: default_health_damage(),
            critical_energy_health_damage: default_health_damage(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            ttl_secs: default_cache_ttl(),
            key_prefix: default_key_prefix(),
        }
    }
}

impl Default for BackpressureConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            max_depth: default_max_depth(),
            poll_interval_ms: default_poll_interval(),
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: default_grid_size(),
            height: default_grid_size(),
            shard_count: default_shard_count(),
            observation_radius: default_observation_radius(),
            processing: ProcessingMode::default(),
            throttle_ms: default_throttle_ms(),
            event_memory: default_event_memory(),
        }
    }
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            food_item: default_food_item(),
            eat_hunger_restore: default_eat_restore(),
            rest_energy_restore: default_rest_restore(),
            sleep_energy_restore: default_sleep_restore(),
            move_energy_cost: default_move_cost(),
            move_step: default_move_step(),
        }
    }
}
