//! Hive Core Prelude: convenient imports for common usage.
//!
//! ```rust
//! use hive_core::prelude::*;
//! ```

pub use crate::types::{
    AgentId, AgentState, GridPos, InventoryItem, LifecycleState, Located, Tick, Vitals,
};

pub use crate::observation::{NearbyAgent, Observation, ResourceSummary, ShelterSummary};

pub use crate::decision::{Action, Decision};

pub use crate::priority::{priority, Priority};

pub use crate::needs::{
    survival_ticks, DeathCause, Need, NeedsEffect, NeedsEngine, NeedsEvent, NeedsOutcome,
    NeedsWarning, WarningDetail, WarningLevel,
};

pub use crate::store::{AgentStore, VitalsPatch, WorldSnapshot};

pub use crate::config::{
    BackpressureConfig, CacheConfig, EffectsConfig, HiveConfig, NeedsConfig, ProcessingMode,
    WorldConfig,
};

pub use crate::error::{StoreError, StoreResult};
