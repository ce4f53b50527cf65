//! # Hive Runtime
//!
//! Tick orchestration for LLM-driven agent populations.
//!
//! The runtime owns everything that happens between "the world has agents"
//! and "every agent acted this tick": observation building, the decision
//! cache, admission control on reasoning calls, needs decay, action effects
//! and per-tick reporting.
//!
//! Every engine is an instance. Two [`TickOrchestrator`]s never share a
//! cache, a backpressure depth or critical-tick counters unless handed the
//! same `Arc` on purpose.
//!
//! ```rust,ignore
//! use hive_runtime::prelude::*;
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoryAgentStore::with_agents(agents));
//! let orchestrator = TickOrchestrator::builder(store, Arc::new(MockBackend::new()))
//!     .with_config(HiveConfig::default())
//!     .build();
//! let report = orchestrator.run_tick().await?;
//! ```

pub mod backpressure;
pub mod cache;
pub mod effects;
pub mod events;
pub mod memory_store;
pub mod observe;
pub mod orchestrator;
pub mod prelude;
pub mod timer;

pub use backpressure::{BackpressureController, BackpressurePermit, BackpressureStats};
pub use cache::{CacheStats, CacheStoreError, DecisionCache, KvStore, MemoryKvStore};
pub use effects::{apply_action, ActionOutcome, GridBounds};
pub use events::{DecisionSource, TickReport, WorldEvent};
pub use memory_store::MemoryAgentStore;
pub use observe::build_observation;
pub use orchestrator::{OrchestratorBuilder, TickOrchestrator};
pub use timer::TickTimer;
