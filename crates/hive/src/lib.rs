//! # Hive
//!
//! Tick orchestration for populations of LLM-driven agents on a grid.
//!
//! Every tick each living agent observes its surroundings, asks a reasoning
//! service what to do, pays for being alive (hunger and energy decay, with
//! health damage when either runs critically low) and then acts. Hive keeps
//! that loop affordable and bounded:
//!
//! - **Sharding** splits the grid into cells processed concurrently or one
//!   at a time.
//! - **Priority** puts starving and injured agents first within a cell.
//! - **Decision caching** reuses answers for observations that are the same
//!   once rounded, per reasoning-service identity.
//! - **Backpressure** caps how many reasoning calls are in flight.
//!
//! ## Quick Start
//!
//! ```rust
//! use hive::prelude::*;
//!
//! let vitals = Vitals::new(25.0, 80.0, 100.0);
//! assert_eq!(priority(&vitals), Priority::High);
//!
//! let grid = GridPartitioner::new(100, 100, 4);
//! assert_eq!(grid.shard_count(), 16);
//! assert_eq!(grid.shard_of(&GridPos::new(99, 99)), ShardId::new(15));
//! ```
//!
//! Running a world:
//!
//! ```rust,ignore
//! use hive::prelude::*;
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoryAgentStore::with_agents(agents));
//! let backend = Arc::new(GuardedBackend::new(Arc::new(MockBackend::new())));
//! let orchestrator = TickOrchestrator::builder(store, backend)
//!     .with_config(HiveConfig::default())
//!     .build();
//!
//! for report in orchestrator.run(100).await? {
//!     println!("tick {}: {} died", report.tick, report.died);
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`hive_core`] - Shared types, configuration, priority, needs decay
//! - [`hive_llm`] - Reasoning-service trait, guarded and mock backends
//! - [`hive_shard`] - Grid partitioning and shard processing
//! - [`hive_runtime`] - Decision cache, backpressure, orchestrator

// Re-export all subcrates
pub use hive_core as core;
pub use hive_llm as llm;
pub use hive_runtime as runtime;
pub use hive_shard as shard;

/// Prelude module for convenient imports.
///
/// ```rust
/// use hive::prelude::*;
/// ```
pub mod prelude {
    pub use hive_runtime::prelude::*;

    pub use hive_shard::{
        process_concurrent, process_shards, process_throttled, GridPartitioner, Shard,
        ShardBounds, ShardId,
    };
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
