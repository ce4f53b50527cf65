//! Hive Runtime Prelude: convenient imports for common usage.
//!
//! ```rust
//! use hive_runtime::prelude::*;
//! ```

pub use crate::backpressure::{BackpressureController, BackpressurePermit, BackpressureStats};

pub use crate::cache::{CacheStats, CacheStoreError, DecisionCache, KvStore, MemoryKvStore};

pub use crate::effects::ActionOutcome;
pub use crate::events::{DecisionSource, TickReport, WorldEvent};
pub use crate::memory_store::MemoryAgentStore;
pub use crate::orchestrator::{OrchestratorBuilder, TickOrchestrator};
pub use crate::timer::TickTimer;

// Re-export from core and llm
pub use hive_core::prelude::*;
pub use hive_llm::prelude::*;
