//! # Hive Shard
//!
//! Spatial sharding for Hive worlds.
//!
//! The world grid is cut into `shard_count²` rectangular cells. Each tick the
//! orchestrator groups agents by cell and processes the cells independently,
//! either all at once or one at a time with a pause in between.
//!
//! Agents interacting across a shard edge within the same tick may observe
//! each other's pre-tick state. That is an accepted approximation;
//! [`GridPartitioner::is_near_boundary`] exists to measure it, not fix it.

pub mod grid;
pub mod process;
pub mod types;

pub use grid::GridPartitioner;
pub use process::{process_concurrent, process_shards, process_throttled};
pub use types::{Shard, ShardBounds, ShardId};
