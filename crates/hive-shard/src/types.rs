//! Core types for grid sharding.

use hive_core::types::GridPos;
use serde::{Deserialize, Serialize};

/// Unique identifier for a shard: `row * shard_count + column`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct ShardId(pub u32);

impl ShardId {
    /// Create a new shard identifier.
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the underlying shard number.
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for ShardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "shard-{}", self.0)
    }
}

/// Inclusive-exclusive rectangle covered by one shard.
///
/// Trailing shards of a non-divisible grid may be narrower than the rest,
/// or empty when the ceil-sized cells overshoot the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardBounds {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl ShardBounds {
    pub fn contains(&self, pos: &GridPos) -> bool {
        pos.x >= self.min_x && pos.x < self.max_x && pos.y >= self.min_y && pos.y < self.max_y
    }

    pub fn width(&self) -> i32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> i32 {
        self.max_y - self.min_y
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }
}

/// One shard's members after partitioning.
#[derive(Debug, Clone)]
pub struct Shard<T> {
    pub id: ShardId,
    pub bounds: ShardBounds,
    pub members: Vec<T>,
}

impl<T> Shard<T> {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
