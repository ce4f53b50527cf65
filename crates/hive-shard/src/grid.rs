//! Grid partitioning of the world into shards.
//!
//! The `width x height` world is cut into `shard_count x shard_count` cells
//! of `ceil(width / shard_count) x ceil(height / shard_count)`. Coordinates
//! are clamped before lookup, so every position, including out-of-grid
//! ones, maps to exactly one shard.

use crate::types::{Shard, ShardBounds, ShardId};
use hive_core::config::WorldConfig;
use hive_core::types::{GridPos, Located};
use std::collections::BTreeMap;

/// Largest grid side addressable by an `i32` coordinate.
const MAX_DIMENSION: u32 = i32::MAX as u32;
/// Largest shards-per-axis whose square still fits a `u32`.
const MAX_PER_AXIS: u32 = u16::MAX as u32;

/// Deterministic assignment of grid cells to shards.
///
/// # Example
///
/// ```
/// use hive_shard::GridPartitioner;
/// use hive_core::types::GridPos;
///
/// let grid = GridPartitioner::new(100, 100, 4);
/// assert_eq!(grid.shard_count(), 16);
/// let shard = grid.shard_of(&GridPos::new(30, 80));
/// assert_eq!(shard.as_u32(), 3 * 4 + 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridPartitioner {
    width: u32,
    height: u32,
    per_axis: u32,
    cell_width: u32,
    cell_height: u32,
}

impl GridPartitioner {
    /// Create a partitioner with `per_axis²` shards.
    ///
    /// Zero dimensions or a zero shard count are raised to 1. Dimensions are
    /// capped to the coordinate range of [`GridPos`], and `per_axis` so that
    /// the shard count fits a `u32`.
    pub fn new(width: u32, height: u32, per_axis: u32) -> Self {
        let width = width.clamp(1, MAX_DIMENSION);
        let height = height.clamp(1, MAX_DIMENSION);
        let per_axis = per_axis.clamp(1, MAX_PER_AXIS);
        Self {
            width,
            height,
            per_axis,
            cell_width: width.div_ceil(per_axis),
            cell_height: height.div_ceil(per_axis),
        }
    }

    /// Create a partitioner from world configuration.
    pub fn from_config(config: &WorldConfig) -> Self {
        Self::new(config.width, config.height, config.shard_count)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Shards per axis.
    pub fn per_axis(&self) -> u32 {
        self.per_axis
    }

    /// Total number of shards.
    pub fn shard_count(&self) -> u32 {
        self.per_axis * self.per_axis
    }

    /// Size of a full (non-trailing) shard.
    pub fn cell_size(&self) -> (u32, u32) {
        (self.cell_width, self.cell_height)
    }

    fn column_of(&self, x: i32) -> u32 {
        let x = x.clamp(0, self.width as i32 - 1) as u32;
        (x / self.cell_width).min(self.per_axis - 1)
    }

    fn row_of(&self, y: i32) -> u32 {
        let y = y.clamp(0, self.height as i32 - 1) as u32;
        (y / self.cell_height).min(self.per_axis - 1)
    }

    /// The shard owning `pos`. Total: out-of-grid positions clamp to the edge.
    pub fn shard_of(&self, pos: &GridPos) -> ShardId {
        ShardId::new(self.row_of(pos.y) * self.per_axis + self.column_of(pos.x))
    }

    /// Every shard id, in row-major order.
    pub fn shard_ids(&self) -> impl Iterator<Item = ShardId> {
        (0..self.shard_count()).map(ShardId::new)
    }

    /// The rectangle covered by `id`, clipped to the grid.
    pub fn bounds_of(&self, id: ShardId) -> ShardBounds {
        let row = id.as_u32() / self.per_axis;
        let col = id.as_u32() % self.per_axis;
        let clip = |v: u32, limit: u32| v.min(limit) as i32;
        ShardBounds {
            min_x: clip(col * self.cell_width, self.width),
            min_y: clip(row * self.cell_height, self.height),
            max_x: clip((col + 1) * self.cell_width, self.width),
            max_y: clip((row + 1) * self.cell_height, self.height),
        }
    }

    /// Moore (8-connected) neighbors of a shard that exist in the grid.
    pub fn neighbors_of(&self, id: ShardId) -> Vec<ShardId> {
        let n = self.per_axis as i64;
        let row = id.as_u32() as i64 / n;
        let col = id.as_u32() as i64 % n;
        let mut neighbors = Vec::with_capacity(8);
        for dr in -1..=1 {
            for dc in -1..=1 {
                if dr == 0 && dc == 0 {
                    continue;
                }
                let (r, c) = (row + dr, col + dc);
                if (0..n).contains(&r) && (0..n).contains(&c) {
                    neighbors.push(ShardId::new((r * n + c) as u32));
                }
            }
        }
        neighbors
    }

    /// Whether `pos` lies within `margin` cells of an internal shard edge.
    ///
    /// Diagnostic only: agents on either side of an edge are processed
    /// concurrently and may see each other's stale state.
    pub fn is_near_boundary(&self, pos: &GridPos, margin: u32) -> bool {
        let pos = pos.clamped(self.width, self.height);
        let bounds = self.bounds_of(self.shard_of(&pos));
        let margin = margin as i32;
        let near_left = bounds.min_x > 0 && pos.x - bounds.min_x < margin;
        let near_right = bounds.max_x < self.width as i32 && bounds.max_x - 1 - pos.x < margin;
        let near_top = bounds.min_y > 0 && pos.y - bounds.min_y < margin;
        let near_bottom = bounds.max_y < self.height as i32 && bounds.max_y - 1 - pos.y < margin;
        near_left || near_right || near_top || near_bottom
    }

    /// Group items by shard.
    ///
    /// Strict partition: every item lands in exactly one shard, in input
    /// order. Shards without members are omitted.
    pub fn partition<T: Located>(&self, items: impl IntoIterator<Item = T>) -> Vec<Shard<T>> {
        let mut groups: BTreeMap<ShardId, Vec<T>> = BTreeMap::new();
        for item in items {
            let id = self.shard_of(&item.grid_position());
            groups.entry(id).or_default().push(item);
        }
        groups
            .into_iter()
            .map(|(id, members)| Shard {
                id,
                bounds: self.bounds_of(id),
                members,
            })
            .collect()
    }
}

impl Default for GridPartitioner {
    fn default() -> Self {
        Self::from_config(&WorldConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shard_of_is_row_major() {
        let grid = GridPartitioner::new(100, 100, 4);
        assert_eq!(grid.shard_of(&GridPos::new(0, 0)), ShardId::new(0));
        assert_eq!(grid.shard_of(&GridPos::new(99, 0)), ShardId::new(3));
        assert_eq!(grid.shard_of(&GridPos::new(0, 99)), ShardId::new(12));
        assert_eq!(grid.shard_of(&GridPos::new(99, 99)), ShardId::new(15));
    }

    #[test]
    fn oversized_dimensions_are_capped() {
        let grid = GridPartitioner::new(3_000_000_000, 10, 2);
        assert_eq!(grid.width(), i32::MAX as u32);
        assert_eq!(grid.shard_of(&GridPos::new(5, 4)), ShardId::new(0));
        assert_eq!(grid.shard_of(&GridPos::new(i32::MAX, 9)), ShardId::new(3));

        let grid = GridPartitioner::new(10, 10, u32::MAX);
        assert_eq!(grid.per_axis(), u16::MAX as u32);
        assert_eq!(grid.shard_of(&GridPos::new(9, 9)), ShardId::new(9 * grid.per_axis() + 9));
    }

    #[test]
    fn out_of_grid_positions_clamp() {
        let grid = GridPartitioner::new(10, 10, 2);
        assert_eq!(grid.shard_of(&GridPos::new(-5, -5)), ShardId::new(0));
        assert_eq!(grid.shard_of(&GridPos::new(500, 500)), ShardId::new(3));
    }

    #[test]
    fn non_divisible_grid_never_overflows() {
        // cell width 3: columns cover 0-2, 3-5, 6-8, 9
        let grid = GridPartitioner::new(10, 10, 4);
        assert_eq!(grid.cell_size(), (3, 3));
        assert_eq!(grid.shard_of(&GridPos::new(9, 9)), ShardId::new(15));
        let last = grid.bounds_of(ShardId::new(15));
        assert_eq!((last.min_x, last.max_x), (9, 10));

        // cell width 2 on a 5-wide grid: the fourth column is empty
        let grid = GridPartitioner::new(5, 5, 4);
        assert_eq!(grid.shard_of(&GridPos::new(4, 0)), ShardId::new(2));
        assert!(grid.bounds_of(ShardId::new(3)).is_empty());
    }

    #[test]
    fn corner_and_center_neighbors() {
        let grid = GridPartitioner::new(90, 90, 3);
        let mut corner = grid.neighbors_of(ShardId::new(0));
        corner.sort();
        assert_eq!(corner, vec![ShardId::new(1), ShardId::new(3), ShardId::new(4)]);
        assert_eq!(grid.neighbors_of(ShardId::new(4)).len(), 8);
        assert!(GridPartitioner::new(10, 10, 1).neighbors_of(ShardId::new(0)).is_empty());
    }

    #[test]
    fn boundary_detection_ignores_world_edges() {
        let grid = GridPartitioner::new(100, 100, 2);
        assert!(!grid.is_near_boundary(&GridPos::new(0, 0), 2));
        assert!(grid.is_near_boundary(&GridPos::new(49, 10), 2));
        assert!(grid.is_near_boundary(&GridPos::new(50, 10), 2));
        assert!(!grid.is_near_boundary(&GridPos::new(25, 25), 2));
    }

    #[test]
    fn zero_shard_count_is_one_shard() {
        let grid = GridPartitioner::new(10, 10, 0);
        assert_eq!(grid.shard_count(), 1);
        assert_eq!(grid.shard_of(&GridPos::new(7, 3)), ShardId::new(0));
    }
}
