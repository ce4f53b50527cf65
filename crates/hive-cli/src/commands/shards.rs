//! Print the shard layout.

use anyhow::Result;
use colored::Colorize;
use hive::prelude::*;
use std::collections::BTreeMap;

use crate::world::seed_world;

pub async fn run(config: &HiveConfig, agents: Option<usize>, seed: u64) -> Result<()> {
    let world = &config.world;
    let partitioner = GridPartitioner::from_config(world);
    let (cell_w, cell_h) = partitioner.cell_size();

    let occupancy: Option<BTreeMap<ShardId, usize>> = match agents {
        Some(count) => {
            let store = seed_world(world, count, seed);
            let positions: Vec<GridPos> = store.agents().await.iter().map(|a| a.position).collect();
            Some(
                partitioner
                    .partition(positions)
                    .into_iter()
                    .map(|shard| (shard.id, shard.len()))
                    .collect(),
            )
        }
        None => None,
    };

    println!("{}", "Shard Layout".white().bold());
    println!("{}", "═".repeat(56).dimmed());
    println!(
        "  Grid {}x{}, {} shards ({} per axis), cells {}x{}",
        partitioner.width(),
        partitioner.height(),
        partitioner.shard_count(),
        partitioner.per_axis(),
        cell_w,
        cell_h
    );
    println!("  Processing: {:?}", world.processing);
    println!();

    for id in partitioner.shard_ids() {
        let bounds = partitioner.bounds_of(id);
        let neighbors = partitioner
            .neighbors_of(id)
            .iter()
            .map(|n| n.as_u32().to_string())
            .collect::<Vec<_>>()
            .join(",");
        let members = match &occupancy {
            Some(counts) => format!(
                "  {:>4} agents",
                counts.get(&id).copied().unwrap_or(0).to_string().cyan()
            ),
            None => String::new(),
        };
        println!(
            "  {:<9} x {:>4}..{:<4} y {:>4}..{:<4} neighbors [{}]{}",
            id.to_string().green(),
            bounds.min_x,
            bounds.max_x,
            bounds.min_y,
            bounds.max_y,
            neighbors,
            members
        );
    }

    Ok(())
}
