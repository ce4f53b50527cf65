//! Run a seeded world.

use anyhow::{Context, Result};
use colored::Colorize;
use hive::prelude::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::world::seed_world;

pub struct RunOptions {
    pub ticks: u64,
    pub agents: usize,
    pub seed: u64,
    pub interval_ms: u64,
    pub report: Option<PathBuf>,
    pub verbose: bool,
}

#[cfg(feature = "http")]
fn remote_backend() -> Result<Option<Arc<dyn ReasoningBackend>>> {
    if std::env::var("HIVE_DECISION_URL").is_err() {
        return Ok(None);
    }
    let http = HttpBackend::from_env().context("Failed to configure decision service")?;
    Ok(Some(Arc::new(http)))
}

#[cfg(not(feature = "http"))]
fn remote_backend() -> Result<Option<Arc<dyn ReasoningBackend>>> {
    Ok(None)
}

/// The guarded HTTP backend when `HIVE_DECISION_URL` is set, the mock otherwise.
fn reasoning_backend() -> Result<Arc<dyn ReasoningBackend>> {
    let inner = match remote_backend()? {
        Some(remote) => remote,
        None => Arc::new(MockBackend::new()),
    };
    Ok(Arc::new(GuardedBackend::new(inner)))
}

pub async fn run(config: HiveConfig, options: RunOptions) -> Result<()> {
    let store = Arc::new(seed_world(&config.world, options.agents, options.seed));
    let backend = reasoning_backend()?;

    println!(
        "{} Seeded {} agents on a {}x{} grid (seed {})",
        "→".blue(),
        options.agents,
        config.world.width,
        config.world.height,
        options.seed
    );
    println!("  Decisions: {}", backend.identity().cyan());

    tracing::debug!(
        shards = config.world.shard_count,
        processing = ?config.world.processing,
        cache = config.cache.enabled,
        backpressure = config.backpressure.enabled,
        "Building orchestrator"
    );
    let orchestrator = TickOrchestrator::builder(store.clone(), backend)
        .with_config(config)
        .build();

    let pb = ProgressBar::new(options.ticks);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ticks {msg}")
            .context("Invalid progress template")?
            .progress_chars("#>-"),
    );

    let mut timer = (options.interval_ms > 0).then(|| TickTimer::new(options.interval_ms));
    let mut reports = Vec::new();
    for _ in 0..options.ticks {
        if let Some(timer) = timer.as_mut() {
            timer.tick().await;
        }
        let report = orchestrator
            .run_tick()
            .await
            .context("Tick aborted")?;

        if options.verbose {
            for line in report.events.iter().filter_map(|e| e.describe()) {
                pb.println(format!("  {}", line.dimmed()));
            }
        }

        let alive = store.alive_count().await;
        pb.set_message(format!("({} alive)", alive));
        pb.inc(1);
        reports.push(report);

        if alive == 0 {
            tracing::info!(tick = orchestrator.current_tick(), "No agents left alive, stopping early");
            break;
        }
    }
    pb.finish_and_clear();

    print_summary(&orchestrator, &store, &reports, options.agents).await;

    if let Some(path) = &options.report {
        let json = serde_json::to_string_pretty(&reports)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!();
        println!("{} Report written to {}", "✓".green(), path.display());
    }

    Ok(())
}

async fn print_summary(
    orchestrator: &TickOrchestrator,
    store: &MemoryAgentStore,
    reports: &[TickReport],
    agents: usize,
) {
    let alive = store.alive_count().await;
    let decisions: usize = reports.iter().map(|r| r.processed).sum();
    let reasoned: usize = reports.iter().map(|r| r.reasoned).sum();
    let failures: usize = reports.iter().map(|r| r.decision_failures).sum();
    let store_failures: usize = reports.iter().map(|r| r.store_failures).sum();
    let elapsed_ms: u64 = reports.iter().map(|r| r.elapsed_ms).sum();

    let mut causes: BTreeMap<String, usize> = BTreeMap::new();
    for (_, cause) in store.deaths().await {
        *causes.entry(cause.to_string()).or_default() += 1;
    }

    println!();
    println!("{}", "World Summary".white().bold());
    println!("{}", "═".repeat(40).dimmed());
    println!("  Ticks run:        {}", reports.len());
    println!("  Current tick:     {}", orchestrator.current_tick());
    println!("  Alive:            {}/{}", alive.to_string().green(), agents);
    if causes.is_empty() {
        println!("  Deaths:           0");
    } else {
        for (cause, count) in &causes {
            println!("  Deaths ({:<10}) {}", format!("{}):", cause), count.to_string().red());
        }
    }
    println!("  Agent turns:      {}", decisions);
    println!("  Reasoned:         {}", reasoned);
    if failures > 0 {
        println!("  Fallbacks:        {}", failures.to_string().yellow());
    }
    if store_failures > 0 {
        println!("  Store failures:   {}", store_failures.to_string().yellow());
    }
    println!("  Tick time:        {} ms", elapsed_ms);

    let cache = orchestrator.cache().stats();
    println!();
    println!("{}", "Decision Cache".white().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("  Hits / misses:    {} / {}", cache.hits, cache.misses);
    println!("  Hit rate:         {:.1}%", cache.hit_rate * 100.0);
    println!("  Writes:           {}", cache.writes);
    if cache.errors > 0 {
        println!("  Errors:           {}", cache.errors.to_string().yellow());
    }

    let pressure = orchestrator.backpressure().stats();
    println!();
    println!("{}", "Backpressure".white().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!(
        "  Enabled:          {} (max depth {})",
        pressure.enabled, pressure.max_depth
    );
    println!("  Wait episodes:    {}", pressure.wait_episodes);
    println!("  Average wait:     {:.1} ms", pressure.average_wait_ms);
}
