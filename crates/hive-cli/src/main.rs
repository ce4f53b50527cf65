//! Hive CLI - run and inspect tick-driven agent worlds.

mod commands;
mod config;
mod world;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hive")]
#[command(author, version, about = "Hive - tick orchestration for LLM-driven agents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: hive.toml in this or a parent directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default hive.toml
    Init {
        /// Project directory (default: current directory)
        #[arg(short, long)]
        path: Option<String>,

        /// Overwrite an existing hive.toml
        #[arg(long)]
        force: bool,
    },

    /// Run a seeded world for a number of ticks
    Run {
        /// Number of ticks to run
        #[arg(short, long, default_value = "50")]
        ticks: u64,

        /// Number of agents to spawn
        #[arg(short, long, default_value = "40")]
        agents: usize,

        /// World seed
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Pause between ticks in milliseconds (0 = as fast as possible)
        #[arg(long, default_value = "0")]
        interval_ms: u64,

        /// Write every tick report to this file as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// How many ticks an agent survives without eating or resting
    Survival {
        /// Starting hunger
        #[arg(long, default_value = "100")]
        hunger: f64,

        /// Starting energy
        #[arg(long, default_value = "100")]
        energy: f64,
    },

    /// Classify vitals into a processing priority
    Priority {
        #[arg(long, default_value = "100")]
        health: f64,

        #[arg(long, default_value = "100")]
        hunger: f64,

        #[arg(long, default_value = "100")]
        energy: f64,
    },

    /// Show the shard layout of the configured grid
    Shards {
        /// Also place this many seeded agents and count them per shard
        #[arg(short, long)]
        agents: Option<usize>,

        /// World seed
        #[arg(short, long, default_value = "42")]
        seed: u64,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let load = || match &cli.config {
        Some(path) => config::load_from(path),
        None => config::load(),
    };

    match cli.command {
        Commands::Init { path, force } => commands::init::run(path, force),
        Commands::Run {
            ticks,
            agents,
            seed,
            interval_ms,
            report,
        } => {
            let options = commands::run::RunOptions {
                ticks,
                agents,
                seed,
                interval_ms,
                report,
                verbose: cli.verbose,
            };
            commands::run::run(load()?, options).await
        }
        Commands::Survival { hunger, energy } => commands::survival::run(&load()?, hunger, energy),
        Commands::Priority {
            health,
            hunger,
            energy,
        } => commands::priority::run(health, hunger, energy),
        Commands::Shards { agents, seed } => commands::shards::run(&load()?, agents, seed).await,
    }
}
