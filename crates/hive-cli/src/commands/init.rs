//! Write a default hive.toml.

use anyhow::{Context, Result};
use colored::Colorize;
use hive::core::config::HiveConfig;
use std::path::PathBuf;

use crate::config::{save, CONFIG_FILE};

pub fn run(path: Option<String>, force: bool) -> Result<()> {
    let base_path = match path {
        Some(p) => PathBuf::from(p),
        None => std::env::current_dir().context("Failed to resolve current directory")?,
    };

    println!("{} Initializing Hive project...", "→".blue());

    std::fs::create_dir_all(&base_path)
        .with_context(|| format!("Failed to create {}", base_path.display()))?;

    let config_path = base_path.join(CONFIG_FILE);
    if config_path.exists() && !force {
        println!("  {} {} already exists", "•".yellow(), config_path.display());
    } else {
        save(&HiveConfig::default(), &config_path)?;
        println!("  {} Created {}", "✓".green(), config_path.display());
    }

    println!();
    println!("{} Hive project initialized!", "✓".green().bold());
    println!();
    println!("Next steps:");
    println!("  {} edit {} to tune decay, caching and sharding", "1.".blue(), CONFIG_FILE);
    println!("  {} hive shards --agents 100", "2.".blue());
    println!("  {} hive run --ticks 100 --agents 40", "3.".blue());

    Ok(())
}
