//! Configuration management for the Hive CLI.

use anyhow::{Context, Result};
use hive::core::config::HiveConfig;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "hive.toml";

/// Load `hive.toml` from the current or a parent directory, or defaults.
pub fn load() -> Result<HiveConfig> {
    match find_config_file() {
        Some(path) => load_from(&path),
        None => Ok(HiveConfig::default()),
    }
}

pub fn load_from(path: &Path) -> Result<HiveConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse config: {}", path.display()))
}

/// Save config to the specified path.
pub fn save(config: &HiveConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config: {}", path.display()))?;
    Ok(())
}

/// Find hive.toml in current or parent directories.
fn find_config_file() -> Option<PathBuf> {
    let mut dir = std::env::current_dir().ok()?;
    loop {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saved_defaults_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);

        save(&HiveConfig::default(), &path).unwrap();
        let loaded = load_from(&path).unwrap();

        assert_eq!(loaded.needs, HiveConfig::default().needs);
        assert_eq!(loaded.world, HiveConfig::default().world);
    }

    #[test]
    fn partial_files_fill_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[needs]\nhunger_decay_rate = 1.5\n\n[world]\nprocessing = \"throttled\"\n").unwrap();

        let loaded = load_from(&path).unwrap();
        assert_eq!(loaded.needs.hunger_decay_rate, 1.5);
        assert_eq!(loaded.needs.energy_decay_rate, 0.3);
        assert_eq!(loaded.world.processing, hive::core::config::ProcessingMode::Throttled);
        assert_eq!(loaded.cache.key_prefix, "hive:decision:");
    }
}
