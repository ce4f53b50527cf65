//! Ticks until hunger or energy runs out.

use anyhow::Result;
use colored::Colorize;
use hive::core::config::HiveConfig;
use hive::core::needs::survival_ticks;

pub fn run(config: &HiveConfig, hunger: f64, energy: f64) -> Result<()> {
    let needs = &config.needs;
    let ticks = survival_ticks(needs, hunger, energy);

    println!("{}", "Survival Estimate".white().bold());
    println!("{}", "═".repeat(40).dimmed());
    println!(
        "  Hunger:  {:>6.1}  (-{} / tick)",
        hunger, needs.hunger_decay_rate
    );
    println!(
        "  Energy:  {:>6.1}  (-{} / tick)",
        energy, needs.energy_decay_rate
    );
    println!();
    println!("  Ticks until a need runs out: {}", format!("{:.1}", ticks).cyan());
    println!(
        "  {}",
        "Ignores the low-hunger energy penalty and any eating or resting.".dimmed()
    );
    Ok(())
}
