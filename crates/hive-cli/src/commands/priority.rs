//! Classify vitals into a processing priority.

use anyhow::Result;
use colored::Colorize;
use hive::prelude::*;

pub fn run(health: f64, hunger: f64, energy: f64) -> Result<()> {
    let vitals = Vitals::new(hunger, energy, health);
    let level = priority(&vitals);

    let label = match level {
        Priority::Urgent => "urgent".red().bold(),
        Priority::High => "high".yellow().bold(),
        Priority::Normal => "normal".green(),
    };

    println!(
        "hunger {:.1}  energy {:.1}  health {:.1}",
        vitals.hunger, vitals.energy, vitals.health
    );
    println!("Priority: {} ({})", label, level.value());
    Ok(())
}
