//! Advisory urgency classification.
//!
//! The bucket only orders a caller's own queue. Nothing downstream enforces
//! it, and currency never enters the calculation.

use crate::types::Vitals;
use serde::{Deserialize, Serialize};

/// Health below this is urgent.
pub const URGENT_HEALTH: f64 = 20.0;
/// Hunger below this is urgent.
pub const URGENT_HUNGER: f64 = 10.0;
/// Hunger below this is high priority.
pub const HIGH_HUNGER: f64 = 30.0;
/// Energy below this is high priority.
pub const HIGH_ENERGY: f64 = 20.0;

/// Urgency bucket. Lower numeric value means more urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Priority {
    Urgent = 1,
    High = 2,
    Normal = 5,
}

impl Priority {
    pub fn value(self) -> u8 {
        self as u8
    }
}

impl From<Priority> for u8 {
    fn from(p: Priority) -> u8 {
        p.value()
    }
}

impl TryFrom<u8> for Priority {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Priority::Urgent),
            2 => Ok(Priority::High),
            5 => Ok(Priority::Normal),
            other => Err(format!("unknown priority {}", other)),
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Urgent => write!(f, "urgent"),
            Priority::High => write!(f, "high"),
            Priority::Normal => write!(f, "normal"),
        }
    }
}

/// Classify vitals into an urgency bucket.
///
/// Rules are checked in order, first match wins; boundary values fall into
/// the less urgent bucket.
pub fn priority(vitals: &Vitals) -> Priority {
    if vitals.health < URGENT_HEALTH || vitals.hunger < URGENT_HUNGER {
        Priority::Urgent
    } else if vitals.hunger < HIGH_HUNGER || vitals.energy < HIGH_ENERGY {
        Priority::High
    } else {
        Priority::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(hunger: f64, energy: f64, health: f64) -> Vitals {
        Vitals::new(hunger, energy, health)
    }

    #[test]
    fn boundaries_fall_into_less_urgent_bucket() {
        assert_eq!(priority(&v(50.0, 50.0, 20.0)), Priority::Normal);
        assert_eq!(priority(&v(10.0, 50.0, 100.0)), Priority::High);
        assert_eq!(priority(&v(30.0, 50.0, 100.0)), Priority::Normal);
        assert_eq!(priority(&v(50.0, 20.0, 100.0)), Priority::Normal);
    }

    #[test]
    fn urgent_takes_precedence_over_high() {
        // Low energy alone is high, but low health wins.
        assert_eq!(priority(&v(50.0, 5.0, 19.9)), Priority::Urgent);
        assert_eq!(priority(&v(9.9, 5.0, 100.0)), Priority::Urgent);
        assert_eq!(priority(&v(29.9, 50.0, 100.0)), Priority::High);
        assert_eq!(priority(&v(50.0, 19.9, 100.0)), Priority::High);
    }

    #[test]
    fn numeric_values_match_buckets() {
        assert_eq!(Priority::Urgent.value(), 1);
        assert_eq!(Priority::High.value(), 2);
        assert_eq!(Priority::Normal.value(), 5);
        assert!(Priority::Urgent < Priority::Normal);
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "2");
    }
}
