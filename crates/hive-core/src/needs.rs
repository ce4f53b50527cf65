//! Needs decay: the per-agent, per-tick hunger/energy/health state machine.
//!
//! Each tick an agent's hunger and energy decay, low and critical thresholds
//! are classified on the *post-decay* values, and health takes damage from
//! needs that stay critical:
//!
//! - Critical hunger has a grace period. The first
//!   `hunger_grace_period_ticks` consecutive critical ticks cost nothing;
//!   after that every critical tick costs `critical_hunger_health_damage`.
//! - Critical energy has no grace period. It costs
//!   `critical_energy_health_damage` immediately and forces the agent to
//!   sleep, overriding whatever it meant to do.
//!
//! Health reaching zero kills the agent. Starvation wins over exhaustion when
//! both damage paths fired on the killing tick. Any other death, including a
//! live agent handed in with zero health where no damage fired at all, is
//! reported as exhaustion.
//!
//! Consecutive-critical counters live inside a [`NeedsEngine`] instance, so
//! two worlds never share them and tests can reset or preset them freely.

use crate::config::NeedsConfig;
use crate::error::StoreResult;
use crate::store::{AgentStore, VitalsPatch};
use crate::types::{clamp_vital, AgentId, AgentState, LifecycleState, Tick, Vitals};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, RwLock};

/// A need tracked by the decay state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Need {
    Hunger,
    Energy,
}

/// Severity of a threshold crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningLevel {
    Low,
    Critical,
}

/// Why an agent died.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathCause {
    Starvation,
    Exhaustion,
}

impl std::fmt::Display for DeathCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeathCause::Starvation => write!(f, "starvation"),
            DeathCause::Exhaustion => write!(f, "exhaustion"),
        }
    }
}

/// Tags describing what happened to an agent's needs this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeedsEffect {
    HungerDecreased,
    EnergyDecreased,
    LowHungerWarning,
    CriticalHungerWarning,
    GracePeriodActive,
    LowEnergyWarning,
    CriticalEnergyWarning,
    ForcedRest,
    HealthDamaged,
    Death,
}

/// Extra context attached to a critical warning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WarningDetail {
    /// Plain threshold crossing.
    None,
    /// Critical hunger, still inside the grace period.
    GracePeriod {
        grace_period_active: bool,
        grace_ticks_remaining: u32,
    },
    /// Critical hunger past the grace period.
    GraceExpired {
        grace_period_active: bool,
        grace_period_expired: bool,
        health_damage: f64,
    },
    /// Critical energy: immediate damage and forced sleep.
    ForcedRest { forced_rest: bool, health_damage: f64 },
}

/// One threshold crossing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NeedsWarning {
    pub need: Need,
    pub level: WarningLevel,
    /// Post-decay value of the need.
    pub value: f64,
    /// Consecutive critical ticks including this one (0 for low warnings).
    pub critical_ticks: u32,
    pub detail: WarningDetail,
}

/// Events emitted by one decay step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NeedsEvent {
    NeedsUpdated {
        agent_id: AgentId,
        tick: Tick,
        previous: Vitals,
        new: Vitals,
    },
    NeedsWarning {
        agent_id: AgentId,
        tick: Tick,
        warning: NeedsWarning,
    },
}

/// Result of one decay step for one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeedsOutcome {
    pub agent_id: AgentId,
    pub previous_state: Vitals,
    pub new_state: Vitals,
    pub died: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub death_cause: Option<DeathCause>,
    /// Critical energy forced the agent to sleep this tick.
    pub forced_rest: bool,
    pub effects: Vec<NeedsEffect>,
    pub events: Vec<NeedsEvent>,
}

impl NeedsOutcome {
    pub fn has_effect(&self, effect: NeedsEffect) -> bool {
        self.effects.contains(&effect)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &NeedsWarning> {
        self.events.iter().filter_map(|e| match e {
            NeedsEvent::NeedsWarning { warning, .. } => Some(warning),
            _ => None,
        })
    }

    pub fn warning_for(&self, need: Need) -> Option<&NeedsWarning> {
        self.warnings().find(|w| w.need == need)
    }

    /// Lifecycle state the agent should be in after this step.
    pub fn lifecycle(&self) -> Option<LifecycleState> {
        if self.died {
            Some(LifecycleState::Dead)
        } else if self.forced_rest {
            Some(LifecycleState::Sleeping)
        } else {
            None
        }
    }

    /// Outcome for an agent that is already dead: nothing changes.
    fn halted(agent_id: AgentId, vitals: Vitals) -> Self {
        Self {
            agent_id,
            previous_state: vitals,
            new_state: vitals,
            died: false,
            death_cause: None,
            forced_rest: false,
            effects: Vec::new(),
            events: Vec::new(),
        }
    }
}

/// Consecutive critical-tick counts for one agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CriticalCounts {
    pub hunger: u32,
    pub energy: u32,
}

impl CriticalCounts {
    pub fn get(&self, need: Need) -> u32 {
        match need {
            Need::Hunger => self.hunger,
            Need::Energy => self.energy,
        }
    }

    pub fn set(&mut self, need: Need, ticks: u32) {
        match need {
            Need::Hunger => self.hunger = ticks,
            Need::Energy => self.energy = ticks,
        }
    }
}

/// Compute one decay step without touching any shared state.
///
/// Returns the outcome and the updated critical counters.
pub fn decay_step(
    config: &NeedsConfig,
    agent_id: AgentId,
    previous: Vitals,
    tick: Tick,
    counts: CriticalCounts,
) -> (NeedsOutcome, CriticalCounts) {
    let previous = previous.clamped();
    let mut counts = counts;
    let mut effects = Vec::new();
    let mut warnings = Vec::new();

    let hunger = clamp_vital(previous.hunger - config.hunger_decay_rate);
    let penalty = if hunger < config.low_hunger_threshold {
        config.low_hunger_energy_penalty
    } else {
        0.0
    };
    let energy = clamp_vital(previous.energy - config.energy_decay_rate - penalty);

    if hunger < previous.hunger {
        effects.push(NeedsEffect::HungerDecreased);
    }
    if energy < previous.energy {
        effects.push(NeedsEffect::EnergyDecreased);
    }

    // Hunger: grace period before damage.
    let mut hunger_damage = 0.0;
    let mut hunger_damage_fired = false;
    if hunger < config.critical_hunger_threshold {
        counts.hunger = counts.hunger.saturating_add(1);
        effects.push(NeedsEffect::CriticalHungerWarning);
        let grace = config.hunger_grace_period_ticks;
        let detail = if counts.hunger <= grace {
            effects.push(NeedsEffect::GracePeriodActive);
            WarningDetail::GracePeriod {
                grace_period_active: true,
                grace_ticks_remaining: grace - counts.hunger,
            }
        } else {
            hunger_damage = config.critical_hunger_health_damage;
            hunger_damage_fired = true;
            effects.push(NeedsEffect::HealthDamaged);
            WarningDetail::GraceExpired {
                grace_period_active: false,
                grace_period_expired: true,
                health_damage: hunger_damage,
            }
        };
        warnings.push(NeedsWarning {
            need: Need::Hunger,
            level: WarningLevel::Critical,
            value: hunger,
            critical_ticks: counts.hunger,
            detail,
        });
    } else {
        counts.hunger = 0;
        if hunger < config.low_hunger_threshold {
            effects.push(NeedsEffect::LowHungerWarning);
            warnings.push(low_warning(Need::Hunger, hunger));
        }
    }

    // Energy: no grace, immediate damage and forced sleep.
    let mut energy_damage = 0.0;
    let mut forced_rest = false;
    if energy < config.critical_energy_threshold {
        counts.energy = counts.energy.saturating_add(1);
        energy_damage = config.critical_energy_health_damage;
        forced_rest = true;
        effects.push(NeedsEffect::CriticalEnergyWarning);
        effects.push(NeedsEffect::ForcedRest);
        if !effects.contains(&NeedsEffect::HealthDamaged) {
            effects.push(NeedsEffect::HealthDamaged);
        }
        warnings.push(NeedsWarning {
            need: Need::Energy,
            level: WarningLevel::Critical,
            value: energy,
            critical_ticks: counts.energy,
            detail: WarningDetail::ForcedRest {
                forced_rest: true,
                health_damage: energy_damage,
            },
        });
    } else {
        counts.energy = 0;
        if energy < config.low_energy_threshold {
            effects.push(NeedsEffect::LowEnergyWarning);
            warnings.push(low_warning(Need::Energy, energy));
        }
    }

    let health = clamp_vital(previous.health - hunger_damage - energy_damage);
    let new_state = Vitals { hunger, energy, health };

    let died = health <= 0.0;
    let death_cause = if !died {
        None
    } else if hunger_damage_fired {
        Some(DeathCause::Starvation)
    } else {
        Some(DeathCause::Exhaustion)
    };
    if died {
        effects.push(NeedsEffect::Death);
    }

    let mut events = Vec::with_capacity(1 + warnings.len());
    events.push(NeedsEvent::NeedsUpdated {
        agent_id,
        tick,
        previous,
        new: new_state,
    });
    events.extend(warnings.into_iter().map(|warning| NeedsEvent::NeedsWarning {
        agent_id,
        tick,
        warning,
    }));

    let outcome = NeedsOutcome {
        agent_id,
        previous_state: previous,
        new_state,
        died,
        death_cause,
        forced_rest: forced_rest && !died,
        effects,
        events,
    };
    (outcome, counts)
}

fn low_warning(need: Need, value: f64) -> NeedsWarning {
    NeedsWarning {
        need,
        level: WarningLevel::Low,
        value,
        critical_ticks: 0,
        detail: WarningDetail::None,
    }
}

/// Ticks until the first need runs out at the configured decay rates.
///
/// Fractional results are meaningful; a zero rate never runs out.
pub fn survival_ticks(config: &NeedsConfig, hunger: f64, energy: f64) -> f64 {
    if hunger <= 0.0 && energy <= 0.0 {
        return 0.0;
    }
    let ticks_until = |value: f64, rate: f64| {
        if value <= 0.0 {
            0.0
        } else if rate <= 0.0 {
            f64::INFINITY
        } else {
            value / rate
        }
    };
    ticks_until(hunger, config.hunger_decay_rate).min(ticks_until(energy, config.energy_decay_rate))
}

/// Per-world needs engine: configuration plus critical-tick counters.
pub struct NeedsEngine {
    config: RwLock<NeedsConfig>,
    counters: Mutex<HashMap<AgentId, CriticalCounts>>,
}

impl NeedsEngine {
    pub fn new(config: NeedsConfig) -> Self {
        Self {
            config: RwLock::new(config),
            counters: Mutex::new(HashMap::new()),
        }
    }

    /// Current configuration.
    pub fn config(&self) -> NeedsConfig {
        self.config.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Replace the configuration; takes effect on the next step.
    pub fn set_config(&self, config: NeedsConfig) {
        *self.config.write().unwrap_or_else(|e| e.into_inner()) = config;
    }

    /// Modify the configuration in place.
    pub fn update_config(&self, f: impl FnOnce(&mut NeedsConfig)) {
        f(&mut self.config.write().unwrap_or_else(|e| e.into_inner()));
    }

    fn counters(&self) -> MutexGuard<'_, HashMap<AgentId, CriticalCounts>> {
        self.counters.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Consecutive critical ticks recorded for `agent_id`.
    pub fn critical_ticks(&self, agent_id: AgentId, need: Need) -> u32 {
        self.counters()
            .get(&agent_id)
            .map(|c| c.get(need))
            .unwrap_or(0)
    }

    /// Preset a counter, e.g. to start a test mid-famine.
    pub fn set_critical_ticks(&self, agent_id: AgentId, need: Need, ticks: u32) {
        self.counters().entry(agent_id).or_default().set(need, ticks);
    }

    /// Forget every counter.
    pub fn reset_critical_ticks(&self) {
        self.counters().clear();
    }

    /// Forget one agent's counters, e.g. after it died.
    pub fn forget_agent(&self, agent_id: AgentId) {
        self.counters().remove(&agent_id);
    }

    /// Number of agents with tracked counters.
    pub fn tracked_agents(&self) -> usize {
        self.counters().len()
    }

    /// Run one decay step, updating this engine's counters.
    ///
    /// The counter read and write happen under one lock with no suspension
    /// point in between.
    pub fn transition(&self, agent_id: AgentId, previous: Vitals, tick: Tick) -> NeedsOutcome {
        let config = self.config();
        let mut counters = self.counters();
        let counts = counters.get(&agent_id).copied().unwrap_or_default();
        let (outcome, counts) = decay_step(&config, agent_id, previous, tick, counts);
        if counts == CriticalCounts::default() {
            counters.remove(&agent_id);
        } else {
            counters.insert(agent_id, counts);
        }
        outcome
    }

    /// Run one decay step and persist it.
    ///
    /// Dead agents are left untouched. A death calls [`AgentStore::kill`]
    /// instead of the ordinary vitals update. Store failures propagate.
    pub async fn apply(
        &self,
        store: &dyn AgentStore,
        agent: &AgentState,
        tick: Tick,
    ) -> StoreResult<NeedsOutcome> {
        if !agent.is_alive() {
            return Ok(NeedsOutcome::halted(agent.id, agent.vitals));
        }

        let outcome = self.transition(agent.id, agent.vitals, tick);

        match outcome.death_cause {
            Some(cause) if outcome.died => {
                self.forget_agent(agent.id);
                store.kill(agent.id, cause).await?;
            }
            _ => {
                let mut patch = VitalsPatch::from_vitals(outcome.new_state);
                if outcome.forced_rest {
                    patch = patch.with_state(LifecycleState::Sleeping);
                }
                store.update_vitals(agent.id, patch).await?;
            }
        }
        Ok(outcome)
    }

    /// Ticks until the first need runs out under the current configuration.
    pub fn survival_ticks(&self, hunger: f64, energy: f64) -> f64 {
        survival_ticks(&self.config(), hunger, energy)
    }
}

impl Default for NeedsEngine {
    fn default() -> Self {
        Self::new(NeedsConfig::default())
    }
}
