//! The tick orchestrator.
//!
//! One tick:
//!
//! 1. Snapshot the world and partition living agents into grid shards.
//! 2. Process shards concurrently or throttled, per [`WorldConfig::processing`].
//! 3. Inside a shard, take agents in priority order (urgent first). For each:
//!    build an observation, consult the decision cache, otherwise reserve a
//!    backpressure slot and ask the reasoning backend. A failed call falls
//!    back to the heuristic policy and is never cached.
//! 4. Run needs decay. A death ends the agent's tick; forced rest overrides
//!    the decision with sleep.
//! 5. Apply the action's effects and collect events into a [`TickReport`].
//!
//! Store failures during one agent's tick are recorded in the report and do
//! not stop other agents. A failed world snapshot fails the whole tick.

use crate::backpressure::BackpressureController;
use crate::cache::{DecisionCache, KvStore, MemoryKvStore};
use crate::effects::{apply_action, GridBounds};
use crate::events::{DecisionSource, TickReport, WorldEvent};
use crate::observe::build_observation;
use hive_core::config::{EffectsConfig, HiveConfig, WorldConfig};
use hive_core::decision::{Action, Decision};
use hive_core::error::StoreResult;
use hive_core::needs::NeedsEngine;
use hive_core::observation::Observation;
use hive_core::priority::priority;
use hive_core::store::{AgentStore, WorldSnapshot};
use hive_core::types::{AgentId, AgentState, Tick};
use hive_llm::{HeuristicPolicy, ReasoningBackend};
use hive_shard::{process_shards, GridPartitioner, Shard};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Per-agent result, folded into the tick report.
#[derive(Debug, Default)]
struct AgentTick {
    events: Vec<WorldEvent>,
    died: bool,
    cache_hit: bool,
    reasoned: bool,
    decision_failed: bool,
    store_failed: bool,
}

impl AgentTick {
    fn store_failure(mut self, agent_id: AgentId, tick: Tick, error: impl ToString) -> Self {
        self.store_failed = true;
        self.events.push(WorldEvent::StoreFailed {
            agent_id,
            tick,
            error: error.to_string(),
        });
        self
    }
}

/// Drives ticks for one world.
pub struct TickOrchestrator {
    store: Arc<dyn AgentStore>,
    backend: Arc<dyn ReasoningBackend>,
    cache: Arc<DecisionCache>,
    backpressure: Arc<BackpressureController>,
    needs: Arc<NeedsEngine>,
    world: RwLock<WorldConfig>,
    effects: RwLock<EffectsConfig>,
    memory: Mutex<HashMap<AgentId, VecDeque<String>>>,
    tick: AtomicU64,
}

impl TickOrchestrator {
    pub fn builder(store: Arc<dyn AgentStore>, backend: Arc<dyn ReasoningBackend>) -> OrchestratorBuilder {
        OrchestratorBuilder::new(store, backend)
    }

    /// Last completed (or in-progress) tick number.
    pub fn current_tick(&self) -> Tick {
        self.tick.load(Ordering::SeqCst)
    }

    pub fn store(&self) -> &Arc<dyn AgentStore> {
        &self.store
    }

    pub fn cache(&self) -> &Arc<DecisionCache> {
        &self.cache
    }

    pub fn backpressure(&self) -> &Arc<BackpressureController> {
        &self.backpressure
    }

    pub fn needs(&self) -> &Arc<NeedsEngine> {
        &self.needs
    }

    pub fn world_config(&self) -> WorldConfig {
        self.world.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn update_world_config(&self, f: impl FnOnce(&mut WorldConfig)) {
        let mut config = self.world.write().unwrap_or_else(|e| e.into_inner());
        f(&mut config);
    }

    pub fn effects_config(&self) -> EffectsConfig {
        self.effects.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn update_effects_config(&self, f: impl FnOnce(&mut EffectsConfig)) {
        let mut config = self.effects.write().unwrap_or_else(|e| e.into_inner());
        f(&mut config);
    }

    /// Run one tick.
    pub async fn run_tick(&self) -> StoreResult<TickReport> {
        let tick = self.tick.fetch_add(1, Ordering::SeqCst) + 1;
        let started = Instant::now();
        let world_config = self.world_config();
        let effects_config = self.effects_config();

        let snapshot = self.store.snapshot().await?;
        let grid = GridPartitioner::from_config(&world_config);
        let shards = grid.partition(snapshot.active_agents().cloned());
        debug!(
            tick,
            agents = snapshot.agents.len(),
            shards = shards.len(),
            "Tick started"
        );

        let mut report = TickReport::new(tick, grid.shard_count());
        report.shards_processed = shards.len();

        let this = self;
        let world = &snapshot;
        let (wc, ec) = (&world_config, &effects_config);
        let results = process_shards(
            world_config.processing,
            Duration::from_millis(world_config.throttle_ms),
            shards,
            move |shard| this.process_shard(shard, world, tick, wc, ec),
        )
        .await;

        for agent_tick in results.into_iter().flatten() {
            report.processed += 1;
            report.died += usize::from(agent_tick.died);
            report.cache_hits += usize::from(agent_tick.cache_hit);
            report.reasoned += usize::from(agent_tick.reasoned);
            report.decision_failures += usize::from(agent_tick.decision_failed);
            report.store_failures += usize::from(agent_tick.store_failed);
            report.events.extend(agent_tick.events);
        }

        report.elapsed_ms = started.elapsed().as_millis() as u64;
        report.events.push(WorldEvent::TickComplete {
            tick,
            processed: report.processed,
            died: report.died,
            elapsed_ms: report.elapsed_ms,
        });
        info!(
            tick,
            processed = report.processed,
            died = report.died,
            cache_hits = report.cache_hits,
            failures = report.decision_failures,
            elapsed_ms = report.elapsed_ms,
            "Tick complete"
        );
        Ok(report)
    }

    /// Run up to `ticks` ticks, stopping early when `callback` returns false.
    pub async fn run_with_callback<F>(&self, ticks: u64, mut callback: F) -> StoreResult<Vec<TickReport>>
    where
        F: FnMut(&TickReport) -> bool,
    {
        let mut reports = Vec::new();
        for _ in 0..ticks {
            let report = self.run_tick().await?;
            let keep_going = callback(&report);
            reports.push(report);
            if !keep_going {
                break;
            }
            tokio::task::yield_now().await;
        }
        Ok(reports)
    }

    pub async fn run(&self, ticks: u64) -> StoreResult<Vec<TickReport>> {
        self.run_with_callback(ticks, |_| true).await
    }

    /// Recent event descriptions remembered for an agent.
    pub fn recent_events(&self, agent_id: AgentId) -> Vec<String> {
        self.memory()
            .get(&agent_id)
            .map(|events| events.iter().cloned().collect())
            .unwrap_or_default()
    }

    async fn process_shard(
        &self,
        shard: Shard<AgentState>,
        world: &WorldSnapshot,
        tick: Tick,
        world_config: &WorldConfig,
        effects_config: &EffectsConfig,
    ) -> Vec<AgentTick> {
        let shard_id = shard.id;
        let mut members = shard.members;
        members.sort_by_key(|a| (priority(&a.vitals), a.id));
        debug!(shard = %shard_id, agents = members.len(), "Processing shard");

        let mut results = Vec::with_capacity(members.len());
        for agent in &members {
            results.push(
                self.process_agent(agent, world, tick, world_config, effects_config)
                    .await,
            );
        }
        results
    }

    async fn process_agent(
        &self,
        agent: &AgentState,
        world: &WorldSnapshot,
        tick: Tick,
        world_config: &WorldConfig,
        effects_config: &EffectsConfig,
    ) -> AgentTick {
        let mut out = AgentTick::default();
        let observation = build_observation(
            agent,
            world,
            tick,
            world_config.observation_radius,
            self.recent_events(agent.id),
        );
        let decision = self
            .decide(&observation, effects_config, &mut out)
            .await;

        let needs = match self.needs.apply(self.store.as_ref(), agent, tick).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(agent = %agent.id, "Needs update failed: {}", e);
                return out.store_failure(agent.id, tick, e);
            }
        };
        out.events
            .extend(needs.events.iter().cloned().map(|event| WorldEvent::Needs { event }));

        if needs.died {
            out.died = true;
            if let Some(cause) = needs.death_cause {
                info!(agent = %agent.id, name = %agent.name, %cause, tick, "Agent died");
                out.events.push(WorldEvent::Died {
                    agent_id: agent.id,
                    tick,
                    cause,
                });
            }
            self.memory().remove(&agent.id);
            return out;
        }

        let action = if needs.forced_rest {
            Action::Sleep
        } else {
            decision.action
        };
        let bounds = GridBounds {
            width: world_config.width,
            height: world_config.height,
        };
        match apply_action(
            self.store.as_ref(),
            effects_config,
            bounds,
            agent,
            needs.new_state,
            &action,
        )
        .await
        {
            Ok(outcome) => out.events.push(WorldEvent::ActionApplied {
                agent_id: agent.id,
                tick,
                outcome,
            }),
            Err(e) => {
                warn!(agent = %agent.id, action = %action, "Action failed: {}", e);
                out = out.store_failure(agent.id, tick, e);
            }
        }

        self.remember(agent.id, &out.events, world_config.event_memory);
        out
    }

    async fn decide(
        &self,
        observation: &Observation,
        effects_config: &EffectsConfig,
        out: &mut AgentTick,
    ) -> Decision {
        let agent_id = observation.agent_id;
        let tick = observation.tick;
        let identity = self.backend.identity();

        let (decision, source) = match self.cache.get(observation, &identity).await {
            Some(decision) => {
                out.cache_hit = true;
                (decision, DecisionSource::Cache)
            }
            None => {
                let result = {
                    let _permit = self.backpressure.acquire().await;
                    self.backend.decide(observation).await
                };
                match result {
                    Ok(decision) => {
                        self.cache.put(observation, &identity, &decision).await;
                        out.reasoned = true;
                        (decision, DecisionSource::Reasoned)
                    }
                    Err(e) => {
                        warn!(agent = %agent_id, backend = %identity, "Decision failed: {}", e);
                        out.decision_failed = true;
                        out.events.push(WorldEvent::DecisionFailed {
                            agent_id,
                            tick,
                            error: e.to_string(),
                        });
                        let policy = HeuristicPolicy::default()
                            .with_food_item(effects_config.food_item.clone());
                        (policy.decide(observation), DecisionSource::Fallback)
                    }
                }
            }
        };

        out.events.push(WorldEvent::DecisionMade {
            agent_id,
            tick,
            action: decision.action.clone(),
            source,
        });
        decision
    }

    fn remember(&self, agent_id: AgentId, events: &[WorldEvent], capacity: usize) {
        let mut memory = self.memory();
        let log = memory.entry(agent_id).or_default();
        log.extend(events.iter().filter_map(WorldEvent::describe));
        while log.len() > capacity {
            log.pop_front();
        }
    }

    fn memory(&self) -> MutexGuard<'_, HashMap<AgentId, VecDeque<String>>> {
        self.memory.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Builder for [`TickOrchestrator`].
///
/// Components not supplied are created from the [`HiveConfig`], so tests can
/// inject a shared cache or needs engine while leaving the rest default.
pub struct OrchestratorBuilder {
    store: Arc<dyn AgentStore>,
    backend: Arc<dyn ReasoningBackend>,
    config: HiveConfig,
    kv_store: Option<Arc<dyn KvStore>>,
    cache: Option<Arc<DecisionCache>>,
    backpressure: Option<Arc<BackpressureController>>,
    needs: Option<Arc<NeedsEngine>>,
    start_tick: Tick,
}

impl OrchestratorBuilder {
    pub fn new(store: Arc<dyn AgentStore>, backend: Arc<dyn ReasoningBackend>) -> Self {
        Self {
            store,
            backend,
            config: HiveConfig::default(),
            kv_store: None,
            cache: None,
            backpressure: None,
            needs: None,
            start_tick: 0,
        }
    }

    pub fn with_config(mut self, config: HiveConfig) -> Self {
        self.config = config;
        self
    }

    /// Back the decision cache with this store instead of an in-memory one.
    pub fn with_kv_store(mut self, kv_store: Arc<dyn KvStore>) -> Self {
        self.kv_store = Some(kv_store);
        self
    }

    pub fn with_cache(mut self, cache: Arc<DecisionCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_backpressure(mut self, backpressure: Arc<BackpressureController>) -> Self {
        self.backpressure = Some(backpressure);
        self
    }

    pub fn with_needs(mut self, needs: Arc<NeedsEngine>) -> Self {
        self.needs = Some(needs);
        self
    }

    /// The first tick run will be `tick + 1`.
    pub fn starting_at(mut self, tick: Tick) -> Self {
        self.start_tick = tick;
        self
    }

    pub fn build(self) -> TickOrchestrator {
        let HiveConfig {
            needs,
            cache,
            backpressure,
            world,
            effects,
        } = self.config;

        let kv_store = self
            .kv_store
            .unwrap_or_else(|| Arc::new(MemoryKvStore::new()) as Arc<dyn KvStore>);

        TickOrchestrator {
            store: self.store,
            backend: self.backend,
            cache: self
                .cache
                .unwrap_or_else(|| Arc::new(DecisionCache::new(kv_store, cache))),
            backpressure: self
                .backpressure
                .unwrap_or_else(|| Arc::new(BackpressureController::new(backpressure))),
            needs: self
                .needs
                .unwrap_or_else(|| Arc::new(NeedsEngine::new(needs))),
            world: RwLock::new(world),
            effects: RwLock::new(effects),
            memory: Mutex::new(HashMap::new()),
            tick: AtomicU64::new(self.start_tick),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_store::MemoryAgentStore;
    use hive_core::types::{GridPos, LifecycleState, Vitals};
    use hive_llm::MockBackend;

    fn agent(seed: u64, x: i32, y: i32, vitals: Vitals) -> AgentState {
        AgentState::new(AgentId::from_seed(seed), format!("agent-{}", seed), GridPos::new(x, y))
            .with_vitals(vitals)
    }

    #[tokio::test]
    async fn tick_counts_every_living_agent_once() {
        let store = Arc::new(MemoryAgentStore::with_agents(vec![
            agent(1, 1, 1, Vitals::full()),
            agent(2, 90, 90, Vitals::full()),
            agent(3, 40, 60, Vitals::full()),
        ]));
        let orchestrator = TickOrchestrator::builder(store.clone(), Arc::new(MockBackend::new())).build();

        let report = orchestrator.run_tick().await.unwrap();
        assert_eq!(report.tick, 1);
        assert_eq!(report.processed, 3);
        assert_eq!(report.shard_count, 16);
        assert_eq!(report.reasoned, 3);
        assert!(matches!(
            report.events.last(),
            Some(WorldEvent::TickComplete { processed: 3, .. })
        ));
    }

    #[tokio::test]
    async fn shard_members_are_taken_in_priority_order() {
        let store = Arc::new(MemoryAgentStore::with_agents(vec![
            agent(1, 1, 1, Vitals::full()),
            agent(2, 2, 2, Vitals::new(20.0, 80.0, 100.0)),
            agent(3, 3, 3, Vitals::new(80.0, 80.0, 15.0)),
        ]));
        let orchestrator = TickOrchestrator::builder(store, Arc::new(MockBackend::new())).build();

        let report = orchestrator.run_tick().await.unwrap();
        let order: Vec<AgentId> = report
            .events
            .iter()
            .filter_map(|e| match e {
                WorldEvent::DecisionMade { agent_id, .. } => Some(*agent_id),
                _ => None,
            })
            .collect();
        assert_eq!(
            order,
            vec![AgentId::from_seed(3), AgentId::from_seed(2), AgentId::from_seed(1)]
        );
    }

    #[tokio::test]
    async fn forced_rest_overrides_the_decision() {
        let tired = agent(1, 5, 5, Vitals::new(80.0, 5.0, 100.0));
        let store = Arc::new(MemoryAgentStore::with_agents(vec![tired.clone()]));
        let backend = MockBackend::new();
        backend.push_result(Ok(Decision::new(Action::Idle)));
        let orchestrator = TickOrchestrator::builder(store.clone(), Arc::new(backend)).build();

        let report = orchestrator.run_tick().await.unwrap();
        let applied = report
            .events_for(tired.id)
            .find_map(|e| match e {
                WorldEvent::ActionApplied { outcome, .. } => Some(outcome.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(applied.action, Action::Sleep);
        assert_eq!(
            store.agent(tired.id).await.unwrap().state,
            LifecycleState::Sleeping
        );
    }

    #[tokio::test]
    async fn remembers_a_bounded_event_log() {
        let a = agent(1, 5, 5, Vitals::full());
        let store = Arc::new(MemoryAgentStore::with_agents(vec![a.clone()]));
        let mut config = HiveConfig::default();
        config.world.event_memory = 2;
        let orchestrator = TickOrchestrator::builder(store, Arc::new(MockBackend::new()))
            .with_config(config)
            .build();

        orchestrator.run(4).await.unwrap();
        let recent = orchestrator.recent_events(a.id);
        assert_eq!(recent.len(), 2);
        assert!(recent[1].starts_with("tick 4:"));
    }

    #[tokio::test]
    async fn callback_can_stop_the_run_early() {
        let store = Arc::new(MemoryAgentStore::with_agents(vec![agent(1, 1, 1, Vitals::full())]));
        let orchestrator = TickOrchestrator::builder(store, Arc::new(MockBackend::new()))
            .starting_at(10)
            .build();

        let reports = orchestrator
            .run_with_callback(10, |report| report.tick < 12)
            .await
            .unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(orchestrator.current_tick(), 12);
    }

    #[tokio::test]
    async fn unbounded_tick_count_stops_on_callback() {
        let store = Arc::new(MemoryAgentStore::with_agents(vec![agent(1, 1, 1, Vitals::full())]));
        let orchestrator = TickOrchestrator::builder(store, Arc::new(MockBackend::new())).build();

        let reports = orchestrator.run_with_callback(u64::MAX, |_| false).await.unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(orchestrator.current_tick(), 1);
    }
}
