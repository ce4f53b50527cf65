//! Decision cache.
//!
//! Memoizes reasoning decisions keyed by a canonical fingerprint of the
//! observation plus the identity of the backend that produced them, so two
//! backends never share entries.
//!
//! The cache never fails its caller. Storage and codec errors are counted in
//! [`CacheStats::errors`], logged, and treated as a miss (on read) or a no-op
//! (on write).

pub mod canonical;
pub mod store;

pub use canonical::{canonicalize, fingerprint, CanonicalObservation};
pub use store::{CacheStoreError, CacheStoreResult, KvStore, MemoryKvStore};

use hive_core::config::CacheConfig;
use hive_core::decision::Decision;
use hive_core::observation::Observation;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::{debug, warn};

/// Cache counters since creation or the last reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub writes: u64,
    pub errors: u64,
    /// `hits / (hits + misses)`, or 0 before any lookup.
    pub hit_rate: f64,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
    errors: AtomicU64,
}

/// Decision memoization over a [`KvStore`].
pub struct DecisionCache {
    store: Arc<dyn KvStore>,
    config: RwLock<CacheConfig>,
    counters: Counters,
}

impl DecisionCache {
    pub fn new(store: Arc<dyn KvStore>, config: CacheConfig) -> Self {
        Self {
            store,
            config: RwLock::new(config),
            counters: Counters::default(),
        }
    }

    /// A cache over a fresh [`MemoryKvStore`].
    pub fn in_memory(config: CacheConfig) -> Self {
        Self::new(Arc::new(MemoryKvStore::new()), config)
    }

    pub fn config(&self) -> CacheConfig {
        self.config.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn set_config(&self, config: CacheConfig) {
        *self.config.write().unwrap_or_else(|e| e.into_inner()) = config;
    }

    pub fn update_config(&self, f: impl FnOnce(&mut CacheConfig)) {
        let mut config = self.config.write().unwrap_or_else(|e| e.into_inner());
        f(&mut config);
    }

    /// Full storage key: `{prefix}{identity}:{fingerprint}`.
    pub fn key_for(&self, observation: &Observation, identity: &str) -> CacheStoreResult<String> {
        let digest = fingerprint(observation)?;
        Ok(format!("{}{}:{}", self.config().key_prefix, identity, digest))
    }

    /// Look up a decision. Disabled caches always miss without counting.
    pub async fn get(&self, observation: &Observation, identity: &str) -> Option<Decision> {
        if !self.config().enabled {
            return None;
        }
        match self.lookup(observation, identity).await {
            Ok(Some(decision)) => {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                Some(decision)
            }
            Ok(None) => {
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            Err(e) => {
                self.counters.errors.fetch_add(1, Ordering::Relaxed);
                warn!("Decision cache read failed: {}", e);
                None
            }
        }
    }

    /// Store a decision. Disabled caches do nothing.
    pub async fn put(&self, observation: &Observation, identity: &str, decision: &Decision) {
        let config = self.config();
        if !config.enabled {
            return;
        }
        match self.store_decision(observation, identity, decision, &config).await {
            Ok(()) => {
                self.counters.writes.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                self.counters.errors.fetch_add(1, Ordering::Relaxed);
                warn!("Decision cache write failed: {}", e);
            }
        }
    }

    /// Remove every entry under the current prefix, returning how many.
    ///
    /// Errors are counted and reported as zero removals.
    pub async fn clear(&self) -> usize {
        let pattern = format!("{}*", self.config().key_prefix);
        let result: CacheStoreResult<usize> = async {
            let keys = self.store.list_keys(&pattern).await?;
            if keys.is_empty() {
                return Ok(0);
            }
            self.store.delete_keys(&keys).await
        }
        .await;
        match result {
            Ok(removed) => {
                debug!(removed, "Cleared decision cache");
                removed
            }
            Err(e) => {
                self.counters.errors.fetch_add(1, Ordering::Relaxed);
                warn!("Decision cache clear failed: {}", e);
                0
            }
        }
    }

    pub fn stats(&self) -> CacheStats {
        let hits = self.counters.hits.load(Ordering::Relaxed);
        let misses = self.counters.misses.load(Ordering::Relaxed);
        let lookups = hits + misses;
        CacheStats {
            hits,
            misses,
            writes: self.counters.writes.load(Ordering::Relaxed),
            errors: self.counters.errors.load(Ordering::Relaxed),
            hit_rate: if lookups == 0 {
                0.0
            } else {
                hits as f64 / lookups as f64
            },
        }
    }

    pub fn reset_stats(&self) {
        self.counters.hits.store(0, Ordering::Relaxed);
        self.counters.misses.store(0, Ordering::Relaxed);
        self.counters.writes.store(0, Ordering::Relaxed);
        self.counters.errors.store(0, Ordering::Relaxed);
    }

    async fn lookup(
        &self,
        observation: &Observation,
        identity: &str,
    ) -> CacheStoreResult<Option<Decision>> {
        let key = self.key_for(observation, identity)?;
        match self.store.get(&key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn store_decision(
        &self,
        observation: &Observation,
        identity: &str,
        decision: &Decision,
        config: &CacheConfig,
    ) -> CacheStoreResult<()> {
        let key = self.key_for(observation, identity)?;
        let value = serde_json::to_string(decision)?;
        self.store
            .set_with_ttl(&key, value, Duration::from_secs(config.ttl_secs))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hive_core::decision::Action;
    use hive_core::types::{AgentId, GridPos, Vitals};

    fn observation(hunger: f64) -> Observation {
        Observation::solitary(
            AgentId::from_seed(1),
            1,
            Vitals::new(hunger, 80.0, 100.0),
            GridPos::new(3, 3),
        )
    }

    fn cache() -> (Arc<MemoryKvStore>, DecisionCache) {
        let store = Arc::new(MemoryKvStore::new());
        let cache = DecisionCache::new(store.clone(), CacheConfig::default());
        (store, cache)
    }

    #[tokio::test]
    async fn miss_then_hit() {
        let (_, cache) = cache();
        let obs = observation(50.0);
        let decision = Decision::new(Action::Rest).with_reasoning("tired");

        assert_eq!(cache.get(&obs, "mock:a").await, None);
        cache.put(&obs, "mock:a", &decision).await;
        assert_eq!(cache.get(&obs, "mock:a").await, Some(decision));

        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses, stats.writes, stats.errors), (1, 1, 1, 0));
        assert_eq!(stats.hit_rate, 0.5);
    }

    #[tokio::test]
    async fn identities_never_share_entries() {
        let (_, cache) = cache();
        let obs = observation(50.0);
        cache.put(&obs, "mock:a", &Decision::new(Action::Idle)).await;

        assert_eq!(cache.get(&obs, "mock:b").await, None);
        assert!(cache.get(&obs, "mock:a").await.is_some());
    }

    #[tokio::test]
    async fn key_has_prefix_identity_and_digest() {
        let (_, cache) = cache();
        let key = cache.key_for(&observation(50.0), "mock:a").unwrap();
        let digest = key.strip_prefix("hive:decision:mock:a:").unwrap();
        assert_eq!(digest.len(), 16);
    }

    #[tokio::test]
    async fn disabled_cache_is_inert() {
        let (store, cache) = cache();
        cache.update_config(|c| c.enabled = false);
        let obs = observation(50.0);

        cache.put(&obs, "mock:a", &Decision::new(Action::Idle)).await;
        assert_eq!(cache.get(&obs, "mock:a").await, None);
        assert!(store.is_empty().await);
        assert_eq!(cache.stats(), CacheStats::default());
    }

    #[tokio::test]
    async fn store_errors_downgrade_to_miss() {
        let (store, cache) = cache();
        let obs = observation(50.0);
        store.set_failing(true);

        cache.put(&obs, "mock:a", &Decision::new(Action::Idle)).await;
        assert_eq!(cache.get(&obs, "mock:a").await, None);

        let stats = cache.stats();
        assert_eq!(stats.errors, 2);
        assert_eq!((stats.hits, stats.misses, stats.writes), (0, 0, 0));
        assert_eq!(stats.hit_rate, 0.0);
    }

    #[tokio::test]
    async fn undecodable_entries_count_as_errors() {
        let (store, cache) = cache();
        let obs = observation(50.0);
        let key = cache.key_for(&obs, "mock:a").unwrap();
        store
            .set_with_ttl(&key, "not json".into(), Duration::ZERO)
            .await
            .unwrap();

        assert_eq!(cache.get(&obs, "mock:a").await, None);
        assert_eq!(cache.stats().errors, 1);
    }

    #[tokio::test]
    async fn clear_only_touches_current_prefix() {
        let (store, cache) = cache();
        cache.put(&observation(50.0), "mock:a", &Decision::new(Action::Idle)).await;
        cache.put(&observation(20.0), "mock:a", &Decision::new(Action::Eat)).await;
        store
            .set_with_ttl("other:key", "x".into(), Duration::ZERO)
            .await
            .unwrap();

        assert_eq!(cache.clear().await, 2);
        assert_eq!(store.len().await, 1);
        assert_eq!(cache.clear().await, 0);
    }

    #[tokio::test]
    async fn prefix_change_applies_at_runtime() {
        let (_, cache) = cache();
        let obs = observation(50.0);
        cache.put(&obs, "mock:a", &Decision::new(Action::Idle)).await;

        cache.update_config(|c| c.key_prefix = "v2:".to_string());
        assert_eq!(cache.get(&obs, "mock:a").await, None);
        assert!(cache.key_for(&obs, "mock:a").unwrap().starts_with("v2:mock:a:"));
    }

    #[tokio::test]
    async fn reset_clears_counters_but_not_entries() {
        let (_, cache) = cache();
        let obs = observation(50.0);
        cache.put(&obs, "mock:a", &Decision::new(Action::Idle)).await;
        cache.get(&obs, "mock:a").await;

        cache.reset_stats();
        assert_eq!(cache.stats(), CacheStats::default());
        assert!(cache.get(&obs, "mock:a").await.is_some());
    }
}
