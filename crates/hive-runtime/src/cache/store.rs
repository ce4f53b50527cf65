//! Key-value storage behind the decision cache.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;

/// Failures from a [`KvStore`], or from encoding what goes into one.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CacheStoreError {
    #[error("Cache store unavailable: {0}")]
    Unavailable(String),

    #[error("Cache operation failed: {0}")]
    Operation(String),

    #[error("Cache entry could not be encoded or decoded: {0}")]
    Codec(String),
}

impl From<serde_json::Error> for CacheStoreError {
    fn from(e: serde_json::Error) -> Self {
        CacheStoreError::Codec(e.to_string())
    }
}

pub type CacheStoreResult<T> = Result<T, CacheStoreError>;

/// A remote key-value store with per-key expiry.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> CacheStoreResult<Option<String>>;

    /// Store `value` under `key`; a zero TTL means no expiry.
    async fn set_with_ttl(&self, key: &str, value: String, ttl: Duration) -> CacheStoreResult<()>;

    /// Keys matching a glob pattern where `*` matches any run of characters.
    async fn list_keys(&self, pattern: &str) -> CacheStoreResult<Vec<String>>;

    /// Delete keys, returning how many existed.
    async fn delete_keys(&self, keys: &[String]) -> CacheStoreResult<usize>;
}

/// Glob match supporting `*` only.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let mut parts = pattern.split('*');
    let first = parts.next().unwrap_or("");
    let Some(mut rest) = text.strip_prefix(first) else {
        return false;
    };
    let tail: Vec<&str> = parts.collect();
    let Some((last, middle)) = tail.split_last() else {
        return rest.is_empty();
    };
    for part in middle {
        match rest.find(part) {
            Some(i) => rest = &rest[i + part.len()..],
            None => return false,
        }
    }
    rest.len() >= last.len() && rest.ends_with(last)
}

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |t| now < t)
    }
}

/// In-process [`KvStore`] with lazy expiry.
///
/// [`set_failing`](Self::set_failing) makes every operation fail, which lets
/// tests exercise the cache's error downgrade.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: Mutex<HashMap<String, Entry>>,
    failing: AtomicBool,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of unexpired entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .await
            .values()
            .filter(|e| e.is_live(now))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn check(&self) -> CacheStoreResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(CacheStoreError::Unavailable("injected failure".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> CacheStoreResult<Option<String>> {
        self.check()?;
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if entry.is_live(Instant::now()) => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set_with_ttl(&self, key: &str, value: String, ttl: Duration) -> CacheStoreResult<()> {
        self.check()?;
        let expires_at = (!ttl.is_zero()).then(|| Instant::now() + ttl);
        self.entries
            .lock()
            .await
            .insert(key.to_string(), Entry { value, expires_at });
        Ok(())
    }

    async fn list_keys(&self, pattern: &str) -> CacheStoreResult<Vec<String>> {
        self.check()?;
        let now = Instant::now();
        let mut keys: Vec<String> = self
            .entries
            .lock()
            .await
            .iter()
            .filter(|(k, e)| e.is_live(now) && glob_match(pattern, k))
            .map(|(k, _)| k.clone())
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn delete_keys(&self, keys: &[String]) -> CacheStoreResult<usize> {
        self.check()?;
        let mut entries = self.entries.lock().await;
        Ok(keys.iter().filter(|k| entries.remove(*k).is_some()).count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glob_matches_prefix_and_infix_wildcards() {
        assert!(glob_match("hive:*", "hive:decision:abc"));
        assert!(glob_match("hive:*:abc", "hive:decision:abc"));
        assert!(glob_match("*", ""));
        assert!(glob_match("exact", "exact"));
        assert!(!glob_match("exact", "exactly"));
        assert!(!glob_match("hive:*", "other:decision"));
        assert!(!glob_match("a*bc", "abc_"));
        assert!(glob_match("a*a", "aa"));
        assert!(!glob_match("ab*ba", "aba"));
    }

    #[tokio::test]
    async fn stores_and_lists_by_pattern() {
        let store = MemoryKvStore::new();
        store.set_with_ttl("p:a", "1".into(), Duration::ZERO).await.unwrap();
        store.set_with_ttl("p:b", "2".into(), Duration::ZERO).await.unwrap();
        store.set_with_ttl("q:c", "3".into(), Duration::ZERO).await.unwrap();

        assert_eq!(store.get("p:a").await.unwrap(), Some("1".to_string()));
        assert_eq!(store.list_keys("p:*").await.unwrap(), vec!["p:a", "p:b"]);

        let removed = store
            .delete_keys(&["p:a".to_string(), "missing".to_string()])
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn expired_entries_disappear() {
        let store = MemoryKvStore::new();
        store
            .set_with_ttl("k", "v".into(), Duration::from_millis(10))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(store.get("k").await.unwrap(), None);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn injected_failures_surface_as_errors() {
        let store = MemoryKvStore::new();
        store.set_failing(true);
        assert!(matches!(
            store.get("k").await,
            Err(CacheStoreError::Unavailable(_))
        ));
        assert!(store.list_keys("*").await.is_err());

        store.set_failing(false);
        assert_eq!(store.get("k").await.unwrap(), None);
    }
}
