//! Admission control for reasoning calls.
//!
//! The controller is a polling gate around a non-negative in-flight depth.
//! Callers either pair [`BackpressureController::on_job_added`] with
//! [`BackpressureController::on_job_completed`] themselves, or take a
//! [`BackpressurePermit`] via [`BackpressureController::acquire`], which
//! releases its slot when dropped on every path, including errors.

use hive_core::config::BackpressureConfig;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Default)]
struct WaitStats {
    episodes: u64,
    total: Duration,
}

/// Point-in-time view of the controller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackpressureStats {
    pub enabled: bool,
    pub depth: usize,
    pub max_depth: usize,
    pub under_pressure: bool,
    /// Number of times a caller had to wait for capacity.
    pub wait_episodes: u64,
    pub total_wait_ms: f64,
    pub average_wait_ms: f64,
}

/// Bounded in-flight depth with polling waits.
#[derive(Debug)]
pub struct BackpressureController {
    config: RwLock<BackpressureConfig>,
    depth: AtomicUsize,
    waits: Mutex<WaitStats>,
}

impl BackpressureController {
    pub fn new(config: BackpressureConfig) -> Self {
        Self {
            config: RwLock::new(config),
            depth: AtomicUsize::new(0),
            waits: Mutex::new(WaitStats::default()),
        }
    }

    pub fn config(&self) -> BackpressureConfig {
        self.config.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn set_config(&self, config: BackpressureConfig) {
        *self.config.write().unwrap_or_else(|e| e.into_inner()) = config;
    }

    pub fn update_config(&self, f: impl FnOnce(&mut BackpressureConfig)) {
        let mut config = self.config.write().unwrap_or_else(|e| e.into_inner());
        f(&mut config);
    }

    /// Current in-flight depth.
    pub fn depth(&self) -> usize {
        self.depth.load(Ordering::SeqCst)
    }

    pub fn on_job_added(&self) {
        self.on_jobs_added(1);
    }

    pub fn on_jobs_added(&self, count: usize) {
        self.depth.fetch_add(count, Ordering::SeqCst);
    }

    /// Never takes the depth below zero.
    pub fn on_job_completed(&self) {
        self.on_jobs_completed(1);
    }

    pub fn on_jobs_completed(&self, count: usize) {
        let _ = self
            .depth
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |d| {
                Some(d.saturating_sub(count))
            });
    }

    /// Non-blocking capacity check. Always true when disabled.
    pub fn has_capacity(&self) -> bool {
        let config = self.config();
        !config.enabled || self.depth() < config.max_depth
    }

    pub fn is_under_pressure(&self) -> bool {
        let config = self.config();
        config.enabled && self.depth() >= config.max_depth
    }

    /// Wait until the depth drops below the maximum.
    ///
    /// Returns immediately when disabled. Otherwise polls at the configured
    /// interval, yielding to other tasks between polls. Does not reserve a
    /// slot; use [`acquire`](Self::acquire) for that.
    pub async fn wait_for_capacity(&self) {
        if self.has_capacity() {
            return;
        }
        let started = Instant::now();
        debug!(depth = self.depth(), "Waiting for capacity");
        while !self.has_capacity() {
            self.pause().await;
        }
        self.record_wait(started.elapsed());
    }

    /// Reserve a slot if one is free. Disabled controllers always succeed.
    pub fn try_reserve(&self) -> bool {
        let config = self.config();
        if !config.enabled {
            self.on_job_added();
            return true;
        }
        self.depth
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |d| {
                (d < config.max_depth).then_some(d + 1)
            })
            .is_ok()
    }

    /// Wait for capacity and reserve a slot in one step.
    ///
    /// The returned permit completes the job when dropped.
    pub async fn acquire(self: &Arc<Self>) -> BackpressurePermit {
        if !self.try_reserve() {
            let started = Instant::now();
            debug!(depth = self.depth(), "Waiting for capacity");
            loop {
                self.pause().await;
                if self.try_reserve() {
                    break;
                }
            }
            self.record_wait(started.elapsed());
        }
        BackpressurePermit {
            controller: Arc::clone(self),
        }
    }

    pub fn stats(&self) -> BackpressureStats {
        let config = self.config();
        let depth = self.depth();
        let waits = self.waits();
        let total_wait_ms = waits.total.as_secs_f64() * 1000.0;
        BackpressureStats {
            enabled: config.enabled,
            depth,
            max_depth: config.max_depth,
            under_pressure: config.enabled && depth >= config.max_depth,
            wait_episodes: waits.episodes,
            total_wait_ms,
            average_wait_ms: if waits.episodes == 0 {
                0.0
            } else {
                total_wait_ms / waits.episodes as f64
            },
        }
    }

    /// Clear wait statistics without touching the depth.
    pub fn reset_wait_stats(&self) {
        *self.waits() = WaitStats::default();
    }

    /// Zero the depth and the wait statistics.
    pub fn reset(&self) {
        self.depth.store(0, Ordering::SeqCst);
        self.reset_wait_stats();
    }

    async fn pause(&self) {
        let interval = Duration::from_millis(self.config().poll_interval_ms);
        if interval.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(interval).await;
        }
    }

    fn record_wait(&self, waited: Duration) {
        let mut waits = self.waits();
        waits.episodes += 1;
        waits.total += waited;
        debug!(waited_ms = waited.as_millis() as u64, "Capacity available");
    }

    fn waits(&self) -> MutexGuard<'_, WaitStats> {
        self.waits.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for BackpressureController {
    fn default() -> Self {
        Self::new(BackpressureConfig::default())
    }
}

/// A reserved in-flight slot.
#[derive(Debug)]
pub struct BackpressurePermit {
    controller: Arc<BackpressureController>,
}

impl Drop for BackpressurePermit {
    fn drop(&mut self) {
        self.controller.on_job_completed();
    }
}
