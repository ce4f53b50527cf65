//! A scriptable backend for tests and offline runs.

use crate::backend::{LlmConfig, LlmError, LlmResult, ReasoningBackend};
use crate::policy::HeuristicPolicy;
use async_trait::async_trait;
use hive_core::decision::Decision;
use hive_core::observation::Observation;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// A mock backend.
///
/// Answers from a queue of scripted results first, then from a
/// [`HeuristicPolicy`]. Tracks call counts and peak concurrency so tests can
/// assert on admission control.
pub struct MockBackend {
    config: LlmConfig,
    policy: HeuristicPolicy,
    scripted: Mutex<VecDeque<LlmResult<Decision>>>,
    failure: Option<LlmError>,
    latency: Option<Duration>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MockBackend {
    /// Create a new mock backend.
    pub fn new() -> Self {
        Self {
            config: LlmConfig::default().with_model("mock"),
            policy: HeuristicPolicy::default(),
            scripted: Mutex::new(VecDeque::new()),
            failure: None,
            latency: None,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    /// Use a different model name, which changes the identity.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Fail every call with `error`.
    pub fn failing(mut self, error: LlmError) -> Self {
        self.failure = Some(error);
        self
    }

    /// Sleep this long inside every call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn with_policy(mut self, policy: HeuristicPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Queue a result to be returned by the next unscripted call.
    pub fn push_result(&self, result: LlmResult<Decision>) {
        self.scripted
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(result);
    }

    /// Total calls to [`decide`](ReasoningBackend::decide).
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of calls observed in flight at once.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ReasoningBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    fn config(&self) -> &LlmConfig {
        &self.config
    }

    async fn decide(&self, observation: &Observation) -> LlmResult<Decision> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if let Some(error) = &self.failure {
            return Err(error.clone());
        }

        let scripted = self
            .scripted
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        match scripted {
            Some(result) => result,
            None => Ok(self.policy.decide(observation)),
        }
    }
}
