//! Caller-level timeout and retry around any backend.

use crate::backend::{LlmConfig, LlmError, LlmResult, ReasoningBackend};
use async_trait::async_trait;
use hive_core::decision::Decision;
use hive_core::observation::Observation;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Wraps a backend with a per-call timeout and bounded retries.
///
/// Only transient errors (connection, rate limit, timeout) are retried.
/// The wrapper shares the inner backend's identity so cached decisions stay
/// valid whether or not the guard is in place.
pub struct GuardedBackend {
    inner: Arc<dyn ReasoningBackend>,
    config: LlmConfig,
}

impl GuardedBackend {
    /// Guard `inner` using its own timeout and retry settings.
    pub fn new(inner: Arc<dyn ReasoningBackend>) -> Self {
        let config = inner.config().clone();
        Self { inner, config }
    }

    /// Guard `inner` with explicit settings. The model name is kept from `inner`.
    pub fn with_config(inner: Arc<dyn ReasoningBackend>, config: LlmConfig) -> Self {
        let config = config.with_model(inner.config().model.clone());
        Self { inner, config }
    }

    async fn attempt(&self, observation: &Observation) -> LlmResult<Decision> {
        let timeout = Duration::from_millis(self.config.timeout_ms);
        match tokio::time::timeout(timeout, self.inner.decide(observation)).await {
            Ok(result) => result,
            Err(_) => Err(LlmError::Timeout(self.config.timeout_ms)),
        }
    }
}

#[async_trait]
impl ReasoningBackend for GuardedBackend {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn identity(&self) -> String {
        self.inner.identity()
    }

    async fn decide(&self, observation: &Observation) -> LlmResult<Decision> {
        let mut attempt = 0;
        loop {
            match self.attempt(observation).await {
                Ok(decision) => return Ok(decision),
                Err(e) if e.is_transient() && attempt < self.config.max_retries => {
                    attempt += 1;
                    debug!(
                        "Retrying {} for agent {} (attempt {}): {}",
                        self.inner.name(),
                        observation.agent_id,
                        attempt,
                        e
                    );
                    let backoff = self.config.retry_backoff_ms * attempt as u64;
                    tokio::time::sleep(Duration::from_millis(backoff)).await;
                }
                Err(e) => {
                    warn!(
                        "{} failed for agent {} after {} attempts: {}",
                        self.inner.name(),
                        observation.agent_id,
                        attempt + 1,
                        e
                    );
                    return Err(e);
                }
            }
        }
    }

    async fn health_check(&self) -> LlmResult<bool> {
        self.inner.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBackend;
    use hive_core::decision::Action;
    use hive_core::types::{AgentId, GridPos, Vitals};

    fn obs() -> Observation {
        Observation::solitary(AgentId::from_seed(1), 1, Vitals::full(), GridPos::new(0, 0))
    }

    fn fast() -> LlmConfig {
        LlmConfig::default()
            .with_timeout_ms(50)
            .with_max_retries(2)
            .with_retry_backoff_ms(1)
    }

    #[tokio::test]
    async fn transient_errors_are_retried() {
        let mock = Arc::new(MockBackend::new());
        mock.push_result(Err(LlmError::ConnectionFailed("reset".into())));
        mock.push_result(Ok(Decision::new(Action::Rest)));
        let guarded = GuardedBackend::with_config(mock.clone(), fast());

        let decision = guarded.decide(&obs()).await.unwrap();
        assert_eq!(decision.action, Action::Rest);
        assert_eq!(mock.calls(), 2);
    }

    #[tokio::test]
    async fn permanent_errors_are_not_retried() {
        let mock = Arc::new(MockBackend::new().failing(LlmError::AuthenticationFailed));
        let guarded = GuardedBackend::with_config(mock.clone(), fast());

        assert_eq!(guarded.decide(&obs()).await, Err(LlmError::AuthenticationFailed));
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn slow_calls_time_out() {
        let mock = Arc::new(MockBackend::new().with_latency(Duration::from_millis(500)));
        let guarded = GuardedBackend::with_config(mock.clone(), fast().with_max_retries(0));

        assert_eq!(guarded.decide(&obs()).await, Err(LlmError::Timeout(50)));
    }

    #[test]
    fn identity_is_inherited() {
        let mock = Arc::new(MockBackend::new().with_model("m1"));
        let guarded = GuardedBackend::new(mock);
        assert_eq!(guarded.identity(), "mock:m1");
    }
}
