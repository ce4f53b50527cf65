//! Core reasoning backend trait.

use async_trait::async_trait;
use hive_core::decision::Decision;
use hive_core::observation::Observation;
use thiserror::Error;

/// Reasoning-service errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LlmError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Rate limited: retry after {0} seconds")]
    RateLimited(u32),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("Timeout after {0} ms")]
    Timeout(u64),
}

impl LlmError {
    /// Whether a retry has a chance of succeeding.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LlmError::ConnectionFailed(_) | LlmError::RateLimited(_) | LlmError::Timeout(_)
        )
    }
}

/// Result type for reasoning calls.
pub type LlmResult<T> = Result<T, LlmError>;

/// Configuration for reasoning requests.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    /// Model name/identifier. Part of the backend identity.
    pub model: String,
    /// Per-call timeout in milliseconds.
    pub timeout_ms: u64,
    /// Extra attempts after a transient failure.
    pub max_retries: u32,
    /// Pause before each retry, multiplied by the attempt number.
    pub retry_backoff_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "default".to_string(),
            timeout_ms: 30_000,
            max_retries: 2,
            retry_backoff_ms: 250,
        }
    }
}

impl LlmConfig {
    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set timeout.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set retry count.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set retry backoff.
    pub fn with_retry_backoff_ms(mut self, backoff_ms: u64) -> Self {
        self.retry_backoff_ms = backoff_ms;
        self
    }
}

/// A service that picks an agent's next action.
///
/// Latency is unbounded and the service is a black box. Implementations do
/// not retry internally; see [`GuardedBackend`](crate::GuardedBackend).
#[async_trait]
pub trait ReasoningBackend: Send + Sync {
    /// Get the backend name.
    fn name(&self) -> &str;

    /// Get the current configuration.
    fn config(&self) -> &LlmConfig;

    /// Identity used to partition cached decisions.
    ///
    /// Two backends with different identities never share cache entries.
    fn identity(&self) -> String {
        format!("{}:{}", self.name(), self.config().model)
    }

    /// Decide the next action for an observation.
    async fn decide(&self, observation: &Observation) -> LlmResult<Decision>;

    /// Check if the backend is available.
    async fn health_check(&self) -> LlmResult<bool> {
        Ok(true)
    }
}
