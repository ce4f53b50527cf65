//! Remote decision service over HTTP.
//!
//! Requires the `http` feature. The endpoint receives the raw observation and
//! answers with a [`Decision`]; turning the observation into a prompt is the
//! service's business.

use crate::backend::{LlmConfig, LlmError, LlmResult, ReasoningBackend};
use async_trait::async_trait;
use hive_core::decision::Decision;
use hive_core::observation::Observation;
use serde::Serialize;

/// Request body sent to the decision endpoint.
#[derive(Debug, Serialize)]
struct DecisionRequest<'a> {
    identity: String,
    model: &'a str,
    observation: &'a Observation,
}

/// HTTP backend for a remote decision service.
///
/// # Example
///
/// ```rust,ignore
/// use hive_llm::{HttpBackend, ReasoningBackend};
///
/// let backend = HttpBackend::new("http://localhost:8088/decide")?;
/// let decision = backend.decide(&observation).await?;
/// ```
pub struct HttpBackend {
    endpoint: String,
    api_key: Option<String>,
    config: LlmConfig,
    client: reqwest::Client,
}

impl HttpBackend {
    /// Create a backend for `endpoint` with default config.
    pub fn new(endpoint: &str) -> LlmResult<Self> {
        Self::with_config(endpoint, LlmConfig::default())
    }

    /// Create with custom config.
    pub fn with_config(endpoint: &str, config: LlmConfig) -> LlmResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| LlmError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: None,
            config,
            client,
        })
    }

    /// Create from `HIVE_DECISION_URL` and optional `HIVE_DECISION_KEY`.
    pub fn from_env() -> LlmResult<Self> {
        let endpoint = std::env::var("HIVE_DECISION_URL")
            .map_err(|_| LlmError::ConnectionFailed("HIVE_DECISION_URL not set".to_string()))?;
        let mut backend = Self::new(&endpoint)?;
        backend.api_key = std::env::var("HIVE_DECISION_KEY").ok();
        Ok(backend)
    }

    /// Set a bearer token.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the model.
    pub fn with_model(mut self, model: &str) -> Self {
        self.config.model = model.to_string();
        self
    }
}

#[async_trait]
impl ReasoningBackend for HttpBackend {
    fn name(&self) -> &str {
        "http"
    }

    fn config(&self) -> &LlmConfig {
        &self.config
    }

    async fn decide(&self, observation: &Observation) -> LlmResult<Decision> {
        let request = DecisionRequest {
            identity: self.identity(),
            model: &self.config.model,
            observation,
        };

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_connect() {
                LlmError::ConnectionFailed(format!("Cannot connect to {}", self.endpoint))
            } else if e.is_timeout() {
                LlmError::Timeout(self.config.timeout_ms)
            } else {
                LlmError::ApiError(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u32>().ok());
            let body = response.text().await.unwrap_or_default();

            return Err(match status.as_u16() {
                401 | 403 => LlmError::AuthenticationFailed,
                429 => LlmError::RateLimited(retry_after.unwrap_or(60)),
                _ => LlmError::ApiError(format!("Decision service error {}: {}", status, body)),
            });
        }

        response
            .json::<Decision>()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))
    }

    async fn health_check(&self) -> LlmResult<bool> {
        match self.client.head(&self.endpoint).send().await {
            Ok(_) => Ok(true),
            Err(e) if e.is_connect() => Ok(false),
            Err(e) => Err(LlmError::ApiError(e.to_string())),
        }
    }
}
