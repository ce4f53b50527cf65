//! # Hive LLM
//!
//! The reasoning-service seam for Hive simulations.
//!
//! The tick pipeline only needs one thing from a reasoning service: given an
//! observation, return a decision or fail. This crate defines that contract
//! ([`ReasoningBackend`]), a caller-level timeout/retry wrapper
//! ([`GuardedBackend`]), a deterministic fallback policy, and a scriptable
//! [`MockBackend`] for tests and offline runs.
//!
//! ## Features
//!
//! - `http`: [`HttpBackend`] for a remote decision endpoint
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hive_llm::{GuardedBackend, MockBackend, ReasoningBackend};
//! use std::sync::Arc;
//!
//! let backend = GuardedBackend::new(Arc::new(MockBackend::new()));
//! let decision = backend.decide(&observation).await?;
//! ```

mod backend;
mod guarded;
mod mock;
mod policy;

pub use backend::{LlmConfig, LlmError, LlmResult, ReasoningBackend};
pub use guarded::GuardedBackend;
pub use mock::MockBackend;
pub use policy::{heuristic_decision, HeuristicPolicy};

#[cfg(feature = "http")]
mod http;
#[cfg(feature = "http")]
pub use http::HttpBackend;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{GuardedBackend, LlmConfig, LlmError, LlmResult, MockBackend, ReasoningBackend};
    pub use crate::{heuristic_decision, HeuristicPolicy};

    #[cfg(feature = "http")]
    pub use crate::HttpBackend;
}
