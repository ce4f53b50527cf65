//! Error types for the persistence seam.
//!
//! Death is not an error: it is reported through `NeedsOutcome::died`.

use crate::types::AgentId;
use thiserror::Error;

/// Failures reported by an [`AgentStore`](crate::store::AgentStore).
///
/// These are never caught by the needs engine; they propagate to the caller.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    #[error("Agent not found: {0}")]
    AgentNotFound(AgentId),

    #[error("Agent {0} is dead")]
    AgentDead(AgentId),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Write rejected: {0}")]
    Rejected(String),
}

/// Result type for persistence operations.
pub type StoreResult<T> = Result<T, StoreError>;
