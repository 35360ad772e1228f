//! Error taxonomy of the request orchestrator.
//!
//! The orchestrator reports *classes* of failure ([`ErrorClass`]); mapping a
//! class to a transport status is the caller's job.

use std::time::Duration;

use llm_service::{LlmError, LlmProvider};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, OrchestratorError>;

/// Coarse failure category used by transports to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    BadRequest,
    NotFound,
    BadGateway,
    GatewayTimeout,
    Unavailable,
    Internal,
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// No model policy entry for the task type.
    #[error("[Orchestrator] unsupported task type: {0}")]
    UnsupportedTaskType(String),

    /// No prompt template named after the task type.
    #[error("[Orchestrator] no prompt template for task: {0}")]
    PromptNotFound(String),

    #[error("[Orchestrator] model '{0}' is not registered")]
    ModelNotRegistered(String),

    /// Request parameters failed validation.
    #[error("[Orchestrator] invalid request: {0}")]
    InvalidRequest(String),

    #[error("[Orchestrator] {backend} does not support {capability}")]
    UnsupportedCapability {
        backend: LlmProvider,
        capability: &'static str,
    },

    /// The backend failed; `detail` is its flattened cause.
    #[error("[Orchestrator] {backend} provider error: {detail}")]
    LlmProvider { backend: LlmProvider, detail: String },

    #[error("[Orchestrator] generation timed out after {0:?}")]
    Timeout(Duration),

    /// Explicit cache operation failed.
    #[error("[Orchestrator] cache unavailable: {0}")]
    CacheUnavailable(String),

    #[error("[Orchestrator] serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl OrchestratorError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::UnsupportedTaskType(_) | Self::InvalidRequest(_) => ErrorClass::BadRequest,
            Self::UnsupportedCapability { .. } => ErrorClass::BadRequest,
            Self::PromptNotFound(_) | Self::ModelNotRegistered(_) => ErrorClass::NotFound,
            Self::LlmProvider { .. } => ErrorClass::BadGateway,
            Self::Timeout(_) => ErrorClass::GatewayTimeout,
            Self::CacheUnavailable(_) => ErrorClass::Unavailable,
            Self::Serialization(_) => ErrorClass::Internal,
        }
    }

    /// Stable machine-readable code (e.g. `"UNSUPPORTED_TASK_TYPE"`).
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedTaskType(_) => "UNSUPPORTED_TASK_TYPE",
            Self::PromptNotFound(_) => "PROMPT_NOT_FOUND",
            Self::ModelNotRegistered(_) => "MODEL_NOT_REGISTERED",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::UnsupportedCapability { .. } => "UNSUPPORTED_CAPABILITY",
            Self::LlmProvider { .. } => "LLM_PROVIDER_ERROR",
            Self::Timeout(_) => "TIMEOUT",
            Self::CacheUnavailable(_) => "CACHE_UNAVAILABLE",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }
}

impl From<LlmError> for OrchestratorError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::ModelNotRegistered(name) => Self::ModelNotRegistered(name),
            LlmError::Unsupported { backend, capability } => {
                Self::UnsupportedCapability { backend, capability }
            }
            LlmError::Provider(p) => Self::LlmProvider {
                backend: p.backend,
                detail: p.detail(),
            },
            LlmError::Config(c) => Self::InvalidRequest(c.to_string()),
            other => Self::InvalidRequest(other.to_string()),
        }
    }
}
