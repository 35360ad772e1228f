//! Environment-driven orchestrator settings.

use std::time::Duration;

use llm_service::error_handler::{Result, env_opt_u64, env_or};

pub const DEFAULT_FAST_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_QUALITY_MODEL: &str = "gpt-4";
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Model for cheap, latency-sensitive tasks.
    pub fast_model: String,
    /// Model for tasks that need stronger reasoning.
    pub quality_model: String,
    pub cache_ttl: Duration,
    /// Upper bound on one provider call; `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            fast_model: DEFAULT_FAST_MODEL.to_string(),
            quality_model: DEFAULT_QUALITY_MODEL.to_string(),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            request_timeout: None,
        }
    }
}

impl OrchestratorConfig {
    /// Reads `LLM_FAST_MODEL`, `LLM_QUALITY_MODEL`, `CACHE_TTL_SECS` and
    /// `LLM_REQUEST_TIMEOUT_SECS`.
    ///
    /// # Errors
    /// [`llm_service::LlmError::Config`] when a numeric variable does not parse.
    pub fn from_env() -> Result<Self> {
        let ttl = env_opt_u64("CACHE_TTL_SECS")?.unwrap_or(DEFAULT_CACHE_TTL_SECS);
        let timeout = env_opt_u64("LLM_REQUEST_TIMEOUT_SECS")?
            .filter(|s| *s > 0)
            .map(Duration::from_secs);

        Ok(Self {
            fast_model: env_or("LLM_FAST_MODEL", DEFAULT_FAST_MODEL),
            quality_model: env_or("LLM_QUALITY_MODEL", DEFAULT_QUALITY_MODEL),
            cache_ttl: Duration::from_secs(ttl),
            request_timeout: timeout,
        })
    }
}
