//! Default provider configs loaded from environment variables.
//!
//! [`ProviderSettings::from_env`] reads every provider-related variable once at
//! startup; registry factories then derive a per-model [`LlmModelConfig`] from
//! the captured settings, so the environment is never re-read on the request path.
//!
//! # Environment variables
//!
//! Common:
//! - `LLM_TIMEOUT_SECS` = optional HTTP timeout (u64, default 60)
//!
//! OpenAI:
//! - `OPENAI_API_KEY`          = API key (required to build OpenAI providers)
//! - `OPENAI_API_BASE`         = base URL (default `https://api.openai.com`)
//! - `OPENAI_EMBEDDING_MODEL`  = embeddings model (default `text-embedding-ada-002`)
//!
//! Anthropic:
//! - `ANTHROPIC_API_KEY`  = API key (required to build Anthropic providers)
//! - `ANTHROPIC_API_BASE` = base URL (default `https://api.anthropic.com`)

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{LlmError, env_opt, env_opt_u64, env_or, validate_http_endpoint},
};

pub const DEFAULT_OPENAI_BASE: &str = "https://api.openai.com";
pub const DEFAULT_ANTHROPIC_BASE: &str = "https://api.anthropic.com";
pub const DEFAULT_OPENAI_EMBEDDING_MODEL: &str = "text-embedding-ada-002";

/// Logical model names served by OpenAI out of the box.
pub const OPENAI_MODELS: &[&str] = &["gpt-3.5-turbo", "gpt-4"];

/// Logical model names served by Anthropic out of the box.
pub const ANTHROPIC_MODELS: &[&str] = &["claude-v1", "claude-3-haiku-20240307"];

/// Provider credentials and endpoints captured once from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    pub openai_api_key: Option<String>,
    pub openai_base: String,
    pub openai_embedding_model: String,
    pub anthropic_api_key: Option<String>,
    pub anthropic_base: String,
    pub timeout_secs: Option<u64>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_base: DEFAULT_OPENAI_BASE.to_string(),
            openai_embedding_model: DEFAULT_OPENAI_EMBEDDING_MODEL.to_string(),
            anthropic_api_key: None,
            anthropic_base: DEFAULT_ANTHROPIC_BASE.to_string(),
            timeout_secs: None,
        }
    }
}

impl ProviderSettings {
    /// Reads provider settings from the environment.
    ///
    /// Missing API keys are not an error here: the affected models fail at
    /// resolution time with `MissingApiKey`, which keeps the other backend usable.
    ///
    /// # Errors
    /// - [`crate::error_handler::ConfigError::InvalidNumber`] if `LLM_TIMEOUT_SECS` is invalid
    /// - [`crate::error_handler::ConfigError::InvalidFormat`] if a base URL is not http/https
    pub fn from_env() -> Result<Self, LlmError> {
        let openai_base = env_or("OPENAI_API_BASE", DEFAULT_OPENAI_BASE);
        validate_http_endpoint("OPENAI_API_BASE", &openai_base)?;
        let anthropic_base = env_or("ANTHROPIC_API_BASE", DEFAULT_ANTHROPIC_BASE);
        validate_http_endpoint("ANTHROPIC_API_BASE", &anthropic_base)?;

        Ok(Self {
            openai_api_key: env_opt("OPENAI_API_KEY"),
            openai_base,
            openai_embedding_model: env_or(
                "OPENAI_EMBEDDING_MODEL",
                DEFAULT_OPENAI_EMBEDDING_MODEL,
            ),
            anthropic_api_key: env_opt("ANTHROPIC_API_KEY"),
            anthropic_base,
            timeout_secs: env_opt_u64("LLM_TIMEOUT_SECS")?,
        })
    }

    /// Config for an OpenAI-served model.
    pub fn openai_config(&self, model: &str) -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::OpenAI,
            model: model.to_string(),
            endpoint: self.openai_base.clone(),
            api_key: self.openai_api_key.clone(),
            embedding_model: Some(self.openai_embedding_model.clone()),
            timeout_secs: self.timeout_secs,
        }
    }

    /// Config for an Anthropic-served model.
    pub fn anthropic_config(&self, model: &str) -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::Anthropic,
            model: model.to_string(),
            endpoint: self.anthropic_base.clone(),
            api_key: self.anthropic_api_key.clone(),
            embedding_model: None,
            timeout_secs: self.timeout_secs,
        }
    }

    /// Config for `model`, picking the backend from its name.
    pub fn config_for(&self, model: &str) -> Option<LlmModelConfig> {
        match backend_for_model(model)? {
            LlmProvider::OpenAI => Some(self.openai_config(model)),
            LlmProvider::Anthropic => Some(self.anthropic_config(model)),
        }
    }
}

/// Guesses the backend serving a model from its naming scheme.
///
/// Known names win; otherwise `claude*` maps to Anthropic and `gpt-*`,
/// `text-*` and `o1*`/`o3*` map to OpenAI.
pub fn backend_for_model(model: &str) -> Option<LlmProvider> {
    if OPENAI_MODELS.contains(&model) {
        return Some(LlmProvider::OpenAI);
    }
    if ANTHROPIC_MODELS.contains(&model) {
        return Some(LlmProvider::Anthropic);
    }
    let m = model.to_ascii_lowercase();
    if m.starts_with("claude") {
        Some(LlmProvider::Anthropic)
    } else if ["gpt-", "text-", "o1", "o3"].iter().any(|p| m.starts_with(p)) {
        Some(LlmProvider::OpenAI)
    } else {
        None
    }
}
