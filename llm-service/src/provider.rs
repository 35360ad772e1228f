//! One capability surface over every backend: `generate`, `embed`, `describe`.
//!
//! [`Provider`] is a closed, tagged set of backends. Each method dispatches by
//! `match`, so adding a backend means adding a variant and handling it here.

use serde::{Deserialize, Serialize};

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::LlmError,
    generation::GenerationParams,
    services::{anthropic_service::AnthropicService, open_ai_service::OpenAiService},
};

/// Version string reported in [`ProviderInfo::client_version`].
pub const CLIENT_VERSION: &str = concat!("llm-service/", env!("CARGO_PKG_VERSION"));

/// Static provider metadata returned by [`Provider::describe`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Backend display name (e.g. `"OpenAI"`).
    pub name: String,
    /// Model identifier the provider is bound to.
    pub model_id: String,
    /// Model family (e.g. `"GPT"`, `"Claude"`).
    pub family: String,
    /// Version of the client talking to the backend.
    pub client_version: String,
}

/// A constructed backend bound to one model.
#[derive(Debug)]
pub enum Provider {
    /// General completion + embedding backend.
    OpenAi(OpenAiService),
    /// Completion-only backend.
    Anthropic(AnthropicService),
}

impl Provider {
    /// Builds the backend selected by `cfg.provider`.
    ///
    /// # Errors
    /// Whatever the backend constructor reports (missing key, bad endpoint, ...).
    pub fn from_config(cfg: LlmModelConfig) -> Result<Self, LlmError> {
        match cfg.provider {
            LlmProvider::OpenAI => OpenAiService::new(cfg).map(Provider::OpenAi),
            LlmProvider::Anthropic => AnthropicService::new(cfg).map(Provider::Anthropic),
        }
    }

    /// Which backend this is.
    pub fn backend(&self) -> LlmProvider {
        match self {
            Provider::OpenAi(_) => LlmProvider::OpenAI,
            Provider::Anthropic(_) => LlmProvider::Anthropic,
        }
    }

    /// Model id the provider was built for.
    pub fn model(&self) -> &str {
        match self {
            Provider::OpenAi(s) => s.model(),
            Provider::Anthropic(s) => s.model(),
        }
    }

    /// Generates one trimmed completion for `prompt`.
    ///
    /// `n > 1` is forwarded to backends that accept it, but the result is
    /// always the first completion only.
    ///
    /// # Errors
    /// [`LlmError::Provider`] on any backend failure.
    pub async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String, LlmError> {
        match self {
            Provider::OpenAi(s) => s.generate(prompt, params).await,
            Provider::Anthropic(s) => s.generate(prompt, params).await,
        }
    }

    /// Computes an embedding vector for `text`.
    ///
    /// # Errors
    /// - [`LlmError::Unsupported`] for backends without an embeddings endpoint
    /// - [`LlmError::Provider`] on any backend failure
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        match self {
            Provider::OpenAi(s) => s.embeddings(text).await,
            Provider::Anthropic(_) => Err(LlmError::Unsupported {
                backend: LlmProvider::Anthropic,
                capability: "embeddings",
            }),
        }
    }

    /// Static metadata; never touches the network.
    pub fn describe(&self) -> ProviderInfo {
        match self {
            Provider::OpenAi(s) => s.describe(),
            Provider::Anthropic(s) => s.describe(),
        }
    }
}
