use crate::config::llm_provider::LlmProvider;

/// Configuration for one provider instance bound to one model.
///
/// Generation knobs (temperature, max tokens, ...) are per request and live in
/// [`crate::generation::GenerationParams`]; this struct only carries what a
/// backend needs to be constructed.
///
/// # Examples
///
/// ```
/// use llm_service::config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};
///
/// let cfg = LlmModelConfig {
///     provider: LlmProvider::OpenAI,
///     model: "gpt-4".to_string(),
///     endpoint: "https://api.openai.com".to_string(),
///     api_key: Some("sk-...".to_string()),
///     embedding_model: None,
///     timeout_secs: Some(30),
/// };
/// assert_eq!(cfg.timeout_or_default(), 30);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmModelConfig {
    /// The LLM provider/backend.
    pub provider: LlmProvider,

    /// Model identifier string (e.g., `"gpt-4"`, `"claude-v1"`).
    pub model: String,

    /// API base URL without the versioned path (e.g., `https://api.openai.com`).
    pub endpoint: String,

    /// API key for authentication.
    pub api_key: Option<String>,

    /// Model used for embeddings, when the backend supports them.
    pub embedding_model: Option<String>,

    /// Optional request timeout (in seconds).
    pub timeout_secs: Option<u64>,
}

impl LlmModelConfig {
    /// Default HTTP timeout when none is configured.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

    pub fn timeout_or_default(&self) -> u64 {
        self.timeout_secs.unwrap_or(Self::DEFAULT_TIMEOUT_SECS)
    }
}
