use std::fmt;

use serde::{Deserialize, Serialize};

/// Represents the provider (backend) used for large language model (LLM) inference.
///
/// This enum distinguishes between the supported hosted APIs:
/// OpenAI (completion + embeddings) and Anthropic (completion only).
///
/// # Examples
///
/// ```
/// use llm_service::config::llm_provider::LlmProvider;
///
/// fn print_provider(provider: LlmProvider) {
///     match provider {
///         LlmProvider::OpenAI => println!("Using OpenAI API"),
///         LlmProvider::Anthropic => println!("Using Anthropic API"),
///     }
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LlmProvider {
    /// OpenAI's chat completion and embeddings API.
    OpenAI,
    /// Anthropic's messages API. Has no embeddings endpoint.
    Anthropic,
}

impl LlmProvider {
    /// Stable display name, also used as `describe().name`.
    pub fn as_str(self) -> &'static str {
        match self {
            LlmProvider::OpenAI => "OpenAI",
            LlmProvider::Anthropic => "Anthropic",
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
