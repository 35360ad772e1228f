//! Canonical response shape, identical for every backend.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const OBJECT_TEXT_COMPLETION: &str = "text_completion";

/// Finish reason reported for every completion; backends' own reasons are not forwarded.
pub const FINISH_REASON_LENGTH: &str = "length";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub text: String,
    pub index: u32,
    pub logprobs: Option<serde_json::Value>,
    pub finish_reason: Option<String>,
}

/// Token accounting. `total_tokens` is always the sum of the other two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawUsage")]
pub struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[derive(Deserialize)]
struct RawUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

impl TryFrom<RawUsage> for Usage {
    type Error = String;

    fn try_from(raw: RawUsage) -> Result<Self, Self::Error> {
        let usage = Self::from_counts(raw.prompt_tokens, raw.completion_tokens);
        if usage.total_tokens != raw.total_tokens {
            return Err(format!(
                "total_tokens {} != prompt_tokens {} + completion_tokens {}",
                raw.total_tokens, raw.prompt_tokens, raw.completion_tokens
            ));
        }
        Ok(usage)
    }
}

impl Usage {
    pub fn from_counts(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
        }
    }

    /// Whitespace-token approximation for both texts.
    pub fn estimate(prompt: &str, completion: &str) -> Self {
        Self::from_counts(count_tokens(prompt), count_tokens(completion))
    }

    pub fn prompt_tokens(&self) -> u32 {
        self.prompt_tokens
    }

    pub fn completion_tokens(&self) -> u32 {
        self.completion_tokens
    }

    pub fn total_tokens(&self) -> u32 {
        self.total_tokens
    }
}

/// Number of whitespace-separated words.
pub fn count_tokens(text: &str) -> u32 {
    u32::try_from(text.split_whitespace().count()).unwrap_or(u32::MAX)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub id: String,
    pub object: String,
    /// Unix seconds.
    pub created: i64,
    pub model: String,
    pub choices: Vec<Choice>,
    pub usage: Usage,
}

impl GenerationResponse {
    /// Wraps one completion of `prompt` into the canonical shape.
    pub fn from_completion(model: &str, prompt: &str, completion: String) -> Self {
        let usage = Usage::estimate(prompt, &completion);
        Self {
            id: format!("cmpl-{}", Uuid::new_v4()),
            object: OBJECT_TEXT_COMPLETION.to_string(),
            created: chrono::Utc::now().timestamp(),
            model: model.to_string(),
            choices: vec![Choice {
                text: completion,
                index: 0,
                logprobs: None,
                finish_reason: Some(FINISH_REASON_LENGTH.to_string()),
            }],
            usage,
        }
    }

    /// Text of the first choice.
    pub fn text(&self) -> &str {
        self.choices.first().map(|c| c.text.as_str()).unwrap_or_default()
    }
}
