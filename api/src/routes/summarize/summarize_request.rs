use serde::Deserialize;

pub const DEFAULT_MAX_LENGTH: u32 = 100;

/// Request payload for /summarize.
#[derive(Debug, Deserialize)]
pub struct SummarizeRequest {
    /// Text to summarize.
    pub text: String,
    /// Target summary length in words.
    #[serde(default = "default_max_length")]
    pub max_length: u32,
}

fn default_max_length() -> u32 {
    DEFAULT_MAX_LENGTH
}
