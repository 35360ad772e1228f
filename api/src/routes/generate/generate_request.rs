use llm_service::GenerationParams;
use serde::Deserialize;

/// Request payload for /generate.
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    /// Free-form prompt text.
    pub prompt: String,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub top_p: Option<f32>,
    #[serde(default)]
    pub n: Option<u32>,
    #[serde(default)]
    pub stop: Option<Vec<String>>,
    #[serde(default)]
    pub presence_penalty: Option<f32>,
    #[serde(default)]
    pub frequency_penalty: Option<f32>,
}

impl GenerateRequest {
    /// Defaults overridden by whatever the client supplied.
    pub fn params(&self) -> GenerationParams {
        let d = GenerationParams::default();
        GenerationParams {
            max_tokens: self.max_tokens.unwrap_or(d.max_tokens),
            temperature: self.temperature.unwrap_or(d.temperature),
            top_p: self.top_p.unwrap_or(d.top_p),
            n: self.n.unwrap_or(d.n),
            stop: self.stop.clone(),
            presence_penalty: self.presence_penalty.unwrap_or(d.presence_penalty),
            frequency_penalty: self.frequency_penalty.unwrap_or(d.frequency_penalty),
            ..d
        }
    }
}
