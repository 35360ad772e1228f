//! Per-request generation parameters shared by every backend.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error_handler::{
    ConfigError, Result, validate_range_f32, validate_stop_sequences,
};

/// Request-body fields owned by the gateway; `extra_params` may not set them.
pub const RESERVED_PARAMS: &[&str] = &[
    "model",
    "messages",
    "prompt",
    "system",
    "stream",
    "max_tokens",
    "temperature",
    "top_p",
    "n",
    "stop",
    "stop_sequences",
    "presence_penalty",
    "frequency_penalty",
    "logit_bias",
    "user",
];

/// Tuning knobs for one generation call.
///
/// Maps are ordered (`BTreeMap`) so that serializing the same parameters
/// always yields the same bytes; cache keys depend on it.
///
/// Backends map what they support and ignore the rest (see each service).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    /// Maximum number of tokens to generate (≥ 1).
    pub max_tokens: u32,
    /// Sampling temperature in `[0, 1]`.
    pub temperature: f32,
    /// Nucleus sampling cutoff in `[0, 1]`.
    pub top_p: f32,
    /// Completions requested from the backend (≥ 1). Only the first is kept.
    pub n: u32,
    /// Up to 4 stop sequences.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
    /// In `[-2, 2]`.
    pub presence_penalty: f32,
    /// In `[-2, 2]`.
    pub frequency_penalty: f32,
    /// Token id → bias.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logit_bias: Option<BTreeMap<String, f32>>,
    /// End-user identifier forwarded to backends that accept one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Open bag of model-specific parameters. Keys in [`RESERVED_PARAMS`]
    /// are rejected by [`GenerationParams::validate`].
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_params: BTreeMap<String, serde_json::Value>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_tokens: 100,
            temperature: 0.7,
            top_p: 1.0,
            n: 1,
            stop: None,
            presence_penalty: 0.0,
            frequency_penalty: 0.0,
            logit_bias: None,
            user: None,
            extra_params: BTreeMap::new(),
        }
    }
}

impl GenerationParams {
    /// Checks every range constraint.
    ///
    /// # Errors
    /// [`ConfigError::OutOfRange`], [`ConfigError::InvalidStopSequence`] or
    /// [`ConfigError::ReservedParam`]
    /// wrapped in [`crate::error_handler::LlmError::Config`].
    pub fn validate(&self) -> Result<()> {
        if self.max_tokens < 1 {
            return Err(ConfigError::OutOfRange {
                field: "max_tokens",
                detail: "expected >= 1",
            }
            .into());
        }
        if self.n < 1 {
            return Err(ConfigError::OutOfRange {
                field: "n",
                detail: "expected >= 1",
            }
            .into());
        }
        validate_range_f32("temperature", "expected 0.0..=1.0", self.temperature, 0.0, 1.0)?;
        validate_range_f32("top_p", "expected 0.0..=1.0", self.top_p, 0.0, 1.0)?;
        validate_range_f32(
            "presence_penalty",
            "expected -2.0..=2.0",
            self.presence_penalty,
            -2.0,
            2.0,
        )?;
        validate_range_f32(
            "frequency_penalty",
            "expected -2.0..=2.0",
            self.frequency_penalty,
            -2.0,
            2.0,
        )?;
        if let Some(stop) = &self.stop {
            validate_stop_sequences(stop)?;
        }
        if let Some(key) = self.reserved_extra_keys().next() {
            return Err(ConfigError::ReservedParam(key.to_string()).into());
        }
        Ok(())
    }

    /// `extra_params` entries that do not collide with a gateway-owned field.
    pub fn forwardable_extras(&self) -> impl Iterator<Item = (&str, &serde_json::Value)> {
        self.extra_params
            .iter()
            .filter(|(k, _)| !RESERVED_PARAMS.contains(&k.as_str()))
            .map(|(k, v)| (k.as_str(), v))
    }

    fn reserved_extra_keys(&self) -> impl Iterator<Item = &str> {
        self.extra_params
            .keys()
            .map(String::as_str)
            .filter(|k| RESERVED_PARAMS.contains(k))
    }
}
