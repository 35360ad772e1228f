//! Validated generation request.

use llm_service::GenerationParams;
use serde::Serialize;

use crate::error::{OrchestratorError, Result};

/// Formatted prompt + model + parameters. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest {
    prompt: String,
    model: String,
    params: GenerationParams,
}

impl GenerationRequest {
    /// # Errors
    /// [`OrchestratorError::InvalidRequest`] for an empty model name or any
    /// parameter outside its range.
    pub fn new(
        prompt: impl Into<String>,
        model: impl Into<String>,
        params: GenerationParams,
    ) -> Result<Self> {
        let model = model.into();
        if model.trim().is_empty() {
            return Err(OrchestratorError::InvalidRequest("model must not be empty".into()));
        }
        params
            .validate()
            .map_err(|e| OrchestratorError::InvalidRequest(e.to_string()))?;
        Ok(Self {
            prompt: prompt.into(),
            model,
            params,
        })
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn params(&self) -> &GenerationParams {
        &self.params
    }
}
