//! Request pipeline: policy → provider → prompt → request → cache → generate.
//!
//! Every step that can reject a request (unknown task, unregistered model,
//! missing template, invalid parameters) runs before any cache or provider
//! I/O. Cache failures never fail a generation; they are logged and treated
//! as a miss.

use std::{sync::Arc, time::Duration};

use llm_service::{GenerationParams, ModelRegistry, Provider, ProviderInfo};
use prompt_store::{PromptStore, Variables};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::{
    cache::{ResponseCache, cache_key},
    chain::{ChainValues, PromptChain},
    config::OrchestratorConfig,
    domain::{GenerationRequest, GenerationResponse},
    error::{OrchestratorError, Result},
    policy::ModelPolicy,
};

/// Placeholder that always receives the caller's input text.
pub const INPUT_TEXT_VAR: &str = "input_text";

/// Per-call options: extra template variables and generation parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskOptions {
    pub variables: Variables,
    pub params: GenerationParams,
}

impl TaskOptions {
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }
}

/// Registered model name with its provider metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelListing {
    pub name: String,
    #[serde(flatten)]
    pub info: ProviderInfo,
}

/// Routes tasks to models and assembles canonical responses.
///
/// Stateless across requests; share it behind an `Arc`.
pub struct Orchestrator {
    registry: Arc<ModelRegistry>,
    prompts: Arc<PromptStore>,
    cache: Arc<dyn ResponseCache>,
    policy: ModelPolicy,
    cache_ttl: Duration,
    request_timeout: Option<Duration>,
}

impl Orchestrator {
    /// Uses the tiered policy built from `config`'s model names.
    pub fn new(
        registry: Arc<ModelRegistry>,
        prompts: Arc<PromptStore>,
        cache: Arc<dyn ResponseCache>,
        config: &OrchestratorConfig,
    ) -> Self {
        Self {
            registry,
            prompts,
            cache,
            policy: ModelPolicy::tiered(&config.fast_model, &config.quality_model),
            cache_ttl: config.cache_ttl,
            request_timeout: config.request_timeout,
        }
    }

    pub fn with_policy(mut self, policy: ModelPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &ModelPolicy {
        &self.policy
    }

    /// Runs one task end to end.
    ///
    /// # Errors
    /// - [`OrchestratorError::UnsupportedTaskType`] / [`OrchestratorError::ModelNotRegistered`]
    ///   / [`OrchestratorError::PromptNotFound`] / [`OrchestratorError::InvalidRequest`]
    ///   before any I/O
    /// - [`OrchestratorError::LlmProvider`] when the backend fails
    /// - [`OrchestratorError::Timeout`] when the configured limit elapses
    #[instrument(skip_all, fields(task_type = %task_type))]
    pub async fn process_request(
        &self,
        task_type: &str,
        input_text: &str,
        options: &TaskOptions,
    ) -> Result<GenerationResponse> {
        let model = self.select_model(task_type)?;
        let provider = self.registry.resolve(model).await?;
        let request = self.build_request(task_type, model, input_text, options)?;
        let key = cache_key(task_type, request.prompt(), request.model(), request.params())?;

        if let Some(hit) = self.cached(&key).await {
            info!(model, "served from cache");
            return Ok(hit);
        }

        let started = std::time::Instant::now();
        let completion = self.generate(&provider, &request).await?;
        let response = GenerationResponse::from_completion(request.model(), request.prompt(), completion);
        info!(
            model,
            elapsed_ms = started.elapsed().as_millis() as u64,
            total_tokens = response.usage.total_tokens(),
            "generation complete"
        );

        self.store(&key, &response).await?;
        Ok(response)
    }

    /// Every registered model that can be constructed, with its metadata.
    ///
    /// Models whose provider fails to build (e.g. missing API key) are skipped.
    pub async fn list_models(&self) -> Vec<ModelListing> {
        let mut out = Vec::new();
        for name in self.registry.list_registered().await {
            match self.registry.resolve(&name).await {
                Ok(p) => out.push(ModelListing {
                    info: p.describe(),
                    name,
                }),
                Err(e) => warn!(model = %name, error = %e, "model cannot be constructed"),
            }
        }
        out
    }

    /// Embeds `text` with the named model.
    ///
    /// # Errors
    /// [`OrchestratorError::UnsupportedCapability`] for completion-only backends,
    /// otherwise the same taxonomy as [`Self::process_request`].
    #[instrument(skip_all, fields(model = %model))]
    pub async fn embed(&self, model: &str, text: &str) -> Result<Vec<f32>> {
        let provider = self.registry.resolve(model).await?;
        Ok(provider.embed(text).await?)
    }

    /// Runs `chain` once: formats its template with `inputs`, generates with its
    /// model and returns the chain's output map. Not cached.
    ///
    /// # Errors
    /// [`OrchestratorError::InvalidRequest`] for a missing declared input or bad
    /// chain params, [`OrchestratorError::PromptNotFound`] /
    /// [`OrchestratorError::ModelNotRegistered`] before any I/O, then the
    /// provider and timeout errors of [`Self::process_request`].
    #[instrument(skip_all, fields(chain = %chain.name()))]
    pub async fn run_chain(&self, chain: &PromptChain, inputs: &ChainValues) -> Result<ChainValues> {
        chain.check_inputs(inputs)?;
        let template = self
            .prompts
            .get(chain.template(), None)
            .ok_or_else(|| OrchestratorError::PromptNotFound(chain.template().to_string()))?;
        let provider = self.registry.resolve(chain.model()).await?;
        let request = GenerationRequest::new(template.format(inputs), chain.model(), chain.params().clone())?;

        let completion = self.generate(&provider, &request).await?;
        debug!(model = chain.model(), "chain complete");
        Ok(chain.outputs(completion))
    }

    /// Drops the cached response for the given task inputs, if any.
    ///
    /// # Errors
    /// Same pre-I/O errors as [`Self::process_request`], plus
    /// [`OrchestratorError::CacheUnavailable`] when the delete fails.
    pub async fn invalidate(&self, task_type: &str, input_text: &str, options: &TaskOptions) -> Result<()> {
        let model = self.select_model(task_type)?;
        let request = self.build_request(task_type, model, input_text, options)?;
        let key = cache_key(task_type, request.prompt(), request.model(), request.params())?;
        self.cache
            .delete(&key)
            .await
            .map_err(|e| OrchestratorError::CacheUnavailable(e.to_string()))?;
        debug!(task_type, "cache entry invalidated");
        Ok(())
    }

    fn select_model(&self, task_type: &str) -> Result<&str> {
        self.policy
            .select(task_type)
            .ok_or_else(|| OrchestratorError::UnsupportedTaskType(task_type.to_string()))
    }

    fn build_request(
        &self,
        task_type: &str,
        model: &str,
        input_text: &str,
        options: &TaskOptions,
    ) -> Result<GenerationRequest> {
        let template = self
            .prompts
            .get(task_type, None)
            .ok_or_else(|| OrchestratorError::PromptNotFound(task_type.to_string()))?;

        let mut vars = options.variables.clone();
        vars.insert(INPUT_TEXT_VAR.to_string(), input_text.to_string());
        let prompt = template.format(&vars);
        debug!(template = %template.key(), prompt_len = prompt.len(), "prompt formatted");

        GenerationRequest::new(prompt, model, options.params.clone())
    }

    async fn cached(&self, key: &str) -> Option<GenerationResponse> {
        match self.cache.get(key).await {
            Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
                Ok(resp) => Some(resp),
                Err(e) => {
                    warn!(error = %e, "discarding undecodable cache entry");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "cache read failed; treating as miss");
                None
            }
        }
    }

    async fn store(&self, key: &str, response: &GenerationResponse) -> Result<()> {
        let bytes = serde_json::to_vec(response)?;
        if let Err(e) = self.cache.set(key, bytes, self.cache_ttl).await {
            warn!(error = %e, "cache write failed");
        }
        Ok(())
    }

    async fn generate(&self, provider: &Provider, request: &GenerationRequest) -> Result<String> {
        let call = provider.generate(request.prompt(), request.params());
        let text = match self.request_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| OrchestratorError::Timeout(limit))??,
            None => call.await?,
        };
        Ok(text)
    }
}
