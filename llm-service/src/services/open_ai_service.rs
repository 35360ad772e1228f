//! OpenAI service for text generation and embeddings.
//!
//! Minimal, non-streaming client around the OpenAI REST API.
//! Endpoints are derived from `LlmModelConfig::endpoint`:
//! - POST {endpoint}/v1/chat/completions — chat completion (non-streaming)
//! - POST {endpoint}/v1/embeddings       — embeddings retrieval
//!
//! Constructor validation:
//! - `cfg.provider` must be `LlmProvider::OpenAI`
//! - `cfg.api_key` must be present
//! - `cfg.endpoint` must start with http:// or https://
//!
//! Errors are normalized into [`ProviderError`] with backend `OpenAI`.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{HttpError, LlmError, ProviderError, ProviderErrorKind, make_snippet},
    generation::GenerationParams,
    provider::{CLIENT_VERSION, ProviderInfo},
};

/// Thin client for the OpenAI API.
///
/// Constructed from a complete [`LlmModelConfig`]. Internally keeps a
/// preconfigured `reqwest::Client` (with timeout and default headers).
///
/// High-level operations:
/// - [`OpenAiService::generate`]   — single, non-streaming chat completion
/// - [`OpenAiService::embeddings`] — single embeddings vector retrieval
#[derive(Debug)]
pub struct OpenAiService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    url_chat: String,
    url_embeddings: String,
}

impl OpenAiService {
    /// Creates a new [`OpenAiService`] from the given config.
    ///
    /// Validates the provider, API key, and endpoint scheme. Builds an HTTP
    /// client with default headers and a configurable timeout.
    ///
    /// # Errors
    /// [`LlmError::Provider`] with `InvalidProvider`, `MissingApiKey`,
    /// `InvalidEndpoint` or `Transport` (client build failure).
    pub fn new(cfg: LlmModelConfig) -> Result<Self, LlmError> {
        // 1) Provider must be OpenAI.
        if cfg.provider != LlmProvider::OpenAI {
            return Err(fail(ProviderErrorKind::InvalidProvider));
        }

        // 2) API key must be present.
        let api_key = cfg
            .api_key
            .clone()
            .ok_or_else(|| fail(ProviderErrorKind::MissingApiKey))?;

        // 3) Endpoint must use http/https.
        let endpoint = cfg.endpoint.trim();
        if endpoint.is_empty()
            || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(fail(ProviderErrorKind::InvalidEndpoint(cfg.endpoint.clone())));
        }

        // 4) HTTP client: timeout + default headers.
        let timeout = Duration::from_secs(cfg.timeout_or_default());

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", api_key)).map_err(|e| {
                fail(ProviderErrorKind::Decode(format!(
                    "invalid API key header: {e}"
                )))
            })?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| fail(ProviderErrorKind::Transport(e.to_string())))?;

        let base = endpoint.trim_end_matches('/').to_string();
        let url_chat = format!("{}/v1/chat/completions", base);
        let url_embeddings = format!("{}/v1/embeddings", base);

        info!(
            provider = %cfg.provider,
            model = %cfg.model,
            endpoint = %cfg.endpoint,
            timeout_secs = cfg.timeout_or_default(),
            "OpenAiService initialized"
        );

        Ok(Self {
            client,
            cfg,
            url_chat,
            url_embeddings,
        })
    }

    /// Model this service is bound to.
    pub fn model(&self) -> &str {
        &self.cfg.model
    }

    /// Static metadata; no network call.
    pub fn describe(&self) -> ProviderInfo {
        ProviderInfo {
            name: LlmProvider::OpenAI.as_str().to_string(),
            model_id: self.cfg.model.clone(),
            family: "GPT".to_string(),
            client_version: CLIENT_VERSION.to_string(),
        }
    }

    /// Performs a **non-streaming** chat completion request (`/v1/chat/completions`).
    ///
    /// Every field of [`GenerationParams`] is forwarded; `extra_params` are
    /// flattened into the request body minus any reserved key. When `n > 1`
    /// the backend returns several choices and only the first is kept.
    ///
    /// # Errors
    /// [`LlmError::Provider`] with `Transport`, `HttpStatus`, `Decode` or `EmptyChoices`.
    #[instrument(skip_all, fields(model = %self.cfg.model))]
    pub async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String, LlmError> {
        let started = Instant::now();
        let body = ChatCompletionRequest::new(&self.cfg.model, prompt, params);

        debug!(
            endpoint = %self.cfg.endpoint,
            prompt_len = prompt.len(),
            n = params.n,
            "POST {}", self.url_chat
        );

        let resp = self
            .client
            .post(&self.url_chat)
            .json(&body)
            .send()
            .await
            .map_err(|e| fail(ProviderErrorKind::Transport(e.to_string())))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let url = self.url_chat.clone();
            let text = resp.text().await.unwrap_or_default();
            let snippet = make_snippet(&text);

            error!(
                %status,
                %url,
                %snippet,
                latency_ms = started.elapsed().as_millis(),
                "OpenAI /v1/chat/completions returned non-success status"
            );

            return Err(fail(ProviderErrorKind::HttpStatus(HttpError {
                status,
                url,
                snippet,
            })));
        }

        let out: ChatCompletionResponse = match resp.json().await {
            Ok(v) => v,
            Err(e) => {
                error!(
                    error = %e,
                    latency_ms = started.elapsed().as_millis(),
                    "failed to decode /v1/chat/completions response"
                );
                return Err(fail(ProviderErrorKind::Decode(format!(
                    "serde error: {e}; expected `choices[0].message.content`"
                ))));
            }
        };

        if out.choices.len() > 1 {
            debug!(choices = out.choices.len(), "multiple choices returned; keeping the first");
        }

        let content = out
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| fail(ProviderErrorKind::EmptyChoices))?;

        info!(
            latency_ms = started.elapsed().as_millis(),
            "chat completion completed"
        );

        Ok(content.trim().to_string())
    }

    /// Retrieves a single embeddings vector via `/v1/embeddings`.
    ///
    /// Uses `cfg.embedding_model` when set, the bound model otherwise.
    ///
    /// # Errors
    /// [`LlmError::Provider`] with `Transport`, `HttpStatus` or `Decode`.
    #[instrument(skip_all, fields(model = %self.cfg.model))]
    pub async fn embeddings(&self, input: &str) -> Result<Vec<f32>, LlmError> {
        let started = Instant::now();
        let model = self
            .cfg
            .embedding_model
            .as_deref()
            .unwrap_or(&self.cfg.model);
        let body = EmbeddingsRequest {
            model,
            input: [input],
        };

        debug!(
            embedding_model = %model,
            input_len = input.len(),
            "POST {}", self.url_embeddings
        );

        let resp = self
            .client
            .post(&self.url_embeddings)
            .json(&body)
            .send()
            .await
            .map_err(|e| fail(ProviderErrorKind::Transport(e.to_string())))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let url = self.url_embeddings.clone();
            let text = resp.text().await.unwrap_or_default();
            let snippet = make_snippet(&text);

            error!(
                %status,
                %url,
                %snippet,
                latency_ms = started.elapsed().as_millis(),
                "OpenAI /v1/embeddings returned non-success status"
            );

            return Err(fail(ProviderErrorKind::HttpStatus(HttpError {
                status,
                url,
                snippet,
            })));
        }

        let out: EmbeddingsResponse = resp.json().await.map_err(|e| {
            fail(ProviderErrorKind::Decode(format!(
                "serde error: {e}; expected `data[0].embedding`"
            )))
        })?;

        let first = out.data.into_iter().next().ok_or_else(|| {
            fail(ProviderErrorKind::Decode(
                "empty `data` in embeddings response".into(),
            ))
        })?;

        info!(
            latency_ms = started.elapsed().as_millis(),
            dims = first.embedding.len(),
            "embeddings completed"
        );

        Ok(first.embedding)
    }
}

fn fail(kind: ProviderErrorKind) -> LlmError {
    ProviderError::new(LlmProvider::OpenAI, kind).into()
}

/* ===========================================================================
HTTP payloads & options
======================================================================== */

/// Request body for `/v1/chat/completions` (non-streaming).
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    n: u32,
    presence_penalty: f32,
    frequency_penalty: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    logit_bias: Option<&'a BTreeMap<String, f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<&'a str>,
    #[serde(flatten)]
    extra: BTreeMap<&'a str, &'a serde_json::Value>,
}

impl<'a> ChatCompletionRequest<'a> {
    fn new(model: &'a str, prompt: &'a str, p: &'a GenerationParams) -> Self {
        Self {
            model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: p.max_tokens,
            temperature: p.temperature,
            top_p: p.top_p,
            n: p.n,
            presence_penalty: p.presence_penalty,
            frequency_penalty: p.frequency_penalty,
            stop: p.stop.as_deref(),
            logit_bias: p.logit_bias.as_ref(),
            user: p.user.as_deref(),
            extra: p.forwardable_extras().collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Minimal response for `/v1/chat/completions`.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageOut,
}

#[derive(Debug, Deserialize)]
struct ChatMessageOut {
    content: Option<String>,
}

/// Request body for `/v1/embeddings`.
#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: [&'a str; 1],
}

/// Response body for `/v1/embeddings`.
#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    embedding: Vec<f32>,
}
