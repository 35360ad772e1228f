//! Lightweight Anthropic service for text generation.
//!
//! This module implements a thin client for the Anthropic messages API:
//! - `POST {endpoint}/v1/messages` — synchronous text generation (no streaming)
//!
//! Anthropic exposes no embeddings endpoint, so this service has no
//! `embeddings` method; [`crate::provider::Provider::embed`] reports the
//! capability as unsupported.
//!
//! # Examples
//!
//! ```no_run
//! use llm_service::config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};
//! use llm_service::generation::GenerationParams;
//! use llm_service::services::anthropic_service::AnthropicService;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = LlmModelConfig {
//!     provider: LlmProvider::Anthropic,
//!     model: "claude-3-haiku-20240307".into(),
//!     endpoint: "https://api.anthropic.com".into(),
//!     api_key: Some("sk-ant-...".into()),
//!     embedding_model: None,
//!     timeout_secs: Some(30),
//! };
//!
//! let svc = AnthropicService::new(cfg)?;
//! let text = svc.generate("Write a haiku about Rust.", &GenerationParams::default()).await?;
//! println!("Generated:\n{}", text);
//! # Ok(()) }
//! ```

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

/// API version pinned in the `anthropic-version` header.
pub const ANTHROPIC_API_VERSION: &str = "2023-06-01";

/// Thin client for Anthropic.
///
/// Initialized with a full [`LlmModelConfig`]. Reuses an HTTP client with
/// a configurable timeout.
#[derive(Debug)]
pub struct AnthropicService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    url_messages: String,
}

impl AnthropicService {
    /// Creates a new [`AnthropicService`] from the given config.
    ///
    /// # Errors
    /// [`LlmError::Provider`] with `InvalidProvider`, `MissingApiKey`,
    /// `InvalidEndpoint` or `Transport` (client build failure).
    pub fn new(cfg: LlmModelConfig) -> Result<Self, LlmError> {
        if cfg.provider != LlmProvider::Anthropic {
            return Err(fail(ProviderErrorKind::InvalidProvider));
        }

        let api_key = cfg
            .api_key
            .clone()
            .ok_or_else(|| fail(ProviderErrorKind::MissingApiKey))?;

        let endpoint = cfg.endpoint.trim();
        if endpoint.is_empty()
            || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(fail(ProviderErrorKind::InvalidEndpoint(cfg.endpoint.clone())));
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(
            "x-api-key",
            header::HeaderValue::from_str(&api_key).map_err(|e| {
                fail(ProviderErrorKind::Decode(format!(
                    "invalid API key header: {e}"
                )))
            })?,
        );
        headers.insert(
            "anthropic-version",
            header::HeaderValue::from_static(ANTHROPIC_API_VERSION),
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_or_default()))
            .default_headers(headers)
            .brotli(true)
            .build()
            .map_err(|e| fail(ProviderErrorKind::Transport(e.to_string())))?;

        let base = endpoint.trim_end_matches('/').to_string();
        let url_messages = format!("{}/v1/messages", base);

        info!(
            provider = %cfg.provider,
            model = %cfg.model,
            endpoint = %cfg.endpoint,
            "AnthropicService initialized"
        );

        Ok(Self {
            client,
            cfg,
            url_messages,
        })
    }

    /// Model this service is bound to.
    pub fn model(&self) -> &str {
        &self.cfg.model
    }

    /// Static metadata; no network call.
    pub fn describe(&self) -> ProviderInfo {
        ProviderInfo {
            name: LlmProvider::Anthropic.as_str().to_string(),
            model_id: self.cfg.model.clone(),
            family: "Claude".to_string(),
            client_version: CLIENT_VERSION.to_string(),
        }
    }

    /// Performs a **non-streaming** generation request via `/v1/messages`.
    ///
    /// Mapped options:
    /// - `max_tokens`     ← `params.max_tokens`
    /// - `temperature`    ← `params.temperature`
    /// - `top_p`          ← `params.top_p`
    /// - `stop_sequences` ← `params.stop`
    /// - `metadata.user_id` ← `params.user`
    ///
    /// `n`, penalties and `logit_bias` have no Anthropic equivalent and are ignored.
    ///
    /// # Errors
    /// [`LlmError::Provider`] with `Transport`, `HttpStatus`, `Decode` or `EmptyChoices`.
    #[instrument(skip_all, fields(model = %self.cfg.model))]
    pub async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String, LlmError> {
        let started = Instant::now();
        let body = MessagesRequest::new(&self.cfg.model, prompt, params);

        if params.n > 1 || params.logit_bias.is_some() {
            debug!(n = params.n, "ignoring parameters unsupported by Anthropic");
        }
        debug!(prompt_len = prompt.len(), "POST {}", self.url_messages);

        let resp = self
            .client
            .post(&self.url_messages)
            .json(&body)
            .send()
            .await
            .map_err(|e| fail(ProviderErrorKind::Transport(e.to_string())))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let url = self.url_messages.clone();
            let text = resp.text().await.unwrap_or_default();
            let snippet = make_snippet(&text);

            error!(
                %status,
                %url,
                %snippet,
                latency_ms = started.elapsed().as_millis(),
                "Anthropic /v1/messages returned non-success status"
            );

            return Err(fail(ProviderErrorKind::HttpStatus(HttpError {
                status,
                url,
                snippet,
            })));
        }

        let out: MessagesResponse = resp.json().await.map_err(|e| {
            fail(ProviderErrorKind::Decode(format!(
                "serde error: {e}; expected `content[].text`"
            )))
        })?;

        let text: String = out
            .content
            .into_iter()
            .filter(|b| b.kind == "text")
            .filter_map(|b| b.text)
            .collect();

        if text.trim().is_empty() {
            return Err(fail(ProviderErrorKind::EmptyChoices));
        }

        info!(
            latency_ms = started.elapsed().as_millis(),
            stop_reason = out.stop_reason.as_deref().unwrap_or("-"),
            "message completed"
        );

        Ok(text.trim().to_string())
    }
}

fn fail(kind: ProviderErrorKind) -> LlmError {
    ProviderError::new(LlmProvider::Anthropic, kind).into()
}

/* ==========================
HTTP payloads & options
========================== */

/// Request body for `/v1/messages` (non-streaming).
#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [Message<'a>; 1],
    temperature: f32,
    top_p: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop_sequences: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<Metadata<'a>>,
}

impl<'a> MessagesRequest<'a> {
    fn new(model: &'a str, prompt: &'a str, p: &'a GenerationParams) -> Self {
        Self {
            model,
            max_tokens: p.max_tokens,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
            temperature: p.temperature,
            top_p: p.top_p,
            stop_sequences: p.stop.as_deref(),
            metadata: p.user.as_deref().map(|user_id| Metadata { user_id }),
        }
    }
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct Metadata<'a> {
    user_id: &'a str,
}

/// Response body for `/v1/messages`.
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}
