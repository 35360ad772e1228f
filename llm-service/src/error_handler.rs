//! Unified error handling for `llm-service`.
//!
//! This module exposes a single top-level error type [`LlmError`] for the whole
//! library, and groups domain-specific errors in nested types (e.g., [`ConfigError`],
//! [`ProviderError`]). Small helpers for reading/validating environment variables are
//! provided and return the unified [`Result<T>`] alias.
//!
//! All messages include the suffix `[LLM Service]` to simplify attribution in logs.

use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

use crate::config::llm_provider::LlmProvider;

/* ------------------------------------------------------------------------- */
/* Public result alias                                                       */
/* ------------------------------------------------------------------------- */

/// Unified result alias for the entire crate.
pub type Result<T> = std::result::Result<T, LlmError>;

/* ------------------------------------------------------------------------- */
/* Top-level error                                                           */
/* ------------------------------------------------------------------------- */

/// Top-level error for the `llm-service` crate.
///
/// Every backend failure (transport, auth, quota, decoding) is folded into
/// [`LlmError::Provider`] so callers only ever see one envelope per backend.
/// Missing capabilities are reported separately because they are a property
/// of the backend, not a runtime failure.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum LlmError {
    /// Configuration/validation errors (startup or request parameters).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Any failure reported by, or while talking to, a backend.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The backend has no endpoint for the requested capability.
    #[error("[LLM Service] {backend} does not support {capability}")]
    Unsupported {
        backend: LlmProvider,
        capability: &'static str,
    },

    /// No factory was registered under this logical model name.
    #[error("[LLM Service] model '{0}' is not registered")]
    ModelNotRegistered(String),
}

/* ------------------------------------------------------------------------- */
/* Config errors                                                             */
/* ------------------------------------------------------------------------- */

/// Error enum for environment/config-driven setup and parameter validation.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable is missing or empty.
    #[error("[LLM Service] missing required environment variable: {0}")]
    MissingVar(&'static str),

    /// A number failed to parse (like ports, limits, timeouts).
    #[error("[LLM Service] invalid number in {var}: {reason}")]
    InvalidNumber {
        /// Variable name (e.g., `LLM_TIMEOUT_SECS`).
        var: &'static str,
        /// Human-readable reason (e.g., `expected u64`).
        reason: &'static str,
    },

    /// Value had the wrong format (e.g., invalid URL).
    #[error("[LLM Service] invalid format in {var}: {reason}")]
    InvalidFormat {
        var: &'static str,
        reason: &'static str,
    },

    /// A numeric field was outside of the allowed range.
    #[error("[LLM Service] {field} is out of range: {detail}")]
    OutOfRange {
        /// Field name (e.g., `temperature`).
        field: &'static str,
        /// Description of the expected range (e.g., `expected 0.0..=1.0`).
        detail: &'static str,
    },

    /// Model name was empty.
    #[error("[LLM Service] model name must not be empty")]
    EmptyModel,

    /// Stop sequences contained an empty string or more than four entries.
    #[error("[LLM Service] stop sequences must be at most 4 non-empty strings")]
    InvalidStopSequence,

    /// `extra_params` named a field the gateway sets itself.
    #[error("[LLM Service] extra parameter '{0}' is reserved")]
    ReservedParam(String),
}

/* ------------------------------------------------------------------------- */
/* Provider errors                                                           */
/* ------------------------------------------------------------------------- */

/// Failure envelope for one backend: `{backend, detail}`.
///
/// `kind` keeps the structured cause for logging; [`ProviderError::detail`]
/// renders it as the flat string the orchestrator forwards.
#[derive(Debug, Error)]
#[error("[LLM Service] {backend} provider error: {kind}")]
pub struct ProviderError {
    pub backend: LlmProvider,
    pub kind: ProviderErrorKind,
}

impl ProviderError {
    pub fn new(backend: LlmProvider, kind: ProviderErrorKind) -> Self {
        Self { backend, kind }
    }

    /// Human-readable cause without the backend prefix.
    pub fn detail(&self) -> String {
        self.kind.to_string()
    }
}

/// Structured cause of a [`ProviderError`].
#[non_exhaustive]
#[derive(Debug)]
pub enum ProviderErrorKind {
    /// Config handed to a service of another backend.
    InvalidProvider,
    /// No API key configured for a backend that requires one.
    MissingApiKey,
    /// Endpoint empty or not http/https.
    InvalidEndpoint(String),
    /// Network/client failure before a response was received.
    Transport(String),
    /// Upstream returned a non-successful HTTP status.
    HttpStatus(HttpError),
    /// Response payload could not be decoded as expected.
    Decode(String),
    /// Response decoded but carried no completion text.
    EmptyChoices,
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidProvider => write!(f, "config belongs to a different provider"),
            Self::MissingApiKey => write!(f, "API key is not configured"),
            Self::InvalidEndpoint(e) => write!(f, "invalid endpoint: {e}"),
            Self::Transport(e) => write!(f, "transport error: {e}"),
            Self::HttpStatus(h) => write!(f, "HTTP {} from {}: {}", h.status, h.url, h.snippet),
            Self::Decode(e) => write!(f, "decode error: {e}"),
            Self::EmptyChoices => write!(f, "response contained no completion"),
        }
    }
}

/// Details of a non-2xx upstream response.
#[derive(Debug, Clone)]
pub struct HttpError {
    /// Numeric HTTP status code.
    pub status: StatusCode,
    /// Request URL.
    pub url: String,
    /// Short snippet of the response body (trimmed).
    pub snippet: String,
}

/// Cuts an upstream body down to something safe to log and return.
pub fn make_snippet(body: &str) -> String {
    const MAX: usize = 240;
    let trimmed = body.trim();
    if trimmed.chars().count() <= MAX {
        trimmed.to_string()
    } else {
        let mut s: String = trimmed.chars().take(MAX).collect();
        s.push('…');
        s
    }
}

/* ------------------------------------------------------------------------- */
/* Env helpers (return unified `Result<T>`)                                  */
/* ------------------------------------------------------------------------- */

/// Fetches a required, non-empty environment variable.
///
/// # Errors
/// Returns [`LlmError::Config`] with [`ConfigError::MissingVar`] if the
/// variable is absent or empty.
pub fn must_env(name: &'static str) -> Result<String> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingVar(name).into()),
    }
}

/// Reads an optional, non-empty environment variable.
pub fn env_opt(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Reads an environment variable or falls back to `default`.
pub fn env_or(name: &str, default: &str) -> String {
    env_opt(name).unwrap_or_else(|| default.to_string())
}

/// Parses an optional `u32` from env (`Ok(None)` if unset/empty).
///
/// # Errors
/// Returns [`LlmError::Config`] with [`ConfigError::InvalidNumber`] if the
/// variable is set but not a valid `u32`.
pub fn env_opt_u32(name: &'static str) -> Result<Option<u32>> {
    match env_opt(name) {
        Some(v) => v.parse::<u32>().map(Some).map_err(|_| {
            LlmError::from(ConfigError::InvalidNumber {
                var: name,
                reason: "expected u32",
            })
        }),
        None => Ok(None),
    }
}

/// Parses an optional `u64` from env (`Ok(None)` if unset/empty).
pub fn env_opt_u64(name: &'static str) -> Result<Option<u64>> {
    match env_opt(name) {
        Some(v) => v.parse::<u64>().map(Some).map_err(|_| {
            LlmError::from(ConfigError::InvalidNumber {
                var: name,
                reason: "expected u64",
            })
        }),
        None => Ok(None),
    }
}

/* ------------------------------------------------------------------------- */
/* Validation helpers (return unified `Result<T>`)                           */
/* ------------------------------------------------------------------------- */

/// Validates that an HTTP endpoint starts with `http://` or `https://`.
///
/// # Errors
/// Returns [`LlmError::Config`] with [`ConfigError::InvalidFormat`] when
/// the string does not start with a valid HTTP scheme.
pub fn validate_http_endpoint(var: &'static str, value: &str) -> Result<()> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidFormat {
            var,
            reason: "must start with http:// or https://",
        }
        .into())
    }
}

/// Validates that a floating-point value lies within an inclusive range.
///
/// # Errors
/// Returns [`LlmError::Config`] with [`ConfigError::OutOfRange`] if `value`
/// is outside `[min, max]` or not finite.
pub fn validate_range_f32(
    field: &'static str,
    detail: &'static str,
    value: f32,
    min: f32,
    max: f32,
) -> Result<()> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, detail }.into())
    }
}

/// Ensures a stop list has at most four entries and no empty strings.
///
/// # Errors
/// Returns [`LlmError::Config`] with [`ConfigError::InvalidStopSequence`].
pub fn validate_stop_sequences<S>(stops: &[S]) -> Result<()>
where
    S: AsRef<str>,
{
    if stops.len() > 4 || stops.iter().any(|s| s.as_ref().is_empty()) {
        Err(ConfigError::InvalidStopSequence.into())
    } else {
        Ok(())
    }
}
