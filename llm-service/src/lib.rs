//! Provider layer of the LLM gateway.
//!
//! - [`provider::Provider`]: OpenAI / Anthropic behind `generate`, `embed`, `describe`
//! - [`model_registry::ModelRegistry`]: logical model name → lazily built provider
//! - [`generation::GenerationParams`]: per-request tuning knobs
//! - [`error_handler`]: unified errors and env/validation helpers
//! - [`telemetry`]: library-scoped tracing layer

pub mod config;
pub mod error_handler;
pub mod generation;
pub mod model_registry;
pub mod provider;
pub mod services;
pub mod telemetry;

pub use config::llm_provider::LlmProvider;
pub use error_handler::{LlmError, ProviderError};
pub use generation::GenerationParams;
pub use model_registry::{ModelRegistry, ProviderFactory};
pub use provider::{Provider, ProviderInfo};
