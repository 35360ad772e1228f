//! Task orchestration for the LLM gateway.
//!
//! A client names a task type and supplies input text; [`Orchestrator`]
//! picks a model via [`policy::ModelPolicy`], formats the task's prompt
//! template, consults the [`cache::ResponseCache`], calls the provider and
//! returns a [`domain::GenerationResponse`].

pub mod cache;
pub mod chain;
pub mod config;
pub mod domain;
pub mod error;
pub mod orchestrator;
pub mod policy;

pub use cache::{CacheError, ResponseCache};
pub use chain::{ChainValues, PromptChain};
pub use config::OrchestratorConfig;
pub use domain::{Choice, GenerationRequest, GenerationResponse, Usage};
pub use error::{ErrorClass, OrchestratorError, Result};
pub use orchestrator::{ModelListing, Orchestrator, TaskOptions};
pub use policy::ModelPolicy;
