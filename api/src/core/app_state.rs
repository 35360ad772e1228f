use std::{collections::BTreeSet, sync::Arc};

use llm_service::{
    ModelRegistry,
    config::default_config::{ANTHROPIC_MODELS, OPENAI_MODELS, ProviderSettings},
    error_handler::{env_opt, env_opt_u64},
};
use orchestrator::{
    Orchestrator, OrchestratorConfig, ResponseCache,
    cache::{
        moka::{DEFAULT_CAPACITY, MokaResponseCache},
        redis::RedisResponseCache,
    },
};
use prompt_store::PromptStore;
use tracing::{info, warn};

use crate::error_handler::AppError;

/// Shared state for all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}

impl AppState {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self { orchestrator }
    }

    /// Wires registry, prompt store, cache engine and orchestrator from the environment.
    ///
    /// # Errors
    /// Invalid numeric/URL settings, an unreadable `PROMPTS_FILE`, or an
    /// unreachable `REDIS_URL`.
    pub async fn from_env() -> Result<Self, AppError> {
        let settings = ProviderSettings::from_env()?;
        let config = OrchestratorConfig::from_env()?;

        let registry = Arc::new(ModelRegistry::new());
        let mut models: BTreeSet<&str> = OPENAI_MODELS.iter().chain(ANTHROPIC_MODELS).copied().collect();
        models.insert(&config.fast_model);
        models.insert(&config.quality_model);
        for model in models {
            if !registry.register_settings(model, &settings).await {
                warn!(model = %model, "no backend serves this model name; not registered");
            }
        }

        let prompts = match env_opt("PROMPTS_FILE") {
            Some(path) => {
                let store = PromptStore::new();
                store.load_templates_file(&path)?;
                store
            }
            None => PromptStore::with_defaults(),
        };
        info!(templates = prompts.len(), "prompt store ready");

        let cache: Arc<dyn ResponseCache> = match env_opt("REDIS_URL") {
            Some(url) => Arc::new(RedisResponseCache::connect(&url).await?),
            None => {
                let capacity = env_opt_u64("CACHE_CAPACITY")?.unwrap_or(DEFAULT_CAPACITY);
                Arc::new(MokaResponseCache::new(capacity))
            }
        };

        let orchestrator = Orchestrator::new(registry, Arc::new(prompts), cache, &config);
        Ok(Self::new(Arc::new(orchestrator)))
    }
}
