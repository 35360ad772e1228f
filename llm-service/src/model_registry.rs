//! Registry of logical model names → provider factories.
//!
//! - Construct once at startup, wrap in `Arc`, and pass clones to dependents.
//! - Providers are built lazily on first [`ModelRegistry::resolve`] and memoized,
//!   so the underlying HTTP client is reused across requests.
//! - Registration is last-write-wins and drops any memoized instance.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use llm_service::config::default_config::ProviderSettings;
//! use llm_service::model_registry::ModelRegistry;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = ProviderSettings::from_env()?;
//! let registry = Arc::new(ModelRegistry::new());
//! registry.register_settings("gpt-4", &settings).await;
//!
//! let provider = registry.resolve("gpt-4").await?;
//! println!("{:?}", provider.describe());
//! # Ok(()) }
//! ```

use std::{
    collections::{BTreeSet, HashMap},
    fmt,
    sync::Arc,
};

use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::{
    config::{default_config::ProviderSettings, llm_model_config::LlmModelConfig},
    error_handler::LlmError,
    provider::Provider,
};

/// Builds a provider for the logical model name it is called with.
pub type ProviderFactory = Arc<dyn Fn(&str) -> Result<Provider, LlmError> + Send + Sync>;

/// Shared registry of providers keyed by logical model name.
#[derive(Default)]
pub struct ModelRegistry {
    factories: RwLock<HashMap<String, ProviderFactory>>,
    instances: RwLock<HashMap<String, Arc<Provider>>>,
}

impl fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelRegistry").finish_non_exhaustive()
    }
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the factory for `name`.
    pub async fn register(&self, name: impl Into<String>, factory: ProviderFactory) {
        let name = name.into();
        // Take both locks in the same order as `resolve` to stay deadlock free.
        let mut factories = self.factories.write().await;
        let mut instances = self.instances.write().await;
        let replaced = factories.insert(name.clone(), factory).is_some();
        instances.remove(&name);
        info!(model = %name, replaced, "model registered");
    }

    /// Registers `name` with a factory that builds from a fixed config.
    pub async fn register_config(&self, name: impl Into<String>, cfg: LlmModelConfig) {
        let factory: ProviderFactory =
            Arc::new(move |_name: &str| Provider::from_config(cfg.clone()));
        self.register(name, factory).await;
    }

    /// Registers `name` against whichever backend its naming scheme points to.
    ///
    /// Returns `false` (and registers nothing) for names no backend claims.
    pub async fn register_settings(&self, name: &str, settings: &ProviderSettings) -> bool {
        match settings.config_for(name) {
            Some(cfg) => {
                self.register_config(name, cfg).await;
                true
            }
            None => false,
        }
    }

    /// Returns the provider for `name`, constructing it on first use.
    ///
    /// Concurrent first resolutions construct exactly one instance: the map is
    /// re-checked under the write lock before the factory runs.
    ///
    /// # Errors
    /// - [`LlmError::ModelNotRegistered`] if no factory exists for `name`
    /// - whatever the factory returns when construction fails (nothing is memoized)
    pub async fn resolve(&self, name: &str) -> Result<Arc<Provider>, LlmError> {
        if let Some(p) = self.instances.read().await.get(name).cloned() {
            return Ok(p);
        }

        let factories = self.factories.read().await;
        let factory = factories
            .get(name)
            .ok_or_else(|| LlmError::ModelNotRegistered(name.to_string()))?;

        let mut instances = self.instances.write().await;
        if let Some(p) = instances.get(name) {
            return Ok(p.clone());
        }

        debug!(model = %name, "constructing provider");
        let provider = Arc::new(factory(name)?);
        instances.insert(name.to_string(), provider.clone());
        Ok(provider)
    }

    /// Registered logical names, sorted.
    pub async fn list_registered(&self) -> BTreeSet<String> {
        self.factories.read().await.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::config::llm_provider::LlmProvider;

    fn openai_cfg(model: &str) -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::OpenAI,
            model: model.into(),
            endpoint: "http://127.0.0.1:9".into(),
            api_key: Some("sk-test".into()),
            embedding_model: None,
            timeout_secs: Some(1),
        }
    }

    fn counting_factory(counter: Arc<AtomicUsize>) -> ProviderFactory {
        Arc::new(move |name: &str| {
            counter.fetch_add(1, Ordering::SeqCst);
            Provider::from_config(openai_cfg(name))
        })
    }

    #[tokio::test]
    async fn resolve_unknown_model_fails() {
        let reg = ModelRegistry::new();
        let err = reg.resolve("nope").await.unwrap_err();
        assert!(matches!(err, LlmError::ModelNotRegistered(n) if n == "nope"));
    }

    #[tokio::test]
    async fn resolve_is_memoized_and_describe_is_stable() {
        let reg = ModelRegistry::new();
        reg.register_config("gpt-4", openai_cfg("gpt-4")).await;

        let a = reg.resolve("gpt-4").await.unwrap();
        let b = reg.resolve("gpt-4").await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.describe(), b.describe());
        assert_eq!(a.describe().name, "OpenAI");
        assert_eq!(a.describe().model_id, "gpt-4");
    }

    #[tokio::test]
    async fn concurrent_first_resolution_builds_once() {
        let reg = Arc::new(ModelRegistry::new());
        let counter = Arc::new(AtomicUsize::new(0));
        reg.register("gpt-4", counting_factory(counter.clone())).await;

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let reg = reg.clone();
                tokio::spawn(async move { reg.resolve("gpt-4").await.unwrap() })
            })
            .collect();

        let mut providers = Vec::new();
        for h in handles {
            providers.push(h.await.unwrap());
        }
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(providers.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[tokio::test]
    async fn register_overwrites_and_drops_memoized_instance() {
        let reg = ModelRegistry::new();
        reg.register_config("fast", openai_cfg("gpt-3.5-turbo")).await;
        let first = reg.resolve("fast").await.unwrap();
        assert_eq!(first.model(), "gpt-3.5-turbo");

        reg.register_config("fast", openai_cfg("gpt-4")).await;
        let second = reg.resolve("fast").await.unwrap();
        assert_eq!(second.model(), "gpt-4");
        assert_eq!(reg.list_registered().await.len(), 1);
    }

    #[tokio::test]
    async fn failed_construction_is_not_memoized() {
        let reg = ModelRegistry::new();
        let mut cfg = openai_cfg("gpt-4");
        cfg.api_key = None;
        reg.register_config("gpt-4", cfg).await;

        assert!(matches!(reg.resolve("gpt-4").await, Err(LlmError::Provider(_))));
        assert!(matches!(reg.resolve("gpt-4").await, Err(LlmError::Provider(_))));
    }

    #[tokio::test]
    async fn settings_registration_picks_backend() {
        let reg = ModelRegistry::new();
        let settings = ProviderSettings {
            anthropic_api_key: Some("k".into()),
            ..ProviderSettings::default()
        };
        assert!(reg.register_settings("claude-v1", &settings).await);
        assert!(!reg.register_settings("llama3", &settings).await);

        let p = reg.resolve("claude-v1").await.unwrap();
        assert_eq!(p.backend(), LlmProvider::Anthropic);
        assert_eq!(
            reg.list_registered().await.into_iter().collect::<Vec<_>>(),
            vec!["claude-v1".to_string()]
        );
    }
}
