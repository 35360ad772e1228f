use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use httpmock::prelude::*;
use serde_json::json;

use llm_service::{
    GenerationParams, LlmProvider, ModelRegistry, config::llm_model_config::LlmModelConfig,
};
use orchestrator::{
    CacheError, ChainValues, ModelPolicy, Orchestrator, OrchestratorConfig, OrchestratorError,
    PromptChain, ResponseCache, TaskOptions,
    cache::{cache_key, moka::MokaResponseCache},
};
use prompt_store::PromptStore;

/// Cache double counting every operation; optionally fails all of them.
#[derive(Default)]
struct CountingCache {
    inner: MokaResponseCache,
    fail: bool,
    gets: AtomicUsize,
    sets: AtomicUsize,
    deletes: AtomicUsize,
}

impl CountingCache {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn ops(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
            + self.sets.load(Ordering::SeqCst)
            + self.deletes.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), CacheError> {
        if self.fail {
            Err(CacheError::Connection("connection refused".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ResponseCache for CountingCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.delete(key).await
    }

    async fn flush(&self) -> Result<(), CacheError> {
        self.check()?;
        self.inner.flush().await
    }
}

fn model_cfg(provider: LlmProvider, model: &str, server: &MockServer) -> LlmModelConfig {
    LlmModelConfig {
        provider,
        model: model.into(),
        endpoint: server.base_url(),
        api_key: Some("sk-test".into()),
        embedding_model: Some("text-embedding-ada-002".into()),
        timeout_secs: Some(5),
    }
}

async fn registry(server: &MockServer) -> Arc<ModelRegistry> {
    let reg = ModelRegistry::new();
    for model in ["gpt-3.5-turbo", "gpt-4"] {
        reg.register_config(model, model_cfg(LlmProvider::OpenAI, model, server))
            .await;
    }
    reg.register_config(
        "claude-v1",
        model_cfg(LlmProvider::Anthropic, "claude-v1", server),
    )
    .await;
    Arc::new(reg)
}

async fn setup(server: &MockServer, cache: Arc<CountingCache>, config: OrchestratorConfig) -> Orchestrator {
    Orchestrator::new(
        registry(server).await,
        Arc::new(PromptStore::with_defaults()),
        cache,
        &config,
    )
}

fn chat_reply(text: &str) -> serde_json::Value {
    json!({ "choices": [ { "message": { "content": text } } ] })
}

#[tokio::test]
async fn identical_requests_hit_the_provider_once() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .body_contains("gpt-3.5-turbo")
                .body_contains("French");
            then.status(200).json_body(chat_reply("Bonjour, le monde!"));
        })
        .await;

    let cache = Arc::new(CountingCache::default());
    let o = setup(&server, cache.clone(), OrchestratorConfig::default()).await;
    let opts = TaskOptions::default().with_variable("target_language", "French");

    let first = o.process_request("translate", "Hello, world!", &opts).await.unwrap();
    let second = o.process_request("translate", "Hello, world!", &opts).await.unwrap();

    mock.assert_hits_async(1).await;
    assert_eq!(first.text(), "Bonjour, le monde!");
    assert_eq!(first.model, "gpt-3.5-turbo");
    assert_eq!(
        serde_json::to_vec(&first).unwrap(),
        serde_json::to_vec(&second).unwrap()
    );
    assert_eq!(cache.sets.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unknown_task_does_no_io() {
    let server = MockServer::start_async().await;
    let any = server
        .mock_async(|when, then| {
            when.any_request();
            then.status(200).json_body(chat_reply("never"));
        })
        .await;

    let cache = Arc::new(CountingCache::default());
    let o = setup(&server, cache.clone(), OrchestratorConfig::default()).await;

    let err = o
        .process_request("unknown_task", "text", &TaskOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, OrchestratorError::UnsupportedTaskType(t) if t == "unknown_task"));
    assert_eq!(cache.ops(), 0);
    any.assert_hits_async(0).await;
}

#[tokio::test]
async fn usage_counts_prompt_and_completion_words() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).json_body(chat_reply("d e"));
        })
        .await;

    let o = setup(&server, Arc::new(CountingCache::default()), OrchestratorConfig::default()).await;
    // The built-in "generate" template is just `{input_text}`.
    let resp = o
        .process_request("generate", "a b c", &TaskOptions::default())
        .await
        .unwrap();

    assert_eq!(resp.usage.prompt_tokens(), 3);
    assert_eq!(resp.usage.completion_tokens(), 2);
    assert_eq!(resp.usage.total_tokens(), 5);
    assert_eq!(resp.object, "text_completion");
}

#[tokio::test]
async fn cache_failure_is_a_transparent_miss() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).json_body(chat_reply("summary"));
        })
        .await;

    let cache = Arc::new(CountingCache::failing());
    let o = setup(&server, cache.clone(), OrchestratorConfig::default()).await;
    let opts = TaskOptions::default();

    assert!(o.process_request("summarize", "long text", &opts).await.is_ok());
    assert!(o.process_request("summarize", "long text", &opts).await.is_ok());

    mock.assert_hits_async(2).await;
    assert_eq!(cache.gets.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn provider_failure_writes_nothing() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(500).body("upstream exploded");
        })
        .await;

    let cache = Arc::new(CountingCache::default());
    let o = setup(&server, cache.clone(), OrchestratorConfig::default()).await;

    let err = o
        .process_request("code_generation", "fizzbuzz", &TaskOptions::default())
        .await
        .unwrap_err();

    match err {
        OrchestratorError::LlmProvider { backend, detail } => {
            assert_eq!(backend, LlmProvider::OpenAI);
            assert!(detail.contains("500"), "{detail}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(cache.sets.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_template_is_reported_before_io() {
    let server = MockServer::start_async().await;
    let any = server
        .mock_async(|when, then| {
            when.any_request();
            then.status(200).json_body(chat_reply("never"));
        })
        .await;

    let cache = Arc::new(CountingCache::default());
    let o = Orchestrator::new(
        registry(&server).await,
        Arc::new(PromptStore::new()),
        cache.clone(),
        &OrchestratorConfig::default(),
    );

    let err = o
        .process_request("translate", "Hello", &TaskOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, OrchestratorError::PromptNotFound(t) if t == "translate"));
    assert_eq!(cache.ops(), 0);
    any.assert_hits_async(0).await;
}

#[tokio::test]
async fn invalid_params_are_rejected_before_io() {
    let server = MockServer::start_async().await;
    let any = server
        .mock_async(|when, then| {
            when.any_request();
            then.status(200).json_body(chat_reply("never"));
        })
        .await;

    let cache = Arc::new(CountingCache::default());
    let o = setup(&server, cache.clone(), OrchestratorConfig::default()).await;
    let opts = TaskOptions::default().with_params(GenerationParams {
        temperature: 5.0,
        ..GenerationParams::default()
    });

    let err = o.process_request("generate", "x", &opts).await.unwrap_err();
    assert!(matches!(err, OrchestratorError::InvalidRequest(_)));
    assert_eq!(cache.ops(), 0);
    any.assert_hits_async(0).await;
}

#[tokio::test]
async fn unregistered_policy_model_is_not_found() {
    let server = MockServer::start_async().await;
    let cache = Arc::new(CountingCache::default());
    let o = setup(&server, cache.clone(), OrchestratorConfig::default())
        .await
        .with_policy(ModelPolicy::new().with_route("generate", "llama3"));

    let err = o
        .process_request("generate", "x", &TaskOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, OrchestratorError::ModelNotRegistered(m) if m == "llama3"));
    assert_eq!(cache.ops(), 0);
}

#[tokio::test]
async fn multiple_completions_collapse_to_one_choice() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .body_contains("\"n\":3");
            then.status(200).json_body(json!({
                "choices": [
                    { "message": { "content": "one" } },
                    { "message": { "content": "two" } },
                    { "message": { "content": "three" } }
                ]
            }));
        })
        .await;

    let o = setup(&server, Arc::new(CountingCache::default()), OrchestratorConfig::default()).await;
    let opts = TaskOptions::default().with_params(GenerationParams {
        n: 3,
        ..GenerationParams::default()
    });

    let resp = o.process_request("generate", "count", &opts).await.unwrap();
    assert_eq!(resp.choices.len(), 1);
    assert_eq!(resp.choices[0].text, "one");
    assert_eq!(resp.choices[0].index, 0);
}

#[tokio::test]
async fn slow_provider_times_out_without_caching() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200)
                .delay(Duration::from_millis(800))
                .json_body(chat_reply("late"));
        })
        .await;

    let cache = Arc::new(CountingCache::default());
    let config = OrchestratorConfig {
        request_timeout: Some(Duration::from_millis(50)),
        ..OrchestratorConfig::default()
    };
    let o = setup(&server, cache.clone(), config).await;

    let err = o
        .process_request("generate", "x", &TaskOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, OrchestratorError::Timeout(_)));
    assert_eq!(cache.sets.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn anthropic_route_and_embedding_capability() {
    let server = MockServer::start_async().await;
    let messages = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/messages");
            then.status(200).json_body(json!({
                "content": [ { "type": "text", "text": "Bonjour" } ]
            }));
        })
        .await;

    let o = setup(&server, Arc::new(CountingCache::default()), OrchestratorConfig::default())
        .await
        .with_policy(ModelPolicy::tiered("gpt-3.5-turbo", "gpt-4").with_route("translate", "claude-v1"));

    let resp = o
        .process_request("translate", "Hello", &TaskOptions::default())
        .await
        .unwrap();
    assert_eq!(resp.model, "claude-v1");
    assert_eq!(resp.text(), "Bonjour");
    messages.assert_hits_async(1).await;

    let err = o.embed("claude-v1", "Hello").await.unwrap_err();
    assert!(matches!(
        err,
        OrchestratorError::UnsupportedCapability { backend: LlmProvider::Anthropic, capability: "embeddings" }
    ));
}

#[tokio::test]
async fn invalidate_forces_a_fresh_generation() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).json_body(chat_reply("fresh"));
        })
        .await;

    let cache = Arc::new(CountingCache::default());
    let o = setup(&server, cache.clone(), OrchestratorConfig::default()).await;
    let opts = TaskOptions::default();

    o.process_request("generate", "x", &opts).await.unwrap();
    o.invalidate("generate", "x", &opts).await.unwrap();
    o.process_request("generate", "x", &opts).await.unwrap();

    mock.assert_hits_async(2).await;
    assert_eq!(cache.deletes.load(Ordering::SeqCst), 1);

    let failing = setup(&server, Arc::new(CountingCache::failing()), OrchestratorConfig::default()).await;
    assert!(matches!(
        failing.invalidate("generate", "x", &opts).await,
        Err(OrchestratorError::CacheUnavailable(_))
    ));
}

#[tokio::test]
async fn list_models_describes_registered_models() {
    let server = MockServer::start_async().await;
    let o = setup(&server, Arc::new(CountingCache::default()), OrchestratorConfig::default()).await;

    let models = o.list_models().await;
    let names: Vec<_> = models.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["claude-v1", "gpt-3.5-turbo", "gpt-4"]);
    assert_eq!(models[0].info.family, "Claude");
    assert_eq!(models[2].info.name, "OpenAI");
}

#[tokio::test]
async fn cached_entry_with_inconsistent_usage_is_regenerated() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).json_body(chat_reply("fresh answer"));
        })
        .await;

    let cache = Arc::new(CountingCache::default());
    let key = cache_key("generate", "say hi", "gpt-3.5-turbo", &GenerationParams::default()).unwrap();
    let tampered = json!({
        "id": "cmpl-stale",
        "object": "text_completion",
        "created": 0,
        "model": "gpt-3.5-turbo",
        "choices": [ { "text": "stale", "index": 0, "logprobs": null, "finish_reason": "length" } ],
        "usage": { "prompt_tokens": 2, "completion_tokens": 1, "total_tokens": 99 }
    });
    cache
        .inner
        .set(&key, serde_json::to_vec(&tampered).unwrap(), Duration::from_secs(60))
        .await
        .unwrap();

    let o = setup(&server, cache.clone(), OrchestratorConfig::default()).await;
    let resp = o.process_request("generate", "say hi", &TaskOptions::default()).await.unwrap();

    assert_eq!(resp.text(), "fresh answer");
    assert_eq!(resp.usage.total_tokens(), 4);
    mock.assert_hits_async(1).await;
}

#[tokio::test]
async fn example_chain_turns_query_into_response() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .body_contains("gpt-3.5-turbo")
                .body_contains("What is Rust?");
            then.status(200).json_body(chat_reply(" A systems language. "));
        })
        .await;

    let cache = Arc::new(CountingCache::default());
    let o = setup(&server, cache.clone(), OrchestratorConfig::default()).await;
    let chain = PromptChain::example();
    let inputs = ChainValues::from([("query".to_string(), "What is Rust?".to_string())]);

    let out = o.run_chain(&chain, &inputs).await.unwrap();

    assert_eq!(out, ChainValues::from([("response".to_string(), "A systems language.".to_string())]));
    mock.assert_hits_async(1).await;
    assert_eq!(cache.ops(), 0);
}

#[tokio::test]
async fn chain_rejects_missing_input_and_template_before_io() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).json_body(chat_reply("unused"));
        })
        .await;

    let cache = Arc::new(CountingCache::default());
    let o = setup(&server, cache.clone(), OrchestratorConfig::default()).await;

    let err = o
        .run_chain(&PromptChain::example(), &ChainValues::new())
        .await
        .unwrap_err();
    assert!(matches!(err, OrchestratorError::InvalidRequest(_)));

    let chain = PromptChain::new("ghost", "no_such_template", "gpt-4");
    let err = o.run_chain(&chain, &ChainValues::new()).await.unwrap_err();
    assert!(matches!(err, OrchestratorError::PromptNotFound(name) if name == "no_such_template"));

    mock.assert_hits_async(0).await;
}
