//! HTTP transport for the LLM gateway.

pub mod core;
pub mod error_handler;
mod routes;

use axum::{
    Router,
    routing::{get, post},
};
use llm_service::error_handler::env_or;
use tokio::signal;
use tracing::{info, warn};

use crate::{
    core::app_state::AppState,
    error_handler::AppError,
    routes::{
        embeddings::embeddings_route::embeddings, generate::generate_route::generate,
        health_route::health, models::models_route::list_models,
        summarize::summarize_route::summarize, tasks::task_route::run_task,
    },
};

pub const DEFAULT_API_ADDRESS: &str = "0.0.0.0:8080";

/// Builds the router over an already wired state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/generate", post(generate))
        .route("/summarize", post(summarize))
        .route("/tasks/{task_type}", post(run_task))
        .route("/embeddings", post(embeddings))
        .route("/models", get(list_models))
        .route("/health", get(health))
        .with_state(state)
}

/// Wires state from the environment and serves until Ctrl+C.
///
/// # Errors
/// Startup wiring failures, bind failures on `API_ADDRESS`, or a server I/O error.
pub async fn start() -> Result<(), AppError> {
    let host_url = env_or("API_ADDRESS", DEFAULT_API_ADDRESS);
    let state = AppState::from_env().await?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&host_url)
        .await
        .map_err(AppError::Bind)?;
    info!(address = %host_url, "llm gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("llm gateway stopped");
    Ok(())
}

/// Returns a future that resolves when Ctrl+C is pressed
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
