//! POST /generate — free-form generation on the fast tier.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use orchestrator::{GenerationResponse, TaskOptions};
use tracing::instrument;

use crate::{
    core::app_state::AppState, error_handler::AppResult,
    routes::generate::generate_request::GenerateRequest,
};

pub const TASK_TYPE: &str = "generate";

/// Handler: POST /generate
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8080/generate \
///   -H 'content-type: application/json' \
///   -d '{"prompt":"Write a haiku about Rust","max_tokens":60,"temperature":0.4}'
/// ```
#[instrument(name = "generate_route", skip_all)]
pub async fn generate(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> AppResult<Json<GenerationResponse>> {
    let Json(body) = payload?;
    let options = TaskOptions::default().with_params(body.params());
    let resp = state
        .orchestrator
        .process_request(TASK_TYPE, &body.prompt, &options)
        .await?;
    Ok(Json(resp))
}
