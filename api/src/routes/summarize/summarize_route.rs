//! POST /summarize — bounded-length summary.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use llm_service::GenerationParams;
use orchestrator::{GenerationResponse, TaskOptions};
use tracing::instrument;

use crate::{
    core::app_state::AppState, error_handler::AppResult,
    routes::summarize::summarize_request::SummarizeRequest,
};

pub const TASK_TYPE: &str = "summarize";

/// Handler: POST /summarize
///
/// Token budget is twice the requested word count.
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8080/summarize \
///   -H 'content-type: application/json' \
///   -d '{"text":"Rust is a systems programming language ...","max_length":30}'
/// ```
#[instrument(name = "summarize_route", skip_all)]
pub async fn summarize(
    State(state): State<AppState>,
    payload: Result<Json<SummarizeRequest>, JsonRejection>,
) -> AppResult<Json<GenerationResponse>> {
    let Json(body) = payload?;
    let options = TaskOptions::default()
        .with_variable("max_length", body.max_length.to_string())
        .with_params(GenerationParams {
            max_tokens: body.max_length.saturating_mul(2),
            ..GenerationParams::default()
        });
    let resp = state
        .orchestrator
        .process_request(TASK_TYPE, &body.text, &options)
        .await?;
    Ok(Json(resp))
}
