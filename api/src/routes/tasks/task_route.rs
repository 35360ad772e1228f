//! POST /tasks/{task_type} — any task known to the routing policy.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use orchestrator::{GenerationResponse, TaskOptions};
use tracing::instrument;

use crate::{
    core::app_state::AppState, error_handler::AppResult, routes::tasks::task_request::TaskRequest,
};

/// Handler: POST /tasks/{task_type}
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8080/tasks/translate \
///   -H 'content-type: application/json' \
///   -d '{"input_text":"Hello, world!","variables":{"target_language":"French"}}'
/// ```
#[instrument(name = "task_route", skip(state, payload), fields(task_type = %task_type))]
pub async fn run_task(
    State(state): State<AppState>,
    Path(task_type): Path<String>,
    payload: Result<Json<TaskRequest>, JsonRejection>,
) -> AppResult<Json<GenerationResponse>> {
    let Json(body) = payload?;
    let options = TaskOptions {
        variables: body.variables,
        params: body.params,
    };
    let resp = state
        .orchestrator
        .process_request(&task_type, &body.input_text, &options)
        .await?;
    Ok(Json(resp))
}
