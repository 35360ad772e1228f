//! POST /embeddings — embedding vector from a named model.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{core::app_state::AppState, error_handler::AppResult};

#[derive(Debug, Deserialize)]
pub struct EmbeddingsRequest {
    pub model: String,
    pub input: String,
}

#[derive(Debug, Serialize)]
pub struct EmbeddingsResponse {
    pub model: String,
    pub embedding: Vec<f32>,
}

#[instrument(name = "embeddings_route", skip_all)]
pub async fn embeddings(
    State(state): State<AppState>,
    payload: Result<Json<EmbeddingsRequest>, JsonRejection>,
) -> AppResult<Json<EmbeddingsResponse>> {
    let Json(body) = payload?;
    let embedding = state.orchestrator.embed(&body.model, &body.input).await?;
    Ok(Json(EmbeddingsResponse {
        model: body.model,
        embedding,
    }))
}
