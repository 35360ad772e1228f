//! GET /models — registered models and their provider metadata.

use axum::{Json, extract::State};
use orchestrator::ModelListing;
use serde::Serialize;

use crate::core::app_state::AppState;

#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelListing>,
}

pub async fn list_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: state.orchestrator.list_models().await,
    })
}
