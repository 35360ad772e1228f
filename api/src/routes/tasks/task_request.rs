use llm_service::GenerationParams;
use prompt_store::Variables;
use serde::Deserialize;

/// Request payload for /tasks/{task_type}.
#[derive(Debug, Deserialize)]
pub struct TaskRequest {
    /// Bound to the template's `{input_text}` placeholder.
    pub input_text: String,
    /// Extra template variables (e.g. `target_language`).
    #[serde(default)]
    pub variables: Variables,
    #[serde(default)]
    pub params: GenerationParams,
}
