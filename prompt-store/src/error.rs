//! Errors for the prompt template store.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PromptStoreError>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum PromptStoreError {
    /// A template with the same `name:version` key is already stored.
    #[error("[Prompt Store] template '{key}' already exists")]
    DuplicateTemplate { key: String },

    #[error("[Prompt Store] template '{key}' not found")]
    NotFound { key: String },

    /// Template file could not be read.
    #[error("[Prompt Store] failed to read templates file: {0}")]
    Io(#[from] std::io::Error),

    /// Template file is not a JSON array of templates.
    #[error("[Prompt Store] invalid templates file: {0}")]
    Json(#[from] serde_json::Error),
}
