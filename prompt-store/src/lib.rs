//! Named, versioned prompt templates.
//!
//! - [`PromptTemplate`] holds the template text and performs lenient
//!   `{placeholder}` substitution.
//! - [`PromptStore`] keeps templates under `"name:version"` keys behind a
//!   reader/writer lock and hands out clones.

pub mod error;
pub mod store;
pub mod template;

pub use error::{PromptStoreError, Result};
pub use store::{PromptStore, default_templates};
pub use template::{PromptTemplate, Variables};
