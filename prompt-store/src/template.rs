//! Versioned prompt template with lenient `{placeholder}` substitution.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::LazyLock,
};

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

/// Variables used to fill a template, keyed by placeholder name.
pub type Variables = BTreeMap<String, String>;

pub const DEFAULT_VERSION: &str = "1.0";

// `{identifier}`; anything else inside braces is not a placeholder.
static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid placeholder regex"));

/// A named, versioned prompt template.
///
/// Placeholders are written `{name}` where `name` starts with an ASCII letter
/// or `_` and continues with letters, digits or `_`.
///
/// # Example
/// ```
/// use prompt_store::{PromptTemplate, Variables};
///
/// let t = PromptTemplate::new("greeting", "Hello, {name}! Welcome to {place}.");
/// let mut vars = Variables::new();
/// vars.insert("name".into(), "Alice".into());
/// assert_eq!(t.format(&vars), "Hello, Alice! Welcome to {place}.");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptTemplate {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    pub template: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

impl PromptTemplate {
    /// Template with version `"1.0"`, no description and no metadata.
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: default_version(),
            template: template.into(),
            description: String::new(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Store key: `"name:version"`.
    pub fn key(&self) -> String {
        make_key(&self.name, &self.version)
    }

    /// Fills placeholders from `vars`.
    ///
    /// Placeholders without a value, and brace runs that are not a valid
    /// placeholder, are copied verbatim. Never fails.
    pub fn format(&self, vars: &Variables) -> String {
        PLACEHOLDER_RE
            .replace_all(&self.template, |caps: &Captures<'_>| match vars.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    /// Names of all placeholders in the template text.
    pub fn required_variables(&self) -> BTreeSet<String> {
        PLACEHOLDER_RE
            .captures_iter(&self.template)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

pub(crate) fn make_key(name: &str, version: &str) -> String {
    format!("{name}:{version}")
}
