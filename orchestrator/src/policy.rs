//! Task type → model routing table.

use std::collections::{BTreeMap, BTreeSet};

/// Tasks served by the fast tier in the default table.
pub const FAST_TASKS: &[&str] = &["translate", "summarize", "generate"];
/// Tasks served by the quality tier in the default table.
pub const QUALITY_TASKS: &[&str] = &["code_generation", "complex_reasoning"];

/// Maps a task type to the logical model name that serves it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelPolicy {
    routes: BTreeMap<String, String>,
}

impl ModelPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default two-tier table.
    pub fn tiered(fast_model: &str, quality_model: &str) -> Self {
        let fast = FAST_TASKS.iter().map(|t| (t.to_string(), fast_model.to_string()));
        let quality = QUALITY_TASKS
            .iter()
            .map(|t| (t.to_string(), quality_model.to_string()));
        Self {
            routes: fast.chain(quality).collect(),
        }
    }

    /// Adds or replaces the route for `task_type`.
    pub fn with_route(mut self, task_type: impl Into<String>, model: impl Into<String>) -> Self {
        self.routes.insert(task_type.into(), model.into());
        self
    }

    pub fn select(&self, task_type: &str) -> Option<&str> {
        self.routes.get(task_type).map(String::as_str)
    }

    pub fn task_types(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }

    /// Distinct model names referenced by the table.
    pub fn models(&self) -> BTreeSet<&str> {
        self.routes.values().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiered_table_routes_by_task() {
        let p = ModelPolicy::tiered("gpt-3.5-turbo", "gpt-4");
        assert_eq!(p.select("translate"), Some("gpt-3.5-turbo"));
        assert_eq!(p.select("summarize"), Some("gpt-3.5-turbo"));
        assert_eq!(p.select("code_generation"), Some("gpt-4"));
        assert_eq!(p.select("complex_reasoning"), Some("gpt-4"));
        assert_eq!(p.select("unknown_task"), None);
        assert_eq!(p.models().len(), 2);
    }

    #[test]
    fn with_route_overrides() {
        let p = ModelPolicy::tiered("a", "b").with_route("translate", "claude-v1");
        assert_eq!(p.select("translate"), Some("claude-v1"));
        assert_eq!(p.task_types().count(), 5);
    }
}
