//! In-memory template store keyed by `"name:version"`.
//!
//! Reads clone templates out of the map, so callers never hold a lock.
//! The lock is a `std::sync::RwLock`: no method suspends while holding it.

use std::{
    collections::HashMap,
    path::Path,
    sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use tracing::{debug, info};

use crate::{
    error::{PromptStoreError, Result},
    template::{PromptTemplate, make_key},
};

#[derive(Debug, Default)]
pub struct PromptStore {
    templates: RwLock<HashMap<String, PromptTemplate>>,
}

impl PromptStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with [`default_templates`].
    pub fn with_defaults() -> Self {
        let templates = default_templates()
            .into_iter()
            .map(|t| (t.key(), t))
            .collect();
        Self {
            templates: RwLock::new(templates),
        }
    }

    /// Adds a new template.
    ///
    /// # Errors
    /// [`PromptStoreError::DuplicateTemplate`] if the `name:version` key exists.
    pub fn add(&self, template: PromptTemplate) -> Result<()> {
        let key = template.key();
        let mut map = self.write();
        if map.contains_key(&key) {
            return Err(PromptStoreError::DuplicateTemplate { key });
        }
        debug!(key = %key, "prompt template added");
        map.insert(key, template);
        Ok(())
    }

    /// Returns a template by name.
    ///
    /// Without a version, the template with the greatest version string wins.
    /// Versions compare as plain strings, so `"10.0" < "9.0"`; callers must use
    /// versions that sort in the intended order.
    pub fn get(&self, name: &str, version: Option<&str>) -> Option<PromptTemplate> {
        let map = self.read();
        match version {
            Some(v) => map.get(&make_key(name, v)).cloned(),
            None => map
                .values()
                .filter(|t| t.name == name)
                .max_by(|a, b| a.version.cmp(&b.version))
                .cloned(),
        }
    }

    /// Replaces an existing template with the same `name:version` key.
    ///
    /// # Errors
    /// [`PromptStoreError::NotFound`] if the key is absent.
    pub fn update(&self, template: PromptTemplate) -> Result<()> {
        let key = template.key();
        let mut map = self.write();
        match map.get_mut(&key) {
            Some(slot) => {
                *slot = template;
                debug!(key = %key, "prompt template updated");
                Ok(())
            }
            None => Err(PromptStoreError::NotFound { key }),
        }
    }

    /// # Errors
    /// [`PromptStoreError::NotFound`] if the key is absent.
    pub fn delete(&self, name: &str, version: &str) -> Result<()> {
        let key = make_key(name, version);
        match self.write().remove(&key) {
            Some(_) => {
                debug!(key = %key, "prompt template deleted");
                Ok(())
            }
            None => Err(PromptStoreError::NotFound { key }),
        }
    }

    /// Snapshot of every stored template, in no particular order.
    ///
    /// The iterator is `Clone`; a clone taken before consumption replays the
    /// same snapshot from the start.
    pub fn list(&self) -> impl Iterator<Item = PromptTemplate> + Clone + use<> {
        let snapshot: Vec<PromptTemplate> = self.read().values().cloned().collect();
        snapshot.into_iter()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Adds every template from a JSON array file.
    ///
    /// Returns how many templates were added. The file is all or nothing: a
    /// key already in the store, or repeated within the file, adds none.
    ///
    /// # Errors
    /// - [`PromptStoreError::Io`] / [`PromptStoreError::Json`] on read or parse failure
    /// - [`PromptStoreError::DuplicateTemplate`] on a key collision
    pub fn load_templates_file(&self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let templates: Vec<PromptTemplate> = serde_json::from_str(&raw)?;

        let mut map = self.write();
        let mut batch = HashMap::with_capacity(templates.len());
        for t in templates {
            let key = t.key();
            if map.contains_key(&key) || batch.contains_key(&key) {
                return Err(PromptStoreError::DuplicateTemplate { key });
            }
            batch.insert(key, t);
        }
        let count = batch.len();
        map.extend(batch);
        drop(map);

        info!(path = %path.display(), count, "prompt templates loaded");
        Ok(count)
    }

    // A poisoned lock only means a writer panicked between statements that
    // never leave the map half-written, so the inner map is still usable.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, PromptTemplate>> {
        self.templates.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, PromptTemplate>> {
        self.templates.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Built-in templates: one per task type of the default routing policy, plus
/// `example_prompt` for the example chain.
pub fn default_templates() -> Vec<PromptTemplate> {
    vec![
        PromptTemplate::new(
            "translate",
            "Translate the following text to {target_language}:\n\n{input_text}",
        )
        .with_description("Translate text into a target language"),
        PromptTemplate::new(
            "summarize",
            "Summarize the following text in at most {max_length} words:\n\n{input_text}",
        )
        .with_description("Summarize text to a bounded length"),
        PromptTemplate::new(
            "generate",
            "{input_text}",
        )
        .with_description("Free-form generation from the input text"),
        PromptTemplate::new(
            "code_generation",
            "Write {language} code for the following task. Reply with code only.\n\n{input_text}",
        )
        .with_description("Generate source code for a described task"),
        PromptTemplate::new(
            "complex_reasoning",
            "Think through the following problem step by step, then state the answer.\n\n{input_text}",
        )
        .with_description("Multi-step reasoning over a problem statement"),
        PromptTemplate::new("example_prompt", "Answer the following query:\n\n{query}")
            .with_description("Prompt for the example query chain"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tpl(name: &str, version: &str, text: &str) -> PromptTemplate {
        PromptTemplate::new(name, text).with_version(version)
    }

    #[test]
    fn duplicate_add_fails() {
        let store = PromptStore::new();
        store.add(tpl("greeting", "1.0", "Hello, {name}!")).unwrap();
        let err = store.add(tpl("greeting", "1.0", "Hi")).unwrap_err();
        assert!(matches!(err, PromptStoreError::DuplicateTemplate { key } if key == "greeting:1.0"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn update_missing_fails_and_existing_replaces() {
        let store = PromptStore::new();
        let err = store.update(tpl("example", "1.0", "x")).unwrap_err();
        assert!(matches!(err, PromptStoreError::NotFound { .. }));

        store.add(tpl("example", "1.0", "Hello, {name}!")).unwrap();
        store.update(tpl("example", "1.0", "Hi, {name}!")).unwrap();
        assert_eq!(store.get("example", None).unwrap().template, "Hi, {name}!");
    }

    #[test]
    fn get_without_version_returns_greatest() {
        let store = PromptStore::new();
        store.add(tpl("greeting", "1.0", "v1")).unwrap();
        store.add(tpl("greeting", "2.0", "v2")).unwrap();
        store.add(tpl("other", "3.0", "v3")).unwrap();

        assert_eq!(store.get("greeting", None).unwrap().version, "2.0");
        assert_eq!(store.get("greeting", Some("1.0")).unwrap().template, "v1");
        assert!(store.get("greeting", Some("9.9")).is_none());
        assert!(store.get("missing", None).is_none());
    }

    #[test]
    fn name_match_is_exact() {
        let store = PromptStore::new();
        store.add(tpl("a:b", "9.0", "colon")).unwrap();
        store.add(tpl("a", "1.0", "other")).unwrap();
        assert_eq!(store.get("a", None).unwrap().template, "other");
        assert_eq!(store.get("a:b", None).unwrap().template, "colon");
    }

    #[test]
    fn delete_then_get_is_none() {
        let store = PromptStore::new();
        store.add(tpl("example", "1.0", "x")).unwrap();
        store.delete("example", "1.0").unwrap();
        assert!(store.get("example", None).is_none());
        assert!(matches!(
            store.delete("example", "1.0"),
            Err(PromptStoreError::NotFound { .. })
        ));
    }

    #[test]
    fn list_is_restartable() {
        let store = PromptStore::new();
        store.add(tpl("example1", "1.0", "Hello")).unwrap();
        store.add(tpl("example2", "1.0", "Goodbye")).unwrap();

        let listing = store.list();
        let replay = listing.clone();
        assert_eq!(listing.count(), 2);

        let mut names: Vec<_> = replay.map(|t| t.name).collect();
        names.sort();
        assert_eq!(names, vec!["example1", "example2"]);
    }

    #[test]
    fn defaults_cover_policy_tasks() {
        let store = PromptStore::with_defaults();
        for task in ["translate", "summarize", "generate", "code_generation", "complex_reasoning"] {
            let t = store.get(task, None).unwrap();
            assert!(t.required_variables().contains("input_text"), "{task}");
        }
    }

    #[test]
    fn load_file_adds_templates() {
        let dir = std::env::temp_dir().join(format!("prompt-store-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("templates.json");
        std::fs::write(
            &path,
            r#"[{"name":"greeting","template":"Hello, {name}!"},
                {"name":"greeting","version":"2.0","template":"Hey {name}"}]"#,
        )
        .unwrap();

        let store = PromptStore::new();
        assert_eq!(store.load_templates_file(&path).unwrap(), 2);
        assert_eq!(store.get("greeting", None).unwrap().template, "Hey {name}");
        assert!(matches!(
            store.load_templates_file(&path),
            Err(PromptStoreError::DuplicateTemplate { .. })
        ));
        assert!(matches!(
            store.load_templates_file(dir.join("missing.json")),
            Err(PromptStoreError::Io(_))
        ));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn load_file_with_duplicate_adds_nothing() {
        let dir = std::env::temp_dir().join(format!("prompt-store-dup-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("templates.json");
        std::fs::write(
            &path,
            r#"[{"name":"a","template":"A"},
                {"name":"b","template":"B"},
                {"name":"a","template":"A again"}]"#,
        )
        .unwrap();

        let store = PromptStore::new();
        let err = store.load_templates_file(&path).unwrap_err();
        assert!(matches!(err, PromptStoreError::DuplicateTemplate { key } if key == "a:1.0"));
        assert!(store.is_empty());

        store.add(tpl("b", "1.0", "existing")).unwrap();
        std::fs::write(&path, r#"[{"name":"c","template":"C"},{"name":"b","template":"B"}]"#).unwrap();
        assert!(store.load_templates_file(&path).is_err());
        assert_eq!(store.len(), 1);
        assert!(store.get("c", None).is_none());
        std::fs::remove_dir_all(&dir).ok();
    }
}
