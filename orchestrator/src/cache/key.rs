use serde::Serialize;
use sha2::{Digest, Sha256};

use llm_service::GenerationParams;

pub const CACHE_KEY_PREFIX: &str = "llm:response:";

#[derive(Serialize)]
struct KeyMaterial<'a> {
    task_type: &'a str,
    prompt: &'a str,
    model: &'a str,
    params: &'a GenerationParams,
}

/// `llm:response:<sha256 hex>` over task type, formatted prompt, model and params.
///
/// Parameter maps are ordered, so equal inputs always hash to the same key.
pub fn cache_key(
    task_type: &str,
    prompt: &str,
    model: &str,
    params: &GenerationParams,
) -> Result<String, serde_json::Error> {
    let material = serde_json::to_vec(&KeyMaterial {
        task_type,
        prompt,
        model,
        params,
    })?;
    let mut h = Sha256::new();
    h.update(&material);
    Ok(format!("{CACHE_KEY_PREFIX}{:x}", h.finalize()))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn equal_inputs_share_a_key() {
        let p = GenerationParams::default();
        let a = cache_key("translate", "Hello", "gpt-3.5-turbo", &p).unwrap();
        let b = cache_key("translate", "Hello", "gpt-3.5-turbo", &p.clone()).unwrap();
        assert_eq!(a, b);
        assert!(a.starts_with(CACHE_KEY_PREFIX));
        assert_eq!(a.len(), CACHE_KEY_PREFIX.len() + 64);
    }

    #[test]
    fn every_component_changes_the_key() {
        let p = GenerationParams::default();
        let base = cache_key("translate", "Hello", "gpt-4", &p).unwrap();
        let hotter = GenerationParams {
            temperature: 0.9,
            ..p.clone()
        };
        assert_ne!(base, cache_key("summarize", "Hello", "gpt-4", &p).unwrap());
        assert_ne!(base, cache_key("translate", "Hello!", "gpt-4", &p).unwrap());
        assert_ne!(base, cache_key("translate", "Hello", "gpt-3.5-turbo", &p).unwrap());
        assert_ne!(base, cache_key("translate", "Hello", "gpt-4", &hotter).unwrap());
    }

    #[test]
    fn extra_param_insertion_order_is_irrelevant() {
        let mut first = BTreeMap::new();
        first.insert("seed".to_string(), serde_json::json!(7));
        first.insert("logprobs".to_string(), serde_json::json!(true));
        let mut second = BTreeMap::new();
        second.insert("logprobs".to_string(), serde_json::json!(true));
        second.insert("seed".to_string(), serde_json::json!(7));

        let a = GenerationParams {
            extra_params: first,
            ..GenerationParams::default()
        };
        let b = GenerationParams {
            extra_params: second,
            ..GenerationParams::default()
        };
        assert_eq!(
            cache_key("generate", "x", "gpt-4", &a).unwrap(),
            cache_key("generate", "x", "gpt-4", &b).unwrap()
        );
    }
}
