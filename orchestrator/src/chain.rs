//! Prompt chains: a fixed template → model pipeline with declared inputs and
//! outputs.
//!
//! Unlike task routing, a chain names its template and model itself; it does
//! not consult the policy table or the response cache. Run one with
//! [`crate::Orchestrator::run_chain`].

use std::collections::BTreeMap;

use llm_service::GenerationParams;
use serde_json::{Value, json};

use crate::error::{OrchestratorError, Result};

/// Named string values flowing into or out of a chain.
pub type ChainValues = BTreeMap<String, String>;

pub const EXAMPLE_TEMPLATE: &str = "example_prompt";
pub const EXAMPLE_MODEL: &str = "gpt-3.5-turbo";

#[derive(Debug, Clone, PartialEq)]
pub struct PromptChain {
    name: String,
    template: String,
    model: String,
    inputs: Vec<String>,
    output: String,
    params: GenerationParams,
}

impl PromptChain {
    /// Chain with no declared inputs and a single `response` output.
    pub fn new(name: impl Into<String>, template: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
            model: model.into(),
            inputs: Vec::new(),
            output: "response".to_string(),
            params: GenerationParams::default(),
        }
    }

    /// `query` → `example_prompt` → `gpt-3.5-turbo` → `response`.
    pub fn example() -> Self {
        Self::new("example", EXAMPLE_TEMPLATE, EXAMPLE_MODEL).with_input("query")
    }

    /// Declares a required input; it is also bound to the same-named placeholder.
    pub fn with_input(mut self, name: impl Into<String>) -> Self {
        self.inputs.push(name.into());
        self
    }

    pub fn with_output(mut self, name: impl Into<String>) -> Self {
        self.output = name.into();
        self
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn params(&self) -> &GenerationParams {
        &self.params
    }

    pub fn output_key(&self) -> &str {
        &self.output
    }

    /// JSON Schema object describing the accepted inputs.
    pub fn input_schema(&self) -> Value {
        string_object_schema(&self.inputs)
    }

    /// JSON Schema object describing the produced outputs.
    pub fn output_schema(&self) -> Value {
        string_object_schema(std::slice::from_ref(&self.output))
    }

    /// Fails on the first declared input missing from `inputs`.
    ///
    /// # Errors
    /// [`OrchestratorError::InvalidRequest`] naming the chain and the input.
    pub fn check_inputs(&self, inputs: &ChainValues) -> Result<()> {
        match self.inputs.iter().find(|name| !inputs.contains_key(*name)) {
            Some(missing) => Err(OrchestratorError::InvalidRequest(format!(
                "chain '{}' requires input '{missing}'",
                self.name
            ))),
            None => Ok(()),
        }
    }

    /// Wraps a completion into the chain's output map.
    pub fn outputs(&self, completion: String) -> ChainValues {
        ChainValues::from([(self.output.clone(), completion)])
    }
}

fn string_object_schema(fields: &[String]) -> Value {
    let properties: serde_json::Map<String, Value> = fields
        .iter()
        .map(|f| (f.clone(), json!({ "type": "string" })))
        .collect();
    json!({
        "type": "object",
        "properties": properties,
        "required": fields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn example_schemas() {
        let chain = PromptChain::example();
        assert_eq!(
            chain.input_schema(),
            json!({
                "type": "object",
                "properties": { "query": { "type": "string" } },
                "required": ["query"]
            })
        );
        assert_eq!(
            chain.output_schema(),
            json!({
                "type": "object",
                "properties": { "response": { "type": "string" } },
                "required": ["response"]
            })
        );
    }

    #[test]
    fn missing_input_is_invalid() {
        let chain = PromptChain::example();
        let err = chain.check_inputs(&ChainValues::new()).unwrap_err();
        assert!(matches!(&err, OrchestratorError::InvalidRequest(m) if m.contains("'query'")));

        let inputs = ChainValues::from([("query".to_string(), "hi".to_string())]);
        assert!(chain.check_inputs(&inputs).is_ok());
    }

    #[test]
    fn custom_output_key() {
        let chain = PromptChain::new("t", "translate", "gpt-4").with_output("translation");
        let out = chain.outputs("Hallo".into());
        assert_eq!(out.get("translation").map(String::as_str), Some("Hallo"));
        assert_eq!(chain.output_schema()["required"], json!(["translation"]));
    }
}
