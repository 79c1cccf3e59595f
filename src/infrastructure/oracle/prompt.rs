use anyhow::{Context, Result};
use handlebars::Handlebars;
use serde::Serialize;
use std::path::Path;

use crate::domain::errors::OracleError;
use crate::domain::models::Observation;

/// Policy prompt shipped with the binary.
pub const DEFAULT_POLICY_TEMPLATE: &str = include_str!("../../../prompts/policy.hbs");

const TEMPLATE_NAME: &str = "policy";

/// Values available to the policy template.
#[derive(Debug, Serialize)]
struct PromptContext {
    observation: String,
    reference_price: String,
    balance: String,
    services_ok: usize,
    services_total: usize,
    coherence: String,
}

impl PromptContext {
    fn new(observation: &Observation, coherence: f64) -> Result<Self, serde_json::Error> {
        Ok(Self {
            observation: serde_json::to_string(observation)?,
            reference_price: observation
                .reference_price
                .map_or_else(|| "N/A".to_string(), |price| format!("{price:.2}")),
            balance: format!("{:.2}", observation.synthetic_balance),
            services_ok: observation.healthy_count(),
            services_total: observation.total(),
            coherence: format!("{coherence:.3}"),
        })
    }
}

/// Renders the policy prompt from a Handlebars template.
///
/// Business rules live in the template text, so they can be changed without
/// touching the control flow.
#[derive(Debug)]
pub struct PromptRenderer {
    registry: Handlebars<'static>,
}

impl PromptRenderer {
    /// Renderer using [`DEFAULT_POLICY_TEMPLATE`].
    pub fn embedded() -> Result<Self> {
        Self::from_template(DEFAULT_POLICY_TEMPLATE)
    }

    /// Renderer for an arbitrary template source.
    pub fn from_template(source: &str) -> Result<Self> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(handlebars::no_escape);
        registry
            .register_template_string(TEMPLATE_NAME, source)
            .context("Invalid policy prompt template")?;
        Ok(Self { registry })
    }

    /// Renderer for a template file on disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read prompt template {}", path.display()))?;
        Self::from_template(&source)
    }

    /// Embedded template unless `path` is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::embedded(),
        }
    }

    /// Render the prompt for one observation.
    pub fn render(&self, observation: &Observation, coherence: f64) -> Result<String, OracleError> {
        let context = PromptContext::new(observation, coherence)
            .map_err(|err| OracleError::Prompt(err.to_string()))?;
        self.registry
            .render(TEMPLATE_NAME, &context)
            .map_err(|err| OracleError::Prompt(err.to_string()))
    }
}
