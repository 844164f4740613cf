//! Planner - decomposes an objective into an ordered step list

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use super::parse::parse_steps;
use super::required::{REQUIRED_STEPS, ensure_required_steps, fallback_steps};
use super::types::Plan;
use crate::config::{Config, PlannerConfig};
use crate::llm::{CompletionRequest, LlmClient, LlmError, Message};
use crate::prompts::{PlanPromptContext, PromptLoader};

/// System prompt sent with every planning request; the rendered template
/// travels as the user message
const SYSTEM_PROMPT: &str = "You are a planning agent. You answer with a JSON array of strings and nothing else.";

/// Errors surfaced by [`Planner::plan`]
///
/// Malformed model output is not among them: it is repaired locally.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("objective must not be empty")]
    EmptyObjective,

    #[error("failed to build planning prompt: {0}")]
    Prompt(String),

    #[error(transparent)]
    Llm(#[from] LlmError),
}

impl PlanError {
    /// The underlying completion-API failure, if that is what this is
    pub fn as_llm(&self) -> Option<&LlmError> {
        match self {
            PlanError::Llm(e) => Some(e),
            _ => None,
        }
    }
}

/// Produces plans through an injected completion client
pub struct Planner {
    llm: Arc<dyn LlmClient>,
    prompts: PromptLoader,
    max_tokens: u32,
    temperature: Option<f32>,
}

impl Planner {
    /// Create a planner with default settings
    pub fn new(llm: Arc<dyn LlmClient>, prompts: PromptLoader) -> Self {
        Self::with_config(llm, prompts, &PlannerConfig::default(), None)
    }

    /// Create a planner from the planner section of the config
    pub fn with_config(
        llm: Arc<dyn LlmClient>,
        prompts: PromptLoader,
        config: &PlannerConfig,
        temperature: Option<f32>,
    ) -> Self {
        debug!(max_tokens = config.max_tokens, ?temperature, "Planner::with_config: called");
        Self {
            llm,
            prompts,
            max_tokens: config.max_tokens,
            temperature,
        }
    }

    /// Wire a planner from the full application config
    pub fn from_config(llm: Arc<dyn LlmClient>, config: &Config) -> Self {
        let prompts = PromptLoader::new(&config.planner.prompts_dir);
        Self::with_config(llm, prompts, &config.planner, config.llm.temperature)
    }

    /// Build the completion request for `objective`
    pub fn build_request(&self, objective: &str) -> Result<CompletionRequest, PlanError> {
        let objective = objective.trim();
        if objective.is_empty() {
            return Err(PlanError::EmptyObjective);
        }

        let context = PlanPromptContext::new(objective, &REQUIRED_STEPS);
        let prompt = self
            .prompts
            .render_plan(&context)
            .map_err(|e| PlanError::Prompt(format!("{:#}", e)))?;

        Ok(CompletionRequest {
            system_prompt: SYSTEM_PROMPT.to_string(),
            messages: vec![Message::user(prompt)],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        })
    }

    /// Decompose `objective` into an ordered plan
    ///
    /// Makes exactly one completion call. Unusable model output falls back
    /// to the required steps; completion failures are returned unchanged.
    pub async fn plan(&self, objective: &str) -> Result<Plan, PlanError> {
        debug!(objective_len = objective.len(), "Planner::plan: called");
        let request = self.build_request(objective)?;

        let response = self.llm.complete(request).await?;
        debug!(stop_reason = ?response.stop_reason, usage = response.usage.total(), "Planner::plan: response received");

        let raw = response.content.unwrap_or_default();
        let steps = match parse_steps(&raw) {
            Ok(parsed) => {
                let model_steps = parsed.len();
                let (steps, appended) = ensure_required_steps(parsed);
                info!(model_steps, appended, total = steps.len(), "Plan ready");
                steps
            }
            Err(failure) => {
                warn!(%failure, raw_len = raw.len(), "Model output unusable, falling back to required steps");
                fallback_steps()
            }
        };

        Ok(Plan::new(steps))
    }
}
