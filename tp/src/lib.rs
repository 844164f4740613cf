//! TaskPlan - LLM-driven objective planner
//!
//! Sends an objective to a hosted language model, reads back a JSON array of
//! step descriptions and returns an ordered plan that always contains the
//! required research and writing steps.
//!
//! # Modules
//!
//! - [`planning`] - Planner, response parsing and required-step policy
//! - [`llm`] - LLM client trait with OpenAI and Anthropic implementations
//! - [`prompts`] - Prompt templates with on-disk overrides
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use taskplan::{Planner, PromptLoader, create_client, config::Config};
//!
//! let config = Config::load(None)?;
//! let planner = Planner::new(create_client(&config.llm)?, PromptLoader::embedded_only());
//! let plan = planner.plan("Write a short summary about Python programming").await?;
//! ```

pub mod cli;
pub mod config;
pub mod llm;
pub mod planning;
pub mod prompts;

// Re-export commonly used types
pub use config::{Config, LlmConfig, PlannerConfig};
pub use llm::{CompletionRequest, CompletionResponse, FailureKind, LlmClient, LlmError, create_client};
pub use planning::{ParseFailure, Plan, PlanError, PlanStep, Planner, REQUIRED_STEPS, parse_steps};
pub use prompts::{PlanPromptContext, PromptLoader};
