//! Planning module - objective decomposition
//!
//! # Architecture
//!
//! ```text
//! Objective → PromptLoader → LlmClient → parse_steps → ensure_required_steps → Plan
//!                                             │
//!                                    (unusable output: fallback)
//! ```
//!
//! The Planner makes one completion call per objective. Everything after
//! the call is local and infallible.

mod parse;
mod planner;
mod required;
mod types;

pub use parse::{ParseFailure, parse_steps};
pub use planner::{PlanError, Planner};
pub use required::{REQUIRED_STEPS, ensure_required_steps, fallback_steps};
pub use types::{Plan, PlanStep};
