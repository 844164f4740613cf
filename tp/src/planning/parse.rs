//! Turning raw model output into plan steps
//!
//! Parsing never errors out of the planner: a failure is a value the caller
//! inspects and then replaces with the fallback plan.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::types::PlanStep;

/// Why a model response could not be read as a step list
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    #[error("response was empty")]
    Empty,

    #[error("response is not JSON: {0}")]
    NotJson(String),

    #[error("expected a JSON array, got {0}")]
    NotAnArray(&'static str),

    #[error("array item {index} is not a string")]
    NonStringItem { index: usize },

    #[error("array contained no non-blank steps")]
    NoSteps,
}

/// Parse model output as a JSON array of step strings
///
/// Accepts the array bare, inside a Markdown code fence, or surrounded by
/// prose. Items are trimmed and blank items dropped; order is kept.
pub fn parse_steps(raw: &str) -> Result<Vec<PlanStep>, ParseFailure> {
    debug!(raw_len = raw.len(), "parse_steps: called");
    let text = strip_code_fences(raw);
    if text.is_empty() {
        return Err(ParseFailure::Empty);
    }

    let value = match serde_json::from_str::<Value>(&text) {
        Ok(value) => value,
        Err(err) => {
            debug!(error = %err, "parse_steps: whole text is not JSON, trying embedded array");
            extract_json_array(&text).ok_or_else(|| ParseFailure::NotJson(err.to_string()))?
        }
    };

    let Value::Array(items) = value else {
        return Err(ParseFailure::NotAnArray(kind_of(&value)));
    };

    let mut steps = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let Value::String(text) = item else {
            return Err(ParseFailure::NonStringItem { index });
        };
        if let Some(step) = PlanStep::new(text) {
            steps.push(step);
        }
    }

    if steps.is_empty() {
        return Err(ParseFailure::NoSteps);
    }

    debug!(step_count = steps.len(), "parse_steps: parsed");
    Ok(steps)
}

fn strip_code_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }
    let mut lines: Vec<&str> = trimmed.lines().collect();
    if lines.first().is_some_and(|first| first.trim_start().starts_with("```")) {
        lines.remove(0);
    }
    if lines.last().is_some_and(|last| last.trim_start().starts_with("```")) {
        lines.pop();
    }
    lines.join("\n").trim().to_string()
}

/// First complete JSON array embedded in `text`
///
/// Each `[` is tried in turn and text after the value is ignored. An array of
/// strings wins over an earlier array of anything else.
fn extract_json_array(text: &str) -> Option<Value> {
    let mut first_array = None;
    for (idx, ch) in text.char_indices() {
        if ch != '[' {
            continue;
        }
        let mut deserializer = serde_json::Deserializer::from_str(&text[idx..]);
        let Ok(value) = Value::deserialize(&mut deserializer) else {
            continue;
        };
        let Value::Array(items) = &value else {
            continue;
        };
        if items.iter().all(Value::is_string) {
            return Some(value);
        }
        first_array.get_or_insert(value);
    }
    first_array
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
