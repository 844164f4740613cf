//! Plan and PlanStep

use std::fmt;

use serde::{Deserialize, Serialize};

/// One unit of work, never empty and never padded with whitespace
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlanStep(String);

impl PlanStep {
    /// Trim `text`; `None` when nothing is left
    pub fn new(text: impl AsRef<str>) -> Option<Self> {
        let trimmed = text.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for PlanStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PlanStep {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PlanStep {
    type Error = &'static str;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        PlanStep::new(value).ok_or("plan step must not be empty")
    }
}

impl From<PlanStep> for String {
    fn from(step: PlanStep) -> Self {
        step.0
    }
}

/// Ordered steps produced for one objective
///
/// Serializes as a bare JSON array of strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Plan {
    steps: Vec<PlanStep>,
}

impl Plan {
    pub fn new(steps: Vec<PlanStep>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PlanStep> {
        self.steps.iter()
    }

    /// Exact match against a step's text
    pub fn contains(&self, step: &str) -> bool {
        self.steps.iter().any(|s| s.as_str() == step)
    }

    pub fn into_strings(self) -> Vec<String> {
        self.steps.into_iter().map(PlanStep::into_string).collect()
    }
}

impl<'a> IntoIterator for &'a Plan {
    type Item = &'a PlanStep;
    type IntoIter = std::slice::Iter<'a, PlanStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}
