//! Steps every plan must contain

use tracing::debug;

use super::types::PlanStep;

/// Required steps, in the order they are appended when missing
pub const REQUIRED_STEPS: [&str; 3] = [
    "Research agent: Use Tavily to perform a broad web search and collect top relevant items (title, authors, year, venue/source, URL, DOI if available).",
    "Research agent: For each collected item, search on arXiv to find matching preprints/versions and extract PDF URLs (if available).",
    "Writer agent: Generate the final comprehensive Markdown report, including inline citations and a full References list with clickable links.",
];

/// Append every required step not already present
///
/// Existing steps keep their order. Presence is an exact match on the
/// trimmed text. Returns the augmented list and how many steps were added.
pub fn ensure_required_steps(mut steps: Vec<PlanStep>) -> (Vec<PlanStep>, usize) {
    debug!(step_count = steps.len(), "ensure_required_steps: called");
    let mut appended = 0;
    for required in REQUIRED_STEPS {
        if steps.iter().any(|s| s.as_str() == required) {
            continue;
        }
        if let Some(step) = PlanStep::new(required) {
            debug!(%required, "ensure_required_steps: appending");
            steps.push(step);
            appended += 1;
        }
    }
    (steps, appended)
}

/// The fallback plan used when the model output is unusable
pub fn fallback_steps() -> Vec<PlanStep> {
    ensure_required_steps(Vec::new()).0
}
