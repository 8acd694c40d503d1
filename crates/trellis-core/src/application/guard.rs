use crate::error::PipelineError;

/// Phrases that suggest an attempt to override the planner's instructions
pub const SUSPICIOUS_PHRASES: [&str; 5] = [
    "ignore previous",
    "ignore above",
    "disregard",
    "system prompt",
    "you are now",
];

pub const EMPTY_PROMPT: &str = "Prompt is required";
pub const OVERRIDE_ATTEMPT: &str =
    "That prompt looks like it might be trying to override the system. Please rephrase.";

/// Reject prompts before any oracle call is made
pub fn check_prompt(prompt: &str) -> Result<(), PipelineError> {
    if prompt.trim().is_empty() {
        return Err(PipelineError::InvalidInput(EMPTY_PROMPT.to_string()));
    }

    let lower = prompt.to_lowercase();
    if SUSPICIOUS_PHRASES.iter().any(|phrase| lower.contains(phrase)) {
        return Err(PipelineError::InvalidInput(OVERRIDE_ATTEMPT.to_string()));
    }

    Ok(())
}
