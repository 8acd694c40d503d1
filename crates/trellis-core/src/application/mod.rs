/// Prompt rejection before any oracle call
pub mod guard;

/// Planner and explainer instructions
pub mod prompts;

/// The generation pipeline
pub mod generation_service;

pub use generation_service::{GenerationConfig, GenerationOutcome, GenerationService};
