//! Explanation pipeline.
//!
//! context → decompose → analogies → synthesis → (translation) → confidence.
//! Every step returns an explicit result; the orchestrator turns failures
//! into degraded values so a run always produces a [`PipelineResult`].

pub mod analogy;
pub mod confidence;
pub mod context;
pub mod decompose;
pub mod diagram;
pub mod llm;
pub mod orchestrator;
pub mod prompt;
pub mod synthesis;
pub mod translate;
pub mod types;

pub use llm::{LlmError, LlmGateway};
pub use orchestrator::ExplanationPipeline;
pub use types::*;

/// Characters of an error message kept in a step record.
pub const STEP_ERROR_CHARS: usize = 100;

/// Characters of an error message kept in user-visible placeholder text.
pub const PLACEHOLDER_ERROR_CHARS: usize = 200;

/// Language for which translation is a no-op.
pub const ENGLISH: &str = "English";

/// First `max` characters of `text` (character-, not byte-based).
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
