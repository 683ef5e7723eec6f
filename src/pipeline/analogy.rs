//! Three labeled analogies (story, visual, practical) for a concept.
//!
//! The answer is passed through untouched. When the gateway fails the
//! orchestrator shows [`failure_placeholder`] in place of the analogies.

use crate::models::{effective_profile, Profile};

use super::llm::{LlmError, LlmGateway};
use super::prompt::build_analogy_prompt;
use super::{truncate_chars, PLACEHOLDER_ERROR_CHARS};

pub const ANALOGY_TEMPERATURE: f32 = 0.7;
const ANALOGY_MAX_TOKENS: u32 = 600;

/// Shown instead of analogies when no credential is configured.
pub const MISSING_CREDENTIAL_WARNING: &str = "⚠️ OPENAI_API_KEY not set";

/// Ask the gateway for three analogies, each followed by a one-line mapping.
pub fn generate_analogies<G: LlmGateway>(
    gateway: &G,
    concept: &str,
    atoms: &[String],
    profile: Option<&Profile>,
) -> Result<String, LlmError> {
    if !gateway.is_configured() {
        return Err(LlmError::MissingCredential);
    }

    let prompt = build_analogy_prompt(concept, atoms, effective_profile(profile));
    let text = gateway.complete_bounded(&prompt, ANALOGY_TEMPERATURE, ANALOGY_MAX_TOKENS)?;

    tracing::debug!(chars = text.len(), "Analogies generated");
    Ok(text)
}

/// User-visible text standing in for analogies that could not be generated.
pub fn failure_placeholder(error: &LlmError) -> String {
    if error.is_configuration() {
        MISSING_CREDENTIAL_WARNING.to_string()
    } else {
        format!(
            "Analogy generation failed: {}",
            truncate_chars(&error.to_string(), PLACEHOLDER_ERROR_CHARS)
        )
    }
}
