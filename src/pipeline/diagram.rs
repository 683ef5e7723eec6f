//! Diagram quick action: one infographic image per concept.

use super::llm::{DiagramGateway, LlmError};
use super::prompt::build_diagram_prompt;
use super::{truncate_chars, PLACEHOLDER_ERROR_CHARS};

pub const DEFAULT_DIAGRAM_SIZE: &str = "1024x1024";

/// Sizes the image backend accepts for a single generated diagram.
pub const DIAGRAM_SIZES: &[&str] = &["1024x1024", "1792x1024", "1024x1792"];

/// Ask the gateway for an infographic of `concept`. Returns the image URL.
pub fn generate_diagram<D: DiagramGateway>(
    gateway: &D,
    concept: &str,
    size: &str,
) -> Result<String, LlmError> {
    let size = if DIAGRAM_SIZES.contains(&size) {
        size
    } else {
        tracing::warn!(size, "Unsupported diagram size, using default");
        DEFAULT_DIAGRAM_SIZE
    };
    let url = gateway.generate_image(&build_diagram_prompt(concept), size)?;
    tracing::debug!(size, "Diagram generated");
    Ok(url)
}

/// User-facing text for a failed diagram request.
pub fn failure_message(error: &LlmError) -> String {
    if error.is_configuration() {
        "No API key".to_string()
    } else {
        truncate_chars(&error.to_string(), PLACEHOLDER_ERROR_CHARS)
    }
}
