use super::llm::LlmGateway;
use super::prompt::build_translation_prompt;
use super::ENGLISH;

pub const TRANSLATION_TEMPERATURE: f32 = 0.3;
const TRANSLATION_MAX_TOKENS: u32 = 1500;

/// True when `target_language` needs no translation call.
pub fn is_identity(target_language: &str) -> bool {
    let target = target_language.trim();
    target.is_empty() || target.eq_ignore_ascii_case(ENGLISH)
}

/// Translate `text`, keeping formatting. Any failure returns `text` unchanged.
pub fn translate<G: LlmGateway>(gateway: &G, text: &str, target_language: &str) -> String {
    if is_identity(target_language) || !gateway.is_configured() || text.trim().is_empty() {
        return text.to_string();
    }

    let prompt = build_translation_prompt(text, target_language.trim());
    match gateway.complete_bounded(&prompt, TRANSLATION_TEMPERATURE, TRANSLATION_MAX_TOKENS) {
        Ok(translated) => translated,
        Err(e) => {
            tracing::warn!(
                error = %e,
                language = target_language,
                "Translation failed, keeping original text"
            );
            text.to_string()
        }
    }
}
