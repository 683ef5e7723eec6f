//! Final explanation text.
//!
//! With context the answer is grounded in an evidence bundle cut to a
//! character budget. Without context a fixed five-part outline is used.

use crate::models::{effective_profile, Profile};

use super::llm::{LlmError, LlmGateway};
use super::prompt::{
    atoms_line, build_direct_synthesis_prompt, build_grounded_synthesis_prompt, grounded_query,
    TRUNCATION_MARKER,
};
use super::{truncate_chars, PLACEHOLDER_ERROR_CHARS};

pub const SYNTHESIS_TEMPERATURE: f32 = 0.7;
const GROUNDED_MAX_TOKENS: u32 = 800;

/// Which prompt shape was used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthesisMode {
    Grounded,
    Direct,
}

impl SynthesisMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Grounded => "grounded",
            Self::Direct => "direct",
        }
    }
}

/// Context text and the atoms line, joined by a blank line and cut to `budget`.
pub fn build_evidence(context: &str, atoms: &[String], budget: usize) -> String {
    let joined = [context.to_string(), atoms_line(atoms)].join("\n\n");
    if joined.chars().count() > budget {
        format!("{}{TRUNCATION_MARKER}", truncate_chars(&joined, budget))
    } else {
        joined
    }
}

/// Produce the explanation. `context` empty means no grounding material.
pub fn synthesize<G: LlmGateway>(
    gateway: &G,
    concept: &str,
    atoms: &[String],
    profile: Option<&Profile>,
    context: &str,
    evidence_budget: usize,
) -> Result<(String, SynthesisMode), LlmError> {
    let profile = effective_profile(profile);

    if context.is_empty() {
        let prompt = build_direct_synthesis_prompt(concept, atoms, profile);
        let text = gateway.complete(&prompt, SYNTHESIS_TEMPERATURE)?;
        return Ok((text, SynthesisMode::Direct));
    }

    let evidence = build_evidence(context, atoms, evidence_budget);
    let query = grounded_query(concept, profile);
    let prompt = build_grounded_synthesis_prompt(&query, &evidence);
    let text = gateway.complete_bounded(&prompt, SYNTHESIS_TEMPERATURE, GROUNDED_MAX_TOKENS)?;
    Ok((text, SynthesisMode::Grounded))
}

/// User-visible text standing in for an explanation that could not be produced.
pub fn failure_placeholder(error: &LlmError) -> String {
    format!(
        "Synthesis error: {}",
        truncate_chars(&error.to_string(), PLACEHOLDER_ERROR_CHARS)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::ScriptedLlm;

    fn atoms(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn evidence_joins_context_and_atoms() {
        let evidence = build_evidence("[1] T\nS\nSource: L", &atoms(&["a", "b"]), 4000);
        assert_eq!(evidence, "[1] T\nS\nSource: L\n\nAtomic concepts: a, b");
    }

    #[test]
    fn long_context_is_cut_to_budget_with_marker() {
        let context = "c".repeat(5000);
        let evidence = build_evidence(&context, &atoms(&["a"]), 4000);
        assert!(evidence.ends_with("\n\n...truncated..."));
        assert_eq!(
            evidence.chars().count(),
            4000 + TRUNCATION_MARKER.chars().count()
        );
    }

    #[test]
    fn grounded_prompt_carries_truncated_evidence() {
        let llm = ScriptedLlm::always("Explanation");
        let context = "c".repeat(5000);
        let (text, mode) =
            synthesize(&llm, "gravity", &atoms(&["a"]), None, &context, 4000).unwrap();
        assert_eq!(text, "Explanation");
        assert_eq!(mode, SynthesisMode::Grounded);

        let prompt = llm.prompt(0);
        assert!(prompt.contains(&format!("{}{TRUNCATION_MARKER}", "c".repeat(4000))));
        assert!(!prompt.contains(&"c".repeat(4001)));
        assert!(prompt.contains("Explain 'gravity' for a student using analogies"));
    }

    #[test]
    fn grounded_query_uses_profile_role() {
        let llm = ScriptedLlm::always("ok");
        let profile = Profile::new("", "", "Teacher", "");
        synthesize(&llm, "gravity", &[], Some(&profile), "ctx", 4000).unwrap();
        assert!(llm.prompt(0).contains("for a Teacher using analogies"));
    }

    #[test]
    fn no_context_uses_direct_outline() {
        let llm = ScriptedLlm::always("Direct");
        let (text, mode) = synthesize(&llm, "gravity", &atoms(&["a"]), None, "", 4000).unwrap();
        assert_eq!(text, "Direct");
        assert_eq!(mode, SynthesisMode::Direct);
        let prompt = llm.prompt(0);
        assert!(prompt.contains("User profile: General audience"));
        assert!(prompt.contains("Learning roadmap"));
        assert!(!prompt.contains("Evidence:"));
        assert_eq!(llm.temperatures.borrow()[0], 0.7);
    }

    #[test]
    fn empty_profile_renders_as_general_audience() {
        let llm = ScriptedLlm::always("Direct");
        let profile = Profile::default();
        synthesize(&llm, "gravity", &[], Some(&profile), "", 4000).unwrap();
        assert!(llm.prompt(0).contains("User profile: General audience"));
    }

    #[test]
    fn gateway_error_propagates() {
        let llm = ScriptedLlm::failing(LlmError::Backend("boom".into()));
        let err = synthesize(&llm, "gravity", &[], None, "", 4000).unwrap_err();
        assert_eq!(err, LlmError::Backend("boom".into()));
    }

    #[test]
    fn placeholder_names_the_error() {
        let text = failure_placeholder(&LlmError::Backend("boom".into()));
        assert_eq!(text, "Synthesis error: LLM call failed: boom");
    }
}
