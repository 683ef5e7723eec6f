use crate::models::Profile;

/// Marker appended when synthesis evidence is cut to budget.
pub const TRUNCATION_MARKER: &str = "\n\n...truncated...";

/// Audience line used when no profile is known.
pub const GENERAL_AUDIENCE: &str = "General audience";

const TUTOR_PERSONA: &str =
    "You are a friendly tutor that explains difficult topics using relatable analogies.";

/// Ask for `max_atoms` atomic sub-concepts as a JSON array.
pub fn build_decomposition_prompt(concept: &str, max_atoms: usize) -> String {
    format!(
        "You are a concise educational assistant.\n\
         Break the following concept into {max_atoms} short atomic sub-concepts (4-8 words each).\n\
         Return output as a valid JSON array of strings ONLY.\n\
         \n\
         Concept:\n\
         \"\"\"{}\"\"\"\n",
        concept.trim()
    )
}

/// Ask for exactly three analogies (story, visual, practical) with mappings.
pub fn build_analogy_prompt(concept: &str, atoms: &[String], profile: Option<&Profile>) -> String {
    let profile_line = profile
        .map(|p| format!("User profile: {}\n", p.to_prompt_json()))
        .unwrap_or_default();

    let atoms_text = if atoms.is_empty() {
        "(no atoms)".to_string()
    } else {
        bullet_list(atoms)
    };

    format!(
        "{TUTOR_PERSONA}\n\
         Use the user's profile to tailor tone and examples.\n\
         {profile_line}\n\
         Concept: {}\n\
         \n\
         Key atoms:\n\
         {atoms_text}\n\
         \n\
         Produce EXACTLY three analogies with short mappings:\n\
         \n\
         Analogy 1 (Story): <2-4 sentences>\n\
         Mapping 1: <one line mapping>\n\
         \n\
         Analogy 2 (Visual): <2-4 sentences>\n\
         Mapping 2: <one line mapping>\n\
         \n\
         Analogy 3 (Practical or hobby): <2-4 sentences>\n\
         Mapping 3: <one line mapping>\n\
         \n\
         Each mapping states which part of the concept corresponds to which element of the analogy.\n\
         Keep overall length concise and easy to read.\n",
        concept.trim()
    )
}

/// `Atomic concepts: a, b, c`
pub fn atoms_line(atoms: &[String]) -> String {
    format!("Atomic concepts: {}", atoms.join(", "))
}

/// User query for the context-grounded synthesis.
pub fn grounded_query(concept: &str, profile: Option<&Profile>) -> String {
    let role = profile.map(Profile::role_or_default).unwrap_or("student");
    format!("Explain '{}' for a {role} using analogies", concept.trim())
}

/// Evidence-grounded explanation. `evidence` is already cut to budget.
pub fn build_grounded_synthesis_prompt(query: &str, evidence: &str) -> String {
    format!(
        "You are an explain-by-analogy tutor. Use the evidence provided to write a clear explanation.\n\
         \n\
         Include:\n\
         - A 2-3 sentence summary\n\
         - 2-3 analogies (each 1-2 paragraphs)\n\
         - Key insights (3-5 bullet points)\n\
         - Short list of sources (URLs or titles)\n\
         - A confidence estimate (0-100)\n\
         \n\
         User query:\n\
         {query}\n\
         \n\
         Evidence:\n\
         {evidence}\n\
         \n\
         Return the result as plain text. If evidence conflicts, note it briefly.\n"
    )
}

/// Explanation without external evidence, tailored to the audience.
pub fn build_direct_synthesis_prompt(
    concept: &str,
    atoms: &[String],
    profile: Option<&Profile>,
) -> String {
    let audience = profile
        .map(Profile::to_prompt_json)
        .unwrap_or_else(|| GENERAL_AUDIENCE.to_string());

    format!(
        "Explain the concept: {}\n\
         \n\
         {}\n\
         \n\
         User profile: {audience}\n\
         \n\
         Provide:\n\
         1. Clear summary (2-3 sentences)\n\
         2. Key insights (3-4 points)\n\
         3. Practical applications\n\
         4. Learning roadmap (4 steps)\n\
         5. Confidence score (0-100)\n\
         \n\
         Keep it educational and engaging.",
        concept.trim(),
        atoms_line(atoms)
    )
}

/// Literal translation that keeps the original formatting.
pub fn build_translation_prompt(text: &str, target_language: &str) -> String {
    format!("Translate the following text to {target_language}. Maintain formatting:\n\n{text}")
}

/// Image prompt for an educational infographic about `concept`.
pub fn build_diagram_prompt(concept: &str) -> String {
    format!(
        "Educational infographic explaining '{}'. Modern, clean design with diagrams, labels, and icons. Professional style.",
        concept.trim()
    )
}

fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atoms(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn decomposition_prompt_asks_for_json_array() {
        let prompt = build_decomposition_prompt("  photosynthesis ", 5);
        assert!(prompt.contains("into 5 short atomic sub-concepts"));
        assert!(prompt.contains("JSON array of strings ONLY"));
        assert!(prompt.contains("\"\"\"photosynthesis\"\"\""));
    }

    #[test]
    fn analogy_prompt_lists_fixed_angles() {
        let prompt = build_analogy_prompt("gravity", &atoms(&["mass attracts mass"]), None);
        assert!(prompt.contains("Analogy 1 (Story)"));
        assert!(prompt.contains("Analogy 2 (Visual)"));
        assert!(prompt.contains("Analogy 3 (Practical or hobby)"));
        assert!(prompt.contains("Mapping 3:"));
        assert!(prompt.contains("- mass attracts mass"));
        assert!(!prompt.contains("User profile"));
    }

    #[test]
    fn analogy_prompt_marks_missing_atoms() {
        let prompt = build_analogy_prompt("gravity", &[], None);
        assert!(prompt.contains("(no atoms)"));
    }

    #[test]
    fn analogy_prompt_includes_profile() {
        let profile = Profile::new("Ana", "16-22", "Student", "football");
        let prompt = build_analogy_prompt("gravity", &[], Some(&profile));
        assert!(prompt.contains("User profile: {"));
        assert!(prompt.contains("football"));
    }

    #[test]
    fn grounded_query_defaults_to_student() {
        assert_eq!(
            grounded_query("gravity", None),
            "Explain 'gravity' for a student using analogies"
        );
        let profile = Profile::new("", "", "Engineer", "");
        assert_eq!(
            grounded_query("gravity", Some(&profile)),
            "Explain 'gravity' for a Engineer using analogies"
        );
    }

    #[test]
    fn grounded_prompt_embeds_evidence_and_conflict_note() {
        let prompt = build_grounded_synthesis_prompt("Explain x", "[1] Title\nSnippet");
        assert!(prompt.contains("[1] Title\nSnippet"));
        assert!(prompt.contains("If evidence conflicts"));
        assert!(prompt.contains("confidence estimate (0-100)"));
    }

    #[test]
    fn direct_prompt_uses_general_audience_without_profile() {
        let prompt = build_direct_synthesis_prompt("gravity", &atoms(&["a", "b"]), None);
        assert!(prompt.contains("User profile: General audience"));
        assert!(prompt.contains("Atomic concepts: a, b"));
        assert!(prompt.contains("4. Learning roadmap (4 steps)"));
    }

    #[test]
    fn translation_prompt_names_language() {
        let prompt = build_translation_prompt("Hello", "Spanish");
        assert!(prompt.starts_with("Translate the following text to Spanish."));
        assert!(prompt.ends_with("\n\nHello"));
    }

    #[test]
    fn diagram_prompt_describes_infographic() {
        assert_eq!(
            build_diagram_prompt(" photosynthesis "),
            "Educational infographic explaining 'photosynthesis'. Modern, clean design with diagrams, labels, and icons. Professional style."
        );
    }
}
