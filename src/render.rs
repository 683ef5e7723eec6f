//! Markdown rendering of explanation results.

use crate::pipeline::{PipelineResult, StepStatus};

/// Full result as Markdown, in the order a reader scans it.
pub fn to_markdown(result: &PipelineResult) -> String {
    let atoms = if result.atoms.is_empty() {
        "_none_".to_string()
    } else {
        result
            .atoms
            .iter()
            .map(|atom| format!("• {atom}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let analogies = if result.analogies.is_empty() {
        "No analogies"
    } else {
        result.analogies.as_str()
    };

    let explanation = if result.explanation.is_empty() {
        "No explanation"
    } else {
        result.explanation.as_str()
    };

    let mut out = format!(
        "**Concept:** {}\n\
         **Language:** {}\n\
         \n\
         **Summary:**\n\
         {explanation}\n\
         \n\
         **Atomic Concepts:**\n\
         {atoms}\n\
         \n\
         **Analogies:**\n\
         {analogies}\n",
        result.concept, result.language
    );

    if !result.sources.is_empty() {
        out.push_str("\n**Sources:**\n");
        for source in &result.sources {
            out.push_str(&format!("• [{}]({})\n", source.title, source.url));
        }
    }

    out.push_str(&format!("\n**Confidence:** {}%\n", result.confidence));

    if let Some(error) = &result.error {
        out.push_str(&format!("\n**Error:** {error}\n"));
    }

    out
}

/// One line per step, e.g. `web_search: success (5)`.
pub fn step_summary(result: &PipelineResult) -> String {
    result
        .steps
        .iter()
        .map(|step| {
            let status = match step.status {
                StepStatus::Success => "success",
                StepStatus::NoResults => "no_results",
                StepStatus::Error => "error",
            };
            let mut line = format!("{}: {status}", step.step.as_str());
            if let Some(count) = step.count {
                line.push_str(&format!(" ({count})"));
            }
            if let Some(language) = &step.language {
                line.push_str(&format!(" [{language}]"));
            }
            if let Some(error) = &step.error {
                line.push_str(&format!(" - {error}"));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}
