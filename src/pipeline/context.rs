//! Context resolution: uploaded document text or web-search snippets.
//!
//! Exactly one source is active per run. A non-blank document always wins,
//! and in that case search is never called.

use crate::config::PipelineLimits;
use crate::search::{SearchHit, WebSearch};

use super::types::{Source, StepKind, StepRecord};
use super::truncate_chars;

const DOCUMENT_HEADER: &str = "Document Context:\n";

/// Grounding material for synthesis plus the step it produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedContext {
    /// Empty when no context is available.
    pub text: String,
    pub sources: Vec<Source>,
    /// `None` when web search is disabled and no document was given.
    pub step: Option<StepRecord>,
}

impl ResolvedContext {
    fn empty(step: Option<StepRecord>) -> Self {
        Self {
            text: String::new(),
            sources: Vec::new(),
            step,
        }
    }

    pub fn has_text(&self) -> bool {
        !self.text.is_empty()
    }
}

/// Pick the context source for `concept`.
pub fn resolve_context<S: WebSearch>(
    search: &S,
    concept: &str,
    document_text: Option<&str>,
    use_web: bool,
    limits: &PipelineLimits,
) -> ResolvedContext {
    if let Some(document) = document_text.filter(|d| !d.trim().is_empty()) {
        let excerpt = truncate_chars(document, limits.document_char_budget);
        tracing::info!(chars = excerpt.chars().count(), "Using document context");
        return ResolvedContext {
            text: format!("{DOCUMENT_HEADER}{excerpt}"),
            sources: Vec::new(),
            step: Some(StepRecord::success(StepKind::DocumentContext)),
        };
    }

    if !use_web {
        return ResolvedContext::empty(None);
    }

    match search.search(concept, limits.search_results) {
        Ok(hits) if hits.is_empty() => {
            tracing::info!("Web search returned no results");
            ResolvedContext::empty(Some(StepRecord::no_results(StepKind::WebSearch)))
        }
        Ok(hits) => {
            tracing::info!(count = hits.len(), "Web search succeeded");
            ResolvedContext {
                text: format_snippets(&hits, limits.context_snippets),
                sources: hits
                    .iter()
                    .take(limits.search_results)
                    .map(Source::from)
                    .collect(),
                step: Some(StepRecord::success(StepKind::WebSearch).with_count(hits.len())),
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Web search failed");
            ResolvedContext::empty(Some(StepRecord::error(
                StepKind::WebSearch,
                &e.to_string(),
            )))
        }
    }
}

/// `[i] title\nsnippet\nSource: link` for the first `max` hits, blank-line separated.
pub fn format_snippets(hits: &[SearchHit], max: usize) -> String {
    hits.iter()
        .take(max)
        .enumerate()
        .map(|(i, hit)| {
            format!(
                "[{}] {}\n{}\nSource: {}",
                i + 1,
                hit.title,
                hit.snippet,
                hit.link
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
