//! Concept decomposition into short atomic ideas.
//!
//! Three tiers, first hit wins: strict JSON array, line heuristics over the
//! raw answer, comma-split of the concept itself. Decomposition never fails
//! and never returns more than `max_atoms` items.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::llm::{LlmError, LlmGateway};
use super::prompt::build_decomposition_prompt;

pub const DECOMPOSE_TEMPERATURE: f32 = 0.0;
const DECOMPOSE_MAX_TOKENS: u32 = 300;

/// `3. Some idea` → `Some idea`
static NUMBERED_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.\s*(.*)$").unwrap());

/// ```` ```json ... ``` ```` → inner body
static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^```[A-Za-z]*\s*\n?(.*?)\n?\s*```$").unwrap());

/// Which tier produced the atoms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtomSource {
    Json,
    Heuristic,
    ConceptSplit,
}

impl AtomSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Heuristic => "heuristic",
            Self::ConceptSplit => "concept_split",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Decomposition {
    pub atoms: Vec<String>,
    pub source: AtomSource,
    /// Set when the gateway call failed and the concept split was used instead.
    pub gateway_error: Option<LlmError>,
}

/// Break `concept` into at most `max_atoms` atoms.
pub fn decompose<G: LlmGateway>(gateway: &G, concept: &str, max_atoms: usize) -> Decomposition {
    let concept = concept.trim();
    if concept.is_empty() {
        return Decomposition {
            atoms: Vec::new(),
            source: AtomSource::ConceptSplit,
            gateway_error: None,
        };
    }

    let prompt = build_decomposition_prompt(concept, max_atoms);
    let mut decomposition =
        match gateway.complete_bounded(&prompt, DECOMPOSE_TEMPERATURE, DECOMPOSE_MAX_TOKENS) {
            Ok(output) => match parse_atoms(&output) {
                Some((atoms, source)) => Decomposition {
                    atoms,
                    source,
                    gateway_error: None,
                },
                None => {
                    tracing::debug!("Decomposition output unusable, splitting concept");
                    split_concept(concept, None)
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "Decomposition call failed, splitting concept");
                split_concept(concept, Some(e))
            }
        };

    decomposition.atoms.truncate(max_atoms);
    decomposition
}

/// Structured parse, then line heuristics. `None` when neither yields anything.
fn parse_atoms(output: &str) -> Option<(Vec<String>, AtomSource)> {
    let trimmed = output.trim();

    if let Some(atoms) = parse_json_array(trimmed) {
        return Some((atoms, AtomSource::Json));
    }
    if let Some(body) = CODE_FENCE.captures(trimmed).and_then(|c| c.get(1)) {
        if let Some(atoms) = parse_json_array(body.as_str().trim()) {
            return Some((atoms, AtomSource::Json));
        }
    }

    let atoms = heuristic_atoms(trimmed);
    if atoms.is_empty() {
        None
    } else {
        Some((atoms, AtomSource::Heuristic))
    }
}

/// A JSON array of items; anything else is a parse failure.
fn parse_json_array(text: &str) -> Option<Vec<String>> {
    let Value::Array(items) = serde_json::from_str::<Value>(text).ok()? else {
        return None;
    };
    Some(
        items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.trim().to_string(),
                other => other.to_string().trim().to_string(),
            })
            .filter(|s| !s.is_empty())
            .collect(),
    )
}

/// One atom per non-empty line, with `-` bullets and `N.` prefixes removed.
fn heuristic_atoms(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let atom = if let Some(caps) = NUMBERED_LINE.captures(line) {
                caps.get(1).map_or("", |m| m.as_str()).trim()
            } else if line.starts_with('-') {
                line.trim_start_matches(['-', ' ']).trim()
            } else {
                line
            };
            (!atom.is_empty()).then(|| atom.to_string())
        })
        .collect()
}

/// Offline fallback: comma-separated parts, or the whole concept.
fn split_concept(concept: &str, gateway_error: Option<LlmError>) -> Decomposition {
    let mut atoms: Vec<String> = concept
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect();
    if atoms.is_empty() {
        atoms.push(concept.to_string());
    }
    Decomposition {
        atoms,
        source: AtomSource::ConceptSplit,
        gateway_error,
    }
}
