use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::Profile;
use crate::search::SearchHit;

/// Pipeline stage named in a step record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    WebSearch,
    DocumentContext,
    Decomposition,
    Analogies,
    Synthesis,
    Translation,
}

impl StepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WebSearch => "web_search",
            Self::DocumentContext => "document_context",
            Self::Decomposition => "decomposition",
            Self::Analogies => "analogies",
            Self::Synthesis => "synthesis",
            Self::Translation => "translation",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Success,
    NoResults,
    Error,
}

/// One entry of the per-run audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: StepKind,
    pub status: StepStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl StepRecord {
    fn new(step: StepKind, status: StepStatus) -> Self {
        Self {
            step,
            status,
            count: None,
            error: None,
            language: None,
            detail: None,
        }
    }

    pub fn success(step: StepKind) -> Self {
        Self::new(step, StepStatus::Success)
    }

    pub fn no_results(step: StepKind) -> Self {
        Self::new(step, StepStatus::NoResults)
    }

    /// Error record. The message is cut to [`super::STEP_ERROR_CHARS`].
    pub fn error(step: StepKind, message: &str) -> Self {
        Self {
            error: Some(super::truncate_chars(message, super::STEP_ERROR_CHARS)),
            ..Self::new(step, StepStatus::Error)
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.language = Some(language.to_string());
        self
    }

    pub fn with_detail(mut self, detail: &str) -> Self {
        self.detail = Some(detail.to_string());
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == StepStatus::Success
    }
}

/// A cited web result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub url: String,
}

impl From<&SearchHit> for Source {
    fn from(hit: &SearchHit) -> Self {
        Self {
            title: hit.title.clone(),
            url: hit.link.clone(),
        }
    }
}

/// Input to one explanation run.
#[derive(Debug, Clone)]
pub struct ExplainRequest {
    pub concept: String,
    pub profile: Option<Profile>,
    pub use_web: bool,
    pub document_text: Option<String>,
    pub target_language: String,
}

impl ExplainRequest {
    pub fn new(concept: &str) -> Self {
        Self {
            concept: concept.to_string(),
            profile: None,
            use_web: true,
            document_text: None,
            target_language: super::ENGLISH.to_string(),
        }
    }

    pub fn with_profile(mut self, profile: Option<Profile>) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_web(mut self, use_web: bool) -> Self {
        self.use_web = use_web;
        self
    }

    pub fn with_document(mut self, text: Option<String>) -> Self {
        self.document_text = text;
        self
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.target_language = language.trim().to_string();
        self
    }
}

/// Complete output of one explanation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub concept: String,
    pub profile: Option<Profile>,
    pub timestamp: NaiveDateTime,
    pub language: String,
    pub atoms: Vec<String>,
    pub analogies: String,
    pub explanation: String,
    pub sources: Vec<Source>,
    pub confidence: u8,
    pub steps: Vec<StepRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
}

impl PipelineResult {
    pub fn new(concept: &str, profile: Option<Profile>, language: &str) -> Self {
        Self {
            concept: concept.to_string(),
            profile,
            timestamp: chrono::Local::now().naive_local(),
            language: language.to_string(),
            atoms: Vec::new(),
            analogies: String::new(),
            explanation: String::new(),
            sources: Vec::new(),
            confidence: 0,
            steps: Vec::new(),
            error: None,
            trace: None,
        }
    }

    pub fn step(&self, kind: StepKind) -> Option<&StepRecord> {
        self.steps.iter().find(|s| s.step == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_kind_serializes_snake_case() {
        let json = serde_json::to_string(&StepKind::WebSearch).unwrap();
        assert_eq!(json, "\"web_search\"");
        assert_eq!(StepKind::DocumentContext.as_str(), "document_context");
    }

    #[test]
    fn step_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&StepStatus::NoResults).unwrap(),
            "\"no_results\""
        );
    }

    #[test]
    fn error_record_truncates_message() {
        let record = StepRecord::error(StepKind::Synthesis, &"x".repeat(500));
        assert_eq!(record.error.as_ref().unwrap().chars().count(), 100);
        assert!(!record.is_success());
    }

    #[test]
    fn record_omits_empty_auxiliary_fields() {
        let json = serde_json::to_string(&StepRecord::success(StepKind::Analogies)).unwrap();
        assert_eq!(json, r#"{"step":"analogies","status":"success"}"#);
    }

    #[test]
    fn record_keeps_count() {
        let record = StepRecord::success(StepKind::WebSearch).with_count(5);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["count"], 5);
    }

    #[test]
    fn source_from_hit_uses_link_as_url() {
        let hit = SearchHit::new("Title", "snippet", "https://example.org");
        let source = Source::from(&hit);
        assert_eq!(source.url, "https://example.org");
        assert_eq!(source.title, "Title");
    }

    #[test]
    fn request_defaults_to_english_with_web() {
        let request = ExplainRequest::new("gravity");
        assert!(request.use_web);
        assert_eq!(request.target_language, "English");
        assert!(request.document_text.is_none());
    }

    #[test]
    fn result_round_trips_through_json() {
        let mut result = PipelineResult::new("gravity", None, "English");
        result.steps.push(StepRecord::success(StepKind::Decomposition).with_count(3));
        let json = serde_json::to_string(&result).unwrap();
        let back: PipelineResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}
