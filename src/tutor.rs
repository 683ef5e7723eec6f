//! Application service: profile lookup, pipeline run, history write.
//!
//! Persistence is fire-and-forget. A store failure is logged and never
//! changes what the caller gets back.

use thiserror::Error;

use crate::config::{PipelineLimits, TutorConfig};
use crate::models::Profile;
use crate::pipeline::analogy::{failure_placeholder, generate_analogies};
use crate::pipeline::decompose::{decompose, Decomposition};
use crate::pipeline::diagram::generate_diagram;
use crate::pipeline::llm::{DiagramGateway, LlmError, LlmGateway, OpenAiClient};
use crate::pipeline::translate::translate;
use crate::pipeline::{ExplainRequest, ExplanationPipeline, PipelineResult};
use crate::search::{
    default_search, DuckDuckGoClient, FallbackSearch, SearchError, SearchHit, WebSearch,
};
use crate::storage::{
    JsonProfileStore, JsonSessionStore, ProfileStore, SessionRecord, SessionStore,
};

#[derive(Error, Debug)]
pub enum SetupError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Search(#[from] SearchError),
}

/// Service wired with the HTTP adapters and the JSON stores.
pub type DefaultTutor = TutorService<
    OpenAiClient,
    FallbackSearch<crate::search::SerpApiClient, DuckDuckGoClient>,
    JsonSessionStore,
    JsonProfileStore,
>;

pub struct TutorService<G, S, H, P>
where
    G: LlmGateway,
    S: WebSearch,
    H: SessionStore,
    P: ProfileStore,
{
    llm: G,
    search: S,
    sessions: H,
    profiles: P,
    limits: PipelineLimits,
}

impl DefaultTutor {
    /// Build the default service from configuration. Stores live under the app data dir.
    pub fn from_config(config: &TutorConfig) -> Result<Self, SetupError> {
        let llm = OpenAiClient::from_config(config)?;
        let search = default_search(config)?;
        tracing::info!(
            llm_configured = llm.is_configured(),
            serpapi = search.has_primary(),
            model = llm.chat_model(),
            "Tutor service ready"
        );
        Ok(TutorService::new(
            llm,
            search,
            JsonSessionStore::open_default(),
            JsonProfileStore::open_default(),
            config.limits.clone(),
        ))
    }
}

impl<G, S, H, P> TutorService<G, S, H, P>
where
    G: LlmGateway,
    S: WebSearch,
    H: SessionStore,
    P: ProfileStore,
{
    pub fn new(llm: G, search: S, sessions: H, profiles: P, limits: PipelineLimits) -> Self {
        Self {
            llm,
            search,
            sessions,
            profiles,
            limits,
        }
    }

    pub fn sessions(&self) -> &H {
        &self.sessions
    }

    pub fn profiles(&self) -> &P {
        &self.profiles
    }

    /// Look up a saved profile. Store failures read as "no profile".
    pub fn load_profile(&self, name: &str) -> Option<Profile> {
        match self.profiles.find(name) {
            Ok(Some(profile)) => Some(profile),
            Ok(None) => {
                tracing::warn!(name, "Profile not found, using general audience");
                None
            }
            Err(e) => {
                tracing::warn!(name, error = %e, "Failed to read profiles");
                None
            }
        }
    }

    /// Run the pipeline and record the session.
    ///
    /// `profile_name` is resolved once, before the run, unless the request
    /// already carries a profile.
    pub fn explain(
        &self,
        mut request: ExplainRequest,
        profile_name: Option<&str>,
    ) -> PipelineResult {
        if request.profile.is_none() {
            if let Some(name) = profile_name {
                request.profile = self.load_profile(name);
            }
        }

        let pipeline =
            ExplanationPipeline::with_limits(&self.llm, &self.search, self.limits.clone());
        let result = pipeline.explain(&request);

        if !result.concept.is_empty() {
            self.persist(&result);
        }
        result
    }

    fn persist(&self, result: &PipelineResult) {
        let record = SessionRecord::from_result(result);
        let id = record.id;
        match self.sessions.append(record) {
            Ok(()) => tracing::debug!(session_id = %id, "Session recorded"),
            Err(e) => tracing::warn!(error = %e, "Failed to record session"),
        }
    }

    // ── Quick actions ───────────────────────────────────────

    /// Raw web search with the configured result limit.
    pub fn search(&self, query: &str) -> Result<Vec<SearchHit>, SearchError> {
        self.search.search(query.trim(), self.limits.search_results)
    }

    pub fn decompose(&self, concept: &str) -> Decomposition {
        decompose(&self.llm, concept, self.limits.max_atoms)
    }

    /// Analogies without atoms, optionally translated. Failures become placeholder text.
    pub fn analogies(&self, concept: &str, profile: Option<&Profile>, language: &str) -> String {
        match generate_analogies(&self.llm, concept.trim(), &[], profile) {
            Ok(text) => translate(&self.llm, &text, language),
            Err(e) => {
                tracing::warn!(error = %e, "Analogy generation failed");
                failure_placeholder(&e)
            }
        }
    }
}

impl<G, S, H, P> TutorService<G, S, H, P>
where
    G: LlmGateway + DiagramGateway,
    S: WebSearch,
    H: SessionStore,
    P: ProfileStore,
{
    /// Infographic for `concept`. Returns the hosted image URL.
    pub fn diagram(&self, concept: &str, size: &str) -> Result<String, LlmError> {
        generate_diagram(&self.llm, concept.trim(), size)
    }
}
