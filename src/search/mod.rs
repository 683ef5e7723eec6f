//! Web search collaborators.
//!
//! SerpAPI is used when a key is configured, DuckDuckGo otherwise or when
//! SerpAPI fails. Each backend maps its own payload to [`SearchHit`].

pub mod duckduckgo;
pub mod fallback;
pub mod serpapi;

pub use duckduckgo::DuckDuckGoClient;
pub use fallback::FallbackSearch;
pub use serpapi::SerpApiClient;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::TutorConfig;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("{0} not set in environment")]
    MissingApiKey(&'static str),

    #[error("Search request failed: {0}")]
    Http(String),

    #[error("Search backend returned error (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("Search response parsing error: {0}")]
    ResponseParsing(String),
}

/// One web result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub snippet: String,
    pub link: String,
}

impl SearchHit {
    pub fn new(title: &str, snippet: &str, link: &str) -> Self {
        Self {
            title: title.to_string(),
            snippet: snippet.to_string(),
            link: link.to_string(),
        }
    }
}

/// Web search port. May return an empty list; failures are reported, not hidden.
pub trait WebSearch {
    fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, SearchError>;
}

impl<T: WebSearch + ?Sized> WebSearch for &T {
    fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, SearchError> {
        (**self).search(query, limit)
    }
}

/// Default search chain for the given configuration.
pub fn default_search(
    config: &TutorConfig,
) -> Result<FallbackSearch<SerpApiClient, DuckDuckGoClient>, SearchError> {
    let primary = match config.serpapi_api_key.as_deref() {
        Some(key) => Some(SerpApiClient::new(key, config.timeout_secs)?),
        None => None,
    };
    let secondary = DuckDuckGoClient::new(config.timeout_secs)?;
    Ok(FallbackSearch::new(primary, secondary))
}

pub(crate) fn http_client(timeout_secs: u64) -> Result<reqwest::blocking::Client, SearchError> {
    reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .user_agent(concat!("tutorx/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| SearchError::Http(e.to_string()))
}

/// Send a GET request and decode the JSON body.
pub(crate) fn get_json(
    request: reqwest::blocking::RequestBuilder,
) -> Result<serde_json::Value, SearchError> {
    let response = request.send().map_err(|e| SearchError::Http(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(SearchError::Status {
            status: status.as_u16(),
            body,
        });
    }

    response
        .json()
        .map_err(|e| SearchError::ResponseParsing(e.to_string()))
}
