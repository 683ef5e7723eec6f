use serde_json::Value;

use super::{get_json, http_client, SearchError, SearchHit, WebSearch};

const SERPAPI_URL: &str = "https://serpapi.com/search.json";

/// Google results through SerpAPI.
pub struct SerpApiClient {
    api_key: String,
    client: reqwest::blocking::Client,
}

impl SerpApiClient {
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, SearchError> {
        if api_key.trim().is_empty() {
            return Err(SearchError::MissingApiKey("SERPAPI_API_KEY"));
        }
        Ok(Self {
            api_key: api_key.trim().to_string(),
            client: http_client(timeout_secs)?,
        })
    }
}

impl WebSearch for SerpApiClient {
    fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, SearchError> {
        let num = limit.to_string();
        let request = self.client.get(SERPAPI_URL).query(&[
            ("engine", "google"),
            ("q", query),
            ("num", num.as_str()),
            ("api_key", self.api_key.as_str()),
        ]);
        let payload = get_json(request)?;

        if let Some(message) = payload.get("error").and_then(Value::as_str) {
            return Err(SearchError::ResponseParsing(message.to_string()));
        }

        let hits = parse_organic_results(&payload, limit);
        tracing::debug!(count = hits.len(), "SerpAPI search complete");
        Ok(hits)
    }
}

/// Map `organic_results` to hits. The snippet falls back to `rich_snippet.top`
/// and the link to `source`.
fn parse_organic_results(payload: &Value, limit: usize) -> Vec<SearchHit> {
    let Some(results) = payload.get("organic_results").and_then(Value::as_array) else {
        return Vec::new();
    };

    results
        .iter()
        .take(limit)
        .map(|r| {
            let snippet = r
                .get("snippet")
                .and_then(Value::as_str)
                .or_else(|| r.pointer("/rich_snippet/top").and_then(Value::as_str))
                .unwrap_or_default();
            let link = r
                .get("link")
                .and_then(Value::as_str)
                .unwrap_or_else(|| str_field(r, "source"));
            SearchHit::new(str_field(r, "title"), snippet, link)
        })
        .collect()
}

fn str_field<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or_default()
}
