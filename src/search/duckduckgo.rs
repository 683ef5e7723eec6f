use serde_json::Value;

use super::{get_json, http_client, SearchError, SearchHit, WebSearch};

const DUCKDUCKGO_URL: &str = "https://api.duckduckgo.com/";

/// Longest title derived from a related-topic text that has no " - " separator.
const MAX_DERIVED_TITLE_CHARS: usize = 80;

/// DuckDuckGo instant-answer API. Needs no key.
pub struct DuckDuckGoClient {
    client: reqwest::blocking::Client,
}

impl DuckDuckGoClient {
    pub fn new(timeout_secs: u64) -> Result<Self, SearchError> {
        Ok(Self {
            client: http_client(timeout_secs)?,
        })
    }
}

impl WebSearch for DuckDuckGoClient {
    fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, SearchError> {
        let request = self.client.get(DUCKDUCKGO_URL).query(&[
            ("q", query),
            ("format", "json"),
            ("no_html", "1"),
            ("skip_disambig", "1"),
        ]);
        let payload = get_json(request)?;
        let hits = parse_instant_answer(&payload, limit);
        tracing::debug!(count = hits.len(), "DuckDuckGo search complete");
        Ok(hits)
    }
}

/// Abstract first, then related topics with nested groups flattened.
fn parse_instant_answer(payload: &Value, limit: usize) -> Vec<SearchHit> {
    let mut hits = Vec::new();

    let abstract_text = str_field(payload, "AbstractText");
    if !abstract_text.is_empty() {
        hits.push(SearchHit::new(
            str_field(payload, "Heading"),
            abstract_text,
            str_field(payload, "AbstractURL"),
        ));
    }

    if let Some(topics) = payload.get("RelatedTopics").and_then(Value::as_array) {
        collect_topics(topics, &mut hits);
    }

    hits.truncate(limit);
    hits
}

fn collect_topics(topics: &[Value], hits: &mut Vec<SearchHit>) {
    for topic in topics {
        if let Some(group) = topic.get("Topics").and_then(Value::as_array) {
            collect_topics(group, hits);
            continue;
        }
        let text = str_field(topic, "Text");
        if text.is_empty() {
            continue;
        }
        hits.push(SearchHit {
            title: derive_title(text),
            snippet: text.to_string(),
            link: str_field(topic, "FirstURL").to_string(),
        });
    }
}

fn derive_title(text: &str) -> String {
    match text.split_once(" - ") {
        Some((title, _)) => title.trim().to_string(),
        None => text.chars().take(MAX_DERIVED_TITLE_CHARS).collect(),
    }
}

fn str_field<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn abstract_comes_first() {
        let payload = json!({
            "Heading": "Photosynthesis",
            "AbstractText": "Photosynthesis is a process used by plants.",
            "AbstractURL": "https://en.wikipedia.org/wiki/Photosynthesis",
            "RelatedTopics": [
                {"Text": "Chlorophyll - A green pigment.", "FirstURL": "https://duckduckgo.com/Chlorophyll"}
            ]
        });
        let hits = parse_instant_answer(&payload, 5);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "Photosynthesis");
        assert_eq!(hits[1].title, "Chlorophyll");
        assert_eq!(hits[1].link, "https://duckduckgo.com/Chlorophyll");
    }

    #[test]
    fn nested_topic_groups_are_flattened() {
        let payload = json!({
            "AbstractText": "",
            "RelatedTopics": [
                {"Name": "Biology", "Topics": [
                    {"Text": "Calvin cycle - Light-independent reactions.", "FirstURL": "u1"},
                    {"Text": "Stomata - Pores in leaves.", "FirstURL": "u2"}
                ]},
                {"Text": "Carbon fixation", "FirstURL": "u3"}
            ]
        });
        let hits = parse_instant_answer(&payload, 5);
        let titles: Vec<&str> = hits.iter().map(|h| h.title.as_str()).collect();
        assert_eq!(titles, vec!["Calvin cycle", "Stomata", "Carbon fixation"]);
    }

    #[test]
    fn topics_without_text_are_skipped() {
        let payload = json!({"RelatedTopics": [{"FirstURL": "u1"}, {"Text": "", "FirstURL": "u2"}]});
        assert!(parse_instant_answer(&payload, 5).is_empty());
    }

    #[test]
    fn hits_capped_at_limit() {
        let topics: Vec<Value> = (0..10)
            .map(|i| json!({"Text": format!("Topic {i} - detail"), "FirstURL": "u"}))
            .collect();
        let hits = parse_instant_answer(&json!({ "RelatedTopics": topics }), 3);
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn long_text_without_separator_gets_short_title() {
        let text = "x".repeat(200);
        assert_eq!(derive_title(&text).chars().count(), MAX_DERIVED_TITLE_CHARS);
    }
}
