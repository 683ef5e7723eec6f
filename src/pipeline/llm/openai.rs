use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{DiagramGateway, LlmError, LlmGateway};
use crate::config::{TutorConfig, DEFAULT_IMAGE_MODEL};
use crate::pipeline::truncate_chars;

/// Characters of each underlying error kept when both conventions fail.
const FAILURE_DETAIL_CHARS: usize = 100;

/// OpenAI-compatible HTTP client.
///
/// Tries the chat-completions endpoint first and the legacy text-completions
/// endpoint second; the first answer wins.
pub struct OpenAiClient {
    base_url: String,
    api_key: Option<String>,
    chat_model: String,
    legacy_model: String,
    image_model: String,
    client: reqwest::blocking::Client,
}

impl OpenAiClient {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        chat_model: &str,
        legacy_model: &str,
        timeout_secs: u64,
    ) -> Result<Self, LlmError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| LlmError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            chat_model: chat_model.to_string(),
            legacy_model: legacy_model.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            client,
        })
    }

    pub fn from_config(config: &TutorConfig) -> Result<Self, LlmError> {
        Ok(Self::new(
            &config.openai_base_url,
            config.openai_api_key.clone(),
            &config.chat_model,
            &config.legacy_model,
            config.timeout_secs,
        )?
        .with_image_model(&config.image_model))
    }

    pub fn with_image_model(mut self, model: &str) -> Self {
        self.image_model = model.to_string();
        self
    }

    pub fn chat_model(&self) -> &str {
        &self.chat_model
    }

    fn chat_completion(
        &self,
        api_key: &str,
        prompt: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let body = ChatRequest {
            model: &self.chat_model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature,
            max_tokens,
        };
        let parsed: ChatResponse = self.post_json("chat/completions", api_key, &body)?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| LlmError::ResponseParsing("chat completion had no content".into()))
    }

    fn legacy_completion(
        &self,
        api_key: &str,
        prompt: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let body = LegacyRequest {
            model: &self.legacy_model,
            prompt,
            temperature,
            max_tokens,
        };
        let parsed: LegacyResponse = self.post_json("completions", api_key, &body)?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.text.trim().to_string())
            .ok_or_else(|| LlmError::ResponseParsing("completion had no choices".into()))
    }

    fn post_json<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        api_key: &str,
        body: &B,
    ) -> Result<R, LlmError> {
        let url = format!("{}/{path}", self.base_url);

        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", api_key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth)
                .map_err(|_| LlmError::HttpClient("invalid API key header".into()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .json(body)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::HttpClient(format!("request to {path} timed out"))
                } else {
                    LlmError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .map_err(|e| LlmError::ResponseParsing(e.to_string()))
    }
}

impl LlmGateway for OpenAiClient {
    fn complete_bounded(
        &self,
        prompt: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingCredential)?;

        let first = match self.chat_completion(api_key, prompt, temperature, max_tokens) {
            Ok(text) => return Ok(text),
            Err(e) => e,
        };
        tracing::debug!(error = %first, "Chat completion failed, trying legacy completion");

        match self.legacy_completion(api_key, prompt, temperature, max_tokens) {
            Ok(text) => Ok(text),
            Err(second) => Err(combine_failures(&first, &second)),
        }
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

impl DiagramGateway for OpenAiClient {
    fn generate_image(&self, prompt: &str, size: &str) -> Result<String, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingCredential)?;
        let body = ImageRequest {
            model: &self.image_model,
            prompt,
            size,
            quality: "standard",
            n: 1,
        };
        let parsed: ImageResponse = self.post_json("images/generations", api_key, &body)?;
        parsed
            .data
            .into_iter()
            .next()
            .and_then(|image| image.url)
            .ok_or_else(|| LlmError::ResponseParsing("image response had no URL".into()))
    }
}

/// Fold both call-convention failures into one backend error.
fn combine_failures(first: &LlmError, second: &LlmError) -> LlmError {
    LlmError::Backend(format!(
        "{} | {}",
        truncate_chars(&first.to_string(), FAILURE_DETAIL_CHARS),
        truncate_chars(&second.to_string(), FAILURE_DETAIL_CHARS),
    ))
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

#[derive(Serialize)]
struct LegacyRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct LegacyResponse {
    choices: Vec<LegacyChoice>,
}

#[derive(Deserialize)]
struct LegacyChoice {
    text: String,
}

#[derive(Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    size: &'a str,
    quality: &'a str,
    n: u32,
}

#[derive(Deserialize)]
struct ImageResponse {
    data: Vec<ImageData>,
}

#[derive(Deserialize)]
struct ImageData {
    url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_without_key() -> OpenAiClient {
        OpenAiClient::new("http://127.0.0.1:9/v1/", None, "gpt-3.5-turbo", "gpt-3.5-turbo-instruct", 1)
            .unwrap()
    }

    #[test]
    fn missing_key_fails_before_any_request() {
        let client = client_without_key();
        assert!(!client.is_configured());
        assert_eq!(
            client.complete("hello", 0.2).unwrap_err(),
            LlmError::MissingCredential
        );
    }

    #[test]
    fn image_generation_without_key_fails_before_any_request() {
        let client = client_without_key();
        assert_eq!(
            client.generate_image("diagram", "1024x1024").unwrap_err(),
            LlmError::MissingCredential
        );
    }

    #[test]
    fn image_model_follows_config() {
        let config = TutorConfig {
            image_model: "dall-e-2".into(),
            ..TutorConfig::default()
        };
        let client = OpenAiClient::from_config(&config).unwrap();
        assert_eq!(client.image_model, "dall-e-2");
        assert_eq!(client_without_key().image_model, DEFAULT_IMAGE_MODEL);
    }

    #[test]
    fn image_request_asks_for_one_standard_image() {
        let body = ImageRequest {
            model: "dall-e-3",
            prompt: "Educational infographic",
            size: "1024x1024",
            quality: "standard",
            n: 1,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["n"], 1);
        assert_eq!(json["size"], "1024x1024");
        assert_eq!(json["quality"], "standard");
    }

    #[test]
    fn image_response_parses_url() {
        let parsed: ImageResponse = serde_json::from_str(
            r#"{"created":1,"data":[{"url":"https://img.example/1.png","revised_prompt":"x"}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.data[0].url.as_deref(), Some("https://img.example/1.png"));
    }

    #[test]
    fn blank_key_is_treated_as_missing() {
        let client = OpenAiClient::new("http://localhost", Some("  ".into()), "m", "l", 1).unwrap();
        assert!(!client.is_configured());
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = client_without_key();
        assert_eq!(client.base_url, "http://127.0.0.1:9/v1");
    }

    #[test]
    fn combined_failure_truncates_each_side() {
        let first = LlmError::HttpClient("a".repeat(300));
        let second = LlmError::Status {
            status: 500,
            body: "b".repeat(300),
        };
        let combined = combine_failures(&first, &second);
        let LlmError::Backend(message) = combined else {
            panic!("expected backend error");
        };
        let (left, right) = message.split_once(" | ").unwrap();
        assert_eq!(left.chars().count(), FAILURE_DETAIL_CHARS);
        assert_eq!(right.chars().count(), FAILURE_DETAIL_CHARS);
        assert!(left.starts_with("HTTP client error"));
        assert!(right.starts_with("Backend returned error (status 500)"));
    }

    #[test]
    fn chat_request_serializes_single_user_message() {
        let body = ChatRequest {
            model: "gpt-3.5-turbo",
            messages: vec![ChatMessage {
                role: "user",
                content: "Explain gravity",
            }],
            temperature: 0.5,
            max_tokens: 300,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "Explain gravity");
        assert_eq!(json["max_tokens"], 300);
    }

    #[test]
    fn chat_response_with_null_content_parses() {
        let parsed: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#)
                .unwrap();
        assert!(parsed.choices[0].message.content.is_none());
    }

    #[test]
    fn legacy_response_parses_text() {
        let parsed: LegacyResponse =
            serde_json::from_str(r#"{"choices":[{"text":"  answer  ","index":0}]}"#).unwrap();
        assert_eq!(parsed.choices[0].text.trim(), "answer");
    }
}
