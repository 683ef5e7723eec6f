//! Language-model gateway: one prompt in, plain text out.
//!
//! The pipeline only sees [`LlmGateway`]. How many call conventions a backend
//! needs to try before it gets an answer is the adapter's business.

pub mod openai;

pub use openai::OpenAiClient;

use thiserror::Error;

/// Completion budget used when a caller does not ask for one.
pub const DEFAULT_MAX_TOKENS: u32 = 700;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    #[error("OPENAI_API_KEY not set in environment")]
    MissingCredential,

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Backend returned error (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("LLM call failed: {0}")]
    Backend(String),
}

impl LlmError {
    /// Configuration problems are reported to the user as warnings, not failures.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingCredential)
    }
}

/// Text completion against a language-model backend.
pub trait LlmGateway {
    fn complete_bounded(
        &self,
        prompt: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, LlmError>;

    fn complete(&self, prompt: &str, temperature: f32) -> Result<String, LlmError> {
        self.complete_bounded(prompt, temperature, DEFAULT_MAX_TOKENS)
    }

    /// Whether a credential is available. Unconfigured gateways always fail.
    fn is_configured(&self) -> bool {
        true
    }
}

impl<T: LlmGateway + ?Sized> LlmGateway for &T {
    fn complete_bounded(
        &self,
        prompt: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        (**self).complete_bounded(prompt, temperature, max_tokens)
    }

    fn is_configured(&self) -> bool {
        (**self).is_configured()
    }
}

/// Image generation against the same backend. Returns the hosted image URL.
pub trait DiagramGateway {
    fn generate_image(&self, prompt: &str, size: &str) -> Result<String, LlmError>;
}

impl<T: DiagramGateway + ?Sized> DiagramGateway for &T {
    fn generate_image(&self, prompt: &str, size: &str) -> Result<String, LlmError> {
        (**self).generate_image(prompt, size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    impl LlmGateway for Echo {
        fn complete_bounded(
            &self,
            prompt: &str,
            _temperature: f32,
            max_tokens: u32,
        ) -> Result<String, LlmError> {
            Ok(format!("{prompt}:{max_tokens}"))
        }
    }

    #[test]
    fn complete_uses_default_budget() {
        assert_eq!(Echo.complete("hi", 0.2).unwrap(), "hi:700");
    }

    #[test]
    fn gateways_are_configured_by_default() {
        assert!(Echo.is_configured());
        assert!((&Echo).is_configured());
    }

    #[test]
    fn only_missing_credential_is_configuration() {
        assert!(LlmError::MissingCredential.is_configuration());
        assert!(!LlmError::Backend("boom".into()).is_configuration());
    }

    #[test]
    fn status_error_formats_body() {
        let err = LlmError::Status {
            status: 429,
            body: "quota".into(),
        };
        assert_eq!(err.to_string(), "Backend returned error (status 429): quota");
    }
}
