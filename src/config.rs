use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "TutorX";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default chat model for the OpenAI-compatible gateway.
pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";
/// Model used by the legacy text-completions call convention.
pub const DEFAULT_LEGACY_MODEL: &str = "gpt-3.5-turbo-instruct";
/// Model used for diagram generation.
pub const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Languages offered by the language selector. The pipeline accepts any name.
pub const SUPPORTED_LANGUAGES: &[&str] = &[
    "English",
    "Hindi",
    "Spanish",
    "French",
    "German",
    "Japanese",
    "Chinese",
    "Arabic",
    "Russian",
    "Portuguese",
];

/// Age-group options shown by the profile form.
pub const AGE_GROUPS: &[&str] = &["10-15", "16-22", "23-30", "30+"];

/// Role options shown by the profile form.
pub const ROLES: &[&str] = &["Student", "Engineer", "Teacher", "Researcher", "Professional"];

/// Default tracing filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    if is_dev() {
        "tutorx=debug,warn"
    } else {
        "tutorx=info,warn"
    }
}

/// Debug builds log more verbosely.
pub fn is_dev() -> bool {
    cfg!(debug_assertions)
}

/// Get the application data directory.
/// `TUTORX_DATA_DIR` overrides the default `~/TutorX/`.
pub fn app_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("TUTORX_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_NAME)
}

/// Session history file.
pub fn sessions_file() -> PathBuf {
    app_data_dir().join("sessions.json")
}

/// Saved profiles file.
pub fn profiles_file() -> PathBuf {
    app_data_dir().join("profiles.json")
}

/// Pipeline limits. Defaults reproduce the reference tutor behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineLimits {
    /// Maximum atoms kept from decomposition.
    pub max_atoms: usize,
    /// Results requested from the search collaborator.
    pub search_results: usize,
    /// Search results formatted into the synthesis context.
    pub context_snippets: usize,
    /// Characters of document text kept at ingestion.
    pub document_char_budget: usize,
    /// Characters of evidence kept in the context-grounded synthesis prompt.
    pub synthesis_char_budget: usize,
}

impl Default for PipelineLimits {
    fn default() -> Self {
        Self {
            max_atoms: 5,
            search_results: 5,
            context_snippets: 3,
            document_char_budget: 3000,
            synthesis_char_budget: 4000,
        }
    }
}

/// Runtime configuration assembled from the environment.
#[derive(Debug, Clone)]
pub struct TutorConfig {
    pub openai_api_key: Option<String>,
    pub chat_model: String,
    pub legacy_model: String,
    pub image_model: String,
    pub openai_base_url: String,
    pub serpapi_api_key: Option<String>,
    pub timeout_secs: u64,
    pub limits: PipelineLimits,
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            legacy_model: DEFAULT_LEGACY_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            serpapi_api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            limits: PipelineLimits::default(),
        }
    }
}

impl TutorConfig {
    /// Read configuration from environment variables.
    ///
    /// Blank values count as unset so an exported-but-empty key does not
    /// look like a credential.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let timeout_secs = match get("TUTORX_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "Ignoring invalid TUTORX_TIMEOUT_SECS");
                DEFAULT_TIMEOUT_SECS
            }),
            None => DEFAULT_TIMEOUT_SECS,
        };

        Self {
            openai_api_key: get("OPENAI_API_KEY"),
            chat_model: get("OPENAI_CHAT_MODEL").unwrap_or(defaults.chat_model),
            legacy_model: get("OPENAI_LEGACY_MODEL").unwrap_or(defaults.legacy_model),
            image_model: get("OPENAI_IMAGE_MODEL").unwrap_or(defaults.image_model),
            openai_base_url: get("OPENAI_BASE_URL").unwrap_or(defaults.openai_base_url),
            serpapi_api_key: get("SERPAPI_API_KEY"),
            timeout_secs,
            limits: defaults.limits,
        }
    }
}
