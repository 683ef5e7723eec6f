use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use tutorx::config::{self, TutorConfig};
use tutorx::models::Profile;
use tutorx::pipeline::diagram::{failure_message, DEFAULT_DIAGRAM_SIZE, DIAGRAM_SIZES};
use tutorx::pipeline::{truncate_chars, ExplainRequest};
use tutorx::render::{step_summary, to_markdown};
use tutorx::storage::{ProfileStore, SessionStore};
use tutorx::tutor::DefaultTutor;

#[derive(Parser, Debug)]
#[command(
    name = "tutorx",
    version,
    about = "Explain concepts with tailored analogies, optionally grounded in web results or a document"
)]
struct Cli {
    /// OpenAI API key
    #[arg(long, global = true, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    /// Chat model used for every completion
    #[arg(long, global = true, env = "OPENAI_CHAT_MODEL")]
    model: Option<String>,

    /// SerpAPI key; DuckDuckGo is used without it
    #[arg(long, global = true, env = "SERPAPI_API_KEY", hide_env_values = true)]
    serpapi_api_key: Option<String>,

    /// HTTP timeout in seconds
    #[arg(long, global = true, env = "TUTORX_TIMEOUT_SECS")]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the full explanation pipeline
    Explain {
        /// Concept to explain
        #[arg(required = true)]
        concept: Vec<String>,

        /// Output language
        #[arg(long, default_value = "English")]
        lang: String,

        /// Plain-text document used as context instead of web search
        #[arg(long)]
        doc: Option<PathBuf>,

        /// Skip web search
        #[arg(long, default_value_t = false)]
        no_web: bool,

        /// Saved profile to tailor the explanation for
        #[arg(long)]
        profile: Option<String>,

        /// Print the raw result as JSON
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Print the per-step log after the explanation
        #[arg(long, default_value_t = false)]
        steps: bool,
    },
    /// Web search only
    Search {
        #[arg(required = true)]
        query: Vec<String>,
    },
    /// Break a concept into atomic ideas
    Decompose {
        #[arg(required = true)]
        concept: Vec<String>,
    },
    /// Three analogies for a concept
    Analogies {
        #[arg(required = true)]
        concept: Vec<String>,

        #[arg(long, default_value = "English")]
        lang: String,

        #[arg(long)]
        profile: Option<String>,
    },
    /// Generate an infographic and print its URL
    Diagram {
        #[arg(required = true)]
        concept: Vec<String>,

        #[arg(long, default_value = DEFAULT_DIAGRAM_SIZE, value_parser = DIAGRAM_SIZES.to_vec())]
        size: String,
    },
    /// Manage saved profiles
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Browse session history
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Subcommand, Debug)]
enum ProfileAction {
    /// Create or replace a profile
    Save {
        name: String,

        #[arg(long, default_value = "16-22")]
        age_group: String,

        #[arg(long, default_value = "Student")]
        role: String,

        #[arg(long, default_value = "technology")]
        interests: String,
    },
    /// List saved profiles
    List,
}

#[derive(Subcommand, Debug)]
enum HistoryAction {
    /// Newest sessions first
    List {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Print one session
    Show { index: usize },
    /// Delete one session
    Remove { index: usize },
    /// Delete all sessions
    Clear,
}

impl Cli {
    fn config(&self) -> TutorConfig {
        let mut config = TutorConfig::from_env();
        if let Some(key) = self.openai_api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            config.openai_api_key = Some(key.trim().to_string());
        }
        if let Some(model) = &self.model {
            config.chat_model = model.clone();
        }
        if let Some(key) = self.serpapi_api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            config.serpapi_api_key = Some(key.trim().to_string());
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        config
    }
}

fn main() -> Result<()> {
    tutorx::init_tracing();
    let cli = Cli::parse();
    let tutor = DefaultTutor::from_config(&cli.config()).context("failed to initialise tutor")?;

    match cli.command {
        Commands::Explain {
            concept,
            lang,
            doc,
            no_web,
            profile,
            json,
            steps,
        } => {
            let concept = concept.join(" ");
            if concept.trim().is_empty() {
                bail!("concept must not be empty");
            }
            warn_unsupported_language(&lang);

            let document = match doc {
                Some(path) => Some(
                    std::fs::read_to_string(&path)
                        .with_context(|| format!("failed to read document {}", path.display()))?,
                ),
                None => None,
            };

            let request = ExplainRequest::new(&concept)
                .with_web(!no_web)
                .with_document(document)
                .with_language(&lang);
            let result = tutor.explain(request, profile.as_deref());

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", to_markdown(&result));
                if steps {
                    println!("---\n{}", step_summary(&result));
                }
            }
        }
        Commands::Search { query } => {
            let hits = tutor.search(&query.join(" "))?;
            if hits.is_empty() {
                println!("No results.");
            }
            for hit in hits {
                println!("**{}**\n{}...\n{}\n", hit.title, truncate_chars(&hit.snippet, 120), hit.link);
            }
        }
        Commands::Decompose { concept } => {
            let decomposition = tutor.decompose(&concept.join(" "));
            if let Some(e) = &decomposition.gateway_error {
                eprintln!("warning: {e}");
            }
            println!("**Atomic Ideas:**");
            for atom in &decomposition.atoms {
                println!("• {atom}");
            }
        }
        Commands::Analogies {
            concept,
            lang,
            profile,
        } => {
            warn_unsupported_language(&lang);
            let profile = profile.and_then(|name| tutor.load_profile(&name));
            println!("{}", tutor.analogies(&concept.join(" "), profile.as_ref(), &lang));
        }
        Commands::Diagram { concept, size } => {
            match tutor.diagram(&concept.join(" "), &size) {
                Ok(url) => println!("{url}"),
                Err(e) => bail!("diagram generation failed: {}", failure_message(&e)),
            }
        }
        Commands::Profile { action } => match action {
            ProfileAction::Save {
                name,
                age_group,
                role,
                interests,
            } => {
                if name.trim().is_empty() {
                    bail!("profile name must not be empty");
                }
                if !config::AGE_GROUPS.contains(&age_group.as_str()) {
                    eprintln!("note: age group '{age_group}' is not one of {:?}", config::AGE_GROUPS);
                }
                if !config::ROLES.contains(&role.as_str()) {
                    eprintln!("note: role '{role}' is not one of {:?}", config::ROLES);
                }
                let saved = tutor
                    .profiles()
                    .save(Profile::new(&name, &age_group, &role, &interests))?;
                println!("Saved profile '{}'", saved.name);
            }
            ProfileAction::List => {
                let profiles = tutor.profiles().list()?;
                if profiles.is_empty() {
                    println!("No profiles yet.");
                }
                for p in profiles {
                    println!("{} ({}, {}) - {}", p.name, p.age_group, p.role, p.interests);
                }
            }
        },
        Commands::History { action } => match action {
            HistoryAction::List { limit } => {
                let sessions = tutor.sessions().list()?;
                if sessions.is_empty() {
                    println!("No sessions yet.");
                }
                for (i, s) in sessions.iter().take(limit).enumerate() {
                    println!(
                        "[{i}] {} | {} | {}%",
                        s.ts.format("%Y-%m-%d %H:%M:%S"),
                        truncate_chars(&s.concept_preview, 35),
                        s.confidence
                    );
                }
            }
            HistoryAction::Show { index } => match tutor.sessions().get(index)? {
                Some(session) => println!("{}", session.result),
                None => bail!("no session at index {index}"),
            },
            HistoryAction::Remove { index } => match tutor.sessions().remove(index)? {
                Some(session) => println!("Removed '{}'", session.concept_preview),
                None => bail!("no session at index {index}"),
            },
            HistoryAction::Clear => {
                tutor.sessions().clear()?;
                println!("History cleared.");
            }
        },
    }

    Ok(())
}

fn warn_unsupported_language(lang: &str) {
    if !config::SUPPORTED_LANGUAGES
        .iter()
        .any(|l| l.eq_ignore_ascii_case(lang.trim()))
    {
        tracing::warn!(language = lang, "Language not in the supported list, translating anyway");
    }
}
