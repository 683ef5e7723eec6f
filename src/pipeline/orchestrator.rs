use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

use crate::config::PipelineLimits;
use crate::models::effective_profile;
use crate::search::WebSearch;

use super::analogy::{self, generate_analogies};
use super::confidence::score_result;
use super::context::resolve_context;
use super::decompose::decompose;
use super::llm::LlmGateway;
use super::synthesis::{self, synthesize};
use super::translate::{is_identity, translate};
use super::types::{ExplainRequest, PipelineResult, StepKind, StepRecord};
use super::ENGLISH;

/// Error and explanation text for a blank concept.
pub const NO_CONCEPT_ERROR: &str = "No concept provided";

/// Full explanation pipeline.
///
/// Coordinates: context → decompose → analogies → synthesize → translate → score.
/// Each step degrades instead of aborting; `explain` always returns a result.
pub struct ExplanationPipeline<'a, G: LlmGateway, S: WebSearch> {
    llm: &'a G,
    search: &'a S,
    limits: PipelineLimits,
}

impl<'a, G: LlmGateway, S: WebSearch> ExplanationPipeline<'a, G, S> {
    pub fn new(llm: &'a G, search: &'a S) -> Self {
        Self {
            llm,
            search,
            limits: PipelineLimits::default(),
        }
    }

    pub fn with_limits(llm: &'a G, search: &'a S, limits: PipelineLimits) -> Self {
        Self {
            llm,
            search,
            limits,
        }
    }

    /// Run every step for `request` and assemble the result.
    pub fn explain(&self, request: &ExplainRequest) -> PipelineResult {
        let concept = request.concept.trim();
        let profile = effective_profile(request.profile.as_ref()).cloned();
        let language = match request.target_language.trim() {
            "" => ENGLISH,
            language => language,
        };
        let mut result = PipelineResult::new(concept, profile, language);

        if concept.is_empty() {
            tracing::warn!("Explain called without a concept");
            result.explanation = format!("{NO_CONCEPT_ERROR}.");
            result.error = Some(NO_CONCEPT_ERROR.to_string());
            return result;
        }

        let _span = tracing::info_span!("explain", concept = %concept).entered();
        tracing::info!(
            use_web = request.use_web,
            has_document = request.document_text.is_some(),
            language = %language,
            "Explanation started"
        );

        match run_guarded(|| self.run_steps(request, &mut result)) {
            Ok(()) => {
                result.confidence = score_result(&result);
                tracing::info!(
                    confidence = result.confidence,
                    steps = result.steps.len(),
                    "Explanation complete"
                );
            }
            Err(failure) => {
                tracing::error!(error = %failure.message, "Explanation aborted by unexpected failure");
                result.error = Some(failure.message);
                result.trace = Some(failure.trace);
            }
        }

        result
    }

    fn run_steps(&self, request: &ExplainRequest, result: &mut PipelineResult) {
        let concept = result.concept.clone();
        let profile = result.profile.clone();

        // ── Context ─────────────────────────────────────────────
        let context = resolve_context(
            self.search,
            &concept,
            request.document_text.as_deref(),
            request.use_web,
            &self.limits,
        );
        if let Some(step) = context.step.clone() {
            result.steps.push(step);
        }
        result.sources = context.sources.clone();

        // ── Decomposition ───────────────────────────────────────
        let decomposition = decompose(self.llm, &concept, self.limits.max_atoms);
        let count = decomposition.atoms.len();
        let step = match &decomposition.gateway_error {
            Some(e) => StepRecord::error(StepKind::Decomposition, &e.to_string()),
            None => StepRecord::success(StepKind::Decomposition),
        };
        result.steps.push(
            step.with_count(count)
                .with_detail(decomposition.source.as_str()),
        );
        tracing::info!(count, source = decomposition.source.as_str(), "Concept decomposed");
        result.atoms = decomposition.atoms;

        // ── Analogies ───────────────────────────────────────────
        match generate_analogies(self.llm, &concept, &result.atoms, profile.as_ref()) {
            Ok(text) => {
                result.analogies = text;
                result.steps.push(StepRecord::success(StepKind::Analogies));
            }
            Err(e) => {
                tracing::warn!(error = %e, "Analogy generation failed");
                result.analogies = analogy::failure_placeholder(&e);
                result
                    .steps
                    .push(StepRecord::error(StepKind::Analogies, &e.to_string()));
            }
        }

        // ── Synthesis (+ translation) ───────────────────────────
        match synthesize(
            self.llm,
            &concept,
            &result.atoms,
            profile.as_ref(),
            &context.text,
            self.limits.synthesis_char_budget,
        ) {
            Ok((text, mode)) => {
                tracing::info!(mode = mode.as_str(), "Explanation synthesized");
                result.explanation = text;
                result
                    .steps
                    .push(StepRecord::success(StepKind::Synthesis).with_detail(mode.as_str()));

                let language = request.target_language.trim();
                if !is_identity(language) {
                    result.explanation = translate(self.llm, &result.explanation, language);
                    result.analogies = translate(self.llm, &result.analogies, language);
                    result
                        .steps
                        .push(StepRecord::success(StepKind::Translation).with_language(language));
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Synthesis failed");
                result.explanation = synthesis::failure_placeholder(&e);
                result
                    .steps
                    .push(StepRecord::error(StepKind::Synthesis, &e.to_string()));
            }
        }
    }
}

/// A panic caught inside the pipeline, with the stack at the panic site.
struct PanicFailure {
    message: String,
    trace: String,
}

thread_local! {
    static GUARD_DEPTH: Cell<usize> = const { Cell::new(0) };
    static PANIC_TRACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

static PANIC_HOOK: Once = Once::new();

/// Chain a hook that, on threads currently inside [`run_guarded`], records the
/// panic-site backtrace and logs through tracing instead of printing to stderr.
/// Other threads keep the previous hook.
fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if GUARD_DEPTH.with(Cell::get) == 0 {
                previous(info);
                return;
            }
            let trace = Backtrace::force_capture().to_string();
            tracing::error!(panic = %info, "Panic inside explanation pipeline");
            PANIC_TRACE.with(|slot| *slot.borrow_mut() = Some(trace));
        }));
    });
}

fn run_guarded(f: impl FnOnce()) -> Result<(), PanicFailure> {
    install_panic_hook();
    PANIC_TRACE.with(|slot| slot.borrow_mut().take());
    GUARD_DEPTH.with(|depth| depth.set(depth.get() + 1));
    let outcome = panic::catch_unwind(AssertUnwindSafe(f));
    GUARD_DEPTH.with(|depth| depth.set(depth.get() - 1));

    outcome.map_err(|payload| PanicFailure {
        message: panic_message(payload.as_ref()),
        trace: PANIC_TRACE
            .with(|slot| slot.borrow_mut().take())
            .unwrap_or_else(|| Backtrace::force_capture().to_string()),
    })
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unexpected failure".to_string()
    }
}
