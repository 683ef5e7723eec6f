use super::types::PipelineResult;
use super::StepRecord;

/// Score when no step ran at all.
const NO_STEPS_SCORE: u8 = 30;
const STEP_WEIGHT: f64 = 70.0;
const SOURCES_BONUS: f64 = 15.0;
const ANALOGIES_BONUS: f64 = 15.0;

/// Heuristic 0-100 confidence from step outcomes and result contents.
pub fn score(steps: &[StepRecord], has_sources: bool, has_analogies: bool) -> u8 {
    if steps.is_empty() {
        return NO_STEPS_SCORE;
    }

    let successful = steps.iter().filter(|s| s.is_success()).count();
    let mut value = successful as f64 / steps.len() as f64 * STEP_WEIGHT;
    if has_sources {
        value += SOURCES_BONUS;
    }
    if has_analogies {
        value += ANALOGIES_BONUS;
    }

    value.clamp(0.0, 100.0) as u8
}

/// Score a finished result.
pub fn score_result(result: &PipelineResult) -> u8 {
    score(
        &result.steps,
        !result.sources.is_empty(),
        !result.analogies.is_empty(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::StepKind;

    fn ok() -> StepRecord {
        StepRecord::success(StepKind::Decomposition)
    }

    fn failed() -> StepRecord {
        StepRecord::error(StepKind::Synthesis, "boom")
    }

    #[test]
    fn no_steps_scores_thirty() {
        assert_eq!(score(&[], true, true), 30);
        assert_eq!(score(&[], false, false), 30);
    }

    #[test]
    fn two_of_three_with_bonuses_is_76() {
        assert_eq!(score(&[ok(), ok(), failed()], true, true), 76);
    }

    #[test]
    fn all_failing_without_bonuses_is_zero() {
        assert_eq!(score(&[failed(), failed()], false, false), 0);
    }

    #[test]
    fn all_successful_with_bonuses_caps_at_100() {
        assert_eq!(score(&[ok(), ok()], true, true), 100);
    }

    #[test]
    fn no_results_is_not_success() {
        let steps = [StepRecord::no_results(StepKind::WebSearch), ok()];
        assert_eq!(score(&steps, false, true), 50);
    }

    #[test]
    fn result_bonuses_follow_contents() {
        let mut result = PipelineResult::new("x", None, "English");
        result.steps = vec![ok()];
        assert_eq!(score_result(&result), 70);
        result.analogies = "Analogy 1".into();
        assert_eq!(score_result(&result), 85);
    }
}
