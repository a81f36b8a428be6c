//! Rule-based behavior evaluation
//!
//! Maps a behavioral profile to four trait weights plus a confidence
//! estimate using fixed, explainable formulas. Every function here is a
//! pure function of its arguments.

use crate::types::{BehavioralProfile, EvaluationResult, PersonalityWeights};
use chrono::Utc;

/// Decision latency (ms) at or below which decisions read as fully
/// intuitive (logic saturates to 0).
const LOGIC_LATENCY_FLOOR_MS: f64 = 1000.0;

/// Latency span (ms) over which logic scales linearly from 0 to 1; logic
/// saturates to 1 at floor + span (5 seconds).
const LOGIC_LATENCY_SPAN_MS: f64 = 4000.0;

/// Contribution of each revision to the complexity score.
const COMPLEXITY_REVISION_WEIGHT: f64 = 0.2;

/// Divisor converting average latency (ms) into the complexity time term.
const COMPLEXITY_LATENCY_DIVISOR: f64 = 10000.0;

/// Placeholder stability used by `evaluate_behavior`. History-aware callers
/// compute real stability via `calculate_stability` and feed it to
/// `calculate_confidence` themselves; the two paths are deliberately kept
/// separate.
pub const DEFAULT_STABILITY: f64 = 0.7;

/// Base confidence granted to any evaluation.
const BASE_CONFIDENCE: f64 = 0.2;

/// Confidence added per observed session.
const SESSION_CONFIDENCE_STEP: f64 = 0.1;

/// Cap on the session-count contribution (saturates at 5 sessions).
const SESSION_CONFIDENCE_CAP: f64 = 0.5;

/// Weight of the stability term in the confidence formula.
const STABILITY_CONFIDENCE_WEIGHT: f64 = 0.3;

/// Hard ceiling: the engine never claims full certainty.
const MAX_CONFIDENCE: f64 = 0.95;

/// Stability reported when fewer than two weight samples exist.
const INSUFFICIENT_HISTORY_STABILITY: f64 = 0.3;

/// Stability fallback when the historical logic mean is zero.
const NEUTRAL_STABILITY: f64 = 0.5;

/// Rule-based evaluator for behavioral profiles.
pub struct RuleEvaluator;

impl RuleEvaluator {
    /// Compute trait weights and reasoning from a profile.
    ///
    /// Confidence and session count are left at zero here;
    /// `evaluate_behavior` attaches them.
    pub fn evaluate_with_rules(profile: &BehavioralProfile) -> EvaluationResult {
        // Sub-second decisions read as intuitive, five seconds and up as
        // fully deliberate, linear in between.
        let logic = ((profile.avg_decision_latency - LOGIC_LATENCY_FLOOR_MS)
            / LOGIC_LATENCY_SPAN_MS)
            .clamp(0.0, 1.0);

        // Complement by construction, not independently measured.
        let intuition = 1.0 - logic;

        // Direct pass-through of the px/ms rate; callers whose coordinate
        // system produces values far outside [0, 1] should pre-scale.
        let fluidity = profile.path_efficiency.clamp(0.0, 1.0);

        // Count-based and time-based signals blended in one term.
        let complexity = (profile.revision_rate as f64 * COMPLEXITY_REVISION_WEIGHT
            + profile.avg_decision_latency / COMPLEXITY_LATENCY_DIVISOR)
            .clamp(0.0, 1.0);

        let reasoning = format!(
            "decision latency: {:.0}ms, revisions: {}, path efficiency: {:.2}",
            profile.avg_decision_latency, profile.revision_rate, profile.path_efficiency
        );

        EvaluationResult {
            weights: PersonalityWeights {
                logic,
                intuition,
                fluidity,
                complexity,
            },
            confidence: 0.0,
            session_count: 0,
            reasoning,
            computed_at_utc: Utc::now().to_rfc3339(),
        }
    }

    /// Evaluate a profile with the fixed stability placeholder.
    pub fn evaluate_behavior(profile: &BehavioralProfile, session_count: u64) -> EvaluationResult {
        let mut result = Self::evaluate_with_rules(profile);
        result.session_count = session_count;
        result.confidence = Self::calculate_confidence(session_count, DEFAULT_STABILITY);
        result
    }

    /// Combine session count and stability into a confidence score.
    ///
    /// Base 0.2, up to 0.5 from session count (saturating at 5 sessions),
    /// up to 0.3 from stability, capped at 0.95.
    pub fn calculate_confidence(session_count: u64, stability: f64) -> f64 {
        let session_contribution =
            (session_count as f64 * SESSION_CONFIDENCE_STEP).min(SESSION_CONFIDENCE_CAP);
        let stability_contribution = stability * STABILITY_CONFIDENCE_WEIGHT;

        (BASE_CONFIDENCE + session_contribution + stability_contribution).min(MAX_CONFIDENCE)
    }

    /// Stability of the `logic` dimension across a weight history, as the
    /// inverse coefficient of variation.
    ///
    /// Only `logic` is examined; this is a scope limitation of the
    /// rule-based approach, kept on purpose.
    pub fn calculate_stability(weight_history: &[PersonalityWeights]) -> f64 {
        if weight_history.len() < 2 {
            return INSUFFICIENT_HISTORY_STABILITY;
        }

        let n = weight_history.len() as f64;
        let mean = weight_history.iter().map(|w| w.logic).sum::<f64>() / n;

        let variance = weight_history
            .iter()
            .map(|w| (w.logic - mean).powi(2))
            .sum::<f64>()
            / n;
        let std_dev = variance.sqrt();

        if mean > 0.0 {
            (1.0 - std_dev / mean).clamp(0.0, 1.0)
        } else {
            NEUTRAL_STABILITY
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(latency: f64, revisions: u64, efficiency: f64) -> BehavioralProfile {
        BehavioralProfile {
            avg_decision_latency: latency,
            revision_rate: revisions,
            path_efficiency: efficiency,
            ..BehavioralProfile::default()
        }
    }

    fn weights(logic: f64) -> PersonalityWeights {
        PersonalityWeights {
            logic,
            intuition: 1.0 - logic,
            fluidity: 0.5,
            complexity: 0.5,
        }
    }

    #[test]
    fn test_rule_evaluation_is_deterministic() {
        let result = RuleEvaluator::evaluate_with_rules(&profile(3000.0, 2, 0.6));

        assert!((result.weights.logic - 0.5).abs() < 0.001);
        assert!((result.weights.intuition - 0.5).abs() < 0.001);
        assert!((result.weights.fluidity - 0.6).abs() < 0.001);
        // 2 * 0.2 + 3000 / 10000 = 0.7
        assert!((result.weights.complexity - 0.7).abs() < 0.001);
    }

    #[test]
    fn test_logic_saturates_at_bounds() {
        for latency in [5000.0, 6000.0, 60000.0] {
            let result = RuleEvaluator::evaluate_with_rules(&profile(latency, 0, 0.0));
            assert_eq!(result.weights.logic, 1.0);
            assert_eq!(result.weights.intuition, 0.0);
        }

        for latency in [0.0, 500.0, 1000.0] {
            let result = RuleEvaluator::evaluate_with_rules(&profile(latency, 0, 0.0));
            assert_eq!(result.weights.logic, 0.0);
            assert_eq!(result.weights.intuition, 1.0);
        }
    }

    #[test]
    fn test_intuition_complements_logic() {
        for latency in [1200.0, 2500.0, 4800.0] {
            let result = RuleEvaluator::evaluate_with_rules(&profile(latency, 1, 0.3));
            assert!((result.weights.logic + result.weights.intuition - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_fluidity_clamps_out_of_range_rates() {
        let high = RuleEvaluator::evaluate_with_rules(&profile(0.0, 0, 4.2));
        assert_eq!(high.weights.fluidity, 1.0);

        let negative = RuleEvaluator::evaluate_with_rules(&profile(0.0, 0, -0.5));
        assert_eq!(negative.weights.fluidity, 0.0);
    }

    #[test]
    fn test_complexity_clamps_at_one() {
        // 10 revisions alone would score 2.0.
        let result = RuleEvaluator::evaluate_with_rules(&profile(8000.0, 10, 0.0));
        assert_eq!(result.weights.complexity, 1.0);
    }

    #[test]
    fn test_reasoning_embeds_input_features() {
        let result = RuleEvaluator::evaluate_with_rules(&profile(3000.0, 2, 0.6));
        assert_eq!(
            result.reasoning,
            "decision latency: 3000ms, revisions: 2, path efficiency: 0.60"
        );
    }

    #[test]
    fn test_rule_path_leaves_confidence_unset() {
        let result = RuleEvaluator::evaluate_with_rules(&profile(2000.0, 1, 0.4));
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.session_count, 0);
    }

    #[test]
    fn test_evaluate_behavior_attaches_confidence() {
        let result = RuleEvaluator::evaluate_behavior(&profile(3000.0, 2, 0.6), 3);

        assert_eq!(result.session_count, 3);
        // 0.2 + 3 * 0.1 + 0.7 * 0.3 = 0.71
        assert!((result.confidence - 0.71).abs() < 0.001);
        // Weights are the same as the plain rule path.
        assert!((result.weights.logic - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_confidence_floor_and_ceiling() {
        assert!((RuleEvaluator::calculate_confidence(0, 0.0) - 0.2).abs() < 1e-9);
        // Raw sum would be 0.2 + 0.5 + 0.3 = 1.0; capped.
        assert!((RuleEvaluator::calculate_confidence(10, 1.0) - 0.95).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_session_contribution_saturates() {
        let at_five = RuleEvaluator::calculate_confidence(5, 0.0);
        let at_fifty = RuleEvaluator::calculate_confidence(50, 0.0);
        assert!((at_five - 0.7).abs() < 1e-9);
        assert_eq!(at_five, at_fifty);
    }

    #[test]
    fn test_stability_insufficient_history() {
        assert_eq!(RuleEvaluator::calculate_stability(&[]), 0.3);
        assert_eq!(RuleEvaluator::calculate_stability(&[weights(0.5)]), 0.3);
    }

    #[test]
    fn test_stability_of_constant_history_is_one() {
        let history = vec![weights(0.6); 5];
        assert!((RuleEvaluator::calculate_stability(&history) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_stability_zero_mean_is_neutral() {
        let history = vec![weights(0.0), weights(0.0), weights(0.0)];
        assert_eq!(RuleEvaluator::calculate_stability(&history), 0.5);
    }

    #[test]
    fn test_stability_penalizes_variance() {
        // mean = 0.5, population stddev = 0.1 -> 1 - 0.2 = 0.8
        let history = vec![weights(0.4), weights(0.6)];
        assert!((RuleEvaluator::calculate_stability(&history) - 0.8).abs() < 1e-9);

        // Wild swings floor at 0.
        let erratic = vec![weights(0.01), weights(0.99), weights(0.01), weights(0.99)];
        let stability = RuleEvaluator::calculate_stability(&erratic);
        assert!(stability < 0.1);
    }

    #[test]
    fn test_result_timestamp_is_rfc3339() {
        let result = RuleEvaluator::evaluate_with_rules(&profile(1500.0, 0, 0.1));
        assert!(chrono::DateTime::parse_from_rfc3339(&result.computed_at_utc).is_ok());
    }
}
