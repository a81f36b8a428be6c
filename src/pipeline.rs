//! Session orchestration
//!
//! Composes the tracker and the rule evaluator into a stateful processor
//! that carries a rolling weight history across sessions within the current
//! process. History never leaves the process; stability derived from it is
//! always passed to the confidence formula explicitly.

use crate::evaluator::RuleEvaluator;
use crate::tracker::InteractionTracker;
use crate::types::{BehavioralProfile, EvaluationResult, PersonalityWeights, Point2D};
use std::collections::VecDeque;

/// Default weight-history window in sessions.
pub const DEFAULT_WEIGHT_HISTORY_WINDOW: usize = 20;

/// Bounded rolling history of per-session trait weights.
#[derive(Debug, Clone)]
pub struct WeightHistory {
    values: VecDeque<PersonalityWeights>,
    window_size: usize,
}

impl Default for WeightHistory {
    fn default() -> Self {
        Self::new(DEFAULT_WEIGHT_HISTORY_WINDOW)
    }
}

impl WeightHistory {
    /// Create a history keeping at most `window_size` sessions.
    pub fn new(window_size: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(window_size),
            window_size,
        }
    }

    /// Append a session's weights, evicting the oldest beyond the window.
    pub fn push(&mut self, weights: PersonalityWeights) {
        self.values.push_back(weights);
        while self.values.len() > self.window_size {
            self.values.pop_front();
        }
    }

    /// Stability of the recorded weights (see
    /// [`RuleEvaluator::calculate_stability`]).
    pub fn stability(&self) -> f64 {
        let snapshot: Vec<PersonalityWeights> = self.values.iter().copied().collect();
        RuleEvaluator::calculate_stability(&snapshot)
    }

    /// Number of sessions currently recorded.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the history is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Drop all recorded weights.
    pub fn clear(&mut self) {
        self.values.clear();
    }
}

/// Stateful processor for multi-session tracking and evaluation.
///
/// Wraps an [`InteractionTracker`] and counts finished sessions, recording
/// each session's weights so later evaluations can use history-aware
/// confidence.
pub struct PersonaProcessor {
    tracker: InteractionTracker,
    history: WeightHistory,
    session_count: u64,
}

impl Default for PersonaProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl PersonaProcessor {
    /// Create a processor with default settings (20 session history window).
    pub fn new() -> Self {
        Self::with_tracker(InteractionTracker::new())
    }

    /// Create a processor with a specific history window size (sessions).
    pub fn with_history_window(sessions: usize) -> Self {
        Self {
            tracker: InteractionTracker::new(),
            history: WeightHistory::new(sessions),
            session_count: 0,
        }
    }

    /// Create a processor around an existing tracker (custom thresholds or
    /// clock).
    pub fn with_tracker(tracker: InteractionTracker) -> Self {
        Self {
            tracker,
            history: WeightHistory::default(),
            session_count: 0,
        }
    }

    /// Restart the current session without evaluating it.
    pub fn start_session(&mut self) {
        self.tracker.start_session();
    }

    /// Feed one pointer sample.
    pub fn track_movement(&mut self, position: Point2D) {
        self.tracker.track_movement(position);
    }

    /// Record a click.
    pub fn record_click(&mut self) {
        self.tracker.record_click();
    }

    /// Mark the moment a decision point became visible.
    pub fn start_decision_step(&mut self) {
        self.tracker.start_decision_step();
    }

    /// Record completion of the current decision step.
    pub fn record_step_completion(&mut self) {
        self.tracker.record_step_completion();
    }

    /// Record a revision.
    pub fn record_revision(&mut self) {
        self.tracker.record_revision();
    }

    /// Upsert a contextual choice.
    pub fn record_choice(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.tracker.record_choice(key, value);
    }

    /// Snapshot the current behavioral profile. Pure read.
    pub fn behavioral_profile(&self) -> BehavioralProfile {
        self.tracker.behavioral_profile()
    }

    /// Evaluate the current session with the fixed stability placeholder.
    pub fn evaluate(&self) -> EvaluationResult {
        RuleEvaluator::evaluate_behavior(&self.tracker.behavioral_profile(), self.session_count)
    }

    /// Evaluate the current session with stability computed from the
    /// recorded weight history.
    pub fn evaluate_with_history(&self) -> EvaluationResult {
        let profile = self.tracker.behavioral_profile();
        let mut result = RuleEvaluator::evaluate_with_rules(&profile);
        result.session_count = self.session_count;
        result.confidence =
            RuleEvaluator::calculate_confidence(self.session_count, self.history.stability());
        result
    }

    /// Close out the current session: evaluate it with history-aware
    /// confidence, record its weights, and start a fresh session.
    pub fn finish_session(&mut self) -> EvaluationResult {
        self.session_count += 1;
        let result = self.evaluate_with_history();
        self.history.push(result.weights);
        self.tracker.start_session();
        result
    }

    /// Number of finished sessions.
    pub fn session_count(&self) -> u64 {
        self.session_count
    }

    /// Number of sessions in the weight history.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Drop the recorded weight history (the session count is kept).
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Read access to the inner tracker.
    pub fn tracker(&self) -> &InteractionTracker {
        &self.tracker
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{ManualClock, MonotonicClock};

    fn processor_at_zero() -> (PersonaProcessor, ManualClock) {
        let clock = ManualClock::new();
        let tracker = InteractionTracker::with_clock(clock.clone());
        (PersonaProcessor::with_tracker(tracker), clock)
    }

    fn run_slow_session(processor: &mut PersonaProcessor, clock: &ManualClock) {
        let base = clock.now_ms();
        processor.start_decision_step();
        clock.set(base + 3000.0);
        processor.record_step_completion();
    }

    #[test]
    fn test_weight_history_window_eviction() {
        let mut history = WeightHistory::new(3);
        for i in 0..5 {
            history.push(PersonalityWeights {
                logic: i as f64 * 0.1,
                ..PersonalityWeights::default()
            });
        }
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn test_weight_history_stability_passthrough() {
        let mut history = WeightHistory::new(10);
        assert_eq!(history.stability(), 0.3);

        history.push(PersonalityWeights {
            logic: 0.5,
            ..PersonalityWeights::default()
        });
        assert_eq!(history.stability(), 0.3);

        history.push(PersonalityWeights {
            logic: 0.5,
            ..PersonalityWeights::default()
        });
        assert!((history.stability() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_finish_session_rolls_over() {
        let (mut processor, clock) = processor_at_zero();

        run_slow_session(&mut processor, &clock);
        let result = processor.finish_session();

        assert_eq!(result.session_count, 1);
        assert_eq!(processor.session_count(), 1);
        assert_eq!(processor.history_len(), 1);
        // First session: no prior history, stability floor applies.
        // 0.2 + 0.1 + 0.3 * 0.3 = 0.39
        assert!((result.confidence - 0.39).abs() < 1e-9);

        // Tracker was reset for the next session.
        assert!(processor.tracker().metrics().decision_latencies.is_empty());
    }

    #[test]
    fn test_history_confidence_grows_with_stable_sessions() {
        let (mut processor, clock) = processor_at_zero();

        let mut last_confidence = 0.0;
        for _ in 0..4 {
            run_slow_session(&mut processor, &clock);
            let result = processor.finish_session();
            assert!(result.confidence >= last_confidence);
            last_confidence = result.confidence;
        }

        // Four identical sessions: stability saturates at 1.0.
        // 0.2 + 0.4 + 0.3 = 0.9 at the fourth finish (history had 3).
        assert!((last_confidence - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_fixed_and_history_paths_differ_only_in_stability() {
        let (mut processor, clock) = processor_at_zero();

        run_slow_session(&mut processor, &clock);
        processor.finish_session();
        run_slow_session(&mut processor, &clock);

        let fixed = processor.evaluate();
        let with_history = processor.evaluate_with_history();

        assert_eq!(fixed.weights, with_history.weights);
        assert_eq!(fixed.session_count, with_history.session_count);

        // Fixed path: 0.2 + 0.1 + 0.7 * 0.3 = 0.51
        assert!((fixed.confidence - 0.51).abs() < 1e-9);
        // History path with a single recorded session: floor stability 0.3.
        // 0.2 + 0.1 + 0.3 * 0.3 = 0.39
        assert!((with_history.confidence - 0.39).abs() < 1e-9);
    }

    #[test]
    fn test_clear_history_keeps_session_count() {
        let (mut processor, clock) = processor_at_zero();

        for _ in 0..3 {
            run_slow_session(&mut processor, &clock);
            processor.finish_session();
        }
        assert_eq!(processor.history_len(), 3);

        processor.clear_history();
        assert_eq!(processor.history_len(), 0);
        assert_eq!(processor.session_count(), 3);
    }

    #[test]
    fn test_recording_delegation() {
        let (mut processor, clock) = processor_at_zero();

        processor.track_movement(Point2D::new(0.0, 0.0));
        clock.set(100.0);
        processor.track_movement(Point2D::new(3.0, 4.0));
        processor.record_click();
        processor.record_revision();
        processor.record_choice("mode", "guided");

        let metrics = processor.tracker().metrics();
        assert!((metrics.path_length - 5.0).abs() < 1e-9);
        assert_eq!(metrics.click_count, 1);
        assert_eq!(metrics.revision_count, 1);

        let profile = processor.behavioral_profile();
        assert_eq!(profile.contextual_choices.get("mode").unwrap(), "guided");
    }

    #[test]
    fn test_history_window_bounds_processor() {
        let clock = ManualClock::new();
        let tracker = InteractionTracker::with_clock(clock.clone());
        let mut processor = PersonaProcessor {
            tracker,
            history: WeightHistory::new(2),
            session_count: 0,
        };

        for _ in 0..5 {
            run_slow_session(&mut processor, &clock);
            processor.finish_session();
        }

        assert_eq!(processor.history_len(), 2);
        assert_eq!(processor.session_count(), 5);
    }
}
