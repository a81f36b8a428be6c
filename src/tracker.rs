//! Session metrics accumulation
//!
//! Consumes discrete interaction events (pointer samples, clicks, decision
//! steps, revisions, contextual choices) and maintains running aggregates
//! for the current session. All operations are total: malformed timing
//! (non-positive deltas from clock anomalies or duplicate samples) is
//! silently excluded from accumulation rather than signaled.

use crate::clock::{MonotonicClock, SystemClock};
use crate::types::{BehavioralProfile, InteractionMetrics, Point2D};
use uuid::Uuid;

/// Default instantaneous velocity (px/ms) above which a movement counts as
/// a velocity peak.
pub const DEFAULT_FAST_MOVEMENT_THRESHOLD: f64 = 5.0;

/// Default distance (px) below which a non-zero movement counts as jitter.
pub const DEFAULT_JITTER_THRESHOLD: f64 = 10.0;

/// Classification thresholds for pointer movement.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Velocities above this (px/ms) are recorded as peaks.
    pub fast_movement_threshold: f64,
    /// Non-zero distances below this (px) are counted as jitter.
    pub jitter_threshold: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            fast_movement_threshold: DEFAULT_FAST_MOVEMENT_THRESHOLD,
            jitter_threshold: DEFAULT_JITTER_THRESHOLD,
        }
    }
}

/// Accumulates interaction metrics for one session at a time.
///
/// Single-writer: callers driving it from multiple threads must supply
/// external mutual exclusion around the whole read-then-update sequence.
pub struct InteractionTracker {
    config: TrackerConfig,
    clock: Box<dyn MonotonicClock>,
    metrics: InteractionMetrics,
}

impl Default for InteractionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionTracker {
    /// Create a tracker on the system clock and immediately start a session.
    pub fn new() -> Self {
        Self::with_config_and_clock(TrackerConfig::default(), SystemClock::new())
    }

    /// Create a tracker with custom thresholds on the system clock.
    pub fn with_config(config: TrackerConfig) -> Self {
        Self::with_config_and_clock(config, SystemClock::new())
    }

    /// Create a tracker with a caller-supplied clock (replay, tests).
    pub fn with_clock(clock: impl MonotonicClock + 'static) -> Self {
        Self::with_config_and_clock(TrackerConfig::default(), clock)
    }

    /// Create a tracker with custom thresholds and clock.
    pub fn with_config_and_clock(
        config: TrackerConfig,
        clock: impl MonotonicClock + 'static,
    ) -> Self {
        let mut tracker = Self {
            config,
            clock: Box::new(clock),
            metrics: InteractionMetrics::default(),
        };
        tracker.start_session();
        tracker
    }

    /// Reset all metrics to zero, stamp timestamps to now, and assign a
    /// fresh session identifier.
    pub fn start_session(&mut self) {
        let now = self.clock.now_ms();
        self.metrics = InteractionMetrics {
            session_id: Uuid::new_v4().to_string(),
            session_start_time: now,
            step_start_time: now,
            last_move_time: now,
            ..InteractionMetrics::default()
        };
    }

    /// Feed one pointer sample.
    ///
    /// The first sample only establishes position. Subsequent samples
    /// accumulate distance, velocity peaks, and jitter, unless the elapsed
    /// time since the previous sample is non-positive, in which case the
    /// sample still becomes the new reference position but contributes
    /// nothing.
    pub fn track_movement(&mut self, position: Point2D) {
        let now = self.clock.now_ms();

        if let Some(last) = self.metrics.last_position {
            let dt = now - self.metrics.last_move_time;
            if dt > 0.0 {
                let distance = last.distance_to(&position);
                self.metrics.path_length += distance;

                let velocity = distance / dt;
                if velocity > self.config.fast_movement_threshold {
                    self.metrics.velocity_peaks.push(velocity);
                }

                // Small non-zero movements read as hesitation noise.
                if distance > 0.0 && distance < self.config.jitter_threshold {
                    self.metrics.jitter_sum += 1.0;
                }
            }
        }

        self.metrics.last_position = Some(position);
        self.metrics.last_move_time = now;
    }

    /// Record a click.
    pub fn record_click(&mut self) {
        self.metrics.click_count += 1;
    }

    /// Mark the moment a decision point became visible.
    pub fn start_decision_step(&mut self) {
        self.metrics.step_start_time = self.clock.now_ms();
    }

    /// Record completion of the current decision step.
    ///
    /// Appends the elapsed latency if it is positive; the step timer is
    /// reset to now either way, so a clock anomaly costs one sample and
    /// nothing more.
    pub fn record_step_completion(&mut self) {
        let now = self.clock.now_ms();
        let latency = now - self.metrics.step_start_time;

        if latency > 0.0 {
            self.metrics.decision_latencies.push(latency);
        }

        self.metrics.step_start_time = now;
    }

    /// Record a revision (an undone or changed choice).
    pub fn record_revision(&mut self) {
        self.metrics.revision_count += 1;
    }

    /// Upsert a contextual choice. Last write wins per key.
    pub fn record_choice(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metrics
            .contextual_choices
            .insert(key.into(), value.into());
    }

    /// Snapshot the current behavioral profile. Pure read.
    pub fn behavioral_profile(&self) -> BehavioralProfile {
        let elapsed = self.clock.now_ms() - self.metrics.session_start_time;

        let path_efficiency = if elapsed > 0.0 {
            self.metrics.path_length / elapsed
        } else {
            0.0
        };

        let avg_decision_latency = if self.metrics.decision_latencies.is_empty() {
            0.0
        } else {
            self.metrics.decision_latencies.iter().sum::<f64>()
                / self.metrics.decision_latencies.len() as f64
        };

        let jitter_index = if self.metrics.path_length > 0.0 {
            self.metrics.jitter_sum / self.metrics.path_length
        } else {
            0.0
        };

        let intensity = self
            .metrics
            .velocity_peaks
            .iter()
            .copied()
            .fold(0.0, f64::max);

        BehavioralProfile {
            session_id: self.metrics.session_id.clone(),
            path_efficiency,
            avg_decision_latency,
            revision_rate: self.metrics.revision_count,
            jitter_index,
            intensity,
            contextual_choices: self.metrics.contextual_choices.clone(),
        }
    }

    /// Read access to the raw running metrics.
    pub fn metrics(&self) -> &InteractionMetrics {
        &self.metrics
    }

    /// The active classification thresholds.
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Identifier of the current session.
    pub fn session_id(&self) -> &str {
        &self.metrics.session_id
    }
}
