//! Core value types for the interaction-telemetry pipeline
//!
//! This module defines the types that flow through the engine: raw session
//! metrics accumulated by the tracker, the immutable profile snapshot handed
//! to the evaluator, and the trait-weight output.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A 2D pointer position in host coordinates (pixels).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    /// Create a new point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point2D) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Running interaction aggregates for one tracking session.
///
/// Owned exclusively by the tracker. All cumulative fields are monotonic for
/// the lifetime of a session; `start_session` resets everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InteractionMetrics {
    /// Session identifier (UUID v4), assigned at session start.
    pub session_id: String,
    /// Cumulative Euclidean pointer distance in pixels. Non-decreasing.
    pub path_length: f64,
    /// Previous pointer sample. `None` until the first sample arrives; the
    /// first sample establishes position without contributing distance.
    pub last_position: Option<Point2D>,
    /// Monotonic clock reading of the last pointer sample, in milliseconds.
    pub last_move_time: f64,
    /// Monotonic clock reading of the current decision step start, in
    /// milliseconds.
    pub step_start_time: f64,
    /// Monotonic clock reading of the session start, in milliseconds.
    pub session_start_time: f64,
    /// Number of clicks recorded. Non-decreasing.
    pub click_count: u64,
    /// Number of revisions recorded. Non-decreasing.
    pub revision_count: u64,
    /// One entry per completed decision step, in milliseconds. Append-only.
    pub decision_latencies: Vec<f64>,
    /// Instantaneous velocities (px/ms) that exceeded the fast-movement
    /// threshold. Append-only.
    pub velocity_peaks: Vec<f64>,
    /// Count of pointer samples classified as jitter. Non-decreasing.
    pub jitter_sum: f64,
    /// Free-form contextual choices, last write wins per key.
    pub contextual_choices: HashMap<String, String>,
}

/// Immutable behavioral snapshot derived from the running metrics.
///
/// A value type copied out of the tracker on demand; reads never mutate the
/// underlying metrics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BehavioralProfile {
    /// Session identifier the snapshot was taken from.
    pub session_id: String,
    /// Path length divided by elapsed session time (px/ms). A rate, not a
    /// ratio to an optimal path.
    pub path_efficiency: f64,
    /// Arithmetic mean of decision latencies in milliseconds (0 if none).
    pub avg_decision_latency: f64,
    /// Raw revision count, not normalized by time.
    pub revision_rate: u64,
    /// Jitter sample count divided by path length (0 if no path yet).
    pub jitter_index: f64,
    /// Maximum velocity peak observed (0 if none).
    pub intensity: f64,
    /// Contextual choices, copied by value.
    pub contextual_choices: HashMap<String, String>,
}

/// Four interaction-style trait weights, each clamped to [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PersonalityWeights {
    /// Deliberate, latency-driven decision style.
    pub logic: f64,
    /// Complement of `logic`: fast, intuitive decisions.
    pub intuition: f64,
    /// Smoothness of pointer motion over the session.
    pub fluidity: f64,
    /// Blend of revision count and decision latency.
    pub complexity: f64,
}

/// Result of one behavior evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Inferred trait weights.
    pub weights: PersonalityWeights,
    /// Confidence in the weights, [0, 1]. Never reaches 1.0.
    pub confidence: f64,
    /// Number of sessions backing this evaluation.
    pub session_count: u64,
    /// Deterministic human-readable summary of the input features.
    pub reasoning: String,
    /// When this evaluation was computed (RFC3339).
    pub computed_at_utc: String,
}
