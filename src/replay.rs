//! Recorded-session replay
//!
//! Hosts capture interaction events on their own timeline and hand them to
//! the engine as NDJSON or a JSON array. Replay drives a tracker against a
//! manual clock, producing the same profile live tracking would have.

use crate::clock::ManualClock;
use crate::error::ComputeError;
use crate::tracker::{InteractionTracker, TrackerConfig};
use crate::types::{BehavioralProfile, Point2D};
use serde::{Deserialize, Serialize};

/// Schema identifier for recorded interaction events.
pub const EVENT_SCHEMA_VERSION: &str = "persona.interaction_event.v1";

/// One recorded interaction event with its host timestamp in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum InteractionEvent {
    /// Pointer sample.
    Movement { t_ms: f64, x: f64, y: f64 },
    /// Click.
    Click { t_ms: f64 },
    /// A decision point became visible.
    StepStart { t_ms: f64 },
    /// The current decision step was completed.
    StepComplete { t_ms: f64 },
    /// A choice was undone or changed.
    Revision { t_ms: f64 },
    /// Contextual key/value choice.
    Choice { t_ms: f64, key: String, value: String },
}

impl InteractionEvent {
    /// Host timestamp of the event in milliseconds.
    pub fn timestamp_ms(&self) -> f64 {
        match self {
            InteractionEvent::Movement { t_ms, .. }
            | InteractionEvent::Click { t_ms }
            | InteractionEvent::StepStart { t_ms }
            | InteractionEvent::StepComplete { t_ms }
            | InteractionEvent::Revision { t_ms }
            | InteractionEvent::Choice { t_ms, .. } => *t_ms,
        }
    }
}

/// Parse a JSON string containing an array of events.
pub fn parse_array(json: &str) -> Result<Vec<InteractionEvent>, ComputeError> {
    let events: Vec<InteractionEvent> = serde_json::from_str(json)?;
    Ok(events)
}

/// Parse NDJSON (newline-delimited JSON) containing events.
pub fn parse_ndjson(ndjson: &str) -> Result<Vec<InteractionEvent>, ComputeError> {
    let mut events = Vec::new();
    for (line_num, line) in ndjson.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<InteractionEvent>(trimmed) {
            Ok(event) => events.push(event),
            Err(e) => {
                return Err(ComputeError::ParseError(format!(
                    "Failed to parse line {}: {}",
                    line_num + 1,
                    e
                )));
            }
        }
    }
    Ok(events)
}

/// Replays recorded events through a tracker.
pub struct SessionReplayer {
    config: TrackerConfig,
}

impl Default for SessionReplayer {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionReplayer {
    /// Create a replayer with default tracker thresholds.
    pub fn new() -> Self {
        Self {
            config: TrackerConfig::default(),
        }
    }

    /// Create a replayer with custom tracker thresholds.
    pub fn with_config(config: TrackerConfig) -> Self {
        Self { config }
    }

    /// Replay events in timestamp order and return the resulting profile.
    ///
    /// The session starts at the first event's timestamp, so elapsed time
    /// spans exactly the recorded window.
    pub fn replay(&self, events: &[InteractionEvent]) -> BehavioralProfile {
        let mut sorted = events.to_vec();
        sorted.sort_by(|a, b| a.timestamp_ms().total_cmp(&b.timestamp_ms()));

        let clock = ManualClock::new();
        if let Some(first) = sorted.first() {
            clock.set(first.timestamp_ms());
        }

        let mut tracker =
            InteractionTracker::with_config_and_clock(self.config.clone(), clock.clone());

        for event in &sorted {
            clock.set(event.timestamp_ms());
            match event {
                InteractionEvent::Movement { x, y, .. } => {
                    tracker.track_movement(Point2D::new(*x, *y));
                }
                InteractionEvent::Click { .. } => tracker.record_click(),
                InteractionEvent::StepStart { .. } => tracker.start_decision_step(),
                InteractionEvent::StepComplete { .. } => tracker.record_step_completion(),
                InteractionEvent::Revision { .. } => tracker.record_revision(),
                InteractionEvent::Choice { key, value, .. } => {
                    tracker.record_choice(key.clone(), value.clone());
                }
            }
        }

        tracker.behavioral_profile()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_events() -> Vec<InteractionEvent> {
        vec![
            InteractionEvent::Movement {
                t_ms: 0.0,
                x: 100.0,
                y: 100.0,
            },
            InteractionEvent::StepStart { t_ms: 0.0 },
            InteractionEvent::Movement {
                t_ms: 100.0,
                x: 103.0,
                y: 104.0,
            },
            InteractionEvent::Movement {
                t_ms: 250.0,
                x: 110.0,
                y: 108.0,
            },
            InteractionEvent::Click { t_ms: 300.0 },
            InteractionEvent::StepComplete { t_ms: 3000.0 },
            InteractionEvent::Revision { t_ms: 3200.0 },
            InteractionEvent::Choice {
                t_ms: 3300.0,
                key: "pace".to_string(),
                value: "careful".to_string(),
            },
        ]
    }

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = InteractionEvent::Movement {
            t_ms: 12.5,
            x: 1.0,
            y: 2.0,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"event_type":"movement","t_ms":12.5,"x":1.0,"y":2.0}"#);

        let parsed: InteractionEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn test_parse_ndjson_skips_blank_lines() {
        let ndjson = r#"
            {"event_type": "click", "t_ms": 10.0}

            {"event_type": "revision", "t_ms": 20.0}
        "#;

        let events = parse_ndjson(ndjson).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], InteractionEvent::Click { t_ms: 10.0 });
    }

    #[test]
    fn test_parse_ndjson_reports_line_number() {
        let ndjson = "{\"event_type\": \"click\", \"t_ms\": 10.0}\nnot json\n";

        let err = parse_ndjson(ndjson).unwrap_err();
        match err {
            ComputeError::ParseError(msg) => assert!(msg.contains("line 2")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_array() {
        let json = r#"[
            {"event_type": "step_start", "t_ms": 0.0},
            {"event_type": "step_complete", "t_ms": 1500.0},
            {"event_type": "choice", "t_ms": 1600.0, "key": "k", "value": "v"}
        ]"#;

        let events = parse_array(json).unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[1], InteractionEvent::StepComplete { t_ms: 1500.0 });
    }

    #[test]
    fn test_replay_accumulates_movement() {
        let profile = SessionReplayer::new().replay(&sample_events());

        // hypot(3,4) + hypot(7,4) over 3300 ms of session.
        let path = 5.0 + (49.0_f64 + 16.0).sqrt();
        assert!((profile.path_efficiency - path / 3300.0).abs() < 1e-9);
        assert_eq!(profile.avg_decision_latency, 3000.0);
        assert_eq!(profile.revision_rate, 1);
        assert_eq!(profile.contextual_choices.get("pace").unwrap(), "careful");
        // Both displacements are sub-threshold jitter.
        assert!((profile.jitter_index - 2.0 / path).abs() < 1e-9);
    }

    #[test]
    fn test_replay_sorts_out_of_order_events() {
        let mut events = sample_events();
        events.reverse();

        let sorted_profile = SessionReplayer::new().replay(&sample_events());
        let reversed_profile = SessionReplayer::new().replay(&events);

        assert_eq!(
            sorted_profile.avg_decision_latency,
            reversed_profile.avg_decision_latency
        );
        assert_eq!(sorted_profile.path_efficiency, reversed_profile.path_efficiency);
        assert_eq!(sorted_profile.revision_rate, reversed_profile.revision_rate);
    }

    #[test]
    fn test_replay_empty_events_yields_neutral_profile() {
        let profile = SessionReplayer::new().replay(&[]);

        assert_eq!(profile.path_efficiency, 0.0);
        assert_eq!(profile.avg_decision_latency, 0.0);
        assert_eq!(profile.revision_rate, 0);
        assert_eq!(profile.intensity, 0.0);
    }

    #[test]
    fn test_replay_matches_manual_tracking() {
        use crate::clock::ManualClock;

        let clock = ManualClock::new();
        let mut tracker = InteractionTracker::with_clock(clock.clone());

        tracker.track_movement(Point2D::new(100.0, 100.0));
        tracker.start_decision_step();
        clock.set(100.0);
        tracker.track_movement(Point2D::new(103.0, 104.0));
        clock.set(250.0);
        tracker.track_movement(Point2D::new(110.0, 108.0));
        clock.set(300.0);
        tracker.record_click();
        clock.set(3000.0);
        tracker.record_step_completion();
        clock.set(3200.0);
        tracker.record_revision();
        clock.set(3300.0);
        tracker.record_choice("pace", "careful");

        let live = tracker.behavioral_profile();
        let replayed = SessionReplayer::new().replay(&sample_events());

        assert_eq!(live.path_efficiency, replayed.path_efficiency);
        assert_eq!(live.avg_decision_latency, replayed.avg_decision_latency);
        assert_eq!(live.revision_rate, replayed.revision_rate);
        assert_eq!(live.jitter_index, replayed.jitter_index);
        assert_eq!(live.intensity, replayed.intensity);
        assert_eq!(live.contextual_choices, replayed.contextual_choices);
    }
}
