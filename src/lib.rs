//! Synheart Persona - On-device engine for interaction-style trait inference
//!
//! Persona aggregates raw interaction telemetry (pointer movement, clicks,
//! decision timing, revisions, contextual choices) into a behavioral profile
//! and scores it into four trait weights plus a confidence estimate through
//! a deterministic pipeline: event accumulation → profile snapshot →
//! rule-based evaluation.
//!
//! ## Modules
//!
//! - **Tracker**: per-session accumulation of interaction metrics
//! - **Evaluator**: rule-based trait weights, confidence, and stability
//! - **Replay**: recorded-session ingestion for hosts that batch events
//! - **ML**: optional delegation to an external scoring endpoint

pub mod clock;
pub mod error;
pub mod evaluator;
pub mod ml;
pub mod pipeline;
pub mod replay;
pub mod tracker;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use clock::{ManualClock, MonotonicClock, SystemClock};
pub use error::ComputeError;
pub use evaluator::RuleEvaluator;
pub use ml::{RemoteScorer, RemoteScorerConfig, ScoreRequest};
pub use pipeline::{PersonaProcessor, WeightHistory};
pub use replay::{InteractionEvent, SessionReplayer};
pub use tracker::{InteractionTracker, TrackerConfig};
pub use types::{
    BehavioralProfile, EvaluationResult, InteractionMetrics, PersonalityWeights, Point2D,
};

/// Persona version embedded in evaluation payloads
pub const PERSONA_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for evaluation payloads
pub const PRODUCER_NAME: &str = "synheart-persona";
