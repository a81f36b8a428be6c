//! Error types for Synheart Persona

use thiserror::Error;

/// Errors that can occur during computation
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Failed to parse event payload: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid scoring endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Scoring request failed: {0}")]
    RequestError(#[from] reqwest::Error),
}
