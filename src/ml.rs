//! Remote model-backed scoring
//!
//! Sends profile features to an external scoring endpoint and returns the
//! parsed JSON response. The engine fixes only the request schema: it issues
//! exactly one POST per invocation, never retries, and leaves response
//! interpretation (and any fallback to the rule path) to the caller.

use crate::error::ComputeError;
use crate::types::BehavioralProfile;
use reqwest::{Client, Url};
use serde::Serialize;
use std::time::Duration;

/// Feature payload POSTed to the scoring endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreRequest {
    /// Average decision latency in milliseconds.
    pub latency: f64,
    /// Raw revision count.
    pub revisions: u64,
    /// Path efficiency rate (px/ms).
    pub efficiency: f64,
    /// Maximum velocity peak (px/ms).
    pub intensity: f64,
}

impl ScoreRequest {
    /// Extract the scoring features from a profile.
    pub fn from_profile(profile: &BehavioralProfile) -> Self {
        Self {
            latency: profile.avg_decision_latency,
            revisions: profile.revision_rate,
            efficiency: profile.path_efficiency,
            intensity: profile.intensity,
        }
    }
}

/// Configuration for the remote scorer.
#[derive(Debug, Clone)]
pub struct RemoteScorerConfig {
    /// Scoring endpoint URL.
    pub endpoint: String,
    /// Transport-layer timeout. The engine defines no deadline of its own;
    /// callers needing bounded latency set one here and treat expiry as a
    /// fall-back-to-rules condition.
    pub timeout: Option<Duration>,
}

impl RemoteScorerConfig {
    /// Create a configuration for the given endpoint, with no timeout.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: None,
        }
    }

    /// Set the transport timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Client for the external scoring service.
pub struct RemoteScorer {
    endpoint: Url,
    client: Client,
}

impl RemoteScorer {
    /// Build a scorer from a configuration. Fails if the endpoint is not a
    /// valid URL.
    pub fn new(config: RemoteScorerConfig) -> Result<Self, ComputeError> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|e| ComputeError::InvalidEndpoint(format!("{}: {}", config.endpoint, e)))?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { endpoint, client })
    }

    /// Score a profile remotely.
    ///
    /// Issues one `POST` with the JSON feature body and parses the response
    /// body as JSON. No fixed response schema is assumed; the caller decides
    /// how to extract trait weights from the returned value.
    pub async fn score(&self, profile: &BehavioralProfile) -> Result<serde_json::Value, ComputeError> {
        let body = ScoreRequest::from_profile(profile);

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await?;

        let value = response.json::<serde_json::Value>().await?;
        Ok(value)
    }
}
