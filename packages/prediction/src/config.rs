//! Backend connection settings.
//!
//! Defaults live in `config/backend.toml`, embedded at compile time.
//! Environment variables override individual values at runtime.

use std::time::Duration;

use minesight_server_models::PredictRequest;
use serde::Deserialize;

use crate::PredictionError;

const BACKEND_TOML: &str = include_str!("../config/backend.toml");

/// Overrides [`BackendConfig::api_url`].
pub const API_URL_ENV: &str = "MINESIGHT_API_URL";
/// Overrides [`BackendConfig::probe_timeout_ms`].
pub const PROBE_TIMEOUT_ENV: &str = "MINESIGHT_PROBE_TIMEOUT_MS";
/// Overrides [`BackendConfig::request_timeout_ms`].
pub const REQUEST_TIMEOUT_ENV: &str = "MINESIGHT_REQUEST_TIMEOUT_MS";

/// Where the prediction service lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BackendConfig {
    /// Base URL, without the `/api` suffix.
    pub api_url: String,
    /// Deadline for the health probe.
    pub probe_timeout_ms: u64,
    /// Deadline for model-info and prediction requests.
    pub request_timeout_ms: u64,
    /// Parameters sent with every live prediction request.
    pub predict: PredictSettings,
}

/// Body values for `POST /api/predict`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PredictSettings {
    /// Minimum confidence the service should return.
    pub confidence: f64,
    /// Maximum number of zones the service should return.
    pub num_predictions: usize,
}

impl BackendConfig {
    /// Embedded defaults with environment overrides applied.
    ///
    /// # Errors
    ///
    /// Returns [`PredictionError::Config`] if the embedded TOML is
    /// malformed.
    pub fn load() -> Result<Self, PredictionError> {
        let mut config = Self::from_toml_str(BACKEND_TOML)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parses a configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`PredictionError::Config`] if `input` is not a valid
    /// backend configuration.
    pub fn from_toml_str(input: &str) -> Result<Self, PredictionError> {
        toml::de::from_str(input).map_err(|e| PredictionError::Config {
            message: format!("Failed to parse backend config: {e}"),
        })
    }

    /// Replaces values for which `lookup` returns a usable override.
    ///
    /// Unparseable timeouts are logged and ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(API_URL_ENV)
            && !url.trim().is_empty()
        {
            self.api_url = url.trim().to_string();
        }
        if let Some(ms) = parse_millis(&lookup, PROBE_TIMEOUT_ENV) {
            self.probe_timeout_ms = ms;
        }
        if let Some(ms) = parse_millis(&lookup, REQUEST_TIMEOUT_ENV) {
            self.request_timeout_ms = ms;
        }
    }

    /// [`Self::probe_timeout_ms`] as a [`Duration`].
    #[must_use]
    pub const fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// [`Self::request_timeout_ms`] as a [`Duration`].
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// The request body for live predictions.
    #[must_use]
    pub const fn predict_request(&self) -> PredictRequest {
        PredictRequest::new(self.predict.confidence, self.predict.num_predictions)
    }

    /// Absolute URL for an API path such as `/api/health`.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.api_url.trim_end_matches('/'))
    }
}

fn parse_millis(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<u64> {
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(ms) => Some(ms),
        Err(e) => {
            log::warn!("Ignoring {key}={raw:?}: {e}");
            None
        }
    }
}
