#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Prediction service client and live/static data source selection.
//!
//! [`DataSourceSelector`] probes the prediction service once per session
//! and decides where predicted zones come from for each load cycle. A
//! healthy service unlocks live predictions; anything else (non-2xx
//! health, unexpected status, timeout, connection refused) falls back to
//! the bundled static dataset without surfacing an error.

pub mod client;
pub mod config;
pub mod selector;

use thiserror::Error;

pub use client::{HttpPredictionClient, PredictionClient};
pub use config::BackendConfig;
pub use selector::{ConnectionState, DataSource, DataSourceSelector, ZoneLoad};

/// Errors that can occur talking to the prediction service.
#[derive(Debug, Error)]
pub enum PredictionError {
    /// Transport-level failure, including request timeouts.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status code.
    #[error("Prediction service returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The response body was not valid JSON for the expected shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The response decoded but contained invalid zones.
    #[error("Malformed prediction payload: {message}")]
    Malformed {
        /// What was wrong with the payload.
        message: String,
    },

    /// Live predictions were requested while the service is not connected.
    #[error("Prediction service is not connected (state: {state})")]
    NotConnected {
        /// The selector's state at the time of the request.
        state: ConnectionState,
    },

    /// Backend configuration could not be parsed.
    #[error("Configuration error: {message}")]
    Config {
        /// Description.
        message: String,
    },
}
