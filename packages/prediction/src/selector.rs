//! Live/static data source selection.
//!
//! ```text
//! Unchecked --probe()--> Checking --healthy--> Connected
//!                                 \--else----> Unavailable
//! ```
//!
//! The probe runs once per session. Its outcome decides, for every later
//! load cycle, whether zones are requested from the prediction service or
//! read from the static fallback provider.

use std::time::Duration;

use minesight_dataset::{DatasetError, GeoDataProvider};
use minesight_mine_models::ZoneCollection;
use minesight_server_models::{ModelInfo, PredictRequest};
use serde::Serialize;
use strum_macros::{AsRefStr, Display};

use crate::{BackendConfig, HttpPredictionClient, PredictionClient, PredictionError};

/// Prediction service reachability as last observed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ConnectionState {
    /// No probe has run yet.
    #[default]
    Unchecked,
    /// A probe is in progress.
    Checking,
    /// The last probe reported a healthy service.
    Connected,
    /// The last probe failed, timed out, or reported an unhealthy service.
    Unavailable,
}

/// Where a load cycle's predicted zones came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DataSource {
    /// The prediction service.
    Live,
    /// The bundled fallback dataset.
    Static,
}

impl DataSource {
    /// Whether zones came from the prediction service.
    #[must_use]
    pub const fn is_live(self) -> bool {
        matches!(self, Self::Live)
    }
}

/// Zones for one load cycle, tagged with their source.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneLoad {
    /// The full zone collection for the cycle.
    pub zones: ZoneCollection,
    /// Live when the prediction service answered, static otherwise.
    pub source: DataSource,
}

/// Decides per load cycle whether zones come from the live service or the
/// static fallback.
pub struct DataSourceSelector {
    client: Box<dyn PredictionClient>,
    state: ConnectionState,
    model_info: Option<ModelInfo>,
    probe_timeout: Duration,
    request: PredictRequest,
}

impl DataSourceSelector {
    /// Creates a selector in the [`ConnectionState::Unchecked`] state.
    #[must_use]
    pub fn new(client: Box<dyn PredictionClient>, probe_timeout: Duration) -> Self {
        Self {
            client,
            state: ConnectionState::Unchecked,
            model_info: None,
            probe_timeout,
            request: PredictRequest::default().with_defaults(),
        }
    }

    /// Creates a selector backed by [`HttpPredictionClient`].
    ///
    /// # Errors
    ///
    /// Returns [`PredictionError::Http`] if the HTTP client cannot be
    /// constructed.
    pub fn from_config(config: &BackendConfig) -> Result<Self, PredictionError> {
        let client = HttpPredictionClient::new(config.clone())?;
        Ok(Self::new(Box::new(client), config.probe_timeout())
            .with_request(config.predict_request()))
    }

    /// Sets the body sent with live prediction requests.
    #[must_use]
    pub const fn with_request(mut self, request: PredictRequest) -> Self {
        self.request = request;
        self
    }

    /// Current connection state.
    #[must_use]
    pub const fn state(&self) -> ConnectionState {
        self.state
    }

    /// Whether the last probe reported a healthy service.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Model metadata fetched after a successful probe, if available.
    #[must_use]
    pub const fn model_info(&self) -> Option<&ModelInfo> {
        self.model_info.as_ref()
    }

    /// The body sent with live prediction requests.
    #[must_use]
    pub const fn request(&self) -> PredictRequest {
        self.request
    }

    /// Probes the service and records the outcome.
    ///
    /// Never fails: every error, including exceeding the probe timeout,
    /// resolves to [`ConnectionState::Unavailable`]. On success, model info
    /// is fetched best-effort; its failure leaves [`Self::model_info`]
    /// empty without affecting the connection state.
    pub async fn probe(&mut self) -> ConnectionState {
        self.state = ConnectionState::Checking;
        self.model_info = None;
        log::debug!("Probing prediction service health");

        let outcome = tokio::time::timeout(self.probe_timeout, self.client.health()).await;

        self.state = match outcome {
            Ok(Ok(health)) if health.is_healthy() => {
                log::info!(
                    "Prediction service healthy (model: {})",
                    health.model.as_deref().unwrap_or("unknown"),
                );
                ConnectionState::Connected
            }
            Ok(Ok(health)) => {
                log::warn!(
                    "Prediction service reported status {:?}, using static data",
                    health.status
                );
                ConnectionState::Unavailable
            }
            Ok(Err(e)) => {
                log::warn!("Prediction service unavailable, using static data: {e}");
                ConnectionState::Unavailable
            }
            Err(_) => {
                log::warn!(
                    "Prediction service health probe timed out after {}ms, using static data",
                    self.probe_timeout.as_millis()
                );
                ConnectionState::Unavailable
            }
        };

        if self.state == ConnectionState::Connected {
            match self.client.model_info().await {
                Ok(info) => self.model_info = Some(info),
                Err(e) => log::warn!("Failed to fetch model info: {e}"),
            }
        }

        self.state
    }

    /// Produces the zones for one load cycle.
    ///
    /// When connected, requests live predictions and falls back to
    /// `fallback` if that request fails for any reason. Otherwise reads
    /// `fallback` directly without contacting the service.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] only if the fallback provider fails.
    pub async fn load_zones(
        &self,
        fallback: &dyn GeoDataProvider,
    ) -> Result<ZoneLoad, DatasetError> {
        if self.is_connected() {
            match self.client.predict(self.request).await {
                Ok(zones) => {
                    return Ok(ZoneLoad {
                        zones,
                        source: DataSource::Live,
                    });
                }
                Err(e) => {
                    log::warn!("Live prediction failed, falling back to static zones: {e}");
                }
            }
        }

        Ok(ZoneLoad {
            zones: fallback.predicted_zones().await?,
            source: DataSource::Static,
        })
    }

    /// Requests a fresh set of live predictions.
    ///
    /// # Errors
    ///
    /// * [`PredictionError::NotConnected`] unless the last probe succeeded
    /// * any error from the prediction request itself
    pub async fn refresh(&self) -> Result<ZoneCollection, PredictionError> {
        if !self.is_connected() {
            return Err(PredictionError::NotConnected { state: self.state });
        }
        self.client.predict(self.request).await
    }
}
