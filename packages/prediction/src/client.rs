//! Prediction service client.

use minesight_mine_models::ZoneCollection;
use minesight_server_models::{ApiHealth, ModelInfo, PredictRequest, PredictResponse};

use crate::{BackendConfig, PredictionError};

/// Operations the prediction service offers.
#[async_trait::async_trait]
pub trait PredictionClient: Send + Sync {
    /// `GET /api/health`.
    ///
    /// # Errors
    ///
    /// Returns [`PredictionError`] on transport failure, non-2xx status or
    /// an undecodable body.
    async fn health(&self) -> Result<ApiHealth, PredictionError>;

    /// `GET /api/model/info`.
    ///
    /// # Errors
    ///
    /// Returns [`PredictionError`] on transport failure, non-2xx status or
    /// an undecodable body.
    async fn model_info(&self) -> Result<ModelInfo, PredictionError>;

    /// `POST /api/predict`.
    ///
    /// Omitted request fields are filled from the service defaults before
    /// sending. Every returned zone has passed boundary validation.
    ///
    /// # Errors
    ///
    /// Returns [`PredictionError`] on transport failure, non-2xx status,
    /// an undecodable body, or any invalid zone in the payload.
    async fn predict(&self, request: PredictRequest) -> Result<ZoneCollection, PredictionError>;
}

/// [`PredictionClient`] over HTTP.
pub struct HttpPredictionClient {
    config: BackendConfig,
    client: reqwest::Client,
}

impl HttpPredictionClient {
    /// Creates a client for the service described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`PredictionError::Http`] if the HTTP client cannot be
    /// constructed.
    pub fn new(config: BackendConfig) -> Result<Self, PredictionError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self { config, client })
    }

    /// The settings this client was built with.
    #[must_use]
    pub const fn config(&self) -> &BackendConfig {
        &self.config
    }

    async fn read_body(resp: reqwest::Response) -> Result<String, PredictionError> {
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(PredictionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }
}

#[async_trait::async_trait]
impl PredictionClient for HttpPredictionClient {
    async fn health(&self) -> Result<ApiHealth, PredictionError> {
        let resp = self
            .client
            .get(self.config.endpoint("/api/health"))
            .timeout(self.config.probe_timeout())
            .send()
            .await?;
        let body = Self::read_body(resp).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn model_info(&self) -> Result<ModelInfo, PredictionError> {
        let resp = self
            .client
            .get(self.config.endpoint("/api/model/info"))
            .send()
            .await?;
        let body = Self::read_body(resp).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn predict(&self, request: PredictRequest) -> Result<ZoneCollection, PredictionError> {
        let request = request.with_defaults();
        log::info!(
            "Requesting up to {} predictions at confidence >= {}",
            request.num_predictions_or_default(),
            request.confidence_or_default(),
        );

        let resp = self
            .client
            .post(self.config.endpoint("/api/predict"))
            .json(&request)
            .send()
            .await?;
        let body = Self::read_body(resp).await?;
        let response: PredictResponse = serde_json::from_str(&body)?;

        let zones = validate_zones(response.zones)?;
        log::info!("Received {} predictions from model", zones.len());
        Ok(zones)
    }
}

/// Rejects a payload containing any zone that fails validation.
///
/// # Errors
///
/// Returns [`PredictionError::Malformed`] naming the first invalid zone.
pub fn validate_zones(zones: ZoneCollection) -> Result<ZoneCollection, PredictionError> {
    for zone in &zones {
        zone.validate().map_err(|e| PredictionError::Malformed {
            message: e.to_string(),
        })?;
    }
    Ok(zones)
}

#[cfg(test)]
mod tests {
    use minesight_mine_models::{Feature, ZoneProperties, ZoneType, polygon};

    use super::*;

    fn zone(id: &str, confidence: f64) -> minesight_mine_models::PredictedZone {
        Feature::new(
            polygon(vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]),
            ZoneProperties {
                id: id.to_string(),
                zone_type: ZoneType::Surface,
                confidence,
                state: "Odisha".to_string(),
                district: "Angul".to_string(),
                area_sqkm: 5.0,
                avg_thermal_anomaly: 1.0,
            },
        )
    }

    #[test]
    fn valid_payload_passes_through() {
        let zones: ZoneCollection = vec![zone("a", 0.7), zone("b", 0.9)].into_iter().collect();
        let validated = validate_zones(zones.clone()).unwrap();
        assert_eq!(validated, zones);
    }

    #[test]
    fn out_of_range_confidence_is_malformed() {
        let zones: ZoneCollection = vec![zone("a", 0.7), zone("bad", 1.4)].into_iter().collect();
        let err = validate_zones(zones).unwrap_err();
        match err {
            PredictionError::Malformed { message } => assert!(message.contains("bad")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn client_builds_from_embedded_config() {
        let config = BackendConfig::from_toml_str(
            "api_url = \"http://127.0.0.1:9\"\nprobe_timeout_ms = 10\nrequest_timeout_ms = 10\n\
             [predict]\nconfidence = 0.5\nnum_predictions = 50\n",
        )
        .unwrap();
        let client = HttpPredictionClient::new(config).unwrap();
        assert_eq!(client.config().probe_timeout_ms, 10);
    }
}
