#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Request and response types for the prediction service API.
//!
//! Shared by the HTTP client in `minesight_prediction` and the mock
//! backend in `minesight_server`. Field names are `snake_case` on the wire.
//!
//! Timestamps are informational. They are written as RFC 3339 and read
//! leniently (see [`parse_timestamp`]) so a backend clock format never
//! fails a whole response.

use chrono::{DateTime, NaiveDateTime, Utc};
use minesight_mine_models::ZoneCollection;
use serde::{Deserialize, Deserializer, Serialize};

/// Value of [`ApiHealth::status`] for a service ready to predict.
pub const HEALTHY: &str = "healthy";

/// Confidence threshold used when a prediction request omits one.
pub const DEFAULT_PREDICT_CONFIDENCE: f64 = 0.5;

/// Result count used when a prediction request omits one.
pub const DEFAULT_NUM_PREDICTIONS: usize = 50;

/// Parses a service timestamp.
///
/// Accepts RFC 3339 and offset-less ISO 8601 (`2025-11-01T10:30:00.123456`,
/// taken as UTC). Anything else yields `None`.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| raw.parse::<NaiveDateTime>().ok().map(|dt| dt.and_utc()))
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

/// Response body of `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiHealth {
    /// `"healthy"` when the model is ready.
    pub status: String,
    /// Model name.
    #[serde(default)]
    pub model: Option<String>,
    /// Model version.
    #[serde(default)]
    pub version: Option<String>,
    /// Server time of the check, if it could be read.
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ApiHealth {
    /// Whether the service reports itself ready.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.status == HEALTHY
    }
}

/// Response body of `GET /api/model/info`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelInfo {
    /// Model name.
    pub model_name: String,
    /// Network architecture description.
    pub architecture: String,
    /// Spectral bands per input patch.
    pub input_bands: u32,
    /// Input patch edge length in pixels.
    pub patch_size: u32,
    /// Inference device (`"cpu"`, `"cuda"`).
    pub device: String,
    /// Training data description.
    pub trained_on: String,
    /// Reported accuracy, formatted by the service (e.g. `"94.2%"`).
    pub accuracy: String,
    /// Model readiness (`"ready"` when loaded).
    pub status: String,
}

/// Request body of `POST /api/predict`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictRequest {
    /// Minimum zone confidence to return.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// Maximum number of zones to return.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_predictions: Option<usize>,
}

impl PredictRequest {
    /// A request with both fields set.
    #[must_use]
    pub const fn new(confidence: f64, num_predictions: usize) -> Self {
        Self {
            confidence: Some(confidence),
            num_predictions: Some(num_predictions),
        }
    }

    /// The requested threshold, or [`DEFAULT_PREDICT_CONFIDENCE`].
    #[must_use]
    pub fn confidence_or_default(&self) -> f64 {
        self.confidence.unwrap_or(DEFAULT_PREDICT_CONFIDENCE)
    }

    /// The requested count, or [`DEFAULT_NUM_PREDICTIONS`].
    #[must_use]
    pub fn num_predictions_or_default(&self) -> usize {
        self.num_predictions.unwrap_or(DEFAULT_NUM_PREDICTIONS)
    }

    /// Copy with every omitted field filled in from the defaults.
    #[must_use]
    pub fn with_defaults(self) -> Self {
        Self::new(
            self.confidence_or_default(),
            self.num_predictions_or_default(),
        )
    }
}

/// Provenance attached to a prediction response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionMetadata {
    /// Number of zones in the response.
    pub total_predictions: usize,
    /// Threshold the service applied.
    pub confidence_threshold: f64,
    /// Version of the model that produced the zones.
    pub model_version: String,
    /// Server time of the prediction, if it could be read.
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Response body of `POST /api/predict`: a zone `FeatureCollection` with
/// extra metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    /// Predicted zones, flattened into the top-level object.
    #[serde(flatten)]
    pub zones: ZoneCollection,
    /// Provenance, absent from older services.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<PredictionMetadata>,
}

/// Response body of `GET /api/states`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatesResponse {
    /// Sorted distinct state names.
    pub states: Vec<String>,
}

/// Error body returned by the service on a failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable reason.
    pub error: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn health_without_optional_fields() {
        let health: ApiHealth = serde_json::from_value(json!({"status": "degraded"})).unwrap();
        assert!(!health.is_healthy());
        assert_eq!(health.model, None);
    }

    #[test]
    fn health_parses_timestamp() {
        let health: ApiHealth = serde_json::from_value(json!({
            "status": "healthy",
            "model": "MineSight-AI",
            "version": "1.0.0",
            "timestamp": "2025-01-15T10:30:00Z"
        }))
        .unwrap();
        assert!(health.is_healthy());
        assert!(health.timestamp.is_some());
    }

    #[test]
    fn health_accepts_naive_isoformat_timestamp() {
        let health: ApiHealth = serde_json::from_str(
            r#"{"status":"healthy","model":"MineSight-AI","version":"1.0.0","timestamp":"2025-11-01T10:30:00.123456"}"#,
        )
        .unwrap();
        assert!(health.is_healthy());
        assert_eq!(
            health.timestamp.map(|t| t.to_rfc3339()),
            Some("2025-11-01T10:30:00.123456+00:00".to_string())
        );
    }

    #[test]
    fn unreadable_timestamp_does_not_fail_health() {
        let health: ApiHealth = serde_json::from_value(json!({
            "status": "healthy",
            "timestamp": "yesterday"
        }))
        .unwrap();
        assert!(health.is_healthy());
        assert_eq!(health.timestamp, None);

        let health: ApiHealth =
            serde_json::from_value(json!({"status": "healthy", "timestamp": null})).unwrap();
        assert_eq!(health.timestamp, None);
    }

    #[test]
    fn parse_timestamp_formats() {
        assert!(parse_timestamp("2025-01-15T10:30:00Z").is_some());
        assert!(parse_timestamp("2025-01-15T16:00:00+05:30").is_some());
        assert!(parse_timestamp("2025-11-01T10:30:00").is_some());
        assert!(parse_timestamp("2025-11-01T10:30:00.123456").is_some());
        assert_eq!(parse_timestamp("not a time"), None);
    }

    #[test]
    fn predict_response_accepts_flask_body() {
        let body = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[86.01, 23.52], [86.09, 23.47], [85.97, 23.44], [85.95, 23.55], [86.04, 23.58], [86.01, 23.52]]]
                },
                "properties": {
                    "id": "pred_4821",
                    "type": "underground",
                    "confidence": 0.87,
                    "state": "Jharkhand",
                    "district": "Bokaro",
                    "area_sqkm": 31.4,
                    "avg_thermal_anomaly": 27.66
                }
            }],
            "metadata": {
                "total_predictions": 1,
                "confidence_threshold": 0.5,
                "model_version": "v1.0.0",
                "timestamp": "2025-11-01T10:30:00.123456"
            }
        }"#;
        let response: PredictResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.zones.len(), 1);
        let metadata = response.metadata.unwrap();
        assert_eq!(metadata.total_predictions, 1);
        assert!(metadata.timestamp.is_some());
    }

    #[test]
    fn predict_request_defaults() {
        let request: PredictRequest = serde_json::from_value(json!({})).unwrap();
        assert!((request.confidence_or_default() - 0.5).abs() < f64::EPSILON);
        assert_eq!(request.num_predictions_or_default(), 50);

        let filled = request.with_defaults();
        assert_eq!(
            serde_json::to_value(filled).unwrap(),
            json!({"confidence": 0.5, "num_predictions": 50})
        );
    }

    #[test]
    fn predict_response_flattens_collection() {
        let response: PredictResponse = serde_json::from_value(json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[84.0, 23.0], [84.2, 23.0], [84.2, 23.2], [84.0, 23.0]]]
                },
                "properties": {
                    "id": "pred_1",
                    "type": "surface",
                    "confidence": 0.8,
                    "state": "Jharkhand",
                    "district": "Palamu",
                    "area_sqkm": 12.5,
                    "avg_thermal_anomaly": 1.1
                }
            }],
            "metadata": {
                "total_predictions": 1,
                "confidence_threshold": 0.5,
                "model_version": "v1.0.0",
                "timestamp": "2025-01-15T10:30:00Z"
            }
        }))
        .unwrap();

        assert_eq!(response.zones.len(), 1);
        assert_eq!(response.metadata.map(|m| m.total_predictions), Some(1));
    }

    #[test]
    fn predict_response_metadata_is_optional() {
        let response: PredictResponse =
            serde_json::from_value(json!({"type": "FeatureCollection", "features": []})).unwrap();
        assert!(response.zones.is_empty());
        assert!(response.metadata.is_none());
    }

    #[test]
    fn model_info_tolerates_missing_fields() {
        let info: ModelInfo =
            serde_json::from_value(json!({"model_name": "MineSight-AI", "input_bands": 16}))
                .unwrap();
        assert_eq!(info.model_name, "MineSight-AI");
        assert_eq!(info.input_bands, 16);
        assert!(info.device.is_empty());
    }
}
