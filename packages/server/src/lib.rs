#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Mock prediction service for the MineSight dashboard.
//!
//! Serves the same HTTP contract as the real model backend, answering
//! from the bundled static dataset. Predictions are deterministic: the
//! static zone set filtered by the requested confidence and truncated to
//! the requested count.

mod handlers;

use std::time::Duration;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use minesight_dataset::{DatasetError, StaticDataset};
use minesight_server_models::ModelInfo;

/// Model name reported by the health and model-info endpoints.
pub const MODEL_NAME: &str = "MineSight-AI";

/// Model version stamped on prediction metadata.
pub const MODEL_VERSION: &str = "v1.0.0";

/// Shared application state.
pub struct AppState {
    /// Source of every response.
    pub dataset: StaticDataset,
    /// Returned verbatim by `GET /api/model/info`.
    pub model: ModelInfo,
}

impl AppState {
    /// Loads the bundled dataset with no artificial latency.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if the bundled fixtures fail to decode.
    pub fn load() -> Result<Self, DatasetError> {
        Ok(Self::new(StaticDataset::load()?.with_latency(Duration::ZERO)))
    }

    /// Wraps an existing dataset.
    #[must_use]
    pub fn new(dataset: StaticDataset) -> Self {
        Self {
            dataset,
            model: default_model_info(),
        }
    }
}

/// Metadata of the simulated segmentation model.
#[must_use]
pub fn default_model_info() -> ModelInfo {
    ModelInfo {
        model_name: MODEL_NAME.to_string(),
        architecture: "U-Net with EfficientNet encoder".to_string(),
        input_bands: 16,
        patch_size: 320,
        device: "cpu".to_string(),
        trained_on: "18-band satellite imagery".to_string(),
        accuracy: "94.2%".to_string(),
        status: "ready".to_string(),
    }
}

/// Where the server listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Interface to bind.
    pub bind_addr: String,
    /// TCP port.
    pub port: u16,
}

impl ServerConfig {
    /// Reads `BIND_ADDR` (default `127.0.0.1`) and `PORT` (default `5001`).
    #[must_use]
    pub fn from_env() -> Self {
        let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(5001);
        Self { bind_addr, port }
    }
}

/// Registers every `/api` route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/model/info", web::get().to(handlers::model_info))
            .route("/predict", web::post().to(handlers::predict))
            .route("/analytics", web::get().to(handlers::analytics))
            .route("/states", web::get().to(handlers::states)),
    );
}

/// Starts the mock prediction service.
///
/// Does not install a logger; the caller decides how logging is set up.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the dataset fails to load, the
/// server fails to bind, or it encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> std::io::Result<()> {
    log::info!("Loading static dataset...");
    let state = web::Data::new(AppState::load().map_err(std::io::Error::other)?);
    log::info!(
        "Serving {} mines and {} zones",
        state.dataset.mines().len(),
        state.dataset.zones().len()
    );

    let ServerConfig { bind_addr, port } = config;
    log::info!("Starting prediction service on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
