#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Static coal-mine dataset and the provider interface the dashboard loads
//! from.
//!
//! The bundled fixtures hold every known operating mine and the reference
//! set of predicted zones. [`StaticDataset`] serves them through the async
//! [`GeoDataProvider`] trait with an optional artificial delay, so the
//! load pipeline behaves the same whether data comes from here or from a
//! remote service.

mod fixture;

use std::sync::Arc;
use std::time::Duration;

use minesight_analytics_models::AnalyticsSnapshot;
use minesight_mine_models::{InvalidFeatureError, MineCollection, ZoneCollection};
use thiserror::Error;

pub use fixture::{StaticDataset, fixture_latency_from_env};

/// Environment variable holding the artificial provider delay in
/// milliseconds.
pub const FIXTURE_LATENCY_ENV: &str = "MINESIGHT_FIXTURE_LATENCY_MS";

/// Delay applied when [`FIXTURE_LATENCY_ENV`] is unset.
pub const DEFAULT_FIXTURE_LATENCY: Duration = Duration::from_millis(500);

/// Errors raised while loading dataset content.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// Fixture JSON failed to decode.
    #[error("Failed to decode {fixture}: {source}")]
    Decode {
        /// Which fixture was being decoded.
        fixture: &'static str,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// A mine or predicted zone failed boundary validation.
    #[error("Invalid feature in fixture: {0}")]
    InvalidFeature(#[from] InvalidFeatureError),

    /// Provider could not produce data.
    #[error("Data provider unavailable: {message}")]
    Unavailable {
        /// What went wrong.
        message: String,
    },
}

/// Async source of the full mine and zone collections.
///
/// Every method returns the complete, unfiltered data set. Filtering is the
/// caller's job.
#[async_trait::async_trait]
pub trait GeoDataProvider: Send + Sync {
    /// All known mines.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if the collection cannot be produced.
    async fn existing_mines(&self) -> Result<Arc<MineCollection>, DatasetError>;

    /// All predicted zones.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if the collection cannot be produced.
    async fn predicted_zones(&self) -> Result<ZoneCollection, DatasetError>;

    /// Analytics snapshot over the full data set.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if the underlying collections cannot be
    /// produced.
    async fn analytics_summary(&self) -> Result<AnalyticsSnapshot, DatasetError>;

    /// Sorted distinct state names, prefixed with the "All" picker label.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if the underlying collections cannot be
    /// produced.
    async fn states(&self) -> Result<Vec<String>, DatasetError>;
}
