//! Bundled fixture data.

use std::sync::Arc;
use std::time::Duration;

use minesight_analytics::compute_snapshot;
use minesight_analytics::filter::state_options;
use minesight_analytics_models::AnalyticsSnapshot;
use minesight_mine_models::{MineCollection, ZoneCollection};

use crate::{DEFAULT_FIXTURE_LATENCY, DatasetError, FIXTURE_LATENCY_ENV, GeoDataProvider};

const EXISTING_MINES: &str = include_str!("../data/existing_mines.geojson");
const PREDICTED_ZONES: &str = include_str!("../data/predicted_zones.geojson");

/// In-memory dataset decoded from the bundled `GeoJSON` fixtures.
///
/// Cloning is cheap: both collections are shared.
#[derive(Debug, Clone)]
pub struct StaticDataset {
    mines: Arc<MineCollection>,
    zones: Arc<ZoneCollection>,
    latency: Duration,
}

impl StaticDataset {
    /// Decodes and validates the bundled fixtures.
    ///
    /// Latency is taken from the environment (see
    /// [`fixture_latency_from_env`]).
    ///
    /// # Errors
    ///
    /// * [`DatasetError::Decode`] if a fixture is not valid `GeoJSON` for
    ///   its collection type
    /// * [`DatasetError::InvalidFeature`] if any bundled mine or zone fails
    ///   validation
    pub fn load() -> Result<Self, DatasetError> {
        let mines: MineCollection =
            serde_json::from_str(EXISTING_MINES).map_err(|source| DatasetError::Decode {
                fixture: "existing_mines.geojson",
                source,
            })?;
        let zones: ZoneCollection =
            serde_json::from_str(PREDICTED_ZONES).map_err(|source| DatasetError::Decode {
                fixture: "predicted_zones.geojson",
                source,
            })?;

        for mine in &mines {
            mine.validate()?;
        }
        for zone in &zones {
            zone.validate()?;
        }

        log::debug!(
            "Loaded static dataset: {} mines, {} zones",
            mines.len(),
            zones.len()
        );

        Ok(Self::from_collections(mines, zones).with_latency(fixture_latency_from_env()))
    }

    /// Wraps already-built collections with no artificial latency.
    #[must_use]
    pub fn from_collections(mines: MineCollection, zones: ZoneCollection) -> Self {
        Self {
            mines: Arc::new(mines),
            zones: Arc::new(zones),
            latency: Duration::ZERO,
        }
    }

    /// Sets the delay applied before every provider call.
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// The configured provider delay.
    #[must_use]
    pub const fn latency(&self) -> Duration {
        self.latency
    }

    /// Shared handle to the mine collection.
    #[must_use]
    pub fn mines(&self) -> &Arc<MineCollection> {
        &self.mines
    }

    /// The zone collection.
    #[must_use]
    pub fn zones(&self) -> &ZoneCollection {
        &self.zones
    }

    async fn delay(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

/// Reads [`FIXTURE_LATENCY_ENV`], falling back to
/// [`DEFAULT_FIXTURE_LATENCY`] when unset or unparseable.
#[must_use]
pub fn fixture_latency_from_env() -> Duration {
    match std::env::var(FIXTURE_LATENCY_ENV) {
        Ok(value) => value.trim().parse::<u64>().map_or_else(
            |_| {
                log::warn!("Ignoring invalid {FIXTURE_LATENCY_ENV}={value:?}");
                DEFAULT_FIXTURE_LATENCY
            },
            Duration::from_millis,
        ),
        Err(_) => DEFAULT_FIXTURE_LATENCY,
    }
}

#[async_trait::async_trait]
impl GeoDataProvider for StaticDataset {
    async fn existing_mines(&self) -> Result<Arc<MineCollection>, DatasetError> {
        self.delay().await;
        Ok(Arc::clone(&self.mines))
    }

    async fn predicted_zones(&self) -> Result<ZoneCollection, DatasetError> {
        self.delay().await;
        Ok(self.zones.as_ref().clone())
    }

    async fn analytics_summary(&self) -> Result<AnalyticsSnapshot, DatasetError> {
        self.delay().await;
        Ok(compute_snapshot(&self.mines, &self.zones))
    }

    async fn states(&self) -> Result<Vec<String>, DatasetError> {
        self.delay().await;
        Ok(state_options(&self.mines, &self.zones))
    }
}
