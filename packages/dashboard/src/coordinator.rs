//! The view coordinator and its load pipeline.

use std::sync::Arc;

use minesight_analytics::filter::{state_options, visible_mines, visible_zones};
use minesight_analytics::{compute_snapshot, filter_mines, filter_zones};
use minesight_analytics_models::{
    AnalyticsSnapshot, ConfidenceThreshold, FilterCriteria, FilterUpdate, Layer, StateFilter,
    VisibleLayers,
};
use minesight_dataset::GeoDataProvider;
use minesight_mine_models::{ExistingMine, MineCollection, PredictedZone, ZoneCollection};
use minesight_prediction::{ConnectionState, DataSource, DataSourceSelector};
use minesight_server_models::ModelInfo;
use tokio::sync::watch;

use crate::{DashboardError, ReportData};

/// Owns all view state and recomputes derived data when inputs change.
///
/// Loading takes `&mut self`, so at most one load is in flight per
/// coordinator. Renderers that need to show progress while that borrow is
/// held subscribe through [`Self::loading_updates`].
pub struct ViewCoordinator {
    provider: Arc<dyn GeoDataProvider>,
    selector: DataSourceSelector,
    loading: watch::Sender<bool>,
    error: Option<String>,
    criteria: FilterCriteria,
    layers: VisibleLayers,
    mines: Arc<MineCollection>,
    zones: Arc<ZoneCollection>,
    filtered_mines: Arc<MineCollection>,
    filtered_zones: ZoneCollection,
    snapshot: AnalyticsSnapshot,
    state_options: Vec<String>,
    source: DataSource,
    loaded: bool,
}

impl ViewCoordinator {
    /// Creates an empty coordinator with default filters and every layer
    /// visible. Nothing is fetched until [`Self::load`].
    #[must_use]
    pub fn new(provider: Arc<dyn GeoDataProvider>, selector: DataSourceSelector) -> Self {
        Self {
            provider,
            selector,
            loading: watch::Sender::new(false),
            error: None,
            criteria: FilterCriteria::default(),
            layers: VisibleLayers::default(),
            mines: Arc::new(MineCollection::default()),
            zones: Arc::new(ZoneCollection::default()),
            filtered_mines: Arc::new(MineCollection::default()),
            filtered_zones: ZoneCollection::default(),
            snapshot: AnalyticsSnapshot::default(),
            state_options: vec![StateFilter::ALL_LABEL.to_string()],
            source: DataSource::Static,
            loaded: false,
        }
    }

    /// Starts from `criteria` instead of the defaults.
    #[must_use]
    pub fn with_criteria(mut self, criteria: FilterCriteria) -> Self {
        self.criteria = criteria;
        self
    }

    /// Starts from `layers` instead of all-visible.
    #[must_use]
    pub const fn with_layers(mut self, layers: VisibleLayers) -> Self {
        self.layers = layers;
        self
    }

    /// Runs one full load cycle.
    ///
    /// Probes the prediction service if it has not been probed yet, then
    /// fetches mines and zones concurrently. The new data replaces the old
    /// only if every fetch succeeds. On failure the previous data stays in
    /// place and [`Self::error`] holds a message for the user.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Load`] if a required collection cannot be
    /// fetched.
    pub async fn load(&mut self) -> Result<(), DashboardError> {
        self.loading.send_replace(true);
        self.error = None;

        if self.selector.state() == ConnectionState::Unchecked {
            self.selector.probe().await;
        }

        let (mines, zones) = tokio::join!(
            self.provider.existing_mines(),
            self.selector.load_zones(self.provider.as_ref()),
        );

        self.loading.send_replace(false);

        let result = mines.and_then(|mines| zones.map(|zones| (mines, zones)));
        match result {
            Ok((mines, load)) => {
                log::info!(
                    "Loaded {} mines and {} {} zones",
                    mines.len(),
                    load.zones.len(),
                    load.source,
                );
                self.publish(mines, load.zones, load.source);
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load dashboard data: {e}");
                let err = DashboardError::from(e);
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Probes the prediction service again without reloading.
    ///
    /// The next [`Self::load`] uses the new outcome.
    pub async fn recheck_backend(&mut self) -> ConnectionState {
        self.selector.probe().await
    }

    /// Replaces the zone set with fresh live predictions.
    ///
    /// Loading and error state are left untouched whether or not this
    /// succeeds.
    ///
    /// # Errors
    ///
    /// * [`DashboardError::RefreshRejected`] if the prediction service is
    ///   not connected
    /// * [`DashboardError::Refresh`] if the live request fails
    pub async fn refresh_predictions(&mut self) -> Result<usize, DashboardError> {
        let zones = self.selector.refresh().await.map_err(|e| {
            log::warn!("Prediction refresh failed: {e}");
            DashboardError::from(e)
        })?;

        let count = zones.len();
        let mines = Arc::clone(&self.mines);
        self.publish(mines, zones, DataSource::Live);
        Ok(count)
    }

    /// Merges `update` into the filter criteria.
    ///
    /// Returns `false`, and recomputes nothing, when the criteria are
    /// unchanged.
    pub fn update_filters(&mut self, update: FilterUpdate) -> bool {
        if !self.criteria.apply(update) {
            return false;
        }
        log::debug!(
            "Filters changed: state={} confidence>={}",
            self.criteria.state,
            self.criteria.confidence
        );
        self.recompute_filtered();
        true
    }

    /// Sets the state restriction.
    pub fn set_state(&mut self, state: StateFilter) -> bool {
        self.update_filters(FilterUpdate {
            state: Some(state),
            confidence: None,
        })
    }

    /// Sets the confidence threshold.
    pub fn set_confidence(&mut self, confidence: ConfidenceThreshold) -> bool {
        self.update_filters(FilterUpdate {
            state: None,
            confidence: Some(confidence),
        })
    }

    /// Flips one map layer and returns its new visibility.
    pub const fn toggle_layer(&mut self, layer: Layer) -> bool {
        self.layers.toggle(layer);
        self.layers.is_visible(layer)
    }

    fn publish(&mut self, mines: Arc<MineCollection>, zones: ZoneCollection, source: DataSource) {
        self.snapshot = compute_snapshot(&mines, &zones);
        self.state_options = state_options(&mines, &zones);
        self.mines = mines;
        self.zones = Arc::new(zones);
        self.source = source;
        self.loaded = true;
        self.recompute_filtered();
    }

    fn recompute_filtered(&mut self) {
        self.filtered_mines = filter_mines(&self.mines, &self.criteria.state);
        self.filtered_zones = filter_zones(
            &self.zones,
            &self.criteria.state,
            self.criteria.confidence,
        );
    }

    /// Whether a load cycle is in progress.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        *self.loading.borrow()
    }

    /// A receiver that observes the loading flag, including while
    /// [`Self::load`] holds the coordinator.
    #[must_use]
    pub fn loading_updates(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    /// Whether at least one load has completed successfully.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// User-visible message from the last failed load.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Current filter criteria.
    #[must_use]
    pub const fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Current layer visibility.
    #[must_use]
    pub const fn layers(&self) -> &VisibleLayers {
        &self.layers
    }

    /// Full, unfiltered mine collection.
    #[must_use]
    pub const fn mines(&self) -> &Arc<MineCollection> {
        &self.mines
    }

    /// Full, unfiltered zone collection.
    #[must_use]
    pub const fn zones(&self) -> &Arc<ZoneCollection> {
        &self.zones
    }

    /// Mines matching the state filter.
    #[must_use]
    pub const fn filtered_mines(&self) -> &Arc<MineCollection> {
        &self.filtered_mines
    }

    /// Zones matching the state filter and confidence threshold.
    #[must_use]
    pub const fn filtered_zones(&self) -> &ZoneCollection {
        &self.filtered_zones
    }

    /// Number of [`Self::filtered_mines`].
    #[must_use]
    pub fn filtered_mine_count(&self) -> usize {
        self.filtered_mines.len()
    }

    /// Number of [`Self::filtered_zones`].
    #[must_use]
    pub fn filtered_zone_count(&self) -> usize {
        self.filtered_zones.len()
    }

    /// Filtered mines to draw on the map, after layer gating.
    #[must_use]
    pub fn visible_mines(&self) -> &[ExistingMine] {
        visible_mines(&self.filtered_mines, &self.layers)
    }

    /// Filtered zones to draw on the map, after layer gating.
    #[must_use]
    pub fn visible_zones(&self) -> Vec<&PredictedZone> {
        visible_zones(&self.filtered_zones, &self.layers)
    }

    /// Global analytics over the full collections.
    #[must_use]
    pub const fn snapshot(&self) -> &AnalyticsSnapshot {
        &self.snapshot
    }

    /// State picker entries, `"All"` first.
    #[must_use]
    pub fn state_options(&self) -> &[String] {
        &self.state_options
    }

    /// Where the current zones came from.
    #[must_use]
    pub const fn source(&self) -> DataSource {
        self.source
    }

    /// Whether the current zones are live predictions.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.source.is_live()
    }

    /// Prediction service reachability as last probed.
    #[must_use]
    pub const fn connection_state(&self) -> ConnectionState {
        self.selector.state()
    }

    /// Model metadata from the last successful probe.
    #[must_use]
    pub const fn model_info(&self) -> Option<&ModelInfo> {
        self.selector.model_info()
    }

    /// Data for the report exporter, with the `top_zones` highest-confidence
    /// zones tabulated.
    #[must_use]
    pub fn report(&self, top_zones: usize) -> ReportData {
        ReportData::build(
            Arc::clone(&self.mines),
            Arc::clone(&self.zones),
            self.snapshot.clone(),
            self.source,
            top_zones,
        )
    }
}
