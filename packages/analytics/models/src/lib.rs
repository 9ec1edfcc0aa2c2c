#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filter criteria, layer toggles and analytics snapshot types.
//!
//! Filter criteria are a small closed set of fields validated at the
//! boundary: a state restriction (or none) and an inclusive confidence
//! lower bound in `[0, 1]`. Visible layers are a display-time gate and
//! never influence filtering or aggregates.

use std::str::FromStr;

use minesight_mine_models::ZoneType;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

/// Confidence threshold applied when the dashboard starts.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.6;

/// Error returned for a confidence threshold outside `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidThresholdError {
    /// Value is NaN or outside `[0, 1]`.
    #[error("confidence threshold {value} is outside [0, 1]")]
    OutOfRange {
        /// The rejected value.
        value: f64,
    },

    /// Input string is not a number.
    #[error("confidence threshold '{input}' is not a number")]
    NotANumber {
        /// The rejected input.
        input: String,
    },
}

/// Inclusive lower bound on zone confidence.
///
/// A zone passes iff `zone.confidence >= threshold`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct ConfidenceThreshold(f64);

impl ConfidenceThreshold {
    /// Accepts everything.
    pub const MIN: Self = Self(0.0);

    /// Creates a threshold.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidThresholdError::OutOfRange`] if `value` is NaN or
    /// outside `[0, 1]`.
    pub fn new(value: f64) -> Result<Self, InvalidThresholdError> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidThresholdError::OutOfRange { value })
        }
    }

    /// The raw threshold value.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Whether a zone with `confidence` passes this threshold.
    #[must_use]
    pub fn passes(self, confidence: f64) -> bool {
        confidence >= self.0
    }
}

impl Default for ConfidenceThreshold {
    fn default() -> Self {
        Self(DEFAULT_CONFIDENCE_THRESHOLD)
    }
}

impl TryFrom<f64> for ConfidenceThreshold {
    type Error = InvalidThresholdError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ConfidenceThreshold> for f64 {
    fn from(value: ConfidenceThreshold) -> Self {
        value.0
    }
}

impl FromStr for ConfidenceThreshold {
    type Err = InvalidThresholdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s
            .trim()
            .parse()
            .map_err(|_| InvalidThresholdError::NotANumber {
                input: s.to_string(),
            })?;
        Self::new(value)
    }
}

impl std::fmt::Display for ConfidenceThreshold {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Optional exact-match restriction on state name.
///
/// `None` means every state passes. On the wire and in pickers the
/// unrestricted filter is spelled [`StateFilter::ALL_LABEL`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct StateFilter(Option<String>);

impl StateFilter {
    /// Picker label for "no state restriction".
    pub const ALL_LABEL: &'static str = "All";

    /// No restriction.
    #[must_use]
    pub const fn all() -> Self {
        Self(None)
    }

    /// Restrict to exactly `state`.
    #[must_use]
    pub fn only(state: impl Into<String>) -> Self {
        Self(Some(state.into()))
    }

    /// Parses picker input; [`Self::ALL_LABEL`] maps to no restriction.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        if input == Self::ALL_LABEL {
            Self::all()
        } else {
            Self::only(input)
        }
    }

    /// The restricted state, if any.
    #[must_use]
    pub fn state(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Whether this filter restricts nothing.
    #[must_use]
    pub const fn is_all(&self) -> bool {
        self.0.is_none()
    }

    /// Exact, case-sensitive match; always true when unrestricted.
    #[must_use]
    pub fn matches(&self, state: &str) -> bool {
        self.0.as_deref().is_none_or(|wanted| wanted == state)
    }
}

impl From<String> for StateFilter {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<StateFilter> for String {
    fn from(value: StateFilter) -> Self {
        value.0.unwrap_or_else(|| StateFilter::ALL_LABEL.to_string())
    }
}

impl std::fmt::Display for StateFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.state().unwrap_or(Self::ALL_LABEL))
    }
}

/// User-selected filter criteria.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    /// State restriction.
    pub state: StateFilter,
    /// Inclusive confidence lower bound.
    pub confidence: ConfidenceThreshold,
}

/// A partial change to [`FilterCriteria`]; unset fields keep their value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterUpdate {
    /// New state restriction.
    pub state: Option<StateFilter>,
    /// New confidence threshold.
    pub confidence: Option<ConfidenceThreshold>,
}

impl FilterCriteria {
    /// Merges `update` into these criteria.
    ///
    /// Returns `true` if anything actually changed.
    pub fn apply(&mut self, update: FilterUpdate) -> bool {
        let mut changed = false;
        if let Some(state) = update.state
            && state != self.state
        {
            self.state = state;
            changed = true;
        }
        if let Some(confidence) = update.confidence
            && confidence != self.confidence
        {
            self.confidence = confidence;
            changed = true;
        }
        changed
    }
}

/// A toggleable map layer.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "kebab-case")]
pub enum Layer {
    /// Known mine points.
    Existing,
    /// Predicted surface zones.
    PredictedSurface,
    /// Predicted underground zones.
    PredictedUnderground,
}

impl Layer {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Existing,
            Self::PredictedSurface,
            Self::PredictedUnderground,
        ]
    }

    /// The zone layer that renders zones of `zone_type`.
    #[must_use]
    pub const fn for_zone_type(zone_type: ZoneType) -> Self {
        match zone_type {
            ZoneType::Surface => Self::PredictedSurface,
            ZoneType::Underground => Self::PredictedUnderground,
        }
    }
}

/// Display-time layer visibility. Orthogonal to [`FilterCriteria`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibleLayers {
    /// Show known mines.
    pub existing: bool,
    /// Show predicted surface zones.
    pub predicted_surface: bool,
    /// Show predicted underground zones.
    pub predicted_underground: bool,
}

impl Default for VisibleLayers {
    fn default() -> Self {
        Self {
            existing: true,
            predicted_surface: true,
            predicted_underground: true,
        }
    }
}

impl VisibleLayers {
    /// Whether `layer` is shown.
    #[must_use]
    pub const fn is_visible(&self, layer: Layer) -> bool {
        match layer {
            Layer::Existing => self.existing,
            Layer::PredictedSurface => self.predicted_surface,
            Layer::PredictedUnderground => self.predicted_underground,
        }
    }

    /// Sets the visibility of `layer`.
    pub const fn set(&mut self, layer: Layer, visible: bool) {
        match layer {
            Layer::Existing => self.existing = visible,
            Layer::PredictedSurface => self.predicted_surface = visible,
            Layer::PredictedUnderground => self.predicted_underground = visible,
        }
    }

    /// Flips the visibility of `layer`.
    pub const fn toggle(&mut self, layer: Layer) {
        self.set(layer, !self.is_visible(layer));
    }

    /// Whether zones of `zone_type` are shown.
    #[must_use]
    pub const fn shows_zone_type(&self, zone_type: ZoneType) -> bool {
        self.is_visible(Layer::for_zone_type(zone_type))
    }

    /// Only the given layers visible.
    #[must_use]
    pub fn only(layers: &[Layer]) -> Self {
        let mut visible = Self {
            existing: false,
            predicted_surface: false,
            predicted_underground: false,
        };
        for layer in layers {
            visible.set(*layer, true);
        }
        visible
    }
}

/// How many predicted zones geographically contain a known mine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlapStatistics {
    /// Zones containing at least one known mine.
    pub zones_with_known_mines: usize,
    /// `100 * zones_with_known_mines / total_predicted_zones`, or 0 when
    /// there are no zones.
    pub percentage_overlap: f64,
}

/// One histogram bucket: a confidence value at hundredths granularity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceBucket {
    /// Bucket confidence, rounded to two decimals.
    pub confidence: f64,
    /// Zones falling in this bucket.
    pub count: usize,
}

/// Known vs. predicted counts for one state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateCount {
    /// State name as provided.
    pub state: String,
    /// Known mines in this state.
    pub known: usize,
    /// Predicted zones in this state.
    pub predicted: usize,
}

/// Global analytics over the full, unfiltered collections.
///
/// Recomputed per load, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSnapshot {
    /// Number of known mines.
    pub total_known_mines: usize,
    /// Number of predicted zones.
    pub total_predicted_zones: usize,
    /// Zone/mine overlap.
    pub overlap_statistics: OverlapStatistics,
    /// Mean `avg_thermal_anomaly` over all zones (°C), 0 when empty.
    pub avg_thermal_anomaly: f64,
    /// Zone counts per distinct confidence, ascending.
    pub confidence_histogram: Vec<ConfidenceBucket>,
    /// Per-state known/predicted counts in first-seen order.
    pub state_distribution: Vec<StateCount>,
    /// Predicted surface zones.
    pub surface_zones: usize,
    /// Predicted underground zones.
    pub underground_zones: usize,
    /// Summed zone area in square kilometres.
    pub total_area_sqkm: f64,
}
