//! Data handed to the report exporter.
//!
//! The exporter lays out pages; this module only guarantees that what it
//! receives is consistent: the same full collections the snapshot was
//! computed from, plus a few pre-derived tables.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use minesight_analytics_models::AnalyticsSnapshot;
use minesight_mine_models::{MineCollection, PredictedZone, ZoneCollection, ZoneType};
use minesight_prediction::DataSource;
use serde::Serialize;

/// A `Metric | Value` line of the summary table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    /// Metric label.
    pub metric: String,
    /// Formatted value, with units.
    pub value: String,
}

/// A row of the per-state table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateRow {
    /// State name.
    pub state: String,
    /// Known mines in the state.
    pub known: usize,
    /// Predicted zones in the state.
    pub predicted: usize,
    /// `known + predicted`.
    pub total: usize,
}

/// A row of the top-zones table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneRow {
    /// 1-based position in the table.
    pub rank: usize,
    /// Zone identifier.
    pub id: String,
    /// Surface or underground.
    pub zone_type: ZoneType,
    /// State the zone lies in.
    pub state: String,
    /// District the zone lies in.
    pub district: String,
    /// Model confidence.
    pub confidence: f64,
    /// Area in square kilometres.
    pub area_sqkm: f64,
    /// Mean thermal anomaly in °C.
    pub avg_thermal_anomaly: f64,
}

impl ZoneRow {
    fn new(rank: usize, zone: &PredictedZone) -> Self {
        let props = &zone.properties;
        Self {
            rank,
            id: props.id.clone(),
            zone_type: props.zone_type,
            state: props.state.clone(),
            district: props.district.clone(),
            confidence: props.confidence,
            area_sqkm: props.area_sqkm,
            avg_thermal_anomaly: props.avg_thermal_anomaly,
        }
    }
}

/// Everything the report exporter consumes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    /// When the report was assembled.
    pub generated_at: DateTime<Utc>,
    /// Where the zones came from.
    pub source: DataSource,
    /// Full mine collection, for the exporter's listing pages.
    #[serde(skip)]
    pub mines: Arc<MineCollection>,
    /// Full zone collection, for the exporter's listing pages.
    #[serde(skip)]
    pub zones: Arc<ZoneCollection>,
    /// Analytics over `mines` and `zones`.
    pub snapshot: AnalyticsSnapshot,
    /// Summary table rows.
    pub summary: Vec<SummaryRow>,
    /// Per-state table, in snapshot order.
    pub states: Vec<StateRow>,
    /// Highest-confidence zones, descending. Ties keep collection order.
    pub top_zones: Vec<ZoneRow>,
}

impl ReportData {
    /// Assembles the report from the full collections and their snapshot.
    #[must_use]
    pub fn build(
        mines: Arc<MineCollection>,
        zones: Arc<ZoneCollection>,
        snapshot: AnalyticsSnapshot,
        source: DataSource,
        top_zones: usize,
    ) -> Self {
        let summary = summary_rows(&snapshot);
        let states = snapshot
            .state_distribution
            .iter()
            .map(|row| StateRow {
                state: row.state.clone(),
                known: row.known,
                predicted: row.predicted,
                total: row.known + row.predicted,
            })
            .collect();
        let top_zones = top_zones_by_confidence(&zones, top_zones);

        Self {
            generated_at: Utc::now(),
            source,
            mines,
            zones,
            snapshot,
            summary,
            states,
            top_zones,
        }
    }

    /// Zones of one type, in collection order.
    pub fn zones_of_type(&self, zone_type: ZoneType) -> impl Iterator<Item = &PredictedZone> {
        self.zones
            .iter()
            .filter(move |zone| zone.properties.zone_type == zone_type)
    }
}

fn summary_rows(snapshot: &AnalyticsSnapshot) -> Vec<SummaryRow> {
    let row = |metric: &str, value: String| SummaryRow {
        metric: metric.to_string(),
        value,
    };
    let overlap = &snapshot.overlap_statistics;

    vec![
        row("Total Known Mines", snapshot.total_known_mines.to_string()),
        row(
            "Total Predicted Zones",
            snapshot.total_predicted_zones.to_string(),
        ),
        row(
            "Zones with Known Mines",
            overlap.zones_with_known_mines.to_string(),
        ),
        row(
            "Overlap Percentage",
            format!("{:.1}%", overlap.percentage_overlap),
        ),
        row(
            "Average Thermal Anomaly",
            format!("{:.2}°C", snapshot.avg_thermal_anomaly),
        ),
        row("Surface Zones", snapshot.surface_zones.to_string()),
        row("Underground Zones", snapshot.underground_zones.to_string()),
        row(
            "Total Predicted Area",
            format!("{:.1} km²", snapshot.total_area_sqkm),
        ),
    ]
}

fn top_zones_by_confidence(zones: &ZoneCollection, limit: usize) -> Vec<ZoneRow> {
    let mut ranked: Vec<&PredictedZone> = zones.iter().collect();
    // Stable sort keeps input order among equal confidences.
    ranked.sort_by(|a, b| b.properties.confidence.total_cmp(&a.properties.confidence));

    ranked
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(idx, zone)| ZoneRow::new(idx + 1, zone))
        .collect()
}
