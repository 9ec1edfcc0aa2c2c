//! Aggregate analytics over the full mine and zone collections.
//!
//! The snapshot is a global view: it is always computed from the
//! unfiltered collections and is never re-filtered by state or
//! confidence. Filtered counts shown next to it come from the filtered
//! collections themselves.

use std::collections::BTreeMap;

use minesight_analytics_models::{
    AnalyticsSnapshot, ConfidenceBucket, OverlapStatistics, StateCount,
};
use minesight_mine_models::{MineCollection, StateScoped as _, ZoneCollection, ZoneType};
use minesight_spatial::MineIndex;

/// Computes the full analytics snapshot.
///
/// Deterministic: identical inputs always produce identical output,
/// including the order of the histogram and state distribution.
#[must_use]
pub fn compute_snapshot(mines: &MineCollection, zones: &ZoneCollection) -> AnalyticsSnapshot {
    let overlap_statistics = overlap_statistics(mines, zones);

    let surface_zones = zones
        .iter()
        .filter(|zone| zone.properties.zone_type == ZoneType::Surface)
        .count();

    let snapshot = AnalyticsSnapshot {
        total_known_mines: mines.len(),
        total_predicted_zones: zones.len(),
        overlap_statistics,
        avg_thermal_anomaly: average_thermal_anomaly(zones),
        confidence_histogram: confidence_histogram(zones),
        state_distribution: state_distribution(mines, zones),
        surface_zones,
        underground_zones: zones.len() - surface_zones,
        total_area_sqkm: zones.iter().map(|zone| zone.properties.area_sqkm).sum(),
    };

    log::debug!(
        "Computed snapshot: {} mines, {} zones, {} overlapping, {} states",
        snapshot.total_known_mines,
        snapshot.total_predicted_zones,
        snapshot.overlap_statistics.zones_with_known_mines,
        snapshot.state_distribution.len(),
    );

    snapshot
}

/// Counts zones whose polygon contains at least one mine point.
#[must_use]
pub fn overlap_statistics(mines: &MineCollection, zones: &ZoneCollection) -> OverlapStatistics {
    if zones.is_empty() || mines.is_empty() {
        return OverlapStatistics::default();
    }

    let index = MineIndex::build(mines);
    let zones_with_known_mines = index.count_zones_with_mines(zones);

    OverlapStatistics {
        zones_with_known_mines,
        percentage_overlap: percentage(zones_with_known_mines, zones.len()),
    }
}

/// `100 * part / total`, or 0 when `total` is 0.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * part as f64 / total as f64
    }
}

/// Arithmetic mean of `avg_thermal_anomaly`, or 0 for no zones.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn average_thermal_anomaly(zones: &ZoneCollection) -> f64 {
    if zones.is_empty() {
        return 0.0;
    }
    let total: f64 = zones
        .iter()
        .map(|zone| zone.properties.avg_thermal_anomaly)
        .sum();
    total / zones.len() as f64
}

/// One bucket per distinct confidence at hundredths granularity,
/// ascending by confidence.
///
/// Confidences are clamped to `[0, 1]` before bucketing.
#[must_use]
pub fn confidence_histogram(zones: &ZoneCollection) -> Vec<ConfidenceBucket> {
    let mut buckets: BTreeMap<u32, usize> = BTreeMap::new();
    for zone in zones {
        *buckets
            .entry(hundredths(zone.properties.confidence))
            .or_default() += 1;
    }

    buckets
        .into_iter()
        .map(|(hundredths, count)| ConfidenceBucket {
            confidence: f64::from(hundredths) / 100.0,
            count,
        })
        .collect()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn hundredths(confidence: f64) -> u32 {
    (confidence.clamp(0.0, 1.0) * 100.0).round() as u32
}

/// Known and predicted counts for every state in either collection.
///
/// States appear in first-seen order, scanning mines before zones. State
/// names are compared exactly (case-sensitive).
#[must_use]
pub fn state_distribution(mines: &MineCollection, zones: &ZoneCollection) -> Vec<StateCount> {
    let mut rows: Vec<StateCount> = Vec::new();
    let mut positions: BTreeMap<&str, usize> = BTreeMap::new();

    for mine in mines {
        let idx = row_for(&mut rows, &mut positions, mine.state());
        rows[idx].known += 1;
    }
    for zone in zones {
        let idx = row_for(&mut rows, &mut positions, zone.state());
        rows[idx].predicted += 1;
    }

    rows
}

fn row_for<'a>(
    rows: &mut Vec<StateCount>,
    positions: &mut BTreeMap<&'a str, usize>,
    state: &'a str,
) -> usize {
    *positions.entry(state).or_insert_with(|| {
        rows.push(StateCount {
            state: state.to_string(),
            known: 0,
            predicted: 0,
        });
        rows.len() - 1
    })
}
