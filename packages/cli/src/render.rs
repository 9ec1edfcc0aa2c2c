//! Plain-text and JSON rendering of coordinator state.

use minesight_analytics_models::{AnalyticsSnapshot, Layer};
use minesight_dashboard::{ReportData, ViewCoordinator};
use minesight_mine_models::ZoneType;
use serde_json::json;

const BAR_WIDTH: usize = 30;

/// Filtered counts, source flags and the global snapshot as JSON.
pub fn summary_json(view: &ViewCoordinator) -> serde_json::Value {
    json!({
        "source": view.source(),
        "connection": view.connection_state(),
        "modelInfo": view.model_info(),
        "filters": view.criteria(),
        "layers": view.layers(),
        "filteredMineCount": view.filtered_mine_count(),
        "filteredZoneCount": view.filtered_zone_count(),
        "visibleMineCount": view.visible_mines().len(),
        "visibleZoneCount": view.visible_zones().len(),
        "analytics": view.snapshot(),
    })
}

pub fn print_summary(view: &ViewCoordinator) {
    let criteria = view.criteria();
    let layers: Vec<String> = Layer::all()
        .iter()
        .filter(|layer| view.layers().is_visible(**layer))
        .map(ToString::to_string)
        .collect();

    println!();
    println!(
        "Data source:     {} (prediction service {})",
        view.source(),
        view.connection_state()
    );
    if let Some(info) = view.model_info() {
        println!(
            "Model:           {} ({}, accuracy {})",
            info.model_name, info.architecture, info.accuracy
        );
    }
    println!(
        "Filters:         state={} confidence>={}",
        criteria.state, criteria.confidence
    );
    println!(
        "Layers:          {}",
        if layers.is_empty() {
            "none".to_string()
        } else {
            layers.join(", ")
        }
    );
    println!(
        "Mines:           {} matching, {} shown",
        view.filtered_mine_count(),
        view.visible_mines().len()
    );
    println!(
        "Predicted zones: {} matching, {} shown",
        view.filtered_zone_count(),
        view.visible_zones().len()
    );
    println!();

    print_snapshot(view.snapshot());
}

fn print_snapshot(snapshot: &AnalyticsSnapshot) {
    let overlap = &snapshot.overlap_statistics;

    println!("Analytics (full dataset)");
    println!("  Known mines:          {}", snapshot.total_known_mines);
    println!(
        "  Predicted zones:      {} ({} surface, {} underground)",
        snapshot.total_predicted_zones, snapshot.surface_zones, snapshot.underground_zones
    );
    println!(
        "  Zones over mines:     {} ({:.1}%)",
        overlap.zones_with_known_mines, overlap.percentage_overlap
    );
    println!(
        "  Avg thermal anomaly:  {:.2}°C",
        snapshot.avg_thermal_anomaly
    );
    println!();

    println!("Confidence histogram");
    let max = snapshot
        .confidence_histogram
        .iter()
        .map(|bucket| bucket.count)
        .max()
        .unwrap_or(0);
    for bucket in &snapshot.confidence_histogram {
        println!(
            "  {:.2} {:<width$} {}",
            bucket.confidence,
            bar(bucket.count, max),
            bucket.count,
            width = BAR_WIDTH
        );
    }
    println!();

    println!("State distribution");
    println!("  {:<20} {:>6} {:>10}", "State", "Known", "Predicted");
    for row in &snapshot.state_distribution {
        println!("  {:<20} {:>6} {:>10}", row.state, row.known, row.predicted);
    }
}

fn bar(count: usize, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    "#".repeat((count * BAR_WIDTH).div_ceil(max))
}

pub fn print_report(report: &ReportData) {
    println!();
    println!(
        "MineSight report ({} data, generated {})",
        report.source,
        report.generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    println!();

    println!("{:<26} Value", "Metric");
    for row in &report.summary {
        println!("{:<26} {}", row.metric, row.value);
    }
    println!();

    println!(
        "{:<4} {:<20} {:>6} {:>10} {:>6}",
        "#", "State/UT", "Known", "Predicted", "Total"
    );
    for (idx, row) in report.states.iter().enumerate() {
        println!(
            "{:<4} {:<20} {:>6} {:>10} {:>6}",
            idx + 1,
            row.state,
            row.known,
            row.predicted,
            row.total
        );
    }
    println!();

    println!("Top {} predicted zones by confidence", report.top_zones.len());
    println!(
        "{:<4} {:<26} {:<12} {:<16} {:<14} {:>5} {:>9} {:>8}",
        "#", "Zone ID", "Type", "State", "District", "Conf", "Area km²", "Thermal"
    );
    for row in &report.top_zones {
        println!(
            "{:<4} {:<26} {:<12} {:<16} {:<14} {:>5.2} {:>9.1} {:>8.2}",
            row.rank,
            row.id,
            row.zone_type,
            row.state,
            row.district,
            row.confidence,
            row.area_sqkm,
            row.avg_thermal_anomaly
        );
    }
    println!();

    println!(
        "Zones by type: {} surface, {} underground; {} known mines listed in dataset",
        report.zones_of_type(ZoneType::Surface).count(),
        report.zones_of_type(ZoneType::Underground).count(),
        report.mines.len()
    );
}
