//! Filter evaluation over mine and zone collections.
//!
//! Filters preserve the relative order of matching features and are
//! idempotent. Layer gating ([`visible_mines`], [`visible_zones`]) is a
//! separate display-time step applied after filtering.

use std::collections::BTreeSet;
use std::sync::Arc;

use minesight_analytics_models::{ConfidenceThreshold, Layer, StateFilter, VisibleLayers};
use minesight_mine_models::{
    ExistingMine, MineCollection, PredictedZone, StateScoped as _, ZoneCollection,
};

/// Mines whose state matches `state`.
///
/// An unrestricted filter hands back the same shared collection without
/// copying.
#[must_use]
pub fn filter_mines(mines: &Arc<MineCollection>, state: &StateFilter) -> Arc<MineCollection> {
    if state.is_all() {
        return Arc::clone(mines);
    }

    Arc::new(
        mines
            .iter()
            .filter(|mine| state.matches(mine.state()))
            .cloned()
            .collect(),
    )
}

/// Zones matching `state` whose confidence is at least `threshold`.
#[must_use]
pub fn filter_zones(
    zones: &ZoneCollection,
    state: &StateFilter,
    threshold: ConfidenceThreshold,
) -> ZoneCollection {
    zones
        .iter()
        .filter(|zone| zone_matches(zone, state, threshold))
        .cloned()
        .collect()
}

/// The predicate [`filter_zones`] applies to each zone.
#[must_use]
pub fn zone_matches(
    zone: &PredictedZone,
    state: &StateFilter,
    threshold: ConfidenceThreshold,
) -> bool {
    state.matches(zone.state()) && threshold.passes(zone.properties.confidence)
}

/// Mines to draw, or nothing when the existing-mines layer is hidden.
#[must_use]
pub fn visible_mines<'a>(mines: &'a MineCollection, layers: &VisibleLayers) -> &'a [ExistingMine] {
    if layers.is_visible(Layer::Existing) {
        &mines.features
    } else {
        &[]
    }
}

/// Zones to draw, gated per zone type.
#[must_use]
pub fn visible_zones<'a>(
    zones: &'a ZoneCollection,
    layers: &VisibleLayers,
) -> Vec<&'a PredictedZone> {
    zones
        .iter()
        .filter(|zone| layers.shows_zone_type(zone.properties.zone_type))
        .collect()
}

/// Sorted distinct state names across both collections.
#[must_use]
pub fn available_states(mines: &MineCollection, zones: &ZoneCollection) -> Vec<String> {
    let states: BTreeSet<&str> = mines
        .iter()
        .map(|mine| mine.state())
        .chain(zones.iter().map(|zone| zone.state()))
        .collect();
    states.into_iter().map(str::to_string).collect()
}

/// [`available_states`] prefixed with the "All" picker label.
#[must_use]
pub fn state_options(mines: &MineCollection, zones: &ZoneCollection) -> Vec<String> {
    std::iter::once(StateFilter::ALL_LABEL.to_string())
        .chain(available_states(mines, zones))
        .collect()
}

#[cfg(test)]
mod tests {
    use minesight_mine_models::{StateScoped as _, ZoneType};

    use super::*;
    use crate::fixtures::{mine, zone};

    fn threshold(value: f64) -> ConfidenceThreshold {
        ConfidenceThreshold::new(value).unwrap()
    }

    fn names(mines: &MineCollection) -> Vec<&str> {
        mines.iter().map(|m| m.properties.name.as_str()).collect()
    }

    fn ids(zones: &ZoneCollection) -> Vec<&str> {
        zones.iter().map(|z| z.properties.id.as_str()).collect()
    }

    #[test]
    fn filters_mines_by_state_in_order() {
        let mines: Arc<MineCollection> = Arc::new(
            vec![
                mine("a", "Jharkhand", 86.0, 23.0),
                mine("b", "Odisha", 85.0, 21.0),
                mine("c", "Jharkhand", 86.1, 23.1),
            ]
            .into_iter()
            .collect(),
        );

        let filtered = filter_mines(&mines, &StateFilter::only("Jharkhand"));
        assert_eq!(names(&filtered), vec!["a", "c"]);
        assert!(filtered.iter().all(|m| m.state() == "Jharkhand"));
        assert_eq!(mines.len(), 3);
    }

    #[test]
    fn unrestricted_mine_filter_returns_same_collection() {
        let mines: Arc<MineCollection> = Arc::new(
            vec![mine("a", "Jharkhand", 86.0, 23.0), mine("a", "Jharkhand", 86.0, 23.0)]
                .into_iter()
                .collect(),
        );
        let filtered = filter_mines(&mines, &StateFilter::all());
        assert!(Arc::ptr_eq(&mines, &filtered));
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn unknown_state_yields_empty() {
        let mines: Arc<MineCollection> =
            Arc::new(std::iter::once(mine("a", "Jharkhand", 86.0, 23.0)).collect());
        assert!(filter_mines(&mines, &StateFilter::only("Goa")).is_empty());
    }

    #[test]
    fn filters_zones_by_inclusive_threshold() {
        let zones: ZoneCollection = vec![
            zone("z1", "Odisha", 0.62),
            zone("z2", "Odisha", 0.82),
            zone("z3", "Jharkhand", 0.71),
        ]
        .into_iter()
        .collect();

        let filtered = filter_zones(&zones, &StateFilter::all(), threshold(0.7));
        assert_eq!(ids(&filtered), vec!["z2", "z3"]);

        let exact = filter_zones(&zones, &StateFilter::all(), threshold(0.71));
        assert_eq!(ids(&exact), vec!["z2", "z3"]);
    }

    #[test]
    fn zone_filter_combines_state_and_threshold() {
        let zones: ZoneCollection = vec![
            zone("z1", "Odisha", 0.9),
            zone("z2", "Jharkhand", 0.9),
            zone("z3", "Odisha", 0.5),
        ]
        .into_iter()
        .collect();

        let filtered = filter_zones(&zones, &StateFilter::only("Odisha"), threshold(0.6));
        assert_eq!(ids(&filtered), vec!["z1"]);
    }

    #[test]
    fn zone_filter_is_complete_and_sound() {
        let zones: ZoneCollection = (0..=20_u32)
            .map(|i| {
                let state = if i % 3 == 0 { "Odisha" } else { "Telangana" };
                zone(&format!("z{i}"), state, f64::from(i) / 20.0)
            })
            .collect();
        let state = StateFilter::only("Odisha");
        let t = threshold(0.35);

        let filtered = filter_zones(&zones, &state, t);
        for z in &filtered {
            assert!(zone_matches(z, &state, t));
        }
        let expected = zones.iter().filter(|z| zone_matches(z, &state, t)).count();
        assert_eq!(filtered.len(), expected);
    }

    #[test]
    fn zone_filter_is_idempotent() {
        let zones: ZoneCollection = vec![
            zone("z1", "Odisha", 0.62),
            zone("z2", "Odisha", 0.82),
            zone("z3", "Assam", 0.71),
        ]
        .into_iter()
        .collect();
        let state = StateFilter::only("Odisha");
        let once = filter_zones(&zones, &state, threshold(0.7));
        let twice = filter_zones(&once, &state, threshold(0.7));
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_collections_filter_to_empty() {
        let mines = Arc::new(MineCollection::default());
        let zones = ZoneCollection::default();
        assert!(filter_mines(&mines, &StateFilter::only("Odisha")).is_empty());
        assert!(filter_zones(&zones, &StateFilter::all(), ConfidenceThreshold::MIN).is_empty());
    }

    #[test]
    fn layers_gate_zones_by_type() {
        let mut underground = zone("u", "Odisha", 0.8);
        underground.properties.zone_type = ZoneType::Underground;
        let zones: ZoneCollection = vec![zone("s", "Odisha", 0.8), underground]
            .into_iter()
            .collect();
        let mines: MineCollection = std::iter::once(mine("a", "Odisha", 85.0, 21.0)).collect();

        let layers = VisibleLayers::only(&[Layer::PredictedUnderground]);
        let shown: Vec<&str> = visible_zones(&zones, &layers)
            .iter()
            .map(|z| z.properties.id.as_str())
            .collect();
        assert_eq!(shown, vec!["u"]);
        assert!(visible_mines(&mines, &layers).is_empty());
        assert_eq!(visible_mines(&mines, &VisibleLayers::default()).len(), 1);
    }

    #[test]
    fn state_options_sorted_with_all_first() {
        let mines: MineCollection = vec![
            mine("a", "Odisha", 85.0, 21.0),
            mine("b", "Jharkhand", 86.0, 23.0),
        ]
        .into_iter()
        .collect();
        let zones: ZoneCollection = vec![zone("z", "Assam", 0.7), zone("y", "Odisha", 0.7)]
            .into_iter()
            .collect();
        assert_eq!(
            state_options(&mines, &zones),
            vec!["All", "Assam", "Jharkhand", "Odisha"]
        );
    }
}
