#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory spatial index for mine/zone overlap.
//!
//! Bulk-loads existing mine points into an R-tree, then answers "does this
//! predicted zone contain any known mine?" by querying the zone's bounding
//! box and running a point-in-polygon test on each candidate. Points lying
//! exactly on a zone boundary count as contained.

use geo::coordinate_position::{CoordPos, CoordinatePosition};
use geo::{BoundingRect, Coord, Polygon};
use minesight_mine_models::{MineCollection, Position, PredictedZone, ZoneCollection};
use rstar::primitives::GeomWithData;
use rstar::{AABB, RTree};

/// A mine point stored in the R-tree, tagged with its index in the source
/// collection.
type MineEntry = GeomWithData<[f64; 2], usize>;

/// Pre-built R-tree over a mine collection.
///
/// Built once per load cycle. Stores positions and collection indices only.
pub struct MineIndex {
    mines: RTree<MineEntry>,
}

impl MineIndex {
    /// Builds the index from every mine in `mines`.
    ///
    /// Mines without a `Point` geometry are skipped.
    #[must_use]
    pub fn build(mines: &MineCollection) -> Self {
        let entries: Vec<MineEntry> = mines
            .iter()
            .enumerate()
            .filter_map(|(idx, mine)| {
                let position = mine.position();
                if position.is_none() {
                    log::debug!("Skipping mine {} without a point geometry", mine.properties.name);
                }
                position.map(|position| GeomWithData::new(position, idx))
            })
            .collect();

        let mines = RTree::bulk_load(entries);
        log::debug!("Loaded {} mines into spatial index", mines.size());

        Self { mines }
    }

    /// Number of indexed mines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mines.size()
    }

    /// Whether the index holds no mines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mines.size() == 0
    }

    /// Indices (into the source mine collection) of every mine inside or on
    /// the boundary of `zone`, in ascending order.
    #[must_use]
    pub fn mines_in_zone(&self, zone: &PredictedZone) -> Vec<usize> {
        let Some(polygon) = zone_polygon(zone) else {
            return Vec::new();
        };
        let Some(envelope) = polygon_envelope(&polygon) else {
            return Vec::new();
        };

        let mut hits: Vec<usize> = self
            .mines
            .locate_in_envelope_intersecting(&envelope)
            .filter(|entry| polygon_contains(&polygon, *entry.geom()))
            .map(|entry| entry.data)
            .collect();
        hits.sort_unstable();
        hits
    }

    /// Whether `zone` contains at least one indexed mine.
    #[must_use]
    pub fn zone_has_mine(&self, zone: &PredictedZone) -> bool {
        let Some(polygon) = zone_polygon(zone) else {
            return false;
        };
        let Some(envelope) = polygon_envelope(&polygon) else {
            return false;
        };

        self.mines
            .locate_in_envelope_intersecting(&envelope)
            .any(|entry| polygon_contains(&polygon, *entry.geom()))
    }

    /// Counts the zones in `zones` that contain at least one indexed mine.
    #[must_use]
    pub fn count_zones_with_mines(&self, zones: &ZoneCollection) -> usize {
        zones.iter().filter(|zone| self.zone_has_mine(zone)).count()
    }
}

/// Converts a zone's `GeoJSON` boundary into a [`geo::Polygon`].
///
/// Returns `None` for a zone whose geometry is not a `Polygon` or has no
/// exterior ring.
#[must_use]
pub fn zone_polygon(zone: &PredictedZone) -> Option<Polygon<f64>> {
    if zone.rings().is_none_or(<[_]>::is_empty) {
        return None;
    }

    let geometry: geo::Geometry<f64> = zone.geometry.clone().try_into().ok()?;
    match geometry {
        geo::Geometry::Polygon(polygon) => Some(polygon),
        _ => None,
    }
}

/// Point-in-polygon test; boundary points count as inside.
#[must_use]
pub fn polygon_contains(polygon: &Polygon<f64>, position: Position) -> bool {
    let coord = Coord {
        x: position[0],
        y: position[1],
    };
    matches!(
        polygon.coordinate_position(&coord),
        CoordPos::Inside | CoordPos::OnBoundary
    )
}

fn polygon_envelope(polygon: &Polygon<f64>) -> Option<AABB<[f64; 2]>> {
    polygon.bounding_rect().map(|rect| {
        AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y])
    })
}
