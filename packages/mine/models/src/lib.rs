#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Existing mine and predicted zone feature types.
//!
//! Both feature sets are `GeoJSON` so the same values can be handed
//! straight to map renderers: existing mines carry `Point` geometries and
//! AI-predicted zones carry `Polygon` geometries. Geometries are
//! [`geojson::Geometry`] values; properties are typed per feature kind.
//! Coordinates are always `[longitude, latitude]`.

use geojson::{Geometry, Value};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

pub use geojson;

/// A `[longitude, latitude]` coordinate pair.
pub type Position = [f64; 2];

/// Errors returned when a feature fails boundary validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidFeatureError {
    /// Confidence is not a number in `[0, 1]`.
    #[error("zone {id}: confidence {confidence} is outside [0, 1]")]
    Confidence {
        /// Zone identifier.
        id: String,
        /// The offending value.
        confidence: f64,
    },

    /// Area is negative or not a number.
    #[error("zone {id}: area {area_sqkm} sq km is not a non-negative number")]
    Area {
        /// Zone identifier.
        id: String,
        /// The offending value.
        area_sqkm: f64,
    },

    /// The polygon boundary is not a closed ring.
    #[error("zone {id}: {message}")]
    Boundary {
        /// Zone identifier.
        id: String,
        /// What is wrong with the ring.
        message: String,
    },

    /// The geometry is of the wrong kind for the feature.
    #[error("{feature}: expected a {expected} geometry")]
    Geometry {
        /// Zone id or mine name.
        feature: String,
        /// `"Point"` or `"Polygon"`.
        expected: &'static str,
    },
}

/// `GeoJSON` `type` tag of a feature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureTag {
    /// `"Feature"`
    #[default]
    Feature,
}

/// `GeoJSON` `type` tag of a feature collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureCollectionTag {
    /// `"FeatureCollection"`
    #[default]
    FeatureCollection,
}

/// A `Point` geometry at the given longitude and latitude.
#[must_use]
pub fn point(lng: f64, lat: f64) -> Geometry {
    Geometry::new(Value::Point(vec![lng, lat]))
}

/// A `Polygon` geometry with a single exterior ring.
///
/// The ring is closed automatically if the last position does not repeat
/// the first.
#[must_use]
pub fn polygon(mut ring: Vec<Position>) -> Geometry {
    if let (Some(first), Some(last)) = (ring.first().copied(), ring.last().copied())
        && first != last
    {
        ring.push(first);
    }
    Geometry::new(Value::Polygon(vec![
        ring.into_iter().map(Vec::from).collect(),
    ]))
}

/// A geo-tagged record with typed properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature<P> {
    /// Always `"Feature"`.
    #[serde(rename = "type", default)]
    pub kind: FeatureTag,
    /// Feature geometry.
    pub geometry: Geometry,
    /// Typed feature properties.
    pub properties: P,
}

impl<P> Feature<P> {
    /// Creates a feature from its geometry and properties.
    pub const fn new(geometry: Geometry, properties: P) -> Self {
        Self {
            kind: FeatureTag::Feature,
            geometry,
            properties,
        }
    }
}

/// Properties that carry a state name.
pub trait StateScoped {
    /// The state (administrative region) this record belongs to.
    fn state(&self) -> &str;
}

impl<P: StateScoped> StateScoped for Feature<P> {
    fn state(&self) -> &str {
        self.properties.state()
    }
}

/// An ordered sequence of features sharing a geometry kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection<F> {
    /// Always `"FeatureCollection"`.
    #[serde(rename = "type", default)]
    pub kind: FeatureCollectionTag,
    /// Features in their original order.
    pub features: Vec<F>,
}

impl<F> FeatureCollection<F> {
    /// Creates a collection preserving the order of `features`.
    #[must_use]
    pub const fn new(features: Vec<F>) -> Self {
        Self {
            kind: FeatureCollectionTag::FeatureCollection,
            features,
        }
    }

    /// Number of features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether the collection has no features.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Iterates features in order.
    pub fn iter(&self) -> std::slice::Iter<'_, F> {
        self.features.iter()
    }
}

impl<F> Default for FeatureCollection<F> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<F> FromIterator<F> for FeatureCollection<F> {
    fn from_iter<I: IntoIterator<Item = F>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a, F> IntoIterator for &'a FeatureCollection<F> {
    type Item = &'a F;
    type IntoIter = std::slice::Iter<'a, F>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.iter()
    }
}

/// Operating status of a known mine.
///
/// Anything other than `"Operating"` is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MineStatus {
    /// Actively producing.
    Operating,
    /// Any other reported status (closed, abandoned, ...).
    Other(String),
}

impl MineStatus {
    /// Whether the mine is currently operating.
    #[must_use]
    pub const fn is_operating(&self) -> bool {
        matches!(self, Self::Operating)
    }
}

impl From<String> for MineStatus {
    fn from(value: String) -> Self {
        if value == "Operating" {
            Self::Operating
        } else {
            Self::Other(value)
        }
    }
}

impl From<MineStatus> for String {
    fn from(value: MineStatus) -> Self {
        match value {
            MineStatus::Operating => "Operating".to_string(),
            MineStatus::Other(other) => other,
        }
    }
}

impl std::fmt::Display for MineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Operating => f.write_str("Operating"),
            Self::Other(other) => f.write_str(other),
        }
    }
}

/// Properties of a known, existing coal mine.
///
/// Mines have no explicit identifier and duplicates are tolerated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MineProperties {
    /// Mine or colliery name.
    pub name: String,
    /// State the mine lies in.
    pub state: String,
    /// District the mine lies in.
    pub district: String,
    /// Operating company (free text).
    pub owner: String,
    /// Operating status.
    pub status: MineStatus,
}

impl StateScoped for MineProperties {
    fn state(&self) -> &str {
        &self.state
    }
}

/// Mining method a predicted zone is suited for.
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
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ZoneType {
    /// Open-cast / surface deposit.
    Surface,
    /// Deep underground deposit.
    Underground,
}

/// Properties of an AI-predicted coal zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneProperties {
    /// Zone identifier (expected unique, not enforced).
    pub id: String,
    /// Surface or underground.
    #[serde(rename = "type")]
    pub zone_type: ZoneType,
    /// Model confidence in `[0, 1]`.
    pub confidence: f64,
    /// State the zone lies in.
    pub state: String,
    /// District the zone lies in.
    pub district: String,
    /// Zone area in square kilometres.
    pub area_sqkm: f64,
    /// Mean thermal anomaly in °C.
    pub avg_thermal_anomaly: f64,
}

impl StateScoped for ZoneProperties {
    fn state(&self) -> &str {
        &self.state
    }
}

/// A known mine: a point feature.
pub type ExistingMine = Feature<MineProperties>;

/// A predicted zone: a polygon feature.
pub type PredictedZone = Feature<ZoneProperties>;

/// All known mines.
pub type MineCollection = FeatureCollection<ExistingMine>;

/// All predicted zones.
pub type ZoneCollection = FeatureCollection<PredictedZone>;

impl Feature<MineProperties> {
    /// The mine's `[longitude, latitude]`, or `None` if the geometry is not
    /// a two-dimensional `Point`.
    #[must_use]
    pub fn position(&self) -> Option<Position> {
        match &self.geometry.value {
            Value::Point(coords) if coords.len() >= 2 => Some([coords[0], coords[1]]),
            _ => None,
        }
    }

    /// Checks that the mine carries a `Point` geometry.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidFeatureError::Geometry`] for any other geometry.
    pub fn validate(&self) -> Result<(), InvalidFeatureError> {
        if self.position().is_none() {
            return Err(InvalidFeatureError::Geometry {
                feature: self.properties.name.clone(),
                expected: "Point",
            });
        }
        Ok(())
    }
}

impl Feature<ZoneProperties> {
    /// The zone's rings (exterior first, then holes), or `None` if the
    /// geometry is not a `Polygon`.
    #[must_use]
    pub fn rings(&self) -> Option<&[Vec<geojson::Position>]> {
        match &self.geometry.value {
            Value::Polygon(rings) => Some(rings.as_slice()),
            _ => None,
        }
    }

    /// Checks the zone against the data model's value constraints.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidFeatureError`] if the confidence is outside
    /// `[0, 1]`, the area is negative, the geometry is not a `Polygon`, or
    /// a ring is not closed.
    pub fn validate(&self) -> Result<(), InvalidFeatureError> {
        let props = &self.properties;

        if !(0.0..=1.0).contains(&props.confidence) {
            return Err(InvalidFeatureError::Confidence {
                id: props.id.clone(),
                confidence: props.confidence,
            });
        }

        if props.area_sqkm.is_nan() || props.area_sqkm < 0.0 {
            return Err(InvalidFeatureError::Area {
                id: props.id.clone(),
                area_sqkm: props.area_sqkm,
            });
        }

        let Some(rings) = self.rings() else {
            return Err(InvalidFeatureError::Geometry {
                feature: props.id.clone(),
                expected: "Polygon",
            });
        };

        if rings.is_empty() {
            return Err(InvalidFeatureError::Boundary {
                id: props.id.clone(),
                message: "polygon has no exterior ring".to_string(),
            });
        }

        for ring in rings {
            if ring.len() < 4 {
                return Err(InvalidFeatureError::Boundary {
                    id: props.id.clone(),
                    message: format!("ring has {} positions, need at least 4", ring.len()),
                });
            }
            if ring.first() != ring.last() {
                return Err(InvalidFeatureError::Boundary {
                    id: props.id.clone(),
                    message: "ring is not closed".to_string(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(confidence: f64, ring: Vec<Position>) -> PredictedZone {
        Feature::new(
            Geometry::new(Value::Polygon(vec![
                ring.into_iter().map(Vec::from).collect(),
            ])),
            ZoneProperties {
                id: "pred_test".to_string(),
                zone_type: ZoneType::Surface,
                confidence,
                state: "Odisha".to_string(),
                district: "Angul".to_string(),
                area_sqkm: 10.0,
                avg_thermal_anomaly: 0.9,
            },
        )
    }

    fn square() -> Vec<Position> {
        vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]
    }

    #[test]
    fn parses_geojson_mine() {
        let json = serde_json::json!({
            "type": "Feature",
            "geometry": { "type": "Point", "coordinates": [86.415, 23.745] },
            "properties": {
                "name": "Jharia Colliery",
                "state": "Jharkhand",
                "district": "Dhanbad",
                "owner": "BCCL",
                "status": "Operating"
            }
        });
        let mine: ExistingMine = serde_json::from_value(json).unwrap();
        let [lng, lat] = mine.position().unwrap();
        assert!((lng - 86.415).abs() < 1e-9);
        assert!((lat - 23.745).abs() < 1e-9);
        assert!(mine.validate().is_ok());
        assert!(mine.properties.status.is_operating());
        assert_eq!(mine.state(), "Jharkhand");
    }

    #[test]
    fn parses_geojson_zone_type() {
        let json = serde_json::json!({
            "type": "Feature",
            "geometry": { "type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]] },
            "properties": {
                "id": "pred_x",
                "type": "underground",
                "confidence": 0.82,
                "state": "Jharkhand",
                "district": "Palamu",
                "area_sqkm": 425,
                "avg_thermal_anomaly": 1.08
            }
        });
        let zone: PredictedZone = serde_json::from_value(json).unwrap();
        assert_eq!(zone.properties.zone_type, ZoneType::Underground);
        let rings = zone.rings().unwrap();
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].len(), 4);
        assert!(zone.validate().is_ok());
    }

    #[test]
    fn unknown_status_kept_verbatim() {
        let status = MineStatus::from("Closed".to_string());
        assert!(!status.is_operating());
        assert_eq!(String::from(status), "Closed");
    }

    #[test]
    fn zone_type_parses_lowercase() {
        assert_eq!("surface".parse::<ZoneType>().unwrap(), ZoneType::Surface);
        assert_eq!(ZoneType::Underground.to_string(), "underground");
        assert!("Surface".parse::<ZoneType>().is_err());
    }

    #[test]
    fn polygon_closes_ring() {
        let Value::Polygon(rings) = polygon(vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]).value else {
            panic!("expected a polygon");
        };
        assert_eq!(rings[0].len(), 4);
        assert_eq!(rings[0].first(), rings[0].last());
    }

    #[test]
    fn point_geometry_round_trips_position() {
        let mine = Feature::new(
            point(85.1, 23.6),
            MineProperties {
                name: "Rajrappa".to_string(),
                state: "Jharkhand".to_string(),
                district: "Ramgarh".to_string(),
                owner: "CCL".to_string(),
                status: MineStatus::Operating,
            },
        );
        assert_eq!(mine.position(), Some([85.1, 23.6]));
    }

    #[test]
    fn validate_rejects_wrong_geometry_kind() {
        let mut z = zone(0.5, square());
        z.geometry = point(0.0, 0.0);
        assert!(z.rings().is_none());
        assert!(matches!(
            z.validate(),
            Err(InvalidFeatureError::Geometry {
                expected: "Polygon",
                ..
            })
        ));

        let mine: ExistingMine = serde_json::from_value(serde_json::json!({
            "type": "Feature",
            "geometry": { "type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]] },
            "properties": {
                "name": "Misplaced",
                "state": "Odisha",
                "district": "Angul",
                "owner": "MCL",
                "status": "Operating"
            }
        }))
        .unwrap();
        assert_eq!(mine.position(), None);
        assert!(matches!(
            mine.validate(),
            Err(InvalidFeatureError::Geometry {
                expected: "Point",
                ..
            })
        ));
    }

    #[test]
    fn validate_accepts_well_formed_zone() {
        assert!(zone(0.0, square()).validate().is_ok());
        assert!(zone(1.0, square()).validate().is_ok());
    }

    #[test]
    fn validate_rejects_out_of_range_confidence() {
        assert!(matches!(
            zone(1.2, square()).validate(),
            Err(InvalidFeatureError::Confidence { .. })
        ));
        assert!(matches!(
            zone(f64::NAN, square()).validate(),
            Err(InvalidFeatureError::Confidence { .. })
        ));
    }

    #[test]
    fn validate_rejects_open_ring() {
        let open = vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        assert!(matches!(
            zone(0.5, open).validate(),
            Err(InvalidFeatureError::Boundary { .. })
        ));
    }

    #[test]
    fn validate_rejects_negative_area() {
        let mut z = zone(0.5, square());
        z.properties.area_sqkm = -1.0;
        assert!(matches!(z.validate(), Err(InvalidFeatureError::Area { .. })));
    }

    #[test]
    fn collection_serializes_as_geojson() {
        let collection: ZoneCollection = std::iter::once(zone(0.7, square())).collect();
        let value = serde_json::to_value(&collection).unwrap();
        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["features"][0]["type"], "Feature");
        assert_eq!(value["features"][0]["geometry"]["type"], "Polygon");
        assert_eq!(value["features"][0]["properties"]["type"], "surface");
    }
}
